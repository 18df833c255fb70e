//! Document model for the pages format
//!
//! Namespaces and pages are created exactly once during parsing, mutated
//! only by property assignment during parsing and by decorator
//! implementations during resolution, and never deleted. A page belongs to
//! exactly one namespace; a decorator belongs to exactly one page's list
//! until resolution discards it.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use crate::pages::source::Location;

/// A named, parameterized annotation attached to a page.
///
/// The `negated`, `is_macro` and `is_global` markers are explicit fields
/// rather than entries in `props`, so user-declared parameter names can
/// never collide with them.
#[derive(Debug, Clone)]
pub struct Decorator {
    pub location: Location,
    pub name: String,
    /// Positional arguments, in declaration order.
    pub args: Vec<String>,
    /// Named parameters.
    pub props: HashMap<String, String>,
    /// Declared with `-`: cancels same-named decorators.
    pub negated: bool,
    /// Declared with `!`: resolved through macro expansion.
    pub is_macro: bool,
    /// Declared with `%%`: scoped to the whole namespace.
    pub is_global: bool,
}

impl Decorator {
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            location,
            name: name.into(),
            args: Vec::new(),
            props: HashMap::new(),
            negated: false,
            is_macro: false,
            is_global: false,
        }
    }
}

impl fmt::Display for Decorator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%")?;
        if self.is_global {
            write!(f, "%")?;
        }
        if self.negated {
            write!(f, "-")?;
        }
        if self.is_macro {
            write!(f, "!")?;
        }
        write!(f, "{}", self.name)
    }
}

/// A body transform installed by a decorator implementation; transforms
/// run in installation order when the page is materialized.
pub type BodyTransform = Box<dyn Fn(&str) -> String>;

/// A named, addressable unit pointing at one source resource.
///
/// `headers` and `transforms` are the processing state written by
/// decorator implementations during resolution; `route` and `output` are
/// written by the build step once the resource has been materialized.
pub struct Page {
    pub location: Location,
    pub name: String,
    /// Source resource path declared with `@"..."`.
    pub resource: Option<String>,
    pub props: HashMap<String, String>,
    /// Pending decorators; empty once the page has been resolved.
    pub decorators: Vec<Decorator>,
    /// Response headers accumulated by decorator implementations.
    pub headers: HashMap<String, String>,
    /// Ordered body-transform pipeline.
    pub transforms: Vec<BodyTransform>,
    /// Public path after a successful build, slash-normalized.
    pub route: Option<String>,
    /// Where the processed resource was written.
    pub output: Option<PathBuf>,
}

impl Page {
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            location,
            name: name.into(),
            resource: None,
            props: HashMap::new(),
            decorators: Vec::new(),
            headers: HashMap::new(),
            transforms: Vec::new(),
            route: None,
            output: None,
        }
    }

    pub fn with_decorators(mut self, decorators: Vec<Decorator>) -> Self {
        self.decorators = decorators;
        self
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("name", &self.name)
            .field("resource", &self.resource)
            .field("props", &self.props)
            .field("decorators", &self.decorators)
            .field("headers", &self.headers)
            .field("transforms", &self.transforms.len())
            .field("route", &self.route)
            .field("output", &self.output)
            .finish()
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Page('{}', {} decorators)", self.name, self.decorators.len())
    }
}

/// A named top-level grouping of pages sharing default properties.
#[derive(Debug)]
pub struct Namespace {
    pub location: Location,
    pub name: String,
    pub props: HashMap<String, String>,
    pub pages: Vec<Page>,
}

impl Namespace {
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            location,
            name: name.into(),
            props: HashMap::new(),
            pages: Vec::new(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Namespace('{}', {} pages)", self.name, self.pages.len())
    }
}

/// The parse result: an ordered forest of namespaces.
#[derive(Debug, Default)]
pub struct Document {
    pub namespaces: Vec<Namespace>,
}

impl Document {
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// All pages in namespace order, then page order within a namespace.
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.namespaces.iter().flat_map(|ns| ns.pages.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::source::Source;

    fn location() -> Location {
        let source = Source::new("test", "");
        Location::new(&source, 0, 0, 0)
    }

    #[test]
    fn test_decorator_display() {
        let mut dec = Decorator::new("min", location());
        assert_eq!(format!("{}", dec), "%min");
        dec.is_global = true;
        dec.is_macro = true;
        assert_eq!(format!("{}", dec), "%%!min");
        dec.is_global = false;
        dec.is_macro = false;
        dec.negated = true;
        assert_eq!(format!("{}", dec), "%-min");
    }

    #[test]
    fn test_page_starts_unresolved() {
        let page = Page::new("index", location());
        assert!(page.resource.is_none());
        assert!(page.decorators.is_empty());
        assert!(page.route.is_none());
        assert!(page.output.is_none());
    }

    #[test]
    fn test_document_page_order() {
        let mut first = Namespace::new("a", location());
        first.pages.push(Page::new("one", location()));
        let mut second = Namespace::new("b", location());
        second.pages.push(Page::new("two", location()));
        let document = Document {
            namespaces: vec![first, second],
        };
        let names: Vec<_> = document.pages().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["one", "two"]);
    }
}
