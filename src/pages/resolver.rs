//! Decorator and macro resolution
//!
//! Resolution runs per page, in four steps: expand macro decorators into
//! the stubs their implementations return (exactly one level deep), apply
//! cancellation, invoke the remaining decorators in order, and leave the
//! page's decorator list empty. Re-resolving an already-resolved page is
//! a no-op because its list is empty.
//!
//! The two name-to-function registries live in a [`Library`] value passed
//! into each call; there is no process-wide registry.

use std::collections::HashMap;

use crate::pages::document::{Decorator, Document, Page};
use crate::pages::error::BuildError;

/// A decorator implementation: reads the decorator's arguments and
/// mutates the page's processing state. All effects are via mutation.
pub type DecoratorFn = Box<dyn Fn(&mut Page, &Decorator)>;

/// A macro implementation: returns the ordered decorator stubs spliced in
/// place of the macro.
pub type MacroFn = Box<dyn Fn(&Page, &Decorator) -> Vec<DecoratorStub>>;

/// A flagless decorator produced by a macro expansion.
///
/// Stubs carry a name, positional arguments and named parameters only;
/// they inherit the macro's location when spliced, and a negated macro
/// propagates its negation onto every stub it produced.
#[derive(Debug, Clone, Default)]
pub struct DecoratorStub {
    pub name: String,
    pub args: Vec<String>,
    pub props: HashMap<String, String>,
}

impl DecoratorStub {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn prop(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }
}

/// The decorator and macro registries used by one resolution run.
#[derive(Default)]
pub struct Library {
    decorators: HashMap<String, DecoratorFn>,
    macros: HashMap<String, MacroFn>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_decorator(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&mut Page, &Decorator) + 'static,
    ) -> Self {
        self.decorators.insert(name.into(), Box::new(f));
        self
    }

    pub fn with_macro(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&Page, &Decorator) -> Vec<DecoratorStub> + 'static,
    ) -> Self {
        self.macros.insert(name.into(), Box::new(f));
        self
    }

    /// Fold another library in; `other`'s entries win on name clashes.
    pub fn merge(&mut self, other: Library) {
        self.decorators.extend(other.decorators);
        self.macros.extend(other.macros);
    }
}

/// Resolve every page of the document, failing fast: pages after the
/// first offending one are left unresolved.
pub fn resolve(document: &mut Document, library: &Library) -> Result<(), BuildError> {
    for namespace in &mut document.namespaces {
        for page in &mut namespace.pages {
            resolve_page(page, library)?;
        }
    }
    Ok(())
}

/// Resolve a single page in place.
pub fn resolve_page(page: &mut Page, library: &Library) -> Result<(), BuildError> {
    let mut list = std::mem::take(&mut page.decorators);

    // Macro expansion, exactly one level deep. Stubs carry no flags, so
    // expansion output is never re-scanned even when a stub shares its
    // name with a registered macro.
    let mut i = 0;
    while i < list.len() {
        if !list[i].is_macro {
            i += 1;
            continue;
        }
        let mac = list.remove(i);
        let expand = library.macros.get(&mac.name).ok_or_else(|| BuildError::UnknownMacro {
            name: mac.name.clone(),
            location: mac.location.clone(),
        })?;
        let stubs = expand(page, &mac);
        let produced = stubs.len();
        for (offset, stub) in stubs.into_iter().enumerate() {
            let mut decorator = Decorator::new(stub.name, mac.location.clone());
            decorator.args = stub.args;
            decorator.props = stub.props;
            decorator.negated = mac.negated;
            list.insert(i + offset, decorator);
        }
        i += produced;
    }

    // Cancellation, scanning from the last index down: a negated entry
    // removes itself and every same-named entry at or after its index.
    // Same-named entries strictly before it survive.
    let mut i = list.len();
    while i > 0 {
        i -= 1;
        if !list[i].negated {
            continue;
        }
        let name = list[i].name.clone();
        let mut j = list.len();
        while j > i {
            j -= 1;
            if list[j].name == name {
                list.remove(j);
            }
        }
    }

    // Invocation, in list order.
    for decorator in &list {
        let apply = library
            .decorators
            .get(&decorator.name)
            .ok_or_else(|| BuildError::UnknownDecorator {
                name: decorator.name.clone(),
                location: decorator.location.clone(),
            })?;
        apply(page, decorator);
    }

    Ok(())
}
