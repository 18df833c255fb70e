//! Error types and diagnostic rendering for the pages format
//!
//! Two error kinds exist, both fatal to the current operation: syntax
//! errors raised by the parser, and build errors raised by the resolver or
//! the build step. Every error carries the originating [`Location`] and
//! renders as `name:row:column`, the trimmed source line, and a caret span
//! under the offending columns, optionally followed by a hint line.

use std::fmt;
use std::path::PathBuf;

use crate::pages::source::Location;

/// Render the shared diagnostic block for a located message.
pub(crate) fn render(
    f: &mut fmt::Formatter<'_>,
    location: &Location,
    message: &str,
    hint: Option<&str>,
) -> fmt::Result {
    write!(f, "{}: {}", location, message)?;
    if let Some(line) = location.source.line(location.row) {
        let line = line.trim_end();
        let width = line.chars().count();
        let column = location.column.min(width);
        let span = location.length.clamp(1, width.saturating_sub(column).max(1));
        write!(f, "\n  {}", line)?;
        write!(f, "\n  {}{}", " ".repeat(column), "^".repeat(span))?;
    }
    if let Some(hint) = hint {
        write!(f, "\nhint: {}", hint)?;
    }
    Ok(())
}

/// A grammar violation; parsing stops at the first one.
#[derive(Debug, Clone)]
pub struct SyntaxError {
    pub message: String,
    pub location: Location,
    pub hint: Option<String>,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, location: Location) -> Self {
        Self {
            message: message.into(),
            location,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(f, &self.location, &self.message, self.hint.as_deref())
    }
}

impl std::error::Error for SyntaxError {}

/// A failure during resolution or materialization; the build stops at the
/// first offending page.
#[derive(Debug)]
pub enum BuildError {
    /// A decorator name with no registered implementation; the location is
    /// the decorator's declaration, not the page's.
    UnknownDecorator { name: String, location: Location },
    /// A macro name with no registered implementation.
    UnknownMacro { name: String, location: Location },
    /// A page reached materialization without a resource path.
    MissingResource { location: Location },
    /// The namespace's source directory does not exist.
    MissingSourceDir { path: PathBuf, location: Location },
    /// The page's resource file does not exist under the source directory.
    MissingSourceFile { path: PathBuf, location: Location },
    /// The output path runs through an existing non-directory file.
    OutputCollision { path: PathBuf, location: Location },
    /// Any other I/O failure while reading or writing a resource.
    Io {
        path: PathBuf,
        message: String,
        location: Location,
    },
}

impl BuildError {
    pub fn location(&self) -> &Location {
        match self {
            BuildError::UnknownDecorator { location, .. }
            | BuildError::UnknownMacro { location, .. }
            | BuildError::MissingResource { location }
            | BuildError::MissingSourceDir { location, .. }
            | BuildError::MissingSourceFile { location, .. }
            | BuildError::OutputCollision { location, .. }
            | BuildError::Io { location, .. } => location,
        }
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            BuildError::UnknownDecorator { name, .. } => format!("unknown decorator '{}'", name),
            BuildError::UnknownMacro { name, .. } => format!("unknown macro '{}'", name),
            BuildError::MissingResource { .. } => "page has no resource path".to_string(),
            BuildError::MissingSourceDir { path, .. } => {
                format!("source directory not found: {}", path.display())
            }
            BuildError::MissingSourceFile { path, .. } => {
                format!("source file not found: {}", path.display())
            }
            BuildError::OutputCollision { path, .. } => {
                format!("output path collides with an existing file: {}", path.display())
            }
            BuildError::Io { path, message, .. } => {
                format!("{}: {}", path.display(), message)
            }
        };
        render(f, self.location(), &message, None)
    }
}

impl std::error::Error for BuildError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::source::Source;

    #[test]
    fn test_syntax_error_rendering() {
        let source = Source::new("site.pages", "(ns) {\n  bogus token\n}");
        let location = Location::new(&source, 1, 2, 5);
        let error = SyntaxError::new("unexpected token 'bogus'", location);
        let rendered = format!("{}", error);
        assert_eq!(
            rendered,
            "site.pages:1:2: unexpected token 'bogus'\n    bogus token\n    ^^^^^"
        );
    }

    #[test]
    fn test_hint_is_appended() {
        let source = Source::new("site.pages", "pages");
        let location = Location::new(&source, 0, 0, 5);
        let error = SyntaxError::new("unexpected token 'pages'", location)
            .with_hint("a namespace is declared as (name) { ... }");
        let rendered = format!("{}", error);
        assert!(rendered.ends_with("\nhint: a namespace is declared as (name) { ... }"));
    }

    #[test]
    fn test_caret_clamped_to_line() {
        let source = Source::new("site.pages", "x");
        let location = Location::new(&source, 0, 40, 10);
        let rendered = format!("{}", SyntaxError::new("boom", location));
        // The caret must not drift past the (short) source line.
        assert_eq!(rendered, "site.pages:0:40: boom\n  x\n   ^");
    }

    #[test]
    fn test_build_error_location_accessor() {
        let source = Source::new("site.pages", "(ns) {}");
        let location = Location::new(&source, 0, 1, 2);
        let error = BuildError::UnknownMacro {
            name: "auto".to_string(),
            location,
        };
        assert_eq!(error.location().row, 0);
        assert!(format!("{}", error).contains("unknown macro 'auto'"));
    }
}
