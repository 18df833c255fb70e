//! The pages format engine
//!
//! This module orchestrates the complete pipeline for the pages format:
//! 1. [`Source`] owns the input text and normalizes line endings
//! 2. [`tokenizer::tokenize`] scans it into located tokens
//! 3. [`parser::parse`] runs the three-state parser producing a [`Document`]
//! 4. [`resolver`] expands macros, applies cancellation and runs decorators
//! 5. [`builder::build`] materializes resolved pages into an output tree
//!
//! [`Pages`] wraps the pipeline behind a small facade for drivers that do
//! not need the individual stages.

pub mod builder;
pub mod document;
pub mod error;
pub mod parser;
pub mod processor;
pub mod resolver;
pub mod source;
pub mod standard;
pub mod tokenizer;

use std::collections::HashMap;
use std::rc::Rc;

pub use builder::BuildOptions;
pub use document::{Decorator, Document, Namespace, Page};
pub use error::{BuildError, SyntaxError};
pub use resolver::{DecoratorStub, Library};
pub use source::{Location, Source};
pub use tokenizer::{tokenize, Token};

/// A parsed pages document plus the operations a driver runs against it.
///
/// Most drivers only need this type:
///
/// ```text
/// let source = Source::new("site.pages", text);
/// let mut pages = Pages::parse(&source)?;
/// pages.build(&options, &standard::library())?;
/// let page = pages.page("/guide/intro");
/// ```
#[derive(Debug)]
pub struct Pages {
    pub document: Document,
}

impl Pages {
    /// Parse a source into a pages document.
    pub fn parse(source: &Rc<Source>) -> Result<Self, SyntaxError> {
        Ok(Self {
            document: parser::parse(source)?,
        })
    }

    /// Parse a source, seeding every namespace's properties from `defaults`.
    pub fn parse_with_defaults(
        source: &Rc<Source>,
        defaults: &HashMap<String, String>,
    ) -> Result<Self, SyntaxError> {
        Ok(Self {
            document: parser::parse_with_defaults(source, defaults)?,
        })
    }

    /// Resolve every page's decorators and write processed resources under
    /// the output root. Fails fast on the first offending page.
    pub fn build(&mut self, options: &BuildOptions, library: &Library) -> Result<(), BuildError> {
        builder::build(&mut self.document, options, library)
    }

    /// Look up a built page by its public path.
    ///
    /// Leading and trailing slashes are ignored; the first structural match
    /// (namespace order, then page order) wins. Pages that were never built
    /// are not addressable.
    pub fn page(&self, path: &str) -> Option<&Page> {
        builder::find_page(&self.document, path)
    }
}
