//! Source text and location tracking for the pages format
//!
//! A [`Source`] is an immutable named text buffer; every token and node
//! produced from it carries a [`Location`] referencing the source through a
//! shared handle, so diagnostics can always reproduce the offending line
//! without copying the text per node.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::rc::Rc;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// A named, immutable text buffer.
///
/// Construction normalizes `\r\n` to `\n`; rows and columns are counted
/// against the normalized text.
pub struct Source {
    pub name: String,
    pub body: String,
}

impl Source {
    pub fn new(name: impl Into<String>, body: &str) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            body: body.replace("\r\n", "\n"),
        })
    }

    /// Read a source from disk, named after the path.
    pub fn from_file(path: impl AsRef<Path>) -> io::Result<Rc<Self>> {
        let path = path.as_ref();
        let body = fs::read_to_string(path)?;
        Ok(Self::new(path.display().to_string(), &body))
    }

    /// The zero-based `row`th line of the body, without its newline.
    pub fn line(&self, row: usize) -> Option<&str> {
        self.body.split('\n').nth(row)
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Source({}, {} bytes)", self.name, self.body.len())
    }
}

/// A zero-based row/column span into a [`Source`], used only for
/// diagnostics. Never mutated after creation.
#[derive(Clone)]
pub struct Location {
    pub source: Rc<Source>,
    pub row: usize,
    pub column: usize,
    pub length: usize,
}

impl Location {
    pub fn new(source: &Rc<Source>, row: usize, column: usize, length: usize) -> Self {
        Self {
            source: Rc::clone(source),
            row,
            column,
            length,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source.name, self.row, self.column)
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Location({}:{}:{}+{})",
            self.source.name, self.row, self.column, self.length
        )
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Location", 4)?;
        state.serialize_field("source", &self.source.name)?;
        state.serialize_field("row", &self.row)?;
        state.serialize_field("column", &self.column)?;
        state.serialize_field("length", &self.length)?;
        state.end()
    }
}
