//! Inspection API for pages sources
//!
//! Dumps a source at a chosen stage (tokens or parsed document) in a
//! chosen format (simple text or JSON), driven by format strings like
//! `token-simple` or `document-json`. Used by the `inspect` CLI command.

use std::fmt;
use std::path::Path;
use std::rc::Rc;

use serde_json::json;

use crate::pages::document::Document;
use crate::pages::parser;
use crate::pages::source::Source;
use crate::pages::tokenizer::{tokenize, Token};

/// Which stage of the pipeline to dump.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingStage {
    Token,
    Document,
}

/// How to render the dump.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputFormat {
    Simple,
    Json,
}

/// A complete processing specification, parsed from a format string.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingSpec {
    pub stage: ProcessingStage,
    pub format: OutputFormat,
}

impl ProcessingSpec {
    /// Parse a format string like `token-simple` or `document-json`.
    pub fn from_string(format_str: &str) -> Result<Self, ProcessingError> {
        let Some((stage, format)) = format_str.split_once('-') else {
            return Err(ProcessingError::InvalidFormat(format_str.to_string()));
        };
        let stage = match stage {
            "token" => ProcessingStage::Token,
            "document" => ProcessingStage::Document,
            other => return Err(ProcessingError::InvalidStage(other.to_string())),
        };
        let format = match format {
            "simple" => OutputFormat::Simple,
            "json" => OutputFormat::Json,
            other => return Err(ProcessingError::InvalidFormatType(other.to_string())),
        };
        Ok(ProcessingSpec { stage, format })
    }
}

/// All recognized format strings.
pub fn available_formats() -> Vec<&'static str> {
    vec!["token-simple", "token-json", "document-simple", "document-json"]
}

/// Errors that can occur while producing a dump.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingError {
    InvalidFormat(String),
    InvalidStage(String),
    InvalidFormatType(String),
    Io(String),
    Syntax(String),
}

impl std::error::Error for ProcessingError {}

impl fmt::Display for ProcessingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingError::InvalidFormat(format) => write!(f, "Invalid format: {}", format),
            ProcessingError::InvalidStage(stage) => write!(f, "Invalid stage: {}", stage),
            ProcessingError::InvalidFormatType(format) => {
                write!(f, "Invalid format type: {}", format)
            }
            ProcessingError::Io(message) => write!(f, "IO error: {}", message),
            ProcessingError::Syntax(message) => write!(f, "{}", message),
        }
    }
}

/// Process a file on disk according to the given specification.
pub fn process_file<P: AsRef<Path>>(
    path: P,
    spec: &ProcessingSpec,
) -> Result<String, ProcessingError> {
    let source = Source::from_file(path).map_err(|e| ProcessingError::Io(e.to_string()))?;
    process_source(&source, spec)
}

/// Process an in-memory source according to the given specification.
pub fn process_source(source: &Rc<Source>, spec: &ProcessingSpec) -> Result<String, ProcessingError> {
    match spec.stage {
        ProcessingStage::Token => {
            let tokens = tokenize(source);
            Ok(match spec.format {
                OutputFormat::Simple => format_tokens(&tokens),
                OutputFormat::Json => serde_json::to_string_pretty(&tokens)
                    .map_err(|e| ProcessingError::Io(e.to_string()))?,
            })
        }
        ProcessingStage::Document => {
            let document =
                parser::parse(source).map_err(|e| ProcessingError::Syntax(e.to_string()))?;
            Ok(match spec.format {
                OutputFormat::Simple => format_document(&document),
                OutputFormat::Json => serde_json::to_string_pretty(&document_json(&document))
                    .map_err(|e| ProcessingError::Io(e.to_string()))?,
            })
        }
    }
}

fn format_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        let rendered = if token.is_end() { "<end>" } else { token.value.as_str() };
        out.push_str(&format!(
            "{}:{}+{} {}\n",
            token.location.row, token.location.column, token.location.length, rendered
        ));
    }
    out
}

fn format_document(document: &Document) -> String {
    let mut out = String::new();
    for namespace in &document.namespaces {
        out.push_str(&format!("({})\n", namespace.name));
        for (name, value) in sorted(&namespace.props) {
            out.push_str(&format!("  {} = \"{}\"\n", name, value));
        }
        for page in &namespace.pages {
            match &page.resource {
                Some(resource) => out.push_str(&format!("  [{}] @\"{}\"\n", page.name, resource)),
                None => out.push_str(&format!("  [{}]\n", page.name)),
            }
            for (name, value) in sorted(&page.props) {
                out.push_str(&format!("    {} = \"{}\"\n", name, value));
            }
            for decorator in &page.decorators {
                out.push_str(&format!("    {}\n", decorator));
            }
        }
    }
    out
}

// HashMap iteration order is unstable; dumps must be deterministic.
fn sorted(props: &std::collections::HashMap<String, String>) -> Vec<(&String, &String)> {
    let mut entries: Vec<_> = props.iter().collect();
    entries.sort_by_key(|(name, _)| name.as_str());
    entries
}

fn document_json(document: &Document) -> serde_json::Value {
    json!({
        "namespaces": document
            .namespaces
            .iter()
            .map(|namespace| {
                json!({
                    "name": &namespace.name,
                    "props": &namespace.props,
                    "pages": namespace
                        .pages
                        .iter()
                        .map(|page| {
                            json!({
                                "name": &page.name,
                                "resource": &page.resource,
                                "props": &page.props,
                                "decorators": page
                                    .decorators
                                    .iter()
                                    .map(|decorator| {
                                        json!({
                                            "name": &decorator.name,
                                            "args": &decorator.args,
                                            "props": &decorator.props,
                                            "negated": decorator.negated,
                                            "macro": decorator.is_macro,
                                            "global": decorator.is_global,
                                        })
                                    })
                                    .collect::<Vec<_>>(),
                            })
                        })
                        .collect::<Vec<_>>(),
                })
            })
            .collect::<Vec<_>>(),
    })
}
