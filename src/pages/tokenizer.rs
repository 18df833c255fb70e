//! Tokenizer for the pages format
//!
//! The scanner walks the source one character at a time while tracking the
//! current row and column. Three accumulation modes override the normal
//! splitting rules: a buffer opened by `"`, `[` or `(` consumes everything
//! verbatim until its closing character, so header and string bodies may
//! contain operators and whitespace (there are no escape sequences).
//! Outside an accumulation, an operator character flushes the pending
//! buffer and is emitted on its own, whitespace flushes and is discarded,
//! and anything else extends the buffer.
//!
//! Tokenization never fails; malformed input surfaces as parser errors,
//! not tokenizer errors. Every stream is terminated by a distinguished
//! end-of-input token carrying the final row and column.

use std::rc::Rc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::pages::source::{Location, Source};

/// The single-character operators of the format.
pub const OPERATORS: [char; 9] = ['!', '=', '-', '@', '%', '{', '}', '<', '>'];

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^#?[a-z0-9_-]+$").unwrap());

/// A classified lexical unit.
///
/// Classification is derived from the shape of `value`, not stored as a
/// separate tag; the end-of-input token is the token with an empty value
/// (the smallest string literal, `""`, is two characters, so an empty
/// value cannot arise from scanning).
#[derive(Debug, Clone, Serialize)]
pub struct Token {
    pub value: String,
    pub location: Location,
}

impl Token {
    fn new(value: String, location: Location) -> Self {
        Self { value, location }
    }

    fn end(location: Location) -> Self {
        Self {
            value: String::new(),
            location,
        }
    }

    /// The terminal end-of-input marker.
    pub fn is_end(&self) -> bool {
        self.value.is_empty()
    }

    /// A namespace header such as `(pages)`.
    pub fn is_namespace_header(&self) -> bool {
        self.value.len() >= 2 && self.value.starts_with('(') && self.value.ends_with(')')
    }

    /// A page header such as `[index]`.
    pub fn is_page_header(&self) -> bool {
        self.value.len() >= 2 && self.value.starts_with('[') && self.value.ends_with(']')
    }

    /// A quoted string literal.
    pub fn is_string(&self) -> bool {
        self.value.len() >= 2 && self.value.starts_with('"') && self.value.ends_with('"')
    }

    /// A bare identifier (`#`-prefixed names allowed).
    pub fn is_identifier(&self) -> bool {
        IDENTIFIER.is_match(&self.value)
    }

    /// Exactly the given single-character operator.
    pub fn is_operator(&self, op: char) -> bool {
        let mut chars = self.value.chars();
        chars.next() == Some(op) && chars.next().is_none()
    }

    /// The text between the delimiters of a header or string token.
    ///
    /// Only meaningful after one of the shape checks above has matched;
    /// the delimiters are single-byte, so slicing is safe.
    pub fn inner(&self) -> &str {
        &self.value[1..self.value.len() - 1]
    }
}

/// Scan a source into tokens plus the terminal end marker.
pub fn tokenize(source: &Rc<Source>) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut buffer = String::new();
    let mut row = 0usize;
    let mut column = 0usize;

    for ch in source.body.chars() {
        let closer = match buffer.chars().next() {
            Some('"') => Some('"'),
            Some('[') => Some(']'),
            Some('(') => Some(')'),
            _ => None,
        };

        // An open accumulation consumes everything up to and including its
        // closing character, which flushes the whole buffer as one token.
        if let Some(closer) = closer {
            buffer.push(ch);
            if ch == closer {
                flush(&mut tokens, &mut buffer, source, row, column + 1);
            }
        } else if OPERATORS.contains(&ch) {
            flush(&mut tokens, &mut buffer, source, row, column);
            tokens.push(Token::new(
                ch.to_string(),
                Location::new(source, row, column, 1),
            ));
        } else if ch.is_whitespace() {
            flush(&mut tokens, &mut buffer, source, row, column);
        } else {
            buffer.push(ch);
        }

        if ch == '\n' {
            row += 1;
            column = 0;
        } else {
            column += 1;
        }
    }

    flush(&mut tokens, &mut buffer, source, row, column);
    tokens.push(Token::end(Location::new(source, row, column, 0)));
    tokens
}

/// Emit the pending buffer, if any, as a single token ending just before
/// `end_column`. Columns are tracked per character during accumulation, so
/// the start column is reconstructed from the buffered length at flush
/// time; a buffer that crossed a line break saturates at column zero.
fn flush(
    tokens: &mut Vec<Token>,
    buffer: &mut String,
    source: &Rc<Source>,
    row: usize,
    end_column: usize,
) {
    if buffer.is_empty() {
        return;
    }
    let value = std::mem::take(buffer);
    let length = value.chars().count();
    let column = end_column.saturating_sub(length);
    tokens.push(Token::new(value, Location::new(source, row, column, length)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(input: &str) -> Vec<String> {
        let source = Source::new("test", input);
        tokenize(&source).iter().map(|t| t.value.clone()).collect()
    }

    #[test]
    fn test_empty_input() {
        let source = Source::new("test", "");
        let tokens = tokenize(&source);
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_end());
    }

    #[test]
    fn test_whitespace_only() {
        assert_eq!(values("  \n\t "), vec![""]);
    }

    #[test]
    fn test_bare_words_split_on_whitespace() {
        assert_eq!(values("alpha beta"), vec!["alpha", "beta", ""]);
    }

    #[test]
    fn test_operators_split_bare_words() {
        assert_eq!(values("a=b"), vec!["a", "=", "b", ""]);
        assert_eq!(values("so-so"), vec!["so", "-", "so", ""]);
    }

    #[test]
    fn test_headers_accumulate_anything_but_their_closer() {
        assert_eq!(values("(name with = spaces)"), vec!["(name with = spaces)", ""]);
        assert_eq!(values("[a/b%c]"), vec!["[a/b%c]", ""]);
    }

    #[test]
    fn test_strings_accumulate_without_escapes() {
        assert_eq!(values("\"x = {y}\""), vec!["\"x = {y}\"", ""]);
    }

    #[test]
    fn test_unterminated_string_flushes_at_end() {
        assert_eq!(values("\"open"), vec!["\"open", ""]);
    }

    #[test]
    fn test_token_locations() {
        let source = Source::new("test", "ab %cd");
        let tokens = tokenize(&source);
        assert_eq!(tokens[0].value, "ab");
        assert_eq!(
            (tokens[0].location.row, tokens[0].location.column, tokens[0].location.length),
            (0, 0, 2)
        );
        assert_eq!(tokens[1].value, "%");
        assert_eq!((tokens[1].location.column, tokens[1].location.length), (3, 1));
        assert_eq!(tokens[2].value, "cd");
        assert_eq!((tokens[2].location.column, tokens[2].location.length), (4, 2));
    }

    #[test]
    fn test_rows_advance_on_newlines() {
        let source = Source::new("test", "a\nb\nc");
        let tokens = tokenize(&source);
        assert_eq!(tokens[1].location.row, 1);
        assert_eq!(tokens[2].location.row, 2);
        let end = tokens.last().unwrap();
        assert!(end.is_end());
        assert_eq!((end.location.row, end.location.column), (2, 1));
    }

    #[test]
    fn test_classification() {
        let source = Source::new("test", "(ns) [page] \"lit\" name #frag % !");
        let tokens = tokenize(&source);
        assert!(tokens[0].is_namespace_header());
        assert_eq!(tokens[0].inner(), "ns");
        assert!(tokens[1].is_page_header());
        assert_eq!(tokens[1].inner(), "page");
        assert!(tokens[2].is_string());
        assert_eq!(tokens[2].inner(), "lit");
        assert!(tokens[3].is_identifier());
        assert!(tokens[4].is_identifier());
        assert!(tokens[5].is_operator('%'));
        assert!(tokens[6].is_operator('!'));
    }

    #[test]
    fn test_empty_string_literal_is_not_end() {
        let source = Source::new("test", "\"\"");
        let tokens = tokenize(&source);
        assert_eq!(tokens[0].value, "\"\"");
        assert!(tokens[0].is_string());
        assert!(!tokens[0].is_end());
        assert_eq!(tokens[0].inner(), "");
    }
}
