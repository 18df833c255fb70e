//! Property-based tests for the pages tokenizer
//!
//! The tokenizer is total: any input, well-formed or not, must scan
//! without panicking and terminate in the end-of-input token with sane
//! locations. Grammar violations are the parser's concern.

use proptest::prelude::*;

use pages::pages::{tokenize, Source};

proptest! {
    #[test]
    fn test_tokenize_never_panics(input in "\\PC{0,200}") {
        let source = Source::new("prop", &input);
        let tokens = tokenize(&source);
        prop_assert!(!tokens.is_empty());
    }

    #[test]
    fn test_stream_ends_with_single_end_token(input in "(?s).{0,200}") {
        let source = Source::new("prop", &input);
        let tokens = tokenize(&source);
        prop_assert!(tokens.last().unwrap().is_end());
        let ends = tokens.iter().filter(|t| t.is_end()).count();
        prop_assert_eq!(ends, 1);
    }

    #[test]
    fn test_rows_are_monotone(input in "(?s).{0,200}") {
        let source = Source::new("prop", &input);
        let tokens = tokenize(&source);
        for pair in tokens.windows(2) {
            prop_assert!(pair[0].location.row <= pair[1].location.row);
        }
    }

    #[test]
    fn test_rows_stay_within_the_source(input in "(?s).{0,200}") {
        let source = Source::new("prop", &input);
        let lines = source.body.split('\n').count();
        for token in tokenize(&source) {
            prop_assert!(token.location.row < lines);
        }
    }

    #[test]
    fn test_operators_always_scan_as_single_tokens(input in "[a-z!=@%{}<>-]{0,64}") {
        let source = Source::new("prop", &input);
        for token in tokenize(&source) {
            if token.value.chars().count() == 1 {
                continue;
            }
            // Multi-character tokens never contain an operator here,
            // since nothing in this alphabet opens an accumulation.
            for op in ['!', '=', '-', '@', '%', '{', '}', '<', '>'] {
                prop_assert!(!token.value.contains(op));
            }
        }
    }
}
