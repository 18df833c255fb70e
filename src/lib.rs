//! # pages
//!
//! A parser and builder for the pages format: a small declarative language
//! describing namespaces of pages mapped to on-disk resources, annotated
//! with decorators and macros that control post-processing.
//!
//! The pipeline is tokenize -> parse -> resolve -> build; see the
//! [`pages`] module for the individual stages and the [`pages::Pages`]
//! entry point.

pub mod pages;
