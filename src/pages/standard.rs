//! The stock decorator and macro implementations
//!
//! These are the implementations the format ships with; drivers merge
//! their own on top. Decorators mutate the page's processing state only,
//! never perform I/O themselves.

use crate::pages::document::{Decorator, Page};
use crate::pages::resolver::{DecoratorStub, Library};

/// The standard library: `min`, `kind`, `header` and the `auto` macro.
pub fn library() -> Library {
    Library::new()
        .with_decorator("min", min)
        .with_decorator("kind", kind)
        .with_decorator("header", header)
        .with_macro("auto", |_, _| {
            vec![DecoratorStub::new("kind"), DecoratorStub::new("min")]
        })
}

/// `%min` installs a whitespace-stripping body transform.
fn min(page: &mut Page, _decorator: &Decorator) {
    page.transforms.push(Box::new(minify));
}

fn minify(body: &str) -> String {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// `%kind` or `%kind<"text/html">` sets the Content-Type header, inferred
/// from the resource extension when no argument is given. An argument
/// without a `/` is treated as an extension.
fn kind(page: &mut Page, decorator: &Decorator) {
    let value = match decorator.args.first() {
        Some(arg) if arg.contains('/') => arg.clone(),
        Some(arg) => content_type(arg).to_string(),
        None => {
            let extension = page
                .resource
                .as_deref()
                .and_then(|r| r.rsplit_once('.'))
                .map(|(_, ext)| ext)
                .unwrap_or_default();
            content_type(extension).to_string()
        }
    };
    page.headers.insert("Content-Type".to_string(), value);
}

/// `%header<name="value" ...>` copies its named parameters into the
/// page's headers.
fn header(page: &mut Page, decorator: &Decorator) {
    for (name, value) in &decorator.props {
        page.headers.insert(name.clone(), value.clone());
    }
}

fn content_type(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "text/javascript",
        "json" => "application/json",
        "svg" => "image/svg+xml",
        "xml" => "application/xml",
        "md" => "text/markdown",
        _ => "text/plain",
    }
}
