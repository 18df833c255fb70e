//! Parser for the pages format
//!
//! A three-state machine over the token stream: `Top` (between
//! namespaces), `NamespaceBody` and `PageBody`. A namespace body operates
//! three scoped decorator buffers: *local* decorators apply to the next
//! page only, *group* decorators to every page declared inside the open
//! `{ }` group, and *global* decorators (declared `%%`) to every page of
//! the namespace, including pages declared before them.
//!
//! Parsing aborts on the first grammar violation; there is no error
//! recovery.

use std::collections::HashMap;
use std::rc::Rc;

use crate::pages::document::{Decorator, Document, Namespace, Page};
use crate::pages::error::SyntaxError;
use crate::pages::source::Source;
use crate::pages::tokenizer::{tokenize, Token};

/// Parse a source into a document.
pub fn parse(source: &Rc<Source>) -> Result<Document, SyntaxError> {
    parse_with_defaults(source, &HashMap::new())
}

/// Parse a source, seeding every namespace's properties from `defaults`.
pub fn parse_with_defaults(
    source: &Rc<Source>,
    defaults: &HashMap<String, String>,
) -> Result<Document, SyntaxError> {
    Parser::new(tokenize(source), defaults).run()
}

enum State {
    Top,
    NamespaceBody,
    PageBody,
}

struct Parser<'a> {
    tokens: Vec<Token>,
    index: usize,
    defaults: &'a HashMap<String, String>,
    state: State,
    namespaces: Vec<Namespace>,
    namespace: Option<Namespace>,
    page: Option<Page>,
    local: Vec<Decorator>,
    group: Vec<Decorator>,
    global: Vec<Decorator>,
    group_open: bool,
}

fn describe(token: &Token) -> String {
    if token.is_end() {
        "end of input".to_string()
    } else {
        format!("'{}'", token.value)
    }
}

impl<'a> Parser<'a> {
    fn new(tokens: Vec<Token>, defaults: &'a HashMap<String, String>) -> Self {
        Self {
            tokens,
            index: 0,
            defaults,
            state: State::Top,
            namespaces: Vec::new(),
            namespace: None,
            page: None,
            local: Vec::new(),
            group: Vec::new(),
            global: Vec::new(),
            group_open: false,
        }
    }

    fn run(mut self) -> Result<Document, SyntaxError> {
        loop {
            let token = self.advance();
            match self.state {
                State::Top => {
                    if token.is_end() {
                        return Ok(Document {
                            namespaces: self.namespaces,
                        });
                    }
                    self.top(token)?;
                }
                State::NamespaceBody => self.namespace_body(token)?,
                State::PageBody => self.page_body(token)?,
            }
        }
    }

    // The token stream always ends with the end token, so clamping the
    // index makes advancing past it return the end token again.
    fn advance(&mut self) -> Token {
        let token = self.tokens[self.index.min(self.tokens.len() - 1)].clone();
        if self.index < self.tokens.len() {
            self.index += 1;
        }
        token
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }

    fn expect_operator(&mut self, op: char, context: &str) -> Result<Token, SyntaxError> {
        let token = self.advance();
        if token.is_operator(op) {
            Ok(token)
        } else {
            Err(SyntaxError::new(
                format!("expected '{}' {}, found {}", op, context, describe(&token)),
                token.location,
            ))
        }
    }

    fn top(&mut self, token: Token) -> Result<(), SyntaxError> {
        if token.is_namespace_header() {
            let name = token.inner().to_string();
            if name.is_empty() {
                return Err(SyntaxError::new("namespace name is empty", token.location));
            }
            self.expect_operator('{', "after namespace header")?;
            let mut namespace = Namespace::new(name, token.location);
            namespace.props = self.defaults.clone();
            self.namespace = Some(namespace);
            self.local.clear();
            self.group.clear();
            self.global.clear();
            self.group_open = false;
            self.state = State::NamespaceBody;
            Ok(())
        } else if token.is_identifier() {
            Err(
                SyntaxError::new(format!("unexpected token '{}'", token.value), token.location)
                    .with_hint("a namespace is declared as (name) { ... }"),
            )
        } else {
            Err(SyntaxError::new(
                format!("expected a namespace declaration, found {}", describe(&token)),
                token.location,
            ))
        }
    }

    fn namespace_body(&mut self, token: Token) -> Result<(), SyntaxError> {
        if token.is_end() {
            let name = self
                .namespace
                .as_ref()
                .map(|ns| ns.name.clone())
                .unwrap_or_default();
            return Err(SyntaxError::new(
                format!("unclosed namespace '{}'", name),
                token.location,
            ));
        }
        if token.is_operator('}') {
            if self.group_open {
                self.group.clear();
                self.group_open = false;
            } else {
                if let Some(namespace) = self.namespace.take() {
                    self.namespaces.push(namespace);
                }
                self.local.clear();
                self.global.clear();
                self.state = State::Top;
            }
            return Ok(());
        }
        if token.is_namespace_header() {
            return Err(SyntaxError::new(
                "namespaces cannot be nested",
                token.location,
            ));
        }
        if token.is_page_header() {
            let name = token.inner().to_string();
            self.expect_operator('{', "after page header")?;
            // The page snapshots whatever is buffered right now, in
            // global, group, local order; the local buffer is spent.
            let mut decorators = self.global.clone();
            decorators.extend(self.group.iter().cloned());
            decorators.append(&mut self.local);
            self.page = Some(Page::new(name, token.location).with_decorators(decorators));
            self.state = State::PageBody;
            return Ok(());
        }
        if token.is_operator('%') {
            return self.decorator(token);
        }
        if token.is_operator('{') {
            if self.group_open {
                return Err(SyntaxError::new(
                    "a decorator group is already open",
                    token.location,
                ));
            }
            if self.local.is_empty() {
                return Err(SyntaxError::new(
                    "decorators required before group",
                    token.location,
                ));
            }
            self.group = std::mem::take(&mut self.local);
            self.group_open = true;
            return Ok(());
        }
        if token.is_identifier() {
            self.expect_operator('=', "after property name")?;
            let value = self.value_token()?;
            if let Some(namespace) = self.namespace.as_mut() {
                namespace.props.insert(token.value, value);
            }
            return Ok(());
        }
        Err(SyntaxError::new(
            format!("unexpected {} in namespace body", describe(&token)),
            token.location,
        ))
    }

    fn page_body(&mut self, token: Token) -> Result<(), SyntaxError> {
        if token.is_end() {
            let name = self
                .page
                .as_ref()
                .map(|p| p.name.clone())
                .unwrap_or_default();
            return Err(SyntaxError::new(
                format!("unclosed page '{}'", name),
                token.location,
            ));
        }
        if token.is_operator('}') {
            if let (Some(namespace), Some(page)) = (self.namespace.as_mut(), self.page.take()) {
                namespace.pages.push(page);
            }
            self.state = State::NamespaceBody;
            return Ok(());
        }
        if token.is_operator('@') {
            let value = self.advance();
            if !value.is_string() {
                return Err(SyntaxError::new(
                    format!("expected a quoted resource path after '@', found {}", describe(&value)),
                    value.location,
                ));
            }
            if let Some(page) = self.page.as_mut() {
                page.resource = Some(value.inner().to_string());
            }
            return Ok(());
        }
        if token.is_namespace_header() || token.is_page_header() {
            return Err(SyntaxError::new(
                format!("{} cannot be nested inside a page", describe(&token)),
                token.location,
            ));
        }
        if token.is_identifier() {
            self.expect_operator('=', "after property name")?;
            let value = self.value_token()?;
            if let Some(page) = self.page.as_mut() {
                page.props.insert(token.value, value);
            }
            return Ok(());
        }
        Err(SyntaxError::new(
            format!("unexpected {} in page body", describe(&token)),
            token.location,
        ))
    }

    /// A property value; only string literals are supported.
    fn value_token(&mut self) -> Result<String, SyntaxError> {
        let token = self.advance();
        if token.is_string() {
            Ok(token.inner().to_string())
        } else if token.is_identifier() {
            Err(SyntaxError::new(
                format!("bare value '{}' is not yet supported", token.value),
                token.location,
            )
            .with_hint("quote the value"))
        } else {
            Err(SyntaxError::new(
                format!("expected a quoted value, found {}", describe(&token)),
                token.location,
            ))
        }
    }

    /// A decorator declaration: `%[%][-][!]name[<params>]`.
    fn decorator(&mut self, percent: Token) -> Result<(), SyntaxError> {
        let mut is_global = false;
        let mut negated = false;
        let mut is_macro = false;
        let mut token = self.advance();
        if token.is_operator('%') {
            is_global = true;
            token = self.advance();
        }
        if token.is_operator('-') {
            negated = true;
            token = self.advance();
        }
        if token.is_operator('!') {
            is_macro = true;
            token = self.advance();
        }
        if !token.is_identifier() {
            return Err(SyntaxError::new(
                format!("expected a decorator name, found {}", describe(&token)),
                token.location,
            ));
        }
        let mut decorator = Decorator::new(token.value, percent.location);
        decorator.negated = negated;
        decorator.is_macro = is_macro;
        decorator.is_global = is_global;
        if self.peek().is_operator('<') {
            let open = self.advance();
            if negated {
                return Err(SyntaxError::new(
                    "a cancelling decorator cannot take parameters",
                    open.location,
                ));
            }
            self.parameters(&mut decorator)?;
        }
        if is_global {
            // Globals cover the whole namespace: pages already declared
            // pick the decorator up here, later pages through the buffer.
            if let Some(namespace) = self.namespace.as_mut() {
                for page in &mut namespace.pages {
                    page.decorators.push(decorator.clone());
                }
            }
            self.global.push(decorator);
        } else {
            self.local.push(decorator);
        }
        Ok(())
    }

    /// The `<...>` parameter list of a decorator.
    fn parameters(&mut self, decorator: &mut Decorator) -> Result<(), SyntaxError> {
        loop {
            let token = self.advance();
            if token.is_operator('>') {
                return Ok(());
            }
            if token.is_end() {
                return Err(SyntaxError::new("unclosed parameter list", token.location));
            }
            if token.is_identifier() && self.peek().is_operator('=') {
                self.advance();
                let value = self.parameter_value()?;
                decorator.props.insert(token.value, value);
            } else if token.is_string() {
                decorator.args.push(token.inner().to_string());
            } else if token.is_identifier() {
                decorator.args.push(token.value);
            } else {
                return Err(SyntaxError::new(
                    format!("unexpected {} in parameter list", describe(&token)),
                    token.location,
                ));
            }
        }
    }

    fn parameter_value(&mut self) -> Result<String, SyntaxError> {
        let token = self.advance();
        if token.is_string() {
            Ok(token.inner().to_string())
        } else if token.is_identifier() {
            Ok(token.value)
        } else {
            Err(SyntaxError::new(
                format!("expected a parameter value, found {}", describe(&token)),
                token.location,
            ))
        }
    }
}
