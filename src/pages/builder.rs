//! Build step: materialize resolved pages into an output tree
//!
//! Building runs per page, fail-fast: resolve the page's decorators, then
//! locate its resource under the namespace's source directory, apply the
//! installed body transforms in order, write the result under the output
//! root, and record the page's public route. Pages after the first
//! offending one are neither resolved nor written.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::pages::document::{Document, Page};
use crate::pages::error::BuildError;
use crate::pages::resolver::{self, Library};

/// Where a build reads from and writes to, plus the default properties
/// every namespace is seeded with at parse time.
///
/// Deserializable so drivers can keep the options in a YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildOptions {
    /// Root directory resources are resolved under; a namespace `dir`
    /// property names a subdirectory of it.
    #[serde(default = "default_source")]
    pub source: PathBuf,
    /// Root directory processed resources are written under.
    #[serde(default = "default_out")]
    pub out: PathBuf,
    /// Default namespace properties.
    #[serde(default)]
    pub defaults: HashMap<String, String>,
}

fn default_source() -> PathBuf {
    PathBuf::from(".")
}

fn default_out() -> PathBuf {
    PathBuf::from("out")
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            source: default_source(),
            out: default_out(),
            defaults: HashMap::new(),
        }
    }
}

impl BuildOptions {
    pub fn new(source: impl Into<PathBuf>, out: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            out: out.into(),
            defaults: HashMap::new(),
        }
    }
}

/// Resolve and materialize every page of the document.
pub fn build(
    document: &mut Document,
    options: &BuildOptions,
    library: &Library,
) -> Result<(), BuildError> {
    for namespace in &mut document.namespaces {
        let source_dir = match namespace.props.get("dir") {
            Some(dir) => options.source.join(dir),
            None => options.source.clone(),
        };
        if !source_dir.is_dir() {
            return Err(BuildError::MissingSourceDir {
                path: source_dir,
                location: namespace.location.clone(),
            });
        }
        let root = namespace.props.get("root").cloned().unwrap_or_default();
        for page in &mut namespace.pages {
            resolver::resolve_page(page, library)?;
            materialize(page, &source_dir, &options.out, &root)?;
        }
    }
    Ok(())
}

/// Read, transform and write one resolved page's resource.
fn materialize(
    page: &mut Page,
    source_dir: &Path,
    out: &Path,
    root: &str,
) -> Result<(), BuildError> {
    let resource = match page.resource.as_deref() {
        Some(resource) => resource,
        None => {
            return Err(BuildError::MissingResource {
                location: page.location.clone(),
            })
        }
    };
    let source_path = source_dir.join(resource);
    if !source_path.is_file() {
        return Err(BuildError::MissingSourceFile {
            path: source_path,
            location: page.location.clone(),
        });
    }
    let mut body = fs::read_to_string(&source_path).map_err(|e| BuildError::Io {
        path: source_path.clone(),
        message: e.to_string(),
        location: page.location.clone(),
    })?;
    for transform in &page.transforms {
        body = transform(&body);
    }

    let out_path = out.join(resource);
    if let Some(parent) = out_path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            // create_dir_all fails when a path component already exists
            // as a plain file.
            if parent.exists() && !parent.is_dir() {
                return Err(BuildError::OutputCollision {
                    path: parent.to_path_buf(),
                    location: page.location.clone(),
                });
            }
            return Err(BuildError::Io {
                path: parent.to_path_buf(),
                message: e.to_string(),
                location: page.location.clone(),
            });
        }
    }
    fs::write(&out_path, &body).map_err(|e| BuildError::Io {
        path: out_path.clone(),
        message: e.to_string(),
        location: page.location.clone(),
    })?;

    page.route = Some(join_route(root, &page.name));
    page.output = Some(out_path);
    Ok(())
}

/// Strip leading and trailing slashes from a lookup path.
pub fn normalize_path(path: &str) -> String {
    path.trim_matches('/').to_string()
}

/// Join a namespace root prefix and a page name into a normalized route.
fn join_route(root: &str, name: &str) -> String {
    [root, name]
        .iter()
        .map(|part| part.trim_matches('/'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// The first built page whose route matches the normalized path, in
/// namespace order then page order. Unbuilt pages are not addressable.
pub fn find_page<'a>(document: &'a Document, path: &str) -> Option<&'a Page> {
    let wanted = normalize_path(path);
    document
        .pages()
        .find(|page| page.output.is_some() && page.route.as_deref() == Some(wanted.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_strips_slashes() {
        assert_eq!(normalize_path("/guide/intro/"), "guide/intro");
        assert_eq!(normalize_path("guide"), "guide");
        assert_eq!(normalize_path("/"), "");
        assert_eq!(normalize_path(""), "");
    }

    #[test]
    fn test_join_route() {
        assert_eq!(join_route("/", "/"), "");
        assert_eq!(join_route("/", "index"), "index");
        assert_eq!(join_route("/docs/", "/intro"), "docs/intro");
        assert_eq!(join_route("", "about"), "about");
    }

    #[test]
    fn test_default_options() {
        let options = BuildOptions::default();
        assert_eq!(options.source, PathBuf::from("."));
        assert_eq!(options.out, PathBuf::from("out"));
        assert!(options.defaults.is_empty());
    }

    #[test]
    fn test_options_deserialize_from_yaml() {
        let options: BuildOptions =
            serde_yaml::from_str("source: site\nout: public\ndefaults:\n  root: /\n").unwrap();
        assert_eq!(options.source, PathBuf::from("site"));
        assert_eq!(options.out, PathBuf::from("public"));
        assert_eq!(options.defaults.get("root").map(String::as_str), Some("/"));
    }
}
