//! Build tests: resource resolution, transforms, routes and lookup

use std::fs;

use tempfile::TempDir;

use pages::pages::{standard, BuildError, BuildOptions, Pages, Source};

fn write(dir: &std::path::Path, name: &str, body: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, body).unwrap();
}

fn build(input: &str, options: &BuildOptions) -> Result<Pages, BuildError> {
    let source = Source::new("site.pages", input);
    let mut pages = Pages::parse(&source).unwrap();
    pages.build(options, &standard::library())?;
    Ok(pages)
}

#[test]
fn test_build_writes_transformed_resources() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src");
    let out = tmp.path().join("out");
    write(&src, "index.html", "  <h1>\n\n    Home\n  </h1>\n");

    let pages = build(
        "(site) { root=\"/\" %%!auto [/] { @\"index.html\" } }",
        &BuildOptions::new(&src, &out),
    )
    .unwrap();

    let written = fs::read_to_string(out.join("index.html")).unwrap();
    assert_eq!(written, "<h1>\nHome\n</h1>");

    let page = pages.page("/").unwrap();
    assert_eq!(page.route.as_deref(), Some(""));
    assert_eq!(
        page.headers.get("Content-Type").map(String::as_str),
        Some("text/html")
    );
    assert!(page.decorators.is_empty());
}

#[test]
fn test_namespace_dir_property_selects_a_subdirectory() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src");
    let out = tmp.path().join("out");
    write(&src, "docs/intro.html", "<p>intro</p>\n");

    let pages = build(
        "(docs) { root=\"/docs\" dir=\"docs\" [intro] { @\"intro.html\" } }",
        &BuildOptions::new(&src, &out),
    )
    .unwrap();

    assert!(out.join("intro.html").is_file());
    let page = pages.page("/docs/intro").unwrap();
    assert_eq!(page.name, "intro");
}

#[test]
fn test_nested_resources_create_output_directories() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src");
    let out = tmp.path().join("out");
    write(&src, "guide/part/one.html", "one\n");

    build(
        "(g) { [one] { @\"guide/part/one.html\" } }",
        &BuildOptions::new(&src, &out),
    )
    .unwrap();

    assert!(out.join("guide/part/one.html").is_file());
}

#[test]
fn test_missing_source_dir_errors_at_the_namespace() {
    let tmp = TempDir::new().unwrap();
    let error = build(
        "(site) { dir=\"nope\" [p] { @\"x.html\" } }",
        &BuildOptions::new(tmp.path(), tmp.path().join("out")),
    )
    .unwrap_err();
    match error {
        BuildError::MissingSourceDir { path, location } => {
            assert!(path.ends_with("nope"));
            assert_eq!(location.column, 0); // the namespace header
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_missing_source_file_errors_at_the_page() {
    let tmp = TempDir::new().unwrap();
    let error = build(
        "(site) {\n  [p] { @\"gone.html\" }\n}",
        &BuildOptions::new(tmp.path(), tmp.path().join("out")),
    )
    .unwrap_err();
    match error {
        BuildError::MissingSourceFile { path, location } => {
            assert!(path.ends_with("gone.html"));
            assert_eq!((location.row, location.column), (1, 2));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_page_without_resource_is_a_build_error() {
    let tmp = TempDir::new().unwrap();
    let error = build(
        "(site) { [p] { title=\"t\" } }",
        &BuildOptions::new(tmp.path(), tmp.path().join("out")),
    )
    .unwrap_err();
    assert!(matches!(error, BuildError::MissingResource { .. }));
}

#[test]
fn test_output_collision_with_a_plain_file() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src");
    let out = tmp.path().join("out");
    write(&src, "sub/x.html", "x\n");
    // The output parent already exists as a plain file.
    write(&out, "sub", "in the way");

    let error = build(
        "(site) { [x] { @\"sub/x.html\" } }",
        &BuildOptions::new(&src, &out),
    )
    .unwrap_err();
    assert!(matches!(error, BuildError::OutputCollision { .. }));
}

#[test]
fn test_lookup_normalizes_slashes_and_prefers_first_match() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src");
    let out = tmp.path().join("out");
    write(&src, "a.html", "a\n");
    write(&src, "b.html", "b\n");

    let pages = build(
        "(first) { root=\"/\" [same] { @\"a.html\" } } (second) { root=\"/\" [same] { @\"b.html\" } }",
        &BuildOptions::new(&src, &out),
    )
    .unwrap();

    // Both pages resolve to the route "same"; namespace order wins.
    let page = pages.page("/same/").unwrap();
    assert_eq!(page.resource.as_deref(), Some("a.html"));
    assert_eq!(pages.page("same").unwrap().resource.as_deref(), Some("a.html"));
    assert!(pages.page("/never-built").is_none());
}

#[test]
fn test_unbuilt_documents_are_not_addressable() {
    let source = Source::new("site.pages", "(s) { root=\"/\" [p] { @\"p.html\" } }");
    let pages = Pages::parse(&source).unwrap();
    assert!(pages.page("/p").is_none());
}

#[test]
fn test_build_failure_leaves_later_pages_untouched() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src");
    let out = tmp.path().join("out");
    write(&src, "ok.html", "ok\n");

    let source = Source::new("site.pages", "(s) { [a] { @\"gone.html\" } [b] { @\"ok.html\" } }");
    let mut pages = Pages::parse(&source).unwrap();
    let result = pages.build(&BuildOptions::new(&src, &out), &standard::library());
    assert!(result.is_err());
    assert!(!out.join("ok.html").exists());
    assert!(pages.document.namespaces[0].pages[1].output.is_none());
}
