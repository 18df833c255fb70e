//! Command-line interface for pages
//! This binary parses, checks and builds pages files.
//!
//! Usage:
//!   pages build `<path>` [--source `<dir>`] [--out `<dir>`] [--options `<yaml>`]
//!   pages check `<path>`                       - Parse only, report diagnostics
//!   pages inspect `<path>` [--format `<format>`] - Dump tokens or the parsed document

use clap::{Arg, Command};

use pages::pages::processor::{self, ProcessingSpec};
use pages::pages::{standard, BuildOptions, Pages, Source};

fn main() {
    let matches = Command::new("pages")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for building and inspecting pages files")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("build")
                .about("Build every page into the output directory")
                .arg(
                    Arg::new("path")
                        .help("Path to the pages file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("source")
                        .long("source")
                        .short('s')
                        .help("Directory resources are read from"),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .short('o')
                        .help("Directory processed resources are written to"),
                )
                .arg(
                    Arg::new("options")
                        .long("options")
                        .help("YAML file with build options (flags override it)"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Parse a pages file and report the first diagnostic")
                .arg(
                    Arg::new("path")
                        .help("Path to the pages file")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Dump a processing stage of a pages file")
                .arg(
                    Arg::new("path")
                        .help("Path to the pages file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format (e.g., 'token-simple', 'document-json')")
                        .default_value("document-simple"),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("build", build_matches)) => {
            let path = build_matches.get_one::<String>("path").unwrap();
            let source = build_matches.get_one::<String>("source");
            let out = build_matches.get_one::<String>("out");
            let options = build_matches.get_one::<String>("options");
            handle_build_command(path, source, out, options);
        }
        Some(("check", check_matches)) => {
            let path = check_matches.get_one::<String>("path").unwrap();
            handle_check_command(path);
        }
        Some(("inspect", inspect_matches)) => {
            let path = inspect_matches.get_one::<String>("path").unwrap();
            let format = inspect_matches.get_one::<String>("format").unwrap();
            handle_inspect_command(path, format);
        }
        _ => unreachable!(),
    }
}

/// Handle the build command
fn handle_build_command(
    path: &str,
    source: Option<&String>,
    out: Option<&String>,
    options_path: Option<&String>,
) {
    let mut options = match options_path {
        Some(options_path) => {
            let text = std::fs::read_to_string(options_path).unwrap_or_else(|e| {
                eprintln!("Error reading options file: {}", e);
                std::process::exit(1);
            });
            serde_yaml::from_str::<BuildOptions>(&text).unwrap_or_else(|e| {
                eprintln!("Error in options file: {}", e);
                std::process::exit(1);
            })
        }
        None => BuildOptions::default(),
    };
    if let Some(source) = source {
        options.source = source.into();
    }
    if let Some(out) = out {
        options.out = out.into();
    }

    let source = Source::from_file(path).unwrap_or_else(|e| {
        eprintln!("Error reading file: {}", e);
        std::process::exit(1);
    });
    let mut pages = Pages::parse_with_defaults(&source, &options.defaults).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });
    pages.build(&options, &standard::library()).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });

    for page in pages.document.pages() {
        if let (Some(route), Some(output)) = (&page.route, &page.output) {
            println!("/{} -> {}", route, output.display());
        }
    }
}

/// Handle the check command
fn handle_check_command(path: &str) {
    let source = Source::from_file(path).unwrap_or_else(|e| {
        eprintln!("Error reading file: {}", e);
        std::process::exit(1);
    });
    match Pages::parse(&source) {
        Ok(pages) => {
            let namespaces = pages.document.namespaces.len();
            let count = pages.document.pages().count();
            println!("ok: {} namespaces, {} pages", namespaces, count);
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

/// Handle the inspect command
fn handle_inspect_command(path: &str, format: &str) {
    let spec = ProcessingSpec::from_string(format).unwrap_or_else(|e| {
        eprintln!("{}", e);
        eprintln!("\nAvailable formats:");
        for format in processor::available_formats() {
            eprintln!("  {}", format);
        }
        std::process::exit(1);
    });
    let output = processor::process_file(path, &spec).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });
    print!("{}", output);
}
