//! sortxml -- sort the elements and attributes of an XML file.
//!
//! Reads one XML document, puts sibling elements and attributes into
//! canonical order, and writes the result to a file or stdout.

use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;

use sortxml::collation::{CaseSensitivity, Collation, Strategy};
use sortxml::error::Error;
use sortxml::file;
use sortxml::parser::ParseOptions;
use sortxml::serial::SerializeOptions;
use sortxml::sort::DEFAULT_PRIMARY_ATTRIBUTE;
use sortxml::{canonicalize, Document, SortOptions};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// sortxml -- sort XML elements and attributes into canonical order.
///
/// Sibling elements are ordered by tag name, then by their attributes;
/// attributes are ordered by name, with the primary attribute first.
#[derive(Parser, Debug)]
#[command(
    name = "sortxml",
    version,
    about,
    long_about = None,
    after_long_help = include_str!("../../README.md")
)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// XML file to sort (use `-` for stdin).
    input: String,

    /// File to write the sorted document to. Defaults to stdout.
    output: Option<PathBuf>,

    /// Print additional information during processing.
    #[arg(short, long)]
    verbose: bool,

    // -- What to sort ------------------------------------------------------
    /// Sort sibling elements (default).
    #[arg(long, overrides_with = "no_sort_nodes")]
    sort_nodes: bool,

    /// Leave the order of sibling elements unchanged.
    #[arg(long, overrides_with = "sort_nodes")]
    no_sort_nodes: bool,

    /// Sort the attributes of every element (default).
    #[arg(long, overrides_with = "no_sort_attributes")]
    sort_attributes: bool,

    /// Leave the order of attributes unchanged.
    #[arg(long, overrides_with = "sort_attributes")]
    no_sort_attributes: bool,

    /// Sort nothing unless re-enabled with --sort-nodes or --sort-attributes.
    #[arg(long)]
    no_sort: bool,

    // -- How to compare ----------------------------------------------------
    /// Compare names and values without regard to case.
    #[arg(short, long, overrides_with = "case_sensitive")]
    ignore_case: bool,

    /// Compare names and values with regard to case (default).
    #[arg(long, overrides_with = "ignore_case")]
    case_sensitive: bool,

    /// Compare by code point instead of the dictionary-like default.
    #[arg(long)]
    ordinal: bool,

    /// Collation for tag names; overrides --ignore-case and --ordinal.
    #[arg(long, value_name = "COLLATION")]
    node_collation: Option<Collation>,

    /// Collation for attributes; overrides --ignore-case and --ordinal.
    #[arg(long, value_name = "COLLATION")]
    attribute_collation: Option<Collation>,

    /// Attribute always placed first in an element.
    #[arg(long, value_name = "NAME", default_value = DEFAULT_PRIMARY_ATTRIBUTE)]
    primary: String,

    // -- Input and output --------------------------------------------------
    /// Drop whitespace-only text and indent the output (default).
    #[arg(long, overrides_with = "no_pretty")]
    pretty: bool,

    /// Keep whitespace as it is and do not indent.
    #[arg(long, overrides_with = "pretty")]
    no_pretty: bool,

    /// Record recoverable well-formedness errors instead of failing.
    #[arg(long)]
    recover: bool,

    /// Write the result back to INPUT when no OUTPUT is given.
    #[arg(long)]
    overwrite: bool,

    /// Wait for Enter before exiting.
    #[arg(short, long)]
    pause: bool,
}

impl Cli {
    fn collation(&self) -> Collation {
        let strategy = if self.ordinal {
            Strategy::Ordinal
        } else {
            Strategy::Linguistic
        };
        let case = if self.ignore_case {
            CaseSensitivity::Insensitive
        } else {
            CaseSensitivity::Sensitive
        };
        Collation::new(strategy, case)
    }

    fn sort_options(&self) -> SortOptions {
        let collation = self.collation();
        SortOptions::default()
            .sort_nodes(enabled(self.sort_nodes, self.no_sort_nodes, self.no_sort))
            .sort_attributes(enabled(
                self.sort_attributes,
                self.no_sort_attributes,
                self.no_sort,
            ))
            .node_collation(self.node_collation.unwrap_or(collation))
            .attribute_collation(self.attribute_collation.unwrap_or(collation))
            .primary_attribute(self.primary.as_str())
    }

    fn pretty(&self) -> bool {
        !self.no_pretty
    }

    fn parse_options(&self) -> ParseOptions {
        ParseOptions::default()
            .recover(self.recover)
            .no_blanks(self.pretty())
    }

    fn serialize_options(&self) -> SerializeOptions {
        SerializeOptions::default().indent(self.pretty())
    }

    /// OUTPUT, else INPUT under --overwrite, else stdout (`None`).
    fn destination(&self) -> Option<&Path> {
        self.output.as_deref().or_else(|| {
            (self.overwrite && self.input != "-").then(|| Path::new(self.input.as_str()))
        })
    }
}

/// An explicit flag for one pass wins over --no-sort.
fn enabled(on: bool, off: bool, none: bool) -> bool {
    if off {
        false
    } else {
        on || !none
    }
}

// ---------------------------------------------------------------------------
// Exit codes
// ---------------------------------------------------------------------------

const EXIT_SUCCESS: u8 = 0;
const EXIT_USAGE: u8 = 1;
const EXIT_LOAD_ERROR: u8 = 100;
const EXIT_SAVE_ERROR: u8 = 101;

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_SUCCESS,
                _ => EXIT_USAGE,
            };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::init_from_env(env_logger::Env::default().default_filter_or(default_filter));

    let code = run(&cli);
    if code == EXIT_SUCCESS && cli.pause {
        wait_for_enter();
    }
    ExitCode::from(code)
}

fn run(cli: &Cli) -> u8 {
    let mut doc = match load(cli) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("sortxml: could not load input file: {e}");
            return EXIT_LOAD_ERROR;
        }
    };

    if cli.verbose {
        for diag in &doc.diagnostics {
            eprintln!("{}: {diag}", cli.input);
        }
    }

    let options = cli.sort_options();
    log::debug!("{options:?}");
    canonicalize(&mut doc, &options);

    let serialize_options = cli.serialize_options();
    let written = match cli.destination() {
        Some(path) => file::write_document(&doc, path, &serialize_options),
        None => write_stdout(&doc, &serialize_options),
    };
    if let Err(e) = written {
        eprintln!("sortxml: could not save output file: {e}");
        return EXIT_SAVE_ERROR;
    }
    EXIT_SUCCESS
}

// ---------------------------------------------------------------------------
// Input and output
// ---------------------------------------------------------------------------

fn load(cli: &Cli) -> Result<Document, Error> {
    let options = cli.parse_options();
    if cli.input != "-" {
        return file::read_document(Path::new(&cli.input), &options);
    }
    let stdin = Path::new("<stdin>");
    let mut bytes = Vec::new();
    io::stdin()
        .read_to_end(&mut bytes)
        .map_err(|source| Error::Read {
            path: stdin.to_path_buf(),
            source,
        })?;
    file::decode_document(&bytes, stdin, &options)
}

fn write_stdout(doc: &Document, options: &SerializeOptions) -> Result<(), Error> {
    let text = file::render(doc, options);
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|source| Error::Write {
            path: PathBuf::from("<stdout>"),
            source,
        })
}

fn wait_for_enter() {
    eprint!("Press Enter to quit: ");
    let _ = io::stderr().flush();
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}
