//! aa-serialize - write security profiles as policy-language text
//!
//! Reads a profile document (root name, profile set, optional shared
//! declarations) and prints the profile file the policy compiler loads.

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod document;
mod error;

pub use config::CliConfig;
pub use document::ProfileDocument;
pub use error::{CliError, CliResult};

use profile_types::FileDeclarations;
use profile_writer::{ProfileSerializer, SerializeOptions};

/// aa-serialize application
#[derive(Parser)]
#[command(name = "aa-serialize")]
#[command(about = "Serialize a profile document into policy-language text", long_about = None)]
#[command(version)]
struct Cli {
    /// Profile document (JSON or YAML), or `-` for JSON on stdin
    input: PathBuf,

    /// Configuration file path
    #[arg(short, long, env = "AA_SERIALIZE_CONFIG")]
    config: Option<PathBuf>,

    /// Profile to serialize instead of the document's root
    #[arg(short, long)]
    root: Option<String>,

    /// Write modification and repository comments
    #[arg(short, long)]
    metadata: bool,

    /// Omit flags clauses
    #[arg(long)]
    no_flags: bool,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Run using the current process arguments.
pub fn run() -> CliResult<()> {
    run_with_args(std::env::args_os())
}

/// Run using the provided argument iterator.
pub fn run_with_args<I, T>(args: I) -> CliResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    // Initialize tracing; stdout is reserved for profile text
    let filter = if cli.verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();

    let config = CliConfig::load(cli.config.as_deref())?;
    let mut document = ProfileDocument::load(&cli.input)?;
    if let Some(root) = cli.root {
        document.root = root;
    }

    let options = config.options(cli.metadata, cli.no_flags);
    let text = render(&document, &config, options)?;

    match cli.output {
        Some(path) => {
            std::fs::write(&path, &text)?;
            info!(path = %path.display(), profile = document.root.as_str(), "Wrote profile");
        }
        None => print!("{}", text),
    }

    Ok(())
}

/// Serialize `document` with the filename layout from `config`.
pub fn render(
    document: &ProfileDocument,
    config: &CliConfig,
    options: SerializeOptions,
) -> CliResult<String> {
    let locator = config.locator();

    let mut declarations = FileDeclarations::new();
    if let Some(shared) = &document.declarations {
        declarations.insert(locator.filename(&document.root), shared.clone());
    }

    let text = ProfileSerializer::new()
        .with_locator(locator)
        .with_declarations(&declarations)
        .serialize(&document.profiles, &document.root, options)?;
    Ok(text)
}
