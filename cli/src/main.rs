//! pipecp - Stream Copy
//!
//! Copy a byte stream between filesystem and HTTP endpoints, powered by
//! pipecopy.

use clap::{Parser, ValueEnum};
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use pipecopy::{
    CopyOptions, CopyOutcome, CopyRequest, CopyService, Endpoint, Error as PipecopyError,
    ErrorClass, SourceSpec,
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// pipecp - Copy a byte stream between endpoints
///
/// Each operand is a local filesystem path, or an http(s):// URL.
/// Missing source metadata (size, MIME type) is resolved before the
/// transfer begins: one HEAD request for HTTP sources, a stat call for
/// local files.
///
/// Usage:
///   pipecp SOURCE DEST
///   pipecp https://example.com/a.png a.png
///   pipecp report.pdf https://storage.example.com/report.pdf
#[derive(Parser, Debug)]
#[command(name = "pipecp", version, about, long_about = None)]
struct Args {
    /// Source: a filesystem path or an http(s):// URL
    source: String,

    /// Destination: a filesystem path or an http(s):// URL
    destination: String,

    /// Correlation id used in log and progress events
    #[arg(long, default_value = "pipecp")]
    id: String,

    /// HTTP method for reading an http source
    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// HTTP method for writing an http destination
    #[arg(long, default_value = "PUT")]
    dest_method: String,

    /// Extra header for the http source (repeatable)
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE")]
    headers: Vec<String>,

    /// Extra header for the http destination (repeatable)
    #[arg(long = "dest-header", value_name = "NAME: VALUE")]
    dest_headers: Vec<String>,

    /// Source size in bytes (skips size discovery)
    #[arg(long)]
    size: Option<u64>,

    /// Source MIME type (skips MIME discovery)
    #[arg(long)]
    mime: Option<String>,

    /// Progress update period in milliseconds
    #[arg(long, default_value = "5000")]
    progress_period: u64,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    output: OutputMode,

    /// Disable the progress bar
    #[arg(short = 'q', long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
enum CliError {
    #[error("Malformed header (expected 'NAME: VALUE'): {raw}")]
    MalformedHeader { raw: String },

    #[error("{source}")]
    Copy { source: PipecopyError },

    #[error("Failed to serialize JSON output: {source}")]
    JsonSerialize { source: serde_json::Error },
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::MalformedHeader { .. } => 2,
            Self::JsonSerialize { .. } => 1,
            Self::Copy { source } => match source.class() {
                ErrorClass::Validation => 2,
                ErrorClass::Resolution => 3,
                ErrorClass::Transport => 4,
            },
        }
    }
}

/// Build an endpoint from a CLI operand: URLs become http endpoints,
/// anything else is a filesystem path.
fn parse_endpoint(operand: &str, method: &str, headers: &[String]) -> CliResult<Endpoint> {
    if operand.starts_with("http://") || operand.starts_with("https://") {
        let mut endpoint = Endpoint::http_with_method(operand, method);
        for raw in headers {
            let Some((name, value)) = raw.split_once(':') else {
                return Err(CliError::MalformedHeader { raw: raw.clone() });
            };
            endpoint = endpoint.with_header(name.trim(), value.trim());
        }
        Ok(endpoint)
    } else {
        Ok(Endpoint::filesystem(operand))
    }
}

fn create_transfer_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    bar
}

fn print_outcome(args: &Args, outcome: &CopyOutcome) -> CliResult<()> {
    match args.output {
        OutputMode::Human => {
            println!(
                "Copied {} in {}s ({}/s)",
                HumanBytes(outcome.stat.transferred),
                outcome.stat.runtime,
                HumanBytes(outcome.stat.speed as u64),
            );
        }
        OutputMode::Json => {
            let value = json!({
                "data": outcome.data,
                "stat": outcome.stat,
            });
            let rendered = serde_json::to_string_pretty(&value)
                .map_err(|source| CliError::JsonSerialize { source })?;
            println!("{rendered}");
        }
    }
    Ok(())
}

async fn run() -> CliResult<()> {
    let args = Args::parse();

    let source = parse_endpoint(&args.source, &args.method, &args.headers)?;
    let destination = parse_endpoint(&args.destination, &args.dest_method, &args.dest_headers)?;

    let mut spec = SourceSpec::new(source);
    if let Some(size) = args.size {
        spec = spec.with_size(size);
    }
    if let Some(mime) = &args.mime {
        spec = spec.with_mime(mime);
    }

    let options = CopyOptions::default()
        .with_progress_update_period(Duration::from_millis(args.progress_period));
    let mut service = CopyService::new(options);

    let bar = (!args.quiet && args.output == OutputMode::Human).then(create_transfer_bar);
    if let Some(bar) = bar.clone() {
        service = service.with_progress(move |event| {
            bar.set_length(event.stat.length);
            bar.set_position(event.stat.transferred);
        });
    }

    let request = CopyRequest::new(args.id.clone(), spec, destination);
    let result = service.copy(request).await;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    let outcome = result.map_err(|source| CliError::Copy { source })?;
    print_outcome(&args, &outcome)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(error) = run().await {
        eprintln!("error: {error}");
        std::process::exit(error.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoint_url() {
        let endpoint = parse_endpoint("https://example.com/a", "GET", &[]).unwrap();
        assert!(matches!(endpoint, Endpoint::Http { .. }));
    }

    #[test]
    fn test_parse_endpoint_path() {
        let endpoint = parse_endpoint("./local/file.bin", "GET", &[]).unwrap();
        assert!(matches!(endpoint, Endpoint::Filesystem { .. }));
    }

    #[test]
    fn test_parse_endpoint_malformed_header() {
        let headers = vec!["no-separator".to_owned()];
        let result = parse_endpoint("https://example.com/a", "GET", &headers);
        assert!(matches!(result, Err(CliError::MalformedHeader { .. })));
    }

    #[test]
    fn test_headers_ignored_for_filesystem_operands() {
        // Header flags only apply to http operands; a path operand with
        // header flags set should still parse (they are ignored upstream).
        let endpoint = parse_endpoint("file.bin", "GET", &[]).unwrap();
        assert!(matches!(endpoint, Endpoint::Filesystem { .. }));
    }
}
