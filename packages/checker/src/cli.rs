//! Command-line interface for the checker.
//!
//! The process always prints one JSON document to stdout and exits 0.
//! Failures, including bad arguments, are reported through the `error` key.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use crate::config::{FetchMode, FetcherConfig, HTTP_TIMEOUT_SECS};
use crate::error::{CheckerError, Result};
use crate::extractor::Extractor;
use crate::fetcher::PorsiFetcher;
use crate::record::error_json;

/// Porsi Haji Checker - Look up a hajj queue registration number.
#[derive(Debug, Parser)]
#[command(name = "porsi-haji-checker")]
#[command(version, about, long_about = None)]
#[command(after_help = "Without NOMOR_PORSI one line is read from stdin:\n  echo \"NOMOR_PORSI\" | porsi-haji-checker")]
pub struct Cli {
    /// Registration number (nomor porsi); `help` prints this text
    pub nomor_porsi: Option<String>,

    /// How the result page is fetched
    #[arg(short, long, value_enum, default_value_t = FetchMode::Direct)]
    pub mode: FetchMode,

    /// Base URL (default depends on --mode)
    #[arg(long)]
    pub url: Option<String>,

    /// User agent sent with every request
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Verify the server's TLS certificate
    #[arg(long)]
    pub verify_ssl: bool,

    /// Per-request timeout in seconds
    #[arg(short, long, default_value_t = HTTP_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Keep cookies in this JSON file between runs
    #[arg(long)]
    pub cookie_file: Option<PathBuf>,
}

impl Cli {
    /// Fetcher configuration from the command-line options.
    pub fn fetcher_config(&self) -> FetcherConfig {
        let mut builder = FetcherConfig::builder()
            .mode(self.mode)
            .verify_ssl(self.verify_ssl)
            .timeout_secs(self.timeout);

        if let Some(url) = &self.url {
            builder = builder.url(url);
        }
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        if let Some(cookie_file) = &self.cookie_file {
            builder = builder.cookie_file(cookie_file);
        }

        builder.build()
    }
}

/// Run the CLI.
pub fn run() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let message = CheckerError::Usage(e.to_string().trim().to_string());
            print_output(&render(Err(message)));
            return;
        }
    };

    if cli.nomor_porsi.as_deref() == Some("help") {
        print_output(&Cli::command().render_long_help().to_string());
        return;
    }

    let output = render(check(&cli, &mut io::stdin().lock()));
    print_output(&output);
}

/// Resolve the registration number and run one lookup.
///
/// Returns the JSON document to print.
pub fn check(cli: &Cli, stdin: &mut impl BufRead) -> Result<String> {
    let nomor_porsi = match &cli.nomor_porsi {
        Some(nomor) if !nomor.is_empty() => nomor.clone(),
        _ => read_nomor_porsi(stdin)?,
    };
    let fetcher = PorsiFetcher::new(nomor_porsi, cli.fetcher_config())?;
    tracing::debug!(
        nomor_porsi = fetcher.nomor_porsi(),
        mode = ?fetcher.config().mode,
        url = %fetcher.config().url,
        "Checking"
    );
    Extractor::new(fetcher).parse()
}

/// Read one line from `stdin`, trimmed.
fn read_nomor_porsi(stdin: &mut impl BufRead) -> Result<String> {
    let mut line = String::new();
    stdin.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Turn a lookup result into the JSON document to print.
fn render(result: Result<String>) -> String {
    match result {
        Ok(json) => json,
        Err(e) => {
            tracing::debug!(error = %e, "Reporting error");
            error_json(&e.to_string())
        }
    }
}

fn print_output(text: &str) {
    let mut stdout = io::stdout().lock();
    // Nothing sensible is left to report if stdout itself is gone.
    let _ = writeln!(stdout, "{text}");
}
