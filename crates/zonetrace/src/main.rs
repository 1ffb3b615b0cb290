//! zonetrace: trace the DNS delegation chain of a name.
//!
//! Resolves a name iteratively from the root servers, querying every
//! known name server at each hop in parallel and printing per-server
//! timing and errors along the way.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;
use zonetrace_client::{Client, ClientConfig};
use zonetrace_proto::{Edns, Message, Name, Question, RecordType};

mod output;

/// Trace the DNS delegation chain of a name from the root servers down.
#[derive(Parser, Debug)]
#[command(name = "zonetrace")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Record type and domain, or just the domain (record type defaults to A)
    #[arg(value_name = "[QTYPE] DOMAIN", required = true, num_args = 1..=2)]
    args: Vec<String>,

    /// Per-query timeout in milliseconds
    #[arg(long, default_value_t = 500, value_name = "MS")]
    timeout: u64,

    /// Attempt ceiling for resolving one name server's addresses
    #[arg(long, default_value_t = 10, value_name = "N")]
    max_retry: u8,

    /// Maximum iterations before giving up
    #[arg(long, default_value_t = 16, value_name = "N")]
    max_steps: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Only print the final answer
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    /// Splits the positionals into `(qtype, domain)`.
    fn question(&self) -> Result<(RecordType, &str)> {
        match self.args.as_slice() {
            [domain] => Ok((RecordType::A, domain.as_str())),
            [qtype, domain] => {
                let qtype = RecordType::from_str(qtype)
                    .with_context(|| format!("unsupported record type {qtype:?}"))?;
                Ok((qtype, domain.as_str()))
            }
            _ => unreachable!("clap bounds the positional count"),
        }
    }
}

fn parse_log_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    }
}

fn init_logging(cli: &Cli) {
    // Diagnostics default to warn so the trace table stays readable.
    let level = cli
        .log_level
        .as_deref()
        .map(parse_log_level)
        .unwrap_or(Level::WARN);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: &Cli) -> Result<bool> {
    let (qtype, domain) = cli.question()?;
    let qname = Name::from_str(domain).with_context(|| format!("invalid domain {domain:?}"))?;

    let mut query = Message::query(Question::new(qname, qtype));
    // The DO bit makes the trace look like real resolver traffic; no
    // validation happens on the answers.
    query.set_edns(Edns::with_dnssec_ok());

    let config = ClientConfig {
        timeout: Duration::from_millis(cli.timeout),
        max_retry: cli.max_retry,
        max_steps: cli.max_steps,
    };
    let client = Client::new(config);
    let tracer = output::tracer(cli.quiet);

    let trace = client.resolve(&query, &tracer).await?;
    match trace.answer {
        Some(answer) => {
            output::print_answer(&answer, trace.rtt);
            Ok(true)
        }
        None => {
            output::print_exhausted(trace.rtt);
            Ok(false)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{} {err:#}", style("error:").red().bold());
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("trace"), Level::TRACE);
        assert_eq!(parse_log_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_log_level("warning"), Level::WARN);
        assert_eq!(parse_log_level("bogus"), Level::WARN);
    }

    #[test]
    fn test_cli_domain_only() {
        let cli = Cli::try_parse_from(["zonetrace", "example.com"]).unwrap();
        let (qtype, domain) = cli.question().unwrap();
        assert_eq!(qtype, RecordType::A);
        assert_eq!(domain, "example.com");
        assert!(!cli.quiet);
    }

    #[test]
    fn test_cli_qtype_and_domain() {
        let cli = Cli::try_parse_from(["zonetrace", "aaaa", "example.com"]).unwrap();
        let (qtype, domain) = cli.question().unwrap();
        assert_eq!(qtype, RecordType::AAAA);
        assert_eq!(domain, "example.com");
    }

    #[test]
    fn test_cli_bad_qtype() {
        let cli = Cli::try_parse_from(["zonetrace", "bogus", "example.com"]).unwrap();
        assert!(cli.question().is_err());
    }

    #[test]
    fn test_cli_options() {
        let cli = Cli::try_parse_from([
            "zonetrace",
            "--timeout",
            "250",
            "--max-retry",
            "5",
            "--max-steps",
            "32",
            "-q",
            "ns",
            "example.org",
        ])
        .unwrap();
        assert_eq!(cli.timeout, 250);
        assert_eq!(cli.max_retry, 5);
        assert_eq!(cli.max_steps, 32);
        assert!(cli.quiet);
        let (qtype, _) = cli.question().unwrap();
        assert_eq!(qtype, RecordType::NS);
    }

    #[test]
    fn test_cli_requires_domain() {
        assert!(Cli::try_parse_from(["zonetrace"]).is_err());
    }
}
