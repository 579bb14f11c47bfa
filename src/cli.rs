//! Command-line interface.
//!
//! ```bash
//! value_investor analyze DE000BASF111 DE0007236101
//! value_investor analyze DE000BASF111,DE0008404005 --json
//! value_investor serve --listen 127.0.0.1:8080 --metrics metrics.json
//! value_investor metrics
//! ```

use crate::models::{Identifier, ScraperError};
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Fundamental metrics for German equities, scraped by ISIN.
#[derive(Debug, Parser)]
#[command(name = "value_investor", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch and print metrics for one or more ISINs.
    Analyze(AnalyzeArgs),
    /// Serve the JSON API.
    Serve(ServeArgs),
    /// Print the metric labels that would be searched for.
    Metrics(MetricsArgs),
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// ISINs, separated by spaces or commas.
    #[arg(required = true)]
    pub identifiers: Vec<String>,

    /// Print JSON instead of text cards.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// JSON file with `[{"key": .., "label": ..}]` entries.
    #[arg(long)]
    pub metrics: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub listen: SocketAddr,

    #[arg(long)]
    pub metrics: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct MetricsArgs {
    #[arg(long)]
    pub metrics: Option<PathBuf>,
}

/// Splits `"A,B" "C"` into three identifiers. Blank pieces are dropped.
pub fn split_identifiers(args: &[String]) -> Result<Vec<Identifier>, ScraperError> {
    let identifiers = args
        .iter()
        .flat_map(|arg| arg.split(','))
        .filter(|piece| !piece.trim().is_empty())
        .map(Identifier::new)
        .collect::<Result<Vec<_>, _>>()?;
    if identifiers.is_empty() {
        return Err(ScraperError::EmptyIdentifier);
    }
    Ok(identifiers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_accepts_comma_and_space_separated_isins() {
        let cli = Cli::try_parse_from([
            "value_investor",
            "analyze",
            "DE000BASF111,DE0007236101",
            "DE0008404005",
            "--json",
        ])
        .unwrap();
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert!(args.json);
        let ids = split_identifiers(&args.identifiers).unwrap();
        let ids: Vec<_> = ids.iter().map(Identifier::as_str).collect();
        assert_eq!(ids, vec!["DE000BASF111", "DE0007236101", "DE0008404005"]);
    }

    #[test]
    fn analyze_without_isin_is_rejected() {
        assert!(Cli::try_parse_from(["value_investor", "analyze"]).is_err());
        assert!(matches!(
            split_identifiers(&[" , ".to_string()]),
            Err(ScraperError::EmptyIdentifier)
        ));
    }

    #[test]
    fn serve_defaults_to_localhost() {
        let cli = Cli::try_parse_from(["value_investor", "serve"]).unwrap();
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.listen, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert!(args.metrics.is_none());
    }
}
