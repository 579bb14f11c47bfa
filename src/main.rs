use chrono::Local;
use clap::Parser;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;
use value_investor::cli::{split_identifiers, AnalyzeArgs, Cli, Command};
use value_investor::config::{resolve_metric_spec, ScraperConfig};
use value_investor::report::{render_cards, render_json, FETCH_FAILED};
use value_investor::server::{serve, AppState};
use value_investor::{Fetcher, MetricResult, ScraperError};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("value_investor=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_analyze(args: AnalyzeArgs) -> Result<ExitCode, ScraperError> {
    let spec = resolve_metric_spec(args.metrics.as_deref())?;
    let identifiers = split_identifiers(&args.identifiers)?;
    let fetcher = Fetcher::new(&ScraperConfig::from_env())?;

    let mut results: Vec<MetricResult> = Vec::new();
    let mut failed = 0;
    for identifier in &identifiers {
        match fetcher.analyze(identifier, &spec).await {
            Ok(result) => results.push(result),
            Err(e) => {
                failed += 1;
                eprintln!("{} ({}): {}", FETCH_FAILED, identifier, e);
            }
        }
    }

    if args.json {
        println!("{}", render_json(&results)?);
    } else {
        let now = Local::now().naive_local();
        for result in &results {
            println!("{}", render_cards(result, now));
        }
    }

    info!("{} analysed, {} failed", results.len(), failed);
    Ok(if failed > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

async fn run(cli: Cli) -> Result<ExitCode, ScraperError> {
    match cli.command {
        Command::Analyze(args) => run_analyze(args).await,
        Command::Serve(args) => {
            let spec = resolve_metric_spec(args.metrics.as_deref())?;
            let fetcher = Fetcher::new(&ScraperConfig::from_env())?;
            serve(args.listen, AppState::new(fetcher, spec)).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Metrics(args) => {
            let spec = resolve_metric_spec(args.metrics.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&spec)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Fehler: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
