use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};

use tender_scout::classifier::RelevanceClassifier;
use tender_scout::config::AppConfig;
use tender_scout::llm::create_provider;
use tender_scout::pipeline::{MailAnalyzer, MailReport};
use tender_scout::tender::TenderScraper;

#[derive(Parser, Debug)]
#[command(
    name = "tender-scout",
    version,
    about = "Score the tenders linked from tender alert emails"
)]
struct Cli {
    /// Raw email files (RFC 822) to analyze.
    #[arg(value_name = "MAIL_FILE", required = true)]
    mail_files: Vec<PathBuf>,

    /// Notify on scores strictly above this (overrides TENDER_MIN_SCORE).
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=10))]
    min_score: Option<u8>,

    /// Print one JSON report per email instead of a table.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(min_score) = cli.min_score {
        config.min_score = min_score;
    }

    eprintln!("🔎 Tender Scout v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.llm.model);
    eprintln!("   Notify above: {}", config.min_score);
    eprintln!("   Mail files: {}\n", cli.mail_files.len());

    let llm = create_provider(&config.llm)?;
    let scraper = Arc::new(TenderScraper::new(&config.scraper)?);
    let classifier = Arc::new(RelevanceClassifier::new(llm, config.classifier.clone()));
    let analyzer = MailAnalyzer::new(scraper, classifier, config.analyzer.clone());

    let mut unreadable = 0usize;
    for path in &cli.mail_files {
        let file = path.display().to_string();
        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(file = %file, error = %e, "Cannot read mail file");
                unreadable += 1;
                continue;
            }
        };

        info!(file = %file, bytes = raw.len(), "Analyzing mail");
        match analyzer.analyze_mail_report(&raw).await {
            Ok(report) => {
                for tender in report.notable(config.min_score) {
                    info!(
                        file = %file,
                        url = %tender.tender.url,
                        agency = %tender.tender.agency,
                        score = tender.score,
                        "Notable tender"
                    );
                }
                if cli.json {
                    let value = serde_json::json!({ "file": file, "report": report });
                    println!("{}", serde_json::to_string_pretty(&value)?);
                } else {
                    print_table(&file, &report, config.min_score);
                }
            }
            Err(e) => {
                warn!(file = %file, error = %e, "Mail analysis failed");
                if cli.json {
                    let value = serde_json::json!({ "file": file, "error": e.to_string() });
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
            }
        }
    }

    if unreadable > 0 {
        anyhow::bail!("{unreadable} of {} mail file(s) could not be read", cli.mail_files.len());
    }
    Ok(())
}

fn print_table(file: &str, report: &MailReport, min_score: u8) {
    println!("{file}");
    for result in report.successes() {
        let marker = if result.is_notable(min_score) { "*" } else { " " };
        println!(
            " {marker} {:>2}  {}  {}",
            result.score, result.tender.agency, result.tender.url
        );
    }
    for (url, error) in report.failures() {
        println!("    --  {url}  ({error})");
    }
}
