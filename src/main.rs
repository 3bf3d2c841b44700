use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use seolens_core::{
    AuditConfig, Auditor, NoAdvice, Report, ReportDelivery, StaticPerformance,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "seolens=info,seolens_core=info";

#[derive(Debug, Parser)]
#[command(name = "seolens", version)]
#[command(about = "Audit the on-page and technical SEO of a single URL")]
struct Cli {
    /// Page to audit (http or https)
    url: String,

    /// Performance metrics JSON exported from a separate audit tool
    #[arg(long, value_name = "FILE")]
    metrics: Option<PathBuf>,

    /// Write the report here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Single-line JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,
}

/// Writes the report as JSON to a file or stdout.
struct JsonDelivery {
    target: Option<PathBuf>,
    compact: bool,
}

#[async_trait]
impl ReportDelivery for JsonDelivery {
    async fn deliver(&self, report: &Report) -> Result<()> {
        let json = if self.compact {
            serde_json::to_string(report)?
        } else {
            serde_json::to_string_pretty(report)?
        };

        match &self.target {
            Some(path) => {
                tokio::fs::write(path, format!("{json}\n"))
                    .await
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!(path = %path.display(), "report saved");
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{json}").context("failed to write report to stdout")?;
            }
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = AuditConfig::from_env().context("invalid configuration")?;
    let mut auditor = Auditor::new(config).context("failed to initialise auditor")?;
    if let Some(path) = &cli.metrics {
        auditor = auditor.with_performance(StaticPerformance::from_file(path)?);
    }

    let delivery = JsonDelivery {
        target: cli.output,
        compact: cli.compact,
    };

    let report = auditor
        .audit_and_deliver(&cli.url, &NoAdvice, &delivery)
        .await
        .with_context(|| format!("audit of {} failed", cli.url))?;

    info!(
        grade = %report.grade(),
        strengths = report.assessment.strengths.len(),
        weaknesses = report.assessment.weaknesses.len(),
        "done"
    );
    Ok(())
}
