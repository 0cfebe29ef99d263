use clap::Parser;
use std::path::Path;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use codebench_scorer::collector::{Collection, Collector};
use codebench_scorer::config::{CliArgs, Mode, ScorerConfig};
use codebench_scorer::error::ScorerError;
use codebench_scorer::process::ProcessRunner;
use codebench_scorer::record::{load_baseline, load_record, save_record, ScoreRecord};
use codebench_scorer::report::render_markdown;
use codebench_scorer::results::TestResults;
use codebench_scorer::scoring::calculate_score;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ScorerConfig::from_args(CliArgs::parse());
    let log_guard = init_tracing(config.log_file.as_deref())?;

    info!("Starting codebench-scorer v{}", env!("CARGO_PKG_VERSION"));
    info!("Mode: {:?}", config.mode);
    info!("Project root: {:?}", config.layout.root());

    if !config.layout.root().exists() {
        error!("Project root does not exist: {:?}", config.layout.root());
        std::process::exit(1);
    }

    match config.mode {
        Mode::Calculate => calculate(&config).await?,
        Mode::Report => {
            if let Err(e) = report(&config) {
                error!("{}", e);
                drop(log_guard);
                std::process::exit(1);
            }
        }
        Mode::Baseline => {
            let Collection { results, .. } = collector(&config).collect_with_log().await;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }

    Ok(())
}

fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("codebench_scorer=info"));
    // stdout is reserved for scores and baseline JSON
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

fn collector(config: &ScorerConfig) -> Collector<ProcessRunner> {
    Collector::new(
        config.layout.clone(),
        ProcessRunner::new(config.command_timeout),
    )
}

async fn calculate(config: &ScorerConfig) -> anyhow::Result<()> {
    // Load the baseline first so a bad file fails before minutes of checks
    let baseline = match &config.baseline_path {
        Some(path) => load_baseline(path)?,
        None => TestResults::reference_baseline(),
    };

    let Collection { results, log } = collector(config).collect_with_log().await;
    let score = calculate_score(&results, &baseline);
    info!(
        "Scored {:.2} with {} regressions",
        score.total, score.regressions
    );

    let record = ScoreRecord::new(score, results, baseline, log.into_entries());
    save_record(&config.output_path, &record)?;

    let score = &record.score;
    println!("Total score: {:.2}/100", score.total);
    println!("  Security:       {:.2}", score.security);
    println!("  Performance:    {:.2}", score.performance);
    println!("  Code Quality:   {:.2}", score.quality);
    println!("  Business Logic: {:.2}", score.logic);
    if score.regressions > 0 {
        println!("  Regressions:    {}", score.regressions);
    }
    println!("Results saved to {}", config.output_path.display());
    Ok(())
}

fn report(config: &ScorerConfig) -> Result<(), ScorerError> {
    let record = load_record(&config.output_path)?;
    std::fs::write(&config.report_path, render_markdown(&record))?;
    info!("Report written to {:?}", config.report_path);
    println!("Report saved to {}", config.report_path.display());
    Ok(())
}
