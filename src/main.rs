use anyhow::{Context, Result};
use clap::Parser;
use leadimage::{init_tracing, ImagePipeline, RunStats, ScraperOptions};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};

/// leadimage - find, score and save the lead image of each article
#[derive(Parser)]
#[command(name = "leadimage", version)]
#[command(about = "Select and save the most relevant image for each article record", long_about = None)]
struct Cli {
    /// Folder containing article JSON files
    #[arg(short, long, default_value = ".", env = "LEADIMAGE_INPUT")]
    input: PathBuf,

    /// Folder that receives one sub-folder per article
    #[arg(short, long, default_value = "articles+images", env = "LEADIMAGE_OUTPUT")]
    output: PathBuf,

    /// JSON file with scraper options; missing keys keep their defaults
    #[arg(short, long, env = "LEADIMAGE_CONFIG")]
    config: Option<PathBuf>,

    /// Articles processed at the same time
    #[arg(long)]
    concurrency: Option<usize>,

    /// Per-article deadline in seconds
    #[arg(long)]
    deadline_secs: Option<u64>,

    /// File that also receives the log
    #[arg(long, default_value = "scraper.log")]
    log_file: PathBuf,

    /// Do not write a log file
    #[arg(long, conflicts_with = "log_file")]
    no_log_file: bool,

    /// Default log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: Level,

    /// Emit JSON log lines on stdout
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = (!cli.no_log_file).then_some(cli.log_file.as_path());
    init_tracing(cli.log_level, cli.json_logs, log_file).context("Failed to initialize logging")?;

    let mut options = match &cli.config {
        Some(path) => ScraperOptions::from_json_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ScraperOptions::default(),
    };
    if let Some(concurrency) = cli.concurrency {
        options.concurrency = concurrency;
    }
    if let Some(secs) = cli.deadline_secs {
        options.article_deadline_secs = secs;
    }

    anyhow::ensure!(
        cli.input.is_dir(),
        "Input folder {} does not exist",
        cli.input.display()
    );

    let pipeline = ImagePipeline::new(options).context("Invalid scraper configuration")?;

    info!(input = %cli.input.display(), output = %cli.output.display(), "starting pipeline");
    let start = Instant::now();

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received shutdown signal");
        } else {
            std::future::pending::<()>().await;
        }
    };
    let stats = pipeline
        .run_with_shutdown(&cli.input, &cli.output, shutdown)
        .await
        .context("Pipeline run failed")?;

    println!();
    print!("{}", summary(&stats, &cli.output));
    println!("Elapsed: {:.1}s", start.elapsed().as_secs_f64());

    Ok(())
}

fn summary(stats: &RunStats, output: &Path) -> String {
    format!(
        "=== Pipeline Results ===\n\
         Total articles: {}\n\
         Successfully processed: {}\n\
         Failed: {}\n\
         Output folder: {}\n",
        stats.total,
        stats.successful,
        stats.failed,
        output.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_counts_and_folder() {
        let stats = RunStats {
            total: 5,
            successful: 4,
            failed: 1,
        };
        let text = summary(&stats, Path::new("articles+images"));
        assert_eq!(
            text,
            "=== Pipeline Results ===\n\
             Total articles: 5\n\
             Successfully processed: 4\n\
             Failed: 1\n\
             Output folder: articles+images\n"
        );
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["leadimage"]).unwrap();
        assert_eq!(cli.output, PathBuf::from("articles+images"));
        assert!(!cli.no_log_file);
    }
}
