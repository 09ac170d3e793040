//! MR Coach - automated merge request review feedback
//!
//! The `coach` command runs one review pass over the merge request named
//! by the CI environment: fetch the changed files, analyze each diff with
//! the configured model, post inline and summary comments, and persist a
//! record of every suggestion.
//!
//! Exit status is 0 on normal completion (including the "no changes" and
//! "all clear" cases) and non-zero when the run takes the fatal path.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, Level};

use coach_core::{init_tracing, Coach, CoachConfig, GeminiModel, GitLabHost, RatePolicy};
use coach_state::{StoreProvider, SurrealStoreProvider};

#[derive(Parser)]
#[command(name = "coach")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Automated AI review feedback for GitLab merge requests", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,

    /// Maximum number of changed files to review per run
    #[arg(long, default_value_t = 5)]
    max_files: usize,

    /// Pause between files, in seconds (rate limiting)
    #[arg(long, default_value_t = 1)]
    delay_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let config = CoachConfig::from_env();

    let host = Arc::new(GitLabHost::new(&config.server_url, &config.gitlab_token)?);
    let model = Arc::new(GeminiModel::new(&config.model_api_key)?);
    let store: Option<Arc<dyn StoreProvider>> = config
        .store_url
        .as_deref()
        .map(|url| Arc::new(SurrealStoreProvider::new(url)) as Arc<dyn StoreProvider>);

    let policy = RatePolicy {
        max_files: cli.max_files,
        file_delay: Duration::from_secs(cli.delay_secs),
    };

    let coach = Coach::new(&config, host, model, store, policy);

    match coach.run().await {
        Ok(report) => {
            info!(
                files_reviewed = report.files_reviewed,
                files_skipped = report.files_skipped,
                total_suggestions = report.total_suggestions,
                "Review run complete"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Review run failed");
            std::process::exit(1);
        }
    }
}
