//! Implementation of the `requester download` command.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use futures::StreamExt;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::cli::output::{create_spinner, output, CommandOutput, ProgressBarExt, TableFormatter};
use crate::domain::models::{Config, FailurePolicy, GameId, Outcome, OutcomeKind, PatchVersion};
use crate::infrastructure::client::{GameApiClient, GameApiClientConfig};
use crate::infrastructure::config::{ConfigError, ConfigLoader};
use crate::infrastructure::storage::GameStore;
use crate::services::{locate_seed, PatchDownloader};

#[derive(Args, Debug, Default)]
pub struct DownloadArgs {
    /// Game to start from (overrides STARTING_GAME_ID)
    #[arg(short, long, allow_negative_numbers = true)]
    pub start: Option<i64>,

    /// Directory the raw payloads are written to
    #[arg(short, long, value_name = "DIR")]
    pub target_dir: Option<PathBuf>,

    /// Re-download games whose file already exists
    #[arg(long)]
    pub overwrite: bool,

    /// Retry profile: standard or aggressive
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Stop each direction after this many candidates
    #[arg(long, value_name = "N")]
    pub max_per_direction: Option<u64>,

    /// What to do after a game exhausts its retries
    #[arg(long, value_enum)]
    pub on_failure: Option<FailurePolicy>,

    /// Look this far around the start for a usable seed (0 disables)
    #[arg(long, value_name = "N")]
    pub seed_search_radius: Option<u64>,
}

impl DownloadArgs {
    /// Layer the flags that were given over the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(start) = self.start {
            config.starting_game_id = Some(start);
        }
        if let Some(dir) = &self.target_dir {
            config.target_directory.clone_from(dir);
        }
        if self.overwrite {
            config.overwrite_old_data = true;
        }
        if let Some(profile) = &self.profile {
            config.retry_profile.clone_from(profile);
            config.retry_schedule_secs = None;
        }
        if let Some(max) = self.max_per_direction {
            config.scan.max_candidates_per_direction = Some(max);
        }
        if let Some(policy) = self.on_failure {
            config.scan.on_failure = policy;
        }
        if let Some(radius) = self.seed_search_radius {
            config.scan.seed_search_radius = radius;
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DownloadSummary {
    pub requested_start: GameId,
    pub seed: GameId,
    pub patch: PatchVersion,
    pub target_directory: PathBuf,
    pub downloaded: u64,
    pub failed: u64,
    pub skipped: u64,
    pub patch_mismatch: u64,
    pub files_written: u64,
    pub started_at: DateTime<Utc>,
    /// Lowest and highest downloaded game
    pub lowest_game_id: Option<GameId>,
    pub highest_game_id: Option<GameId>,
    pub elapsed_secs: f64,
}

impl DownloadSummary {
    pub fn new(
        requested_start: GameId,
        seed: GameId,
        patch: PatchVersion,
        target_directory: PathBuf,
    ) -> Self {
        Self {
            requested_start,
            seed,
            patch,
            target_directory,
            downloaded: 0,
            failed: 0,
            skipped: 0,
            patch_mismatch: 0,
            files_written: 0,
            started_at: Utc::now(),
            lowest_game_id: None,
            highest_game_id: None,
            elapsed_secs: 0.0,
        }
    }

    pub fn record(&mut self, outcome: &Outcome, written: bool) {
        match outcome.kind() {
            OutcomeKind::Downloaded => {
                let id = outcome.game_id();
                self.downloaded += 1;
                self.lowest_game_id = Some(self.lowest_game_id.map_or(id, |low| low.min(id)));
                self.highest_game_id = Some(self.highest_game_id.map_or(id, |high| high.max(id)));
            }
            OutcomeKind::Failed => self.failed += 1,
            OutcomeKind::Skipped => self.skipped += 1,
            OutcomeKind::PatchMismatch => self.patch_mismatch += 1,
        }
        if written {
            self.files_written += 1;
        }
    }

    pub const fn total(&self) -> u64 {
        self.downloaded + self.failed + self.skipped + self.patch_mismatch
    }

    fn counts(&self) -> [(OutcomeKind, u64); 4] {
        [
            (OutcomeKind::Downloaded, self.downloaded),
            (OutcomeKind::Failed, self.failed),
            (OutcomeKind::Skipped, self.skipped),
            (OutcomeKind::PatchMismatch, self.patch_mismatch),
        ]
    }
}

impl CommandOutput for DownloadSummary {
    fn to_human(&self) -> String {
        let formatter = TableFormatter::new();
        let range = match (self.lowest_game_id, self.highest_game_id) {
            (Some(low), Some(high)) => format!("{low}..={high}"),
            _ => "-".to_string(),
        };

        let mut lines = vec![format!(
            "Patch {} scanned around game {} in {:.1}s",
            self.patch, self.seed, self.elapsed_secs
        )];
        if self.seed != self.requested_start {
            lines.push(format!(
                "Game {} was unusable, started from {} instead",
                self.requested_start, self.seed
            ));
        }
        lines.push(formatter.format_outcome_counts(&self.counts()));
        lines.push(formatter.format_details(&[
            ("Started", self.started_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
            ("Downloaded range", range),
            ("Files written", self.files_written.to_string()),
            ("Directory", self.target_directory.display().to_string()),
        ]));
        lines.join("\n")
    }
}

pub async fn execute(args: DownloadArgs, mut config: Config, json_mode: bool) -> Result<()> {
    args.apply(&mut config);

    let requested = config
        .starting_game_id
        .map(GameId::new)
        .ok_or(ConfigError::MissingStartingGameId)?;
    let schedule = ConfigLoader::retry_schedule(&config)?;
    let options = ConfigLoader::scan_options(&config);

    let store = GameStore::new(&config.target_directory);
    store.ensure_layout().await?;

    let client = GameApiClient::new(GameApiClientConfig::from_api_config(&config.api))
        .context("Failed to build the API client")?;

    let mut downloader = PatchDownloader::new(Arc::new(client), schedule)
        .with_failure_policy(options.on_failure)
        .with_limits(options.limits);
    if config.overwrite_old_data {
        info!("Existing files will be overwritten");
    } else {
        downloader = downloader.with_filter(Arc::new(store.missing_file_filter()));
    }

    let spinner = create_spinner(!json_mode && console::Term::stderr().is_term());
    spinner.set_message("resolving seed");

    let radius = config.scan.seed_search_radius;
    let started = Instant::now();
    let scan = if radius > 0 {
        match locate_seed(downloader.evaluator(), requested, radius).await {
            Ok(Some(found)) => downloader.download_patch_from(found.outcome),
            Ok(None) => {
                spinner.finish_error("no usable seed");
                return Err(anyhow!(
                    "No game within {radius} of {requested} downloads with a known patch"
                ));
            }
            Err(err) => {
                spinner.finish_error("seed search failed");
                return Err(err.into());
            }
        }
    } else {
        downloader.download_patch(requested).await
    };

    let mut games = match scan {
        Ok(games) => games,
        Err(err) => {
            spinner.finish_error("seed unavailable");
            return Err(err.into());
        }
    };
    let seed = games.seed();

    let mut summary = DownloadSummary::new(
        requested,
        seed,
        games.target_patch().clone(),
        config.target_directory.clone(),
    );
    spinner.set_message(format!("on patch {}", summary.patch));

    while let Some(outcome) = games.next().await {
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(err) => {
                spinner.finish_error("scan aborted");
                return Err(err.into());
            }
        };
        let written = store.persist(&outcome).await?;
        summary.record(&outcome, written.is_some());
        spinner.inc(1);
    }

    summary.elapsed_secs = started.elapsed().as_secs_f64();
    spinner.finish_success(format!("{} games on patch {}", summary.total(), summary.patch));
    info!(
        downloaded = summary.downloaded,
        failed = summary.failed,
        skipped = summary.skipped,
        "Scan complete"
    );

    output(&summary, json_mode);
    Ok(())
}
