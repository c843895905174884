//! Implementation of the `requester probe` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::{Config, GameId, GameResponse, PatchVersion};
use crate::domain::ports::GameTransport;
use crate::infrastructure::client::{GameApiClient, GameApiClientConfig};
use crate::services::extract_patch;

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Game to fetch
    #[arg(allow_negative_numbers = true)]
    pub game_id: i64,
}

#[derive(Debug, Serialize)]
pub struct ProbeOutput {
    pub game_id: GameId,
    pub http_status: u16,
    pub envelope_code: Option<i64>,
    pub success: bool,
    pub patch: Option<PatchVersion>,
    pub bytes: usize,
}

impl ProbeOutput {
    pub fn from_response(game_id: GameId, response: &GameResponse) -> Self {
        Self {
            game_id,
            http_status: response.status,
            envelope_code: response.envelope_code(),
            success: response.is_success(),
            patch: response.body.as_ref().and_then(extract_patch),
            bytes: response.raw.len(),
        }
    }
}

impl CommandOutput for ProbeOutput {
    fn to_human(&self) -> String {
        let verdict = if self.success {
            console::style("downloadable").green()
        } else {
            console::style("not downloadable").red()
        };
        let details = TableFormatter::new().format_details(&[
            ("HTTP status", self.http_status.to_string()),
            (
                "Envelope code",
                self.envelope_code.map_or_else(|| "-".to_string(), |c| c.to_string()),
            ),
            (
                "Patch",
                self.patch
                    .as_ref()
                    .map_or_else(|| "unknown".to_string(), ToString::to_string),
            ),
            ("Bytes", self.bytes.to_string()),
        ]);
        format!("Game {} is {verdict}\n{details}", self.game_id)
    }
}

/// One request, no retries.
pub async fn execute(args: ProbeArgs, config: Config, json_mode: bool) -> Result<()> {
    let game_id = GameId::new(args.game_id);
    let client = GameApiClient::new(GameApiClientConfig::from_api_config(&config.api))
        .context("Failed to build the API client")?;

    let response = client
        .fetch(game_id)
        .await
        .with_context(|| format!("Failed to fetch game {game_id}"))?;

    output(&ProbeOutput::from_response(game_id, &response), json_mode);
    Ok(())
}
