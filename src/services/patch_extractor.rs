//! Reads the patch version out of a game record.

use serde_json::Value;

use crate::domain::models::{PatchVersion, VersionPart};

/// Field holding the per-player entries of a game.
pub const USER_GAMES_FIELD: &str = "userGames";
/// Field holding the major version on a per-player entry.
pub const VERSION_MAJOR_FIELD: &str = "versionMajor";
/// Field holding the hotfix version on a per-player entry.
pub const VERSION_HOTFIX_FIELD: &str = "versionMinor";

/// Extract `(versionMajor, versionMinor)` from the first entry of `userGames`.
///
/// Returns `None` when the list is missing or empty, or when either field is
/// absent or not an integer or string. An indeterminate record is an
/// ordinary outcome, not an error.
pub fn extract_patch(body: &Value) -> Option<PatchVersion> {
    let first_player = body.get(USER_GAMES_FIELD)?.as_array()?.first()?;
    let major = VersionPart::from_json(first_player.get(VERSION_MAJOR_FIELD)?)?;
    let hotfix = VersionPart::from_json(first_player.get(VERSION_HOTFIX_FIELD)?)?;
    Some(PatchVersion { major, hotfix })
}
