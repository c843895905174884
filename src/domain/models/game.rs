use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a single match on the remote API.
///
/// Identifiers are sequential, so the scanner walks them with
/// [`GameId::successor`] and [`GameId::predecessor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub i64);

impl GameId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }

    /// Next identifier upwards, `None` on overflow.
    pub fn successor(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }

    /// Next identifier downwards, `None` on overflow.
    pub fn predecessor(self) -> Option<Self> {
        self.0.checked_sub(1).map(Self)
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for GameId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// One half of a patch version as the API reports it.
///
/// The API has shipped both numeric and string versions, and the two are
/// never considered equal to each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VersionPart {
    Int(i64),
    Text(String),
}

impl VersionPart {
    /// Read a version part from a JSON value; only integers and strings count.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_i64().map(Self::Int),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for VersionPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for VersionPart {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for VersionPart {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Release a match was played on: `(major, hotfix)`.
///
/// Patch versions are only ever compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatchVersion {
    pub major: VersionPart,
    pub hotfix: VersionPart,
}

impl PatchVersion {
    pub fn new(major: impl Into<VersionPart>, hotfix: impl Into<VersionPart>) -> Self {
        Self {
            major: major.into(),
            hotfix: hotfix.into(),
        }
    }
}

impl fmt::Display for PatchVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.hotfix)
    }
}

/// Envelope code the API embeds in a body it considers successful.
pub const ENVELOPE_OK: i64 = 200;

/// Result of a single GET against the games endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResponse {
    /// HTTP status code
    pub status: u16,
    /// Parsed JSON body, `None` when the payload was not JSON
    pub body: Option<serde_json::Value>,
    /// Bytes exactly as received
    pub raw: Vec<u8>,
}

impl GameResponse {
    /// Build a response from raw bytes, parsing JSON leniently.
    pub fn from_bytes(status: u16, raw: Vec<u8>) -> Self {
        let body = serde_json::from_slice(&raw).ok();
        Self { status, body, raw }
    }

    /// Status code embedded in the body (`code` field), if any.
    pub fn envelope_code(&self) -> Option<i64> {
        self.body.as_ref()?.get("code")?.as_i64()
    }

    /// The API reports success twice: once in HTTP and once in the body.
    pub fn is_success(&self) -> bool {
        self.status == 200 && self.envelope_code() == Some(ENVELOPE_OK)
    }
}
