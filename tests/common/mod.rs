//! Common test utilities for integration tests
//!
//! Provides an in-memory `GameTransport` driven by a per-game script, plus
//! helpers to build API payloads.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use requester::domain::errors::{CredentialError, TransportError};
use requester::domain::models::{GameId, GameResponse};
use requester::domain::ports::GameTransport;

/// Body of a successful record played on `major.minor`.
pub fn game_body(major: i64, minor: i64) -> Value {
    json!({
        "code": 200,
        "message": "Success",
        "userGames": [
            {"versionMajor": major, "versionMinor": minor, "gameRank": 1},
            {"versionMajor": major, "versionMinor": minor, "gameRank": 2}
        ]
    })
}

pub fn response(status: u16, body: &Value) -> GameResponse {
    GameResponse::from_bytes(status, serde_json::to_vec(body).unwrap())
}

/// A successful record on `major.minor`.
pub fn on_patch(major: i64, minor: i64) -> Reply {
    Reply::Respond(response(200, &game_body(major, minor)))
}

/// HTTP 200 whose envelope carries `code`.
pub fn envelope(code: i64) -> Reply {
    Reply::Respond(response(200, &json!({"code": code, "message": "Not Found"})))
}

#[derive(Debug, Clone)]
pub enum Reply {
    Respond(GameResponse),
    Timeout,
    NoCredential,
}

impl Reply {
    fn into_result(self) -> Result<GameResponse, TransportError> {
        match self {
            Self::Respond(response) => Ok(response),
            Self::Timeout => Err(TransportError::Timeout),
            Self::NoCredential => Err(TransportError::Credential(CredentialError::Empty)),
        }
    }
}

/// Transport answering from a script.
///
/// Each game has a queue of replies; the last one repeats once the others
/// are used up. Games without a script get `fallback`.
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<i64, VecDeque<Reply>>>,
    fallback: Reply,
    calls: Mutex<Vec<(GameId, tokio::time::Instant)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::with_fallback(envelope(404))
    }

    pub fn with_fallback(fallback: Reply) -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            fallback,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn game(self, id: i64, reply: Reply) -> Self {
        self.script(id, vec![reply])
    }

    pub fn script(self, id: i64, replies: Vec<Reply>) -> Self {
        self.scripts.lock().unwrap().insert(id, replies.into());
        self
    }

    /// Every game in `ids` is a successful record on `major.minor`.
    pub fn patch_range(mut self, ids: std::ops::RangeInclusive<i64>, major: i64, minor: i64) -> Self {
        for id in ids {
            self = self.game(id, on_patch(major, minor));
        }
        self
    }

    pub fn calls(&self) -> Vec<GameId> {
        self.calls.lock().unwrap().iter().map(|(id, _)| *id).collect()
    }

    pub fn call_times(&self, id: i64) -> Vec<tokio::time::Instant> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(game, _)| game.get() == id)
            .map(|(_, at)| *at)
            .collect()
    }

    pub fn calls_for(&self, id: i64) -> usize {
        self.call_times(id).len()
    }
}

#[async_trait]
impl GameTransport for ScriptedTransport {
    async fn fetch(&self, game_id: GameId) -> Result<GameResponse, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((game_id, tokio::time::Instant::now()));

        let mut scripts = self.scripts.lock().unwrap();
        let reply = match scripts.get_mut(&game_id.get()) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        reply.unwrap_or_else(|| self.fallback.clone()).into_result()
    }
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
