//! Inputs the engine consumes: chat messages already scoped to the report
//! channel, and the archived result table.

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::record::GameRecord;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

/// A chat message with its post time in Unix seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMessage {
    pub text: String,
    pub timestamp: f64,
}

impl RawMessage {
    pub fn new(text: impl Into<String>, timestamp: f64) -> Self {
        Self {
            text: text.into(),
            timestamp,
        }
    }

    /// Builds a message posted at a local wall-clock time.
    pub fn at(text: impl Into<String>, posted: NaiveDateTime) -> Self {
        let seconds = Local
            .from_local_datetime(&posted)
            .earliest()
            .map(|dt| dt.timestamp())
            .unwrap_or_else(|| posted.and_utc().timestamp());
        Self::new(text, seconds as f64)
    }

    /// Local post time truncated to whole seconds.
    pub fn local_time(&self) -> Option<NaiveDateTime> {
        if !self.timestamp.is_finite() {
            return None;
        }
        DateTime::from_timestamp(self.timestamp.trunc() as i64, 0)
            .map(|utc| utc.with_timezone(&Local).naive_local())
    }
}

/// One seat of an archived game, already ranked. Rows of the same game
/// share a `game_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub game_id: u64,
    pub timestamp: NaiveDateTime,
    pub seat_index: u8,
    pub player_name: String,
    pub raw_score: i64,
    pub rank: u8,
}

impl ResultRow {
    /// Splits a record into its four rows, keeping the raw names.
    pub fn from_record(record: &GameRecord, game_id: u64) -> Vec<ResultRow> {
        record
            .entries()
            .map(|(seat, entry)| ResultRow {
                game_id,
                timestamp: record.timestamp(),
                seat_index: seat.index() as u8,
                player_name: entry.raw_name.clone(),
                raw_score: entry.raw_score,
                rank: entry.rank,
            })
            .collect()
    }
}

#[async_trait]
pub trait MessageSource: Send + Sync {
    async fn fetch_messages(&self) -> Result<Vec<RawMessage>, SourceError>;
}

#[async_trait]
pub trait ResultTable: Send + Sync {
    async fn fetch_rows(&self) -> Result<Vec<ResultRow>, SourceError>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryMessageSource {
    messages: Arc<RwLock<Vec<RawMessage>>>,
}

impl InMemoryMessageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, message: RawMessage) {
        let mut messages = self.messages.write().await;
        messages.push(message);
        debug!(count = messages.len(), "Stored chat message");
    }
}

#[async_trait]
impl MessageSource for InMemoryMessageSource {
    async fn fetch_messages(&self) -> Result<Vec<RawMessage>, SourceError> {
        Ok(self.messages.read().await.clone())
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryResultTable {
    rows: Arc<RwLock<Vec<ResultRow>>>,
}

impl InMemoryResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn archive(&self, record: &GameRecord) {
        let mut rows = self.rows.write().await;
        let game_id = rows.last().map_or(0, |row| row.game_id + 1);
        rows.extend(ResultRow::from_record(record, game_id));
        debug!(game_id, timestamp = %record.timestamp(), "Archived game record");
    }
}

#[async_trait]
impl ResultTable for InMemoryResultTable {
    async fn fetch_rows(&self) -> Result<Vec<ResultRow>, SourceError> {
        Ok(self.rows.read().await.clone())
    }
}
