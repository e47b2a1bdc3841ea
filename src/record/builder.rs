use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use super::{parse_score, resolve_ranks, score, GameRecord, MessageParser, RecordError, SeatEntry};
use crate::member::{NameCanonicalizer, NameOptions};
use crate::settings::{ScoringConfig, Settings};
use crate::source::{RawMessage, ResultRow};

/// Four raw scores that do not add up to the configured total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZeroSumMismatch {
    pub expected: i64,
    pub actual: i64,
}

impl ZeroSumMismatch {
    /// Amount the posted scores are over (positive) or under the total.
    pub fn difference(&self) -> i64 {
        self.actual - self.expected
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub record: GameRecord,
    pub mismatch: Option<ZeroSumMismatch>,
}

/// Turns chat messages or archived rows into [`GameRecord`]s.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    parser: MessageParser,
    scoring: ScoringConfig,
}

impl RecordBuilder {
    pub fn new(settings: &Settings) -> Result<Self, RecordError> {
        Ok(Self {
            parser: MessageParser::new(&settings.search.keyword)?,
            scoring: settings.scoring.clone(),
        })
    }

    pub fn parser(&self) -> &MessageParser {
        &self.parser
    }

    /// Builds a record from one message, or `None` when the message is not
    /// a game report. The record is returned even when the scores do not sum
    /// to the expected total.
    pub fn extract(
        &self,
        message: &RawMessage,
        canonicalizer: &NameCanonicalizer<'_>,
        options: NameOptions,
    ) -> Option<Extraction> {
        let parsed = self.parser.parse(&message.text)?;
        let Some(timestamp) = message.local_time() else {
            debug!(timestamp = message.timestamp, "Skipping message with unusable timestamp");
            return None;
        };

        let mut scores = [0i64; 4];
        for (slot, seat) in scores.iter_mut().zip(parsed.iter()) {
            match parse_score(&seat.score_text) {
                Ok(value) => *slot = value,
                Err(e) => {
                    debug!(error = %e, "Skipping message with unreadable score");
                    return None;
                }
            }
        }
        let ranks = resolve_ranks(scores);

        let seats = std::array::from_fn(|i| SeatEntry {
            raw_name: parsed[i].name.clone(),
            canonical_name: canonicalizer.canonicalize(&parsed[i].name, options),
            score_text: parsed[i].score_text.clone(),
            raw_score: scores[i],
            rank: ranks[i],
            point: score::points(scores[i], ranks[i], &self.scoring),
        });
        let record = GameRecord::new(timestamp, seats);

        let mismatch = self.check_total(&record);
        if let Some(mismatch) = mismatch {
            warn!(
                %timestamp,
                expected = mismatch.expected,
                actual = mismatch.actual,
                "Game scores do not add up to the expected total"
            );
        }
        Some(Extraction { record, mismatch })
    }

    fn check_total(&self, record: &GameRecord) -> Option<ZeroSumMismatch> {
        let actual = record.score_total();
        (actual != self.scoring.expected_total).then_some(ZeroSumMismatch {
            expected: self.scoring.expected_total,
            actual,
        })
    }

    /// Records from every game report among `messages`, in message order.
    pub fn build_all<'m>(
        &self,
        messages: impl IntoIterator<Item = &'m RawMessage>,
        canonicalizer: &NameCanonicalizer<'_>,
        options: NameOptions,
    ) -> Vec<GameRecord> {
        let records: Vec<GameRecord> = messages
            .into_iter()
            .filter_map(|message| self.extract(message, canonicalizer, options))
            .map(|extraction| extraction.record)
            .collect();
        debug!(count = records.len(), "Built records from chat messages");
        records
    }

    /// Rebuilds records from archived rows. Ranks are taken as stored while
    /// names and points are derived again under the current settings.
    pub fn from_rows(
        &self,
        rows: &[ResultRow],
        canonicalizer: &NameCanonicalizer<'_>,
        options: NameOptions,
    ) -> Result<Vec<GameRecord>, RecordError> {
        let mut games: BTreeMap<(NaiveDateTime, u64), Vec<&ResultRow>> = BTreeMap::new();
        for row in rows {
            games.entry((row.timestamp, row.game_id)).or_default().push(row);
        }

        games
            .into_iter()
            .map(|((timestamp, game_id), mut game)| {
                game.sort_by_key(|row| row.seat_index);
                let seat_indices: Vec<u8> = game.iter().map(|row| row.seat_index).collect();
                let mut ranks: Vec<u8> = game.iter().map(|row| row.rank).collect();
                ranks.sort_unstable();
                if seat_indices != [0, 1, 2, 3] || ranks != [1, 2, 3, 4] {
                    return Err(RecordError::InvalidRows(format!(
                        "game {game_id} at {timestamp}: seats {seat_indices:?}, ranks {ranks:?}"
                    )));
                }

                let seats = std::array::from_fn(|i| {
                    let row = game[i];
                    SeatEntry {
                        raw_name: row.player_name.clone(),
                        canonical_name: canonicalizer.canonicalize(&row.player_name, options),
                        score_text: row.raw_score.to_string(),
                        raw_score: row.raw_score,
                        rank: row.rank,
                        point: score::points(row.raw_score, row.rank, &self.scoring),
                    }
                });
                Ok(GameRecord::new(timestamp, seats))
            })
            .collect()
    }
}
