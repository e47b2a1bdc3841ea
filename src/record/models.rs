use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::EnumIter;

use crate::member::{NameCanonicalizer, NameOptions};
use crate::settings::ScoringConfig;

use super::score;

/// Fixed seat positions. Declaration order is the tie-break order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
)]
pub enum Seat {
    East = 0,
    South = 1,
    West = 2,
    North = 3,
}

impl Seat {
    pub const ALL: [Seat; 4] = [Seat::East, Seat::South, Seat::West, Seat::North];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Seat> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Seat::East => "東家",
                Seat::South => "南家",
                Seat::West => "西家",
                Seat::North => "北家",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatEntry {
    pub raw_name: String,
    pub canonical_name: String,
    /// Score text exactly as posted, kept for redisplay.
    pub score_text: String,
    /// Raw score in units of 100 points.
    pub raw_score: i64,
    pub rank: u8,
    pub point: f64,
}

impl SeatEntry {
    pub fn is_bust(&self) -> bool {
        self.raw_score < 0
    }
}

/// One finished game with its four seats in East, South, West, North order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    timestamp: NaiveDateTime,
    seats: [SeatEntry; 4],
}

impl GameRecord {
    pub fn new(timestamp: NaiveDateTime, seats: [SeatEntry; 4]) -> Self {
        Self { timestamp, seats }
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn seats(&self) -> &[SeatEntry; 4] {
        &self.seats
    }

    pub fn seat(&self, seat: Seat) -> &SeatEntry {
        &self.seats[seat.index()]
    }

    pub fn entries(&self) -> impl Iterator<Item = (Seat, &SeatEntry)> {
        Seat::ALL.into_iter().zip(self.seats.iter())
    }

    pub fn score_total(&self) -> i64 {
        self.seats
            .iter()
            .fold(0i64, |total, entry| total.saturating_add(entry.raw_score))
    }

    /// First seat whose canonical name equals `name`.
    pub fn find_player(&self, name: &str) -> Option<&SeatEntry> {
        self.seats.iter().find(|entry| entry.canonical_name == name)
    }

    /// Number of seats whose canonical name contains the guest marker.
    pub fn guest_count(&self, guest_name: &str) -> usize {
        self.seats
            .iter()
            .filter(|entry| entry.canonical_name.contains(guest_name))
            .count()
    }

    /// Re-resolves every canonical name from the raw tokens.
    pub fn recanonicalize(&mut self, canonicalizer: &NameCanonicalizer<'_>, options: NameOptions) {
        for entry in &mut self.seats {
            entry.canonical_name = canonicalizer.canonicalize(&entry.raw_name, options);
        }
    }

    /// Recomputes points after a scoring rule change.
    pub fn rescore(&mut self, config: &ScoringConfig) {
        for entry in &mut self.seats {
            entry.point = score::points(entry.raw_score, entry.rank, config);
        }
    }
}
