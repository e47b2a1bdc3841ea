use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::models::PlayerTally;
use crate::record::{GameRecord, Seat, SeatEntry};
use crate::window::TimeWindow;

/// The target player's seat in one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameLine {
    pub timestamp: NaiveDateTime,
    pub seat: Seat,
    pub entry: SeatEntry,
    /// Two or more seats were guests.
    pub guest_game: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerDetail {
    pub name: String,
    pub window: TimeWindow,
    /// Games in the window, whether or not the player took part.
    pub window_games: u32,
    pub tally: PlayerTally,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub history: Vec<GameLine>,
}

impl PlayerDetail {
    pub fn collect<'r>(
        name: &str,
        window: TimeWindow,
        guest_name: &str,
        records: impl IntoIterator<Item = &'r GameRecord>,
    ) -> Self {
        let mut detail = Self {
            name: name.to_string(),
            window,
            window_games: 0,
            tally: PlayerTally::new(name),
            wins: 0,
            losses: 0,
            draws: 0,
            history: Vec::new(),
        };

        for record in records {
            detail.window_games += 1;
            let Some((seat, entry)) = record
                .entries()
                .find(|(_, entry)| entry.canonical_name == name)
            else {
                continue;
            };

            detail.tally.record(entry);
            match entry.point {
                p if p > 0.0 => detail.wins += 1,
                p if p < 0.0 => detail.losses += 1,
                _ => detail.draws += 1,
            }
            detail.history.push(GameLine {
                timestamp: record.timestamp(),
                seat,
                entry: entry.clone(),
                guest_game: record.guest_count(guest_name) >= 2,
            });
        }
        detail
    }
}
