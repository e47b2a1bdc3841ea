use serde::{Deserialize, Serialize};

use crate::record::{score::round_to_tenth, GameRecord, SeatEntry};
use crate::window::TimeWindow;

/// Head-to-head results of the focal player against one opponent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersusRecord {
    pub opponent: String,
    pub wins: u32,
    pub losses: u32,
    /// Points the focal player earned in the shared games.
    pub focal_points: f64,
    pub opponent_points: f64,
}

impl VersusRecord {
    fn new(opponent: &str) -> Self {
        Self {
            opponent: opponent.to_string(),
            wins: 0,
            losses: 0,
            focal_points: 0.0,
            opponent_points: 0.0,
        }
    }

    pub fn games(&self) -> u32 {
        self.wins + self.losses
    }

    pub fn win_rate(&self) -> f64 {
        match self.games() {
            0 => 0.0,
            games => f64::from(self.wins) / f64::from(games),
        }
    }

    fn record(&mut self, focal: &SeatEntry, opponent: &SeatEntry) {
        if focal.rank < opponent.rank {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        self.focal_points = round_to_tenth(self.focal_points + focal.point);
        self.opponent_points = round_to_tenth(self.opponent_points + opponent.point);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersusMatrix {
    pub focal: String,
    pub window: TimeWindow,
    /// Games in the window the focal player took part in.
    pub game_count: u32,
    pub records: Vec<VersusRecord>,
}

impl VersusMatrix {
    pub fn record_for(&self, opponent: &str) -> Option<&VersusRecord> {
        self.records.iter().find(|r| r.opponent == opponent)
    }
}

/// Tallies the focal player's games. Opponents appear in the order they are
/// first met; a non-empty `opponents` list restricts who is counted.
pub fn tally_versus<'r>(
    focal: &str,
    opponents: &[String],
    records: impl IntoIterator<Item = &'r GameRecord>,
) -> (u32, Vec<VersusRecord>) {
    let mut game_count = 0;
    let mut tallies: Vec<VersusRecord> = Vec::new();

    for record in records {
        let Some(focal_entry) = record.find_player(focal) else {
            continue;
        };
        game_count += 1;

        for opponent in record.seats() {
            if opponent.canonical_name == focal {
                continue;
            }
            if !opponents.is_empty() && !opponents.contains(&opponent.canonical_name) {
                continue;
            }
            let index = match tallies
                .iter()
                .position(|t| t.opponent == opponent.canonical_name)
            {
                Some(index) => index,
                None => {
                    tallies.push(VersusRecord::new(&opponent.canonical_name));
                    tallies.len() - 1
                }
            };
            tallies[index].record(focal_entry, opponent);
        }
    }

    (game_count, tallies)
}
