use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::models::{group_ties, PlayerTally};
use crate::record::score::round_to_tenth;
use crate::window::TimeWindow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub position: usize,
    pub tally: PlayerTally,
    /// Points behind the row above; `None` for the first row.
    pub gap: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub window: TimeWindow,
    pub game_count: u32,
    pub first_game: NaiveDateTime,
    pub last_game: NaiveDateTime,
    pub rows: Vec<SummaryRow>,
    pub bust_total: u32,
}

/// Leaderboard rows ordered by total points, ties sharing a position.
pub fn leaderboard(tallies: Vec<PlayerTally>) -> Vec<SummaryRow> {
    let scored = tallies
        .into_iter()
        .map(|tally| {
            let total = tally.total_points;
            (tally, total)
        })
        .collect();

    let mut rows: Vec<SummaryRow> = Vec::new();
    for group in group_ties(scored, true, usize::MAX) {
        for (tally, total) in group.members {
            let gap = rows
                .last()
                .map(|above| round_to_tenth(above.tally.total_points - total));
            rows.push(SummaryRow {
                position: group.rank,
                tally,
                gap,
            });
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(name: &str, total_points: f64) -> PlayerTally {
        PlayerTally {
            name: name.into(),
            games: 1,
            total_points,
            rank_counts: [1, 0, 0, 0],
            busts: 0,
        }
    }

    #[test]
    fn rows_follow_total_points_with_shared_positions() {
        let rows = leaderboard(vec![
            tally("c", -20.4),
            tally("a", 35.1),
            tally("b", -20.4),
            tally("d", 5.7),
        ]);

        let shape: Vec<(usize, &str, Option<f64>)> = rows
            .iter()
            .map(|r| (r.position, r.tally.name.as_str(), r.gap))
            .collect();
        assert_eq!(
            shape,
            vec![
                (1, "a", None),
                (2, "d", Some(29.4)),
                (3, "c", Some(26.1)),
                (3, "b", Some(0.0)),
            ]
        );
    }

    #[test]
    fn empty_input_gives_empty_board() {
        assert!(leaderboard(vec![]).is_empty());
    }
}
