use serde::{Deserialize, Serialize};

use crate::record::score::round_to_tenth;
use crate::record::SeatEntry;

/// Running totals for one player over a set of games.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerTally {
    pub name: String,
    pub games: u32,
    pub total_points: f64,
    pub rank_counts: [u32; 4],
    pub busts: u32,
}

impl PlayerTally {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn record(&mut self, entry: &SeatEntry) {
        self.games += 1;
        self.total_points = round_to_tenth(self.total_points + entry.point);
        if let Some(count) = self.rank_counts.get_mut(usize::from(entry.rank).wrapping_sub(1)) {
            *count += 1;
        }
        if entry.is_bust() {
            self.busts += 1;
        }
    }

    fn ratio(&self, count: u32) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            f64::from(count) / f64::from(self.games)
        }
    }

    pub fn average_points(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.total_points / f64::from(self.games)
        }
    }

    pub fn average_rank(&self) -> f64 {
        let rank_sum: u32 = self
            .rank_counts
            .iter()
            .zip(1u32..)
            .map(|(count, rank)| count * rank)
            .sum();
        self.ratio(rank_sum)
    }

    /// Share of games finished at `rank` (1-4).
    pub fn rank_rate(&self, rank: usize) -> f64 {
        let count = rank
            .checked_sub(1)
            .and_then(|i| self.rank_counts.get(i))
            .copied()
            .unwrap_or(0);
        self.ratio(count)
    }

    pub fn top_count(&self) -> u32 {
        self.rank_counts[0]
    }

    pub fn top_two_count(&self) -> u32 {
        self.rank_counts[0] + self.rank_counts[1]
    }

    pub fn top_two_rate(&self) -> f64 {
        self.ratio(self.top_two_count())
    }

    pub fn bust_rate(&self) -> f64 {
        self.ratio(self.busts)
    }
}

/// Entries sharing one rank number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TieGroup<T> {
    pub rank: usize,
    pub members: Vec<T>,
}

/// Orders `items` by value and groups equal values under one rank number.
///
/// The sort is stable, so members of a group keep their input order. Rank
/// numbers skip past tied entries (1, 1, 3), and groups whose rank exceeds
/// `slots` are dropped.
pub fn group_ties<T>(
    mut items: Vec<(T, f64)>,
    descending: bool,
    slots: usize,
) -> Vec<TieGroup<(T, f64)>> {
    items.sort_by(|(_, a), (_, b)| {
        let ordering = a.total_cmp(b);
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });

    let mut groups: Vec<TieGroup<(T, f64)>> = Vec::new();
    let mut position = 0;
    for item in items {
        position += 1;
        match groups.last_mut() {
            Some(group) if group.members.last().map(|(_, v)| *v) == Some(item.1) => {
                group.members.push(item);
            }
            _ => {
                if position > slots {
                    break;
                }
                groups.push(TieGroup {
                    rank: position,
                    members: vec![item],
                });
            }
        }
    }
    groups
}
