use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use super::models::{group_ties, PlayerTally};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize)]
pub enum RankingMetric {
    Participation,
    TotalPoints,
    AveragePoints,
    TopRate,
    TopTwoRate,
    AverageRank,
}

impl RankingMetric {
    pub fn title(self) -> &'static str {
        match self {
            RankingMetric::Participation => "ゲーム参加率",
            RankingMetric::TotalPoints => "累積ポイント",
            RankingMetric::AveragePoints => "平均ポイント",
            RankingMetric::TopRate => "トップ率",
            RankingMetric::TopTwoRate => "連対率",
            RankingMetric::AverageRank => "平均順位",
        }
    }

    /// Average rank is the only board where lower is better.
    pub fn descending(self) -> bool {
        !matches!(self, RankingMetric::AverageRank)
    }

    pub fn value(self, tally: &PlayerTally, game_count: u32) -> f64 {
        match self {
            RankingMetric::Participation => {
                if game_count == 0 {
                    0.0
                } else {
                    f64::from(tally.games) / f64::from(game_count)
                }
            }
            RankingMetric::TotalPoints => tally.total_points,
            RankingMetric::AveragePoints => tally.average_points(),
            RankingMetric::TopRate => tally.rank_rate(1),
            RankingMetric::TopTwoRate => tally.top_two_rate(),
            RankingMetric::AverageRank => tally.average_rank(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub rank: usize,
    pub name: String,
    pub value: f64,
    pub games: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingBoard {
    pub metric: RankingMetric,
    pub entries: Vec<RankingEntry>,
}

impl RankingBoard {
    pub fn build(
        metric: RankingMetric,
        pool: &[&PlayerTally],
        game_count: u32,
        slots: usize,
    ) -> Self {
        let values = pool
            .iter()
            .map(|tally| (*tally, metric.value(tally, game_count)))
            .collect();
        let entries = group_ties(values, metric.descending(), slots)
            .into_iter()
            .flat_map(|group| {
                let rank = group.rank;
                group.members.into_iter().map(move |(tally, value)| RankingEntry {
                    rank,
                    name: tally.name.clone(),
                    value,
                    games: tally.games,
                })
            })
            .collect();
        Self { metric, entries }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingReport {
    pub game_count: u32,
    /// Minimum number of games a player needs to appear on a board.
    pub qualification: u32,
    pub first_game: NaiveDateTime,
    pub last_game: NaiveDateTime,
    pub boards: Vec<RankingBoard>,
}

pub fn qualification(game_count: u32, ratio: f64) -> u32 {
    let required = (f64::from(game_count) * ratio).ceil();
    if required <= 0.0 {
        0
    } else {
        required.min(f64::from(u32::MAX)) as u32
    }
}

pub fn build_boards(pool: &[&PlayerTally], game_count: u32, slots: usize) -> Vec<RankingBoard> {
    RankingMetric::iter()
        .map(|metric| RankingBoard::build(metric, pool, game_count, slots))
        .collect()
}
