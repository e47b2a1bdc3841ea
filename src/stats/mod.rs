pub mod detail;
pub mod filter;
pub mod ranking;
pub mod summary;
pub mod versus;

mod errors;
pub mod models;

pub use detail::{GameLine, PlayerDetail};
pub use errors::StatsError;
pub use filter::GameFilter;
pub use models::*;
pub use ranking::{RankingBoard, RankingEntry, RankingMetric, RankingReport};
pub use summary::{Summary, SummaryRow};
pub use versus::{VersusMatrix, VersusRecord};

use chrono::NaiveDateTime;
use std::collections::HashMap;
use tracing::debug;

use crate::record::GameRecord;

/// Aggregations over the records a [`GameFilter`] admits.
///
/// An empty target list means every player. Each aggregation reports
/// [`StatsError::NoMatches`] instead of producing an empty result.
pub struct AggregationEngine<'a> {
    records: Vec<&'a GameRecord>,
    filter: GameFilter<'a>,
}

impl<'a> AggregationEngine<'a> {
    pub fn new(records: &'a [GameRecord], filter: GameFilter<'a>) -> Self {
        let records = filter.select(records);
        debug!(
            selected = records.len(),
            start = %filter.window.start,
            end = %filter.window.end,
            "Selected games for aggregation"
        );
        Self { records, filter }
    }

    pub fn records(&self) -> &[&'a GameRecord] {
        &self.records
    }

    pub fn game_count(&self) -> u32 {
        u32::try_from(self.records.len()).unwrap_or(u32::MAX)
    }

    fn no_matches(&self) -> StatsError {
        StatsError::NoMatches {
            start: self.filter.window.start,
            end: self.filter.window.end,
        }
    }

    fn span(&self) -> Result<(NaiveDateTime, NaiveDateTime), StatsError> {
        span_of(&self.records).ok_or_else(|| self.no_matches())
    }

    /// Games with at least one of `targets` seated, or every game when no
    /// target is given.
    fn games_with(&self, targets: &[String]) -> Vec<&'a GameRecord> {
        self.records
            .iter()
            .copied()
            .filter(|record| {
                targets.is_empty()
                    || record
                        .seats()
                        .iter()
                        .any(|entry| targets.contains(&entry.canonical_name))
            })
            .collect()
    }

    fn tallies(&self) -> Vec<PlayerTally> {
        tallies_of(&self.records)
    }

    pub fn summary(&self, targets: &[String]) -> Result<Summary, StatsError> {
        let games = self.games_with(targets);
        let Some((first_game, last_game)) = span_of(&games) else {
            return Err(self.no_matches());
        };
        let tallies: Vec<PlayerTally> = tallies_of(&games)
            .into_iter()
            .filter(|t| targets.is_empty() || targets.contains(&t.name))
            .collect();
        if tallies.is_empty() {
            return Err(self.no_matches());
        }

        let rows = summary::leaderboard(tallies);
        let bust_total = rows.iter().map(|row| row.tally.busts).sum();
        Ok(Summary {
            window: self.filter.window,
            game_count: u32::try_from(games.len()).unwrap_or(u32::MAX),
            first_game,
            last_game,
            rows,
            bust_total,
        })
    }

    /// Ranking boards over registered players with enough games.
    pub fn rankings(
        &self,
        targets: &[String],
        slots: usize,
        qualification_ratio: f64,
    ) -> Result<RankingReport, StatsError> {
        let (first_game, last_game) = self.span()?;
        let game_count = self.game_count();
        let qualification = ranking::qualification(game_count, qualification_ratio);

        let tallies = self.tallies();
        let pool: Vec<&PlayerTally> = tallies
            .iter()
            .filter(|t| !t.name.contains(self.filter.guest_name))
            .filter(|t| targets.is_empty() || targets.contains(&t.name))
            .filter(|t| t.games >= qualification)
            .collect();
        debug!(pool = pool.len(), qualification, "Built ranking pool");

        Ok(RankingReport {
            game_count,
            qualification,
            first_game,
            last_game,
            boards: ranking::build_boards(&pool, game_count, slots),
        })
    }

    pub fn versus(&self, focal: &str, opponents: &[String]) -> Result<VersusMatrix, StatsError> {
        let (game_count, records) =
            versus::tally_versus(focal, opponents, self.records.iter().copied());
        if game_count == 0 {
            return Err(self.no_matches());
        }
        Ok(VersusMatrix {
            focal: focal.to_string(),
            window: self.filter.window,
            game_count,
            records,
        })
    }

    pub fn player_detail(&self, name: &str) -> Result<PlayerDetail, StatsError> {
        if self.records.is_empty() {
            return Err(self.no_matches());
        }
        Ok(PlayerDetail::collect(
            name,
            self.filter.window,
            self.filter.guest_name,
            self.records.iter().copied(),
        ))
    }
}

fn span_of(records: &[&GameRecord]) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let first = records.iter().map(|r| r.timestamp()).min();
    let last = records.iter().map(|r| r.timestamp()).max();
    first.zip(last)
}

/// Per-player tallies in order of first appearance.
fn tallies_of(records: &[&GameRecord]) -> Vec<PlayerTally> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut tallies: Vec<PlayerTally> = Vec::new();
    for record in records {
        for entry in record.seats() {
            let slot = *index.entry(entry.canonical_name.as_str()).or_insert_with(|| {
                tallies.push(PlayerTally::new(entry.canonical_name.as_str()));
                tallies.len() - 1
            });
            tallies[slot].record(entry);
        }
    }
    tallies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SeatEntry;
    use crate::window::TimeWindow;
    use chrono::NaiveDate;

    fn game(hour: u32, seats: [(&str, i64, u8, f64); 4]) -> GameRecord {
        let ts = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        GameRecord::new(
            ts,
            seats.map(|(name, raw_score, rank, point)| SeatEntry {
                raw_name: name.into(),
                canonical_name: name.into(),
                score_text: raw_score.to_string(),
                raw_score,
                rank,
                point,
            }),
        )
    }

    fn filter(guest_skip: bool) -> GameFilter<'static> {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        GameFilter::new(TimeWindow::from_days(day, day), guest_skip, "ゲスト")
    }

    fn records() -> Vec<GameRecord> {
        vec![
            game(13, [("A", 450, 1, 65.0), ("B", 300, 2, 10.0), ("C", 200, 3, -20.0), ("D", 50, 4, -55.0)]),
            game(14, [("B", 450, 1, 65.0), ("A", 300, 2, 10.0), ("D", 300, 3, -10.0), ("C", -50, 4, -65.0)]),
            game(15, [("ゲスト", 450, 1, 65.0), ("A", 300, 2, 10.0), ("ゲスト", 200, 3, -20.0), ("C", 50, 4, -55.0)]),
        ]
    }

    #[test]
    fn summary_orders_by_total_points() {
        let records = records();
        let engine = AggregationEngine::new(&records, filter(true));
        let summary = engine.summary(&[]).unwrap();

        assert_eq!(summary.game_count, 2);
        let names: Vec<&str> = summary.rows.iter().map(|r| r.tally.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "D", "C"]);
        assert_eq!(summary.rows[0].tally.total_points, 75.0);
        assert_eq!(summary.bust_total, 1);
    }

    #[test]
    fn summary_includes_guest_games_without_skip() {
        let records = records();
        let engine = AggregationEngine::new(&records, filter(false));
        let summary = engine.summary(&["A".to_string()]).unwrap();

        assert_eq!(summary.game_count, 3);
        assert_eq!(summary.rows.len(), 1);
        assert_eq!(summary.rows[0].tally.games, 3);
        assert_eq!(summary.rows[0].tally.total_points, 85.0);
    }

    #[test]
    fn summary_counts_only_games_the_targets_played() {
        let records = records();
        let engine = AggregationEngine::new(&records, filter(false));
        let summary = engine.summary(&["D".to_string()]).unwrap();

        assert_eq!(summary.game_count, 2);
        assert_eq!(summary.first_game, records[0].timestamp());
        assert_eq!(summary.last_game, records[1].timestamp());
        assert_eq!(summary.rows[0].tally.games, 2);
    }

    #[test]
    fn summary_for_absent_target_has_no_matches() {
        let records = records();
        let engine = AggregationEngine::new(&records, filter(true));
        assert!(matches!(
            engine.summary(&["Z".to_string()]),
            Err(StatsError::NoMatches { .. })
        ));
    }

    #[test]
    fn rankings_leave_out_guests() {
        let records = records();
        let engine = AggregationEngine::new(&records, filter(false));
        let report = engine.rankings(&[], 3, 0.05).unwrap();

        assert_eq!(report.game_count, 3);
        assert_eq!(report.qualification, 1);
        let total = report
            .boards
            .iter()
            .find(|b| b.metric == RankingMetric::TotalPoints)
            .unwrap();
        assert!(total.entries.iter().all(|e| e.name != "ゲスト"));
        assert_eq!(total.entries[0].name, "A");
    }

    #[test]
    fn versus_needs_focal_games() {
        let records = records();
        let engine = AggregationEngine::new(&records, filter(true));

        let matrix = engine.versus("A", &[]).unwrap();
        assert_eq!(matrix.game_count, 2);
        let b = matrix.record_for("B").unwrap();
        assert_eq!(b.win_rate(), 0.5);
        assert_eq!(b.games(), 2);

        assert!(matches!(
            engine.versus("Z", &[]),
            Err(StatsError::NoMatches { .. })
        ));
    }

    #[test]
    fn empty_window_reports_no_matches() {
        let records: Vec<GameRecord> = Vec::new();
        let engine = AggregationEngine::new(&records, filter(true));
        assert_eq!(engine.game_count(), 0);
        assert!(engine.summary(&[]).is_err());
        assert!(engine.rankings(&[], 3, 0.05).is_err());
        assert!(engine.player_detail("A").is_err());
    }
}
