use tracing::debug;

use crate::record::GameRecord;
use crate::window::TimeWindow;

/// Decides which records take part in an aggregation.
#[derive(Debug, Clone, Copy)]
pub struct GameFilter<'a> {
    pub window: TimeWindow,
    /// Drop games where two or more seats are guests.
    pub guest_skip: bool,
    pub guest_name: &'a str,
}

impl<'a> GameFilter<'a> {
    pub fn new(window: TimeWindow, guest_skip: bool, guest_name: &'a str) -> Self {
        Self {
            window,
            guest_skip,
            guest_name,
        }
    }

    pub fn admits(&self, record: &GameRecord) -> bool {
        if !self.window.contains(record.timestamp()) {
            return false;
        }
        if self.guest_skip && record.guest_count(self.guest_name) >= 2 {
            debug!(timestamp = %record.timestamp(), "Skipping game with two or more guests");
            return false;
        }
        true
    }

    pub fn select<'r>(&self, records: &'r [GameRecord]) -> Vec<&'r GameRecord> {
        records.iter().filter(|record| self.admits(record)).collect()
    }
}
