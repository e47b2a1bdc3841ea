use chrono::NaiveDateTime;

use super::setup::TestSetup;

// ============================================================================
// Game Report Utilities
// ============================================================================

/// Builds chat lines reporting games and posts them in order.
pub struct GameBuilder {
    keyword: String,
    games: Vec<(String, NaiveDateTime)>,
}

impl GameBuilder {
    pub fn new() -> Self {
        Self {
            keyword: "御無礼".to_string(),
            games: vec![],
        }
    }

    /// A game report with the keyword in front, seats East to North.
    pub fn game(mut self, posted: NaiveDateTime, seats: [(&str, i64); 4]) -> Self {
        let body: Vec<String> = seats
            .iter()
            .map(|(name, score)| format!("{name}{score}"))
            .collect();
        self.games
            .push((format!("{} {}", self.keyword, body.join(" ")), posted));
        self
    }

    /// A line exactly as typed.
    pub fn line(mut self, posted: NaiveDateTime, text: &str) -> Self {
        self.games.push((text.to_string(), posted));
        self
    }

    pub async fn post(self, setup: &TestSetup) {
        for (text, posted) in &self.games {
            setup.post(text, *posted).await;
        }
    }
}
