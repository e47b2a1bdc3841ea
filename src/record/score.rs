use crate::settings::ScoringConfig;

impl ScoringConfig {
    /// Bonus paid to the winner: the gap between return and base points of all four players.
    pub fn oka(&self) -> f64 {
        (self.return_point as f64 - self.base_point as f64) * 4.0 / 10.0
    }

    /// Uma with the oka folded into first place.
    pub fn adjusted_uma(&self) -> [f64; 4] {
        let mut uma = self.uma.0;
        uma[0] += self.oka();
        uma
    }
}

/// Points earned for a raw score (units of 100) finishing at `rank` (1-4).
pub fn points(raw_score: i64, rank: u8, config: &ScoringConfig) -> f64 {
    let uma = config.adjusted_uma();
    let slot = usize::from(rank.clamp(1, 4)) - 1;
    let value = (raw_score as f64 - config.return_point as f64) / 10.0 + uma[slot];
    round_to_tenth(value)
}

/// Rounds to one decimal place, halves away from zero.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
