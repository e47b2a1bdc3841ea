use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    #[error("No games between {start} and {end}")]
    NoMatches {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("At least one player must be specified")]
    MissingPlayer,
}
