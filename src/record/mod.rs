pub mod builder;
pub mod parser;
pub mod rank;
pub mod score;

mod errors;
pub mod models;

pub use builder::{Extraction, RecordBuilder, ZeroSumMismatch};
pub use errors::RecordError;
pub use models::*;
pub use parser::{parse_score, MessageParser, ParsedSeat};
pub use rank::resolve_ranks;
