// Library crate for the mahjong chat ledger
// This file exposes the public API for the binary and integration tests

pub mod member;
pub mod record;
pub mod report;
pub mod settings;
pub mod shared;
pub mod source;
pub mod stats;
pub mod window;

// Re-export commonly used types for easier access in tests
pub use member::{MemberService, NameCanonicalizer, NameOptions, PlayerRegistry};
pub use record::{GameRecord, RecordBuilder, Seat, SeatEntry};
pub use report::{Report, ReportQuery, ReportService};
pub use settings::Settings;
pub use shared::{AppError, AppState};
pub use source::{InMemoryMessageSource, InMemoryResultTable, RawMessage, ResultRow};
pub use window::{TimeWindow, TimeWindowResolver};
