pub mod format;
pub mod query;
pub mod service;

pub use format::Report;
pub use query::{OptionFlag, QueryError, ReportOptions, ReportQuery};
pub use service::ReportService;
