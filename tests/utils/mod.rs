pub mod builders;
pub mod setup;

// Re-export main utilities for use by test files
pub use builders::GameBuilder;
#[allow(unused_imports)]
pub use setup::{game_time, TestSetup, TestSetupBuilder};
