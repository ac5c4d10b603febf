//! Idempotent schema migrations for the school forum database.
//!
//! SQL is embedded at compile time, so the binary needs no migration files
//! at runtime.

pub mod catalog;
pub mod runner;
pub mod split;

pub use catalog::{Migration, MigrationSource, MIGRATIONS};
pub use runner::{
    run_all, run_migration, MigrationError, MigrationOutcome, RunAllError, StatementExecutor,
};
pub use split::split_statements;
