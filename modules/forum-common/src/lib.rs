pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod telemetry;
#[cfg(feature = "test-utils")]
pub mod testutil;

pub use config::{DbConfig, EmailConfig};
pub use db::{connect, MySqlErrorKind};
pub use error::{ForumAdminError, Result};
