use sqlx::mysql::{MySqlDatabaseError, MySqlPool, MySqlPoolOptions};
use tracing::info;

use crate::config::DbConfig;
use crate::error::Result;

/// MySQL server error numbers the migration tools care about.
pub const ER_TABLE_EXISTS_ERROR: u16 = 1050;
pub const ER_DUP_FIELDNAME: u16 = 1060;
pub const ER_DUP_KEYNAME: u16 = 1061;

/// Open the single connection a tool runs on.
pub async fn connect(config: &DbConfig) -> Result<MySqlPool> {
    let pool = MySqlPoolOptions::new()
        .max_connections(1)
        .connect_with(config.connect_options())
        .await?;

    info!(
        host = config.host.as_str(),
        database = config.database.as_str(),
        "Connected to MySQL"
    );
    Ok(pool)
}

/// Coarse classification of a database error by MySQL error number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MySqlErrorKind {
    DuplicateColumn,
    TableExists,
    DuplicateKey,
    Other,
}

impl MySqlErrorKind {
    pub fn from_number(number: u16) -> Self {
        match number {
            ER_DUP_FIELDNAME => Self::DuplicateColumn,
            ER_TABLE_EXISTS_ERROR => Self::TableExists,
            ER_DUP_KEYNAME => Self::DuplicateKey,
            _ => Self::Other,
        }
    }

    pub fn classify(err: &sqlx::Error) -> Self {
        server_error_number(err)
            .map(Self::from_number)
            .unwrap_or(Self::Other)
    }

    /// The schema change this error reports is already in place.
    pub fn is_already_applied(self) -> bool {
        !matches!(self, Self::Other)
    }

    pub fn code_name(self) -> &'static str {
        match self {
            Self::DuplicateColumn => "ER_DUP_FIELDNAME",
            Self::TableExists => "ER_TABLE_EXISTS_ERROR",
            Self::DuplicateKey => "ER_DUP_KEYNAME",
            Self::Other => "OTHER",
        }
    }
}

fn server_error_number(err: &sqlx::Error) -> Option<u16> {
    err.as_database_error()?
        .try_downcast_ref::<MySqlDatabaseError>()
        .map(|e| e.number())
}
