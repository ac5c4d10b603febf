use async_trait::async_trait;
use forum_common::MySqlErrorKind;
use sqlx::mysql::MySqlPool;
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::Migration;
use crate::split::preview;

/// A statement failure, already classified by MySQL error number.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StatementError {
    pub kind: MySqlErrorKind,
    pub message: String,
}

/// Something that can execute a single SQL statement.
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<(), StatementError>;
}

#[async_trait]
impl StatementExecutor for MySqlPool {
    async fn execute(&self, sql: &str) -> Result<(), StatementError> {
        match sqlx::raw_sql(sql).execute(self).await {
            Ok(_) => Ok(()),
            Err(e) => Err(StatementError {
                kind: MySqlErrorKind::classify(&e),
                message: e.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Every statement ran.
    Applied,
    /// Every statement reported that its change was already in place.
    AlreadyApplied,
    PartiallyApplied { applied: usize, skipped: usize },
}

impl std::fmt::Display for MigrationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Applied => write!(f, "applied"),
            Self::AlreadyApplied => write!(f, "already applied"),
            Self::PartiallyApplied { applied, skipped } => {
                write!(f, "applied {applied}, already present {skipped}")
            }
        }
    }
}

#[derive(Debug, Error)]
#[error("migration {migration} failed at statement {index} ({statement}): {source}")]
pub struct MigrationError {
    pub migration: &'static str,
    pub index: usize,
    pub statement: String,
    #[source]
    pub source: StatementError,
}

/// Run one migration, statement by statement.
///
/// "Already exists" errors are downgraded to notices; any other error stops
/// the migration and is returned.
pub async fn run_migration<E>(
    executor: &E,
    migration: &Migration,
) -> Result<MigrationOutcome, MigrationError>
where
    E: StatementExecutor + ?Sized,
{
    info!(
        migration = migration.name,
        origin = migration.origin(),
        "Running migration"
    );

    let mut applied = 0;
    let mut skipped = 0;

    for (i, statement) in migration.statements().into_iter().enumerate() {
        match executor.execute(&statement).await {
            Ok(()) => applied += 1,
            Err(e) if e.kind.is_already_applied() => {
                warn!(
                    migration = migration.name,
                    code = e.kind.code_name(),
                    "Already exists (skipped): {}",
                    preview(&statement)
                );
                skipped += 1;
            }
            Err(e) => {
                return Err(MigrationError {
                    migration: migration.name,
                    index: i + 1,
                    statement: preview(&statement),
                    source: e,
                })
            }
        }
    }

    let outcome = match (applied, skipped) {
        (_, 0) => MigrationOutcome::Applied,
        (0, _) => MigrationOutcome::AlreadyApplied,
        (applied, skipped) => MigrationOutcome::PartiallyApplied { applied, skipped },
    };

    info!(migration = migration.name, %outcome, "Migration complete");
    Ok(outcome)
}

/// A fatal error part way through a batch, with what finished before it.
#[derive(Debug, Error)]
#[error("{failure}")]
pub struct RunAllError {
    pub completed: Vec<(&'static str, MigrationOutcome)>,
    #[source]
    pub failure: MigrationError,
}

/// Run migrations in order, stopping at the first fatal error.
pub async fn run_all<E>(
    executor: &E,
    migrations: &[&Migration],
) -> Result<Vec<(&'static str, MigrationOutcome)>, RunAllError>
where
    E: StatementExecutor + ?Sized,
{
    let mut outcomes = Vec::with_capacity(migrations.len());
    for migration in migrations {
        match run_migration(executor, migration).await {
            Ok(outcome) => outcomes.push((migration.name, outcome)),
            Err(failure) => {
                return Err(RunAllError {
                    completed: outcomes,
                    failure,
                })
            }
        }
    }
    Ok(outcomes)
}
