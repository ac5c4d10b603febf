//! Integration tests for the migration runner against a real MySQL.
//! Set DATABASE_TEST_URL or these tests are skipped.

use forum_common::testutil::{mysql_container, test_pool};
use forum_migrate::{run_all, run_migration, Migration, MigrationOutcome, MIGRATIONS};
use sqlx::MySqlPool;

/// The tables the forum server creates before any migration runs.
async fn create_base_schema(pool: &MySqlPool) {
    for ddl in [
        "CREATE TABLE IF NOT EXISTS users (
            id INT AUTO_INCREMENT PRIMARY KEY,
            username VARCHAR(50) NOT NULL UNIQUE,
            email VARCHAR(255) NOT NULL UNIQUE,
            password VARCHAR(255) NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        ) ENGINE=InnoDB",
        "CREATE TABLE IF NOT EXISTS posts (
            id INT AUTO_INCREMENT PRIMARY KEY,
            user_id INT NOT NULL,
            title VARCHAR(255) NOT NULL,
            content TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        ) ENGINE=InnoDB",
        "CREATE TABLE IF NOT EXISTS replies (
            id INT AUTO_INCREMENT PRIMARY KEY,
            post_id INT NOT NULL,
            user_id INT NOT NULL,
            content TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        ) ENGINE=InnoDB",
    ] {
        sqlx::raw_sql(ddl).execute(pool).await.unwrap();
    }
}

async fn column_exists(pool: &MySqlPool, table: &str, column: &str) -> bool {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM information_schema.columns
         WHERE table_schema = DATABASE() AND table_name = ? AND column_name = ?",
    )
    .bind(table)
    .bind(column)
    .fetch_one(pool)
    .await
    .unwrap();
    count > 0
}

fn all() -> Vec<&'static Migration> {
    MIGRATIONS.iter().collect()
}

#[tokio::test]
async fn every_migration_succeeds_twice() {
    let Some(pool) = test_pool().await else {
        return;
    };
    create_base_schema(&pool).await;

    run_all(&pool, &all()).await.expect("first run failed");
    let second = run_all(&pool, &all()).await.expect("second run failed");

    for (name, outcome) in second {
        assert_eq!(outcome, MigrationOutcome::AlreadyApplied, "{name}");
    }
}

#[tokio::test]
async fn migrations_leave_expected_columns() {
    let Some(pool) = test_pool().await else {
        return;
    };
    create_base_schema(&pool).await;
    run_all(&pool, &all()).await.unwrap();

    assert!(column_exists(&pool, "users", "role").await);
    assert!(column_exists(&pool, "users", "email_verified").await);
    assert!(column_exists(&pool, "posts", "view_count").await);
    assert!(column_exists(&pool, "replies", "parent_reply_id").await);
}

#[tokio::test]
async fn non_idempotent_errors_are_fatal() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let missing_table = Migration {
        name: "alter-missing-table",
        description: "test",
        source: forum_migrate::MigrationSource::Inline(
            "ALTER TABLE table_that_does_not_exist ADD COLUMN x INT",
        ),
    };
    let err = run_migration(&pool, &missing_table).await.unwrap_err();
    assert_eq!(err.migration, "alter-missing-table");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn fresh_container_applies_then_skips() {
    let (_container, pool) = mysql_container().await;
    create_base_schema(&pool).await;

    let first = run_all(&pool, &all()).await.unwrap();
    assert!(first.iter().all(|(_, o)| *o == MigrationOutcome::Applied));

    let second = run_all(&pool, &all()).await.unwrap();
    assert!(second.iter().all(|(_, o)| *o == MigrationOutcome::AlreadyApplied));
}
