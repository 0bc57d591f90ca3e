pub mod enrollments;
pub mod professors;
pub mod students;
pub mod subjects;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use sqlx::{Sqlite, SqlitePool, Transaction};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// Opens a pool with foreign keys enforced on every connection.
///
/// An in-memory database lives only as long as its connection, so those
/// pools are pinned to a single connection that never expires.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    if database_url.contains(":memory:") {
        return SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await;
    }

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

/// Starts a transaction that takes the write lock up front. A deferred
/// transaction that reads first cannot be upgraded while another writer
/// holds the lock and fails with `SQLITE_BUSY` instead of waiting.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

#[cfg(test)]
pub(crate) async fn setup_test_db() -> SqlitePool {
    let pool = connect("sqlite::memory:", 1)
        .await
        .expect("Failed to create test db");

    migrate(&pool).await.expect("Failed to run migrations");

    pool
}
