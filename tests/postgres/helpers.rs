//! Shared test helpers for `PostgreSQL` integration tests.

use cabinet::task::adapters::postgres::{PostgresTaskRepository, TaskPgPool};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use std::sync::atomic::{AtomicU32, Ordering};

/// Environment variable naming the test database.
pub const DATABASE_URL_ENV: &str = "CABINET_TEST_DATABASE_URL";

static SCHEMA_COUNTER: AtomicU32 = AtomicU32::new(0);

/// A per-test schema, dropped when the guard goes out of scope.
pub struct TestSchema {
    url: String,
    name: String,
}

impl Drop for TestSchema {
    fn drop(&mut self) {
        if let Ok(mut connection) = PgConnection::establish(&self.url) {
            let statement = format!("DROP SCHEMA IF EXISTS {} CASCADE", self.name);
            let _ignored = connection.batch_execute(&statement);
        }
    }
}

#[derive(Debug)]
struct SearchPath(String);

impl CustomizeConnection<PgConnection, diesel::r2d2::Error> for SearchPath {
    fn on_acquire(&self, connection: &mut PgConnection) -> Result<(), diesel::r2d2::Error> {
        connection
            .batch_execute(&format!("SET search_path TO {}", self.0))
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Returns the test database URL, if configured.
#[must_use]
pub fn database_url() -> Option<String> {
    std::env::var(DATABASE_URL_ENV)
        .ok()
        .filter(|url| !url.trim().is_empty())
}

/// Creates a fresh schema, applies the task table and returns a repository
/// bound to it.
///
/// # Errors
///
/// Returns an error when the database is unreachable or the schema cannot
/// be created.
pub async fn setup_repository(
    url: &str,
) -> Result<(TestSchema, PostgresTaskRepository), eyre::Report> {
    let name = format!(
        "cabinet_test_{}_{}",
        std::process::id(),
        SCHEMA_COUNTER.fetch_add(1, Ordering::SeqCst)
    );
    let mut admin = PgConnection::establish(url)?;
    admin.batch_execute(&format!("CREATE SCHEMA {name}"))?;
    let schema = TestSchema {
        url: url.to_owned(),
        name: name.clone(),
    };

    let manager = ConnectionManager::<PgConnection>::new(url);
    let pool: TaskPgPool = Pool::builder()
        .max_size(2)
        .connection_customizer(Box::new(SearchPath(name)))
        .build(manager)?;
    let repository = PostgresTaskRepository::new(pool);
    repository.ensure_schema().await?;
    Ok((schema, repository))
}
