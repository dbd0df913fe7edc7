#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Persistence port for the city pulse dashboard.
//!
//! Snapshot and prediction-log writes go through the [`DataStore`] trait,
//! which has two implementations selected once at startup: [`PostgresStore`]
//! when a database connection can be established, and the in-memory
//! [`MemoryStore`] otherwise. All writes from the request path are detached
//! through [`DetachedWriter`], so a slow or failing database never blocks an
//! HTTP response.

mod memory;
mod postgres;
mod store;
mod writer;

use include_dir::{Dir, include_dir};
use switchy_database::Database;
use switchy_schema::discovery::embedded::EmbeddedMigrationSource;
use switchy_schema::runner::MigrationRunner;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use store::DataStore;
pub use writer::DetachedWriter;

/// Embedded SQL migrations from the `migrations/` directory.
static MIGRATIONS_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/../../migrations");

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] switchy_schema::MigrationError),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Connects to the database at `url` and applies pending migrations.
///
/// Query parameters (e.g. `?sslmode=require`) are stripped before parsing;
/// TLS is handled by the native-tls connector automatically.
///
/// # Errors
///
/// Returns an error if the URL cannot be parsed, the connection fails, or a
/// migration fails to apply.
pub async fn connect(url: &str) -> Result<Box<dyn Database>, Box<dyn std::error::Error>> {
    let url_base = url.split('?').next().unwrap_or(url);

    let creds = switchy_database_connection::Credentials::from_url(url_base)?;
    let db = switchy_database_connection::init_postgres_raw_native_tls(creds).await?;

    // Stalled queries should fail instead of hanging indefinitely.
    db.exec_raw("SET statement_timeout = '30s'").await?;

    run_migrations(db.as_ref()).await?;

    Ok(db)
}

/// Runs all pending database migrations.
///
/// # Errors
///
/// Returns [`DbError`] if any migration fails to apply.
pub async fn run_migrations(db: &dyn Database) -> Result<(), DbError> {
    let source = EmbeddedMigrationSource::new(&MIGRATIONS_DIR);
    let runner = MigrationRunner::new(Box::new(source));
    runner.run(db).await?;
    log::info!("Database migrations completed successfully");
    Ok(())
}
