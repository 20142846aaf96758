use crate::errors::StoreError;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Opens a SQLite connection and brings its schema up to date.
///
/// `database_url` is a file path or `:memory:`.
pub fn establish_connection(database_url: &str) -> Result<SqliteConnection, StoreError> {
    let mut connection = SqliteConnection::establish(database_url)?;
    debug!(database_url = %database_url, "Connected to database");

    run_migrations(&mut connection)?;
    Ok(connection)
}

pub fn run_migrations(connection: &mut SqliteConnection) -> Result<(), StoreError> {
    let applied = connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| StoreError::Migration(err.to_string()))?;

    if !applied.is_empty() {
        info!(count = applied.len(), "Applied pending migrations");
    }

    Ok(())
}
