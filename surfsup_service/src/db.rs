/// Database connection setup.
///
/// Opens the single read session the service uses, applies the statement
/// timeout, and checks that the statically declared tables are present.
/// The schema itself lives in `sql/schema.sql`.

use postgres::{Client, NoTls};
use thiserror::Error;
use tracing::{debug, info};

use crate::logging::DataSource;

/// Tables the service reads from.
pub const REQUIRED_TABLES: &[&str] = &["station", "measurement"];

#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to connect to database: {0}")]
    Connect(#[source] postgres::Error),
    #[error("failed to configure session: {0}")]
    Session(#[source] postgres::Error),
    #[error("missing required tables: {}. Load the dataset with sql/schema.sql first", .0.join(", "))]
    MissingTables(Vec<String>),
}

/// `SET statement_timeout` value for the given number of seconds (0 disables).
pub fn statement_timeout_sql(timeout_secs: u64) -> String {
    format!("SET statement_timeout = {}", timeout_secs * 1000)
}

/// Opens a connection and applies session settings.
///
/// Must be called outside an async runtime; the synchronous client drives
/// its own.
pub fn connect(url: &str, statement_timeout_secs: u64) -> Result<Client, DbError> {
    let mut client = Client::connect(url, NoTls).map_err(DbError::Connect)?;
    client
        .batch_execute(&format!(
            "{}; SET default_transaction_read_only = on",
            statement_timeout_sql(statement_timeout_secs)
        ))
        .map_err(DbError::Session)?;
    debug!(
        source = %DataSource::Database,
        "session configured: statement_timeout={}s, read-only",
        statement_timeout_secs
    );
    Ok(client)
}

/// Returns the tables from `required` that are absent in the `public` schema.
pub fn missing_tables(client: &mut Client, required: &[&str]) -> Result<Vec<String>, DbError> {
    let rows = client
        .query(
            "SELECT table_name::text
             FROM information_schema.tables
             WHERE table_schema = 'public'
               AND table_name::text = ANY($1::text[])",
            &[&required],
        )
        .map_err(DbError::Session)?;
    let present: Vec<String> = rows.iter().map(|row| row.get(0)).collect();

    Ok(required
        .iter()
        .filter(|t| !present.iter().any(|p| p == *t))
        .map(|t| t.to_string())
        .collect())
}

/// Connects and confirms the dataset tables exist.
pub fn connect_and_verify(url: &str, statement_timeout_secs: u64) -> Result<Client, DbError> {
    let mut client = connect(url, statement_timeout_secs)?;
    let missing = missing_tables(&mut client, REQUIRED_TABLES)?;
    if !missing.is_empty() {
        return Err(DbError::MissingTables(missing));
    }
    info!(source = %DataSource::Database, "connected; tables verified: {}", REQUIRED_TABLES.join(", "));
    Ok(client)
}
