pub mod migrations;
pub mod queries;

use anyhow::Context;
use rusqlite::Connection;

/// Opens the database and brings it up to date, seeding the catalog on first use.
/// The default `:memory:` database lives and dies with the process.
pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path).with_context(|| format!("failed to open database at {path}"))?;

    let pragmas = if path == ":memory:" {
        "PRAGMA foreign_keys=ON;"
    } else {
        "PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;"
    };
    conn.execute_batch(pragmas)
        .context("failed to set database pragmas")?;

    migrations::run_migrations(&conn)?;
    tracing::debug!(path, "database ready");

    Ok(conn)
}
