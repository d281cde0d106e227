//! SQLite database migrations

use crate::error::Result;
use rusqlite::Connection;

/// Run all database migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    // Create migrations table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    run_migration(conn, "001_admin_users", CREATE_ADMIN_USERS_TABLE)?;
    run_migration(conn, "002_industries", CREATE_INDUSTRIES_TABLE)?;
    run_migration(conn, "003_industry_benchmarks", CREATE_INDUSTRY_BENCHMARKS_TABLE)?;
    run_migration(conn, "004_diagnosis_history", CREATE_DIAGNOSIS_HISTORY_TABLE)?;

    tracing::info!("Database migrations completed");
    Ok(())
}

fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM migrations WHERE name = ?)",
        [name],
        |row| row.get(0),
    )?;

    if !exists {
        tracing::info!("Running migration: {}", name);
        conn.execute_batch(sql)?;
        conn.execute("INSERT INTO migrations (name) VALUES (?)", [name])?;
    }

    Ok(())
}

const CREATE_ADMIN_USERS_TABLE: &str = r#"
CREATE TABLE admin_users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

const CREATE_INDUSTRIES_TABLE: &str = r#"
CREATE TABLE industries (
    code TEXT PRIMARY KEY,
    name TEXT NOT NULL
);
"#;

/// One row per (industry, year, firm size); ratio columns mirror the ratio ids
const CREATE_INDUSTRY_BENCHMARKS_TABLE: &str = r#"
CREATE TABLE industry_benchmarks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    industry_code TEXT NOT NULL,
    year INTEGER NOT NULL,
    firm_size_type TEXT NOT NULL,
    current_ratio REAL,
    quick_ratio REAL,
    debt_ratio REAL,
    equity_ratio REAL,
    interest_coverage REAL,
    operating_margin REAL,
    net_margin REAL,
    roa REAL,
    roe REAL,
    asset_turnover REAL,
    inventory_turnover REAL,
    receivable_turnover REAL,
    valid TEXT NOT NULL DEFAULT 'Y' CHECK (valid IN ('Y', 'N')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(industry_code, year, firm_size_type)
);
CREATE INDEX IF NOT EXISTS idx_benchmarks_industry ON industry_benchmarks(industry_code);
"#;

const CREATE_DIAGNOSIS_HISTORY_TABLE: &str = r#"
CREATE TABLE diagnosis_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    company_name TEXT NOT NULL,
    industry_code TEXT NOT NULL,
    industry_name TEXT NOT NULL,
    year INTEGER NOT NULL,
    firm_size_type TEXT NOT NULL,
    risk_level TEXT NOT NULL,
    result_json TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);
CREATE INDEX IF NOT EXISTS idx_history_created ON diagnosis_history(created_at);
CREATE INDEX IF NOT EXISTS idx_history_risk ON diagnosis_history(risk_level);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let applied: i64 = conn
            .query_row("SELECT COUNT(*) FROM migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(applied, 4);
    }
}
