//! SQLite database module

pub mod models;
mod migrations;
mod user;
mod industry;
mod history;

use crate::diagnosis::{BenchmarkRow, DiagnosisResult};
use crate::error::Result;
use crate::security::SecurityManager;
use models::*;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;

/// SQLite database wrapper
pub struct SqliteDb {
    conn: Mutex<Connection>,
}

impl SqliteDb {
    /// Open (or create) the database file and run migrations
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL for concurrent readers while a request writes history
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        Self::from_connection(conn)
    }

    /// In-memory database, used by tests
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock();
        migrations::run_migrations(&conn)
    }

    // ========== Admin User Methods ==========

    /// Verify admin credentials
    ///
    /// The row is read under the connection lock; Argon2 runs after it is released.
    pub fn verify_user(
        &self,
        username: &str,
        password: &str,
        security: &SecurityManager,
    ) -> Result<Option<AdminUser>> {
        let credentials = {
            let conn = self.conn.lock();
            user::get_credentials(&conn, username)?
        };

        match credentials {
            Some((admin, password_hash)) if security.verify_password(password, &password_hash)? => {
                Ok(Some(admin))
            }
            _ => Ok(None),
        }
    }

    /// Create the first admin; `None` when one already exists
    ///
    /// Hashes before taking the lock, then checks and inserts in one statement.
    pub fn create_first_user(
        &self,
        username: &str,
        password: &str,
        security: &SecurityManager,
    ) -> Result<Option<AdminUser>> {
        let password_hash = security.hash_password(password)?;
        let conn = self.conn.lock();
        user::create_first_user(&conn, username, &password_hash)
    }

    /// Check if any admin exists
    pub fn has_user(&self) -> Result<bool> {
        let conn = self.conn.lock();
        user::has_user(&conn)
    }

    // ========== Industry / Benchmark Methods ==========

    pub fn list_industries(&self) -> Result<Vec<Industry>> {
        let conn = self.conn.lock();
        industry::list_industries(&conn)
    }

    pub fn get_industry_name(&self, code: &str) -> Result<Option<String>> {
        let conn = self.conn.lock();
        industry::get_industry_name(&conn, code)
    }

    pub fn upsert_industries(&self, industries: &[Industry]) -> Result<usize> {
        let mut conn = self.conn.lock();
        industry::upsert_industries(&mut conn, industries)
    }

    /// Valid benchmark for (industry, year, firm size), at most one
    pub fn find_benchmark(
        &self,
        industry_code: &str,
        year: i32,
        firm_size_type: &str,
    ) -> Result<Option<BenchmarkRow>> {
        let conn = self.conn.lock();
        industry::find_benchmark(&conn, industry_code, year, firm_size_type)
    }

    pub fn list_benchmark_keys(&self, industry_code: &str) -> Result<Vec<BenchmarkKey>> {
        let conn = self.conn.lock();
        industry::list_benchmark_keys(&conn, industry_code)
    }

    pub fn upsert_benchmarks(&self, rows: &[BenchmarkRow]) -> Result<usize> {
        let mut conn = self.conn.lock();
        industry::upsert_benchmarks(&mut conn, rows)
    }

    // ========== History Methods ==========

    /// Persist a diagnosis, returns the history id
    pub fn insert_diagnosis(&self, industry_code: &str, result: &DiagnosisResult) -> Result<i64> {
        let conn = self.conn.lock();
        history::insert_diagnosis(&conn, industry_code, result)
    }

    pub fn list_history(
        &self,
        filter: &HistoryFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<HistorySummary>> {
        let conn = self.conn.lock();
        history::list_history(&conn, filter, limit, offset)
    }

    pub fn count_history(&self, filter: &HistoryFilter) -> Result<i64> {
        let conn = self.conn.lock();
        history::count_history(&conn, filter)
    }

    pub fn get_history(&self, id: i64) -> Result<Option<HistoryRecord>> {
        let conn = self.conn.lock();
        history::get_history(&conn, id)
    }

    pub fn delete_history(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock();
        history::delete_history(&conn, id)
    }

    pub fn history_stats(&self) -> Result<HistoryStats> {
        let conn = self.conn.lock();
        history::history_stats(&conn)
    }
}
