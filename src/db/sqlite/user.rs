//! Admin user management
//!
//! Only row access lives here. Password hashing and verification run in
//! `SqliteDb` outside the connection lock.

use crate::db::sqlite::models::AdminUser;
use crate::error::Result;
use rusqlite::{Connection, OptionalExtension};

/// Stored admin row together with its PHC password hash
pub fn get_credentials(conn: &Connection, username: &str) -> Result<Option<(AdminUser, String)>> {
    let row = conn
        .query_row(
            "SELECT id, username, password_hash, created_at FROM admin_users WHERE username = ?",
            [username],
            |row| {
                Ok((
                    AdminUser {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        created_at: row.get(3)?,
                    },
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;

    Ok(row)
}

/// Insert the first admin; `None` when an admin already exists
///
/// The emptiness check and the insert are one statement.
pub fn create_first_user(
    conn: &Connection,
    username: &str,
    password_hash: &str,
) -> Result<Option<AdminUser>> {
    let inserted = conn.execute(
        "INSERT INTO admin_users (username, password_hash)
         SELECT ?1, ?2
         WHERE NOT EXISTS (SELECT 1 FROM admin_users)",
        rusqlite::params![username, password_hash],
    )?;

    if inserted == 0 {
        return Ok(None);
    }

    let id = conn.last_insert_rowid();
    let created_at: String = conn.query_row(
        "SELECT created_at FROM admin_users WHERE id = ?",
        [id],
        |row| row.get(0),
    )?;

    Ok(Some(AdminUser {
        id,
        username: username.to_string(),
        created_at,
    }))
}

/// Check if any admin exists
pub fn has_user(conn: &Connection) -> Result<bool> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM admin_users", [], |row| row.get(0))?;
    Ok(count > 0)
}
