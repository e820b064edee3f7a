//! User account store
//!
//! SQLite-backed `users` table: registration, credential checks and account
//! edits. Passwords are stored as salted SHA-256 digests.

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

const USERS_SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    salt TEXT NOT NULL,
    password TEXT NOT NULL
)";

/// User store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Account storage shared by all signaling connections
pub struct UserStore {
    conn: Mutex<Connection>,
}

impl UserStore {
    /// Open (or create) the store at the given path
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(USERS_SCHEMA_SQL)?;

        tracing::info!("User store opened at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(USERS_SCHEMA_SQL)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an account; fails if the name is taken
    pub fn register(&self, username: &str, password: &str) -> StoreResult<()> {
        validate(username, password)?;

        let salt = Uuid::new_v4().simple().to_string();
        let digest = hash_password(&salt, password);

        let conn = self.conn.lock();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO users(username, salt, password) VALUES (?1, ?2, ?3)",
            params![username, salt, digest],
        )?;

        if inserted == 0 {
            return Err(StoreError::UsernameTaken(username.to_string()));
        }

        tracing::debug!("Registered user '{}'", username);
        Ok(())
    }

    /// Check a username/password pair
    pub fn login(&self, username: &str, password: &str) -> StoreResult<bool> {
        let conn = self.conn.lock();
        verify(&conn, username, password)
    }

    /// Replace the password after checking the current one
    pub fn change_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> StoreResult<()> {
        validate(username, new_password)?;

        let conn = self.conn.lock();
        if !verify(&conn, username, old_password)? {
            return Err(StoreError::InvalidCredentials);
        }

        let salt = Uuid::new_v4().simple().to_string();
        let digest = hash_password(&salt, new_password);
        conn.execute(
            "UPDATE users SET salt = ?1, password = ?2 WHERE username = ?3",
            params![salt, digest, username],
        )?;

        tracing::debug!("Changed password for '{}'", username);
        Ok(())
    }

    /// Rename an account after checking its password
    pub fn change_username(
        &self,
        current_name: &str,
        password: &str,
        new_name: &str,
    ) -> StoreResult<()> {
        validate(new_name, password)?;

        let conn = self.conn.lock();
        if !verify(&conn, current_name, password)? {
            return Err(StoreError::InvalidCredentials);
        }

        let updated = conn.execute(
            "UPDATE OR IGNORE users SET username = ?1 WHERE username = ?2",
            params![new_name, current_name],
        )?;
        if updated == 0 {
            return Err(StoreError::UsernameTaken(new_name.to_string()));
        }

        tracing::debug!("Renamed user '{}' to '{}'", current_name, new_name);
        Ok(())
    }
}

fn validate(username: &str, password: &str) -> StoreResult<()> {
    if username.trim().is_empty() {
        return Err(StoreError::InvalidInput("username is empty".to_string()));
    }
    if password.is_empty() {
        return Err(StoreError::InvalidInput("password is empty".to_string()));
    }
    Ok(())
}

fn verify(conn: &Connection, username: &str, password: &str) -> StoreResult<bool> {
    let row: Option<(String, String)> = conn
        .query_row(
            "SELECT salt, password FROM users WHERE username = ?1",
            params![username],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    Ok(match row {
        Some((salt, digest)) => hash_password(&salt, password) == digest,
        None => false,
    })
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_login() {
        let store = UserStore::open_in_memory().unwrap();
        store.register("alice", "hunter2").unwrap();

        assert!(store.login("alice", "hunter2").unwrap());
        assert!(!store.login("alice", "wrong").unwrap());
        assert!(!store.login("bob", "hunter2").unwrap());
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let store = UserStore::open_in_memory().unwrap();
        store.register("alice", "one").unwrap();

        let err = store.register("alice", "two").unwrap_err();
        assert!(matches!(err, StoreError::UsernameTaken(name) if name == "alice"));
        assert!(store.login("alice", "one").unwrap());
    }

    #[test]
    fn test_empty_fields_rejected() {
        let store = UserStore::open_in_memory().unwrap();
        assert!(matches!(store.register(" ", "pw"), Err(StoreError::InvalidInput(_))));
        assert!(matches!(store.register("alice", ""), Err(StoreError::InvalidInput(_))));
    }

    #[test]
    fn test_change_password() {
        let store = UserStore::open_in_memory().unwrap();
        store.register("alice", "old").unwrap();

        assert!(matches!(
            store.change_password("alice", "bad", "new"),
            Err(StoreError::InvalidCredentials)
        ));
        store.change_password("alice", "old", "new").unwrap();

        assert!(!store.login("alice", "old").unwrap());
        assert!(store.login("alice", "new").unwrap());
    }

    #[test]
    fn test_change_username() {
        let store = UserStore::open_in_memory().unwrap();
        store.register("alice", "pw").unwrap();
        store.register("bob", "pw").unwrap();

        assert!(matches!(
            store.change_username("alice", "pw", "bob"),
            Err(StoreError::UsernameTaken(_))
        ));
        store.change_username("alice", "pw", "carol").unwrap();

        assert!(store.login("carol", "pw").unwrap());
        assert!(!store.login("alice", "pw").unwrap());
    }

    #[test]
    fn test_passwords_not_stored_in_clear() {
        let store = UserStore::open_in_memory().unwrap();
        store.register("alice", "hunter2").unwrap();

        let stored: String = store
            .conn
            .lock()
            .query_row("SELECT password FROM users WHERE username = 'alice'", [], |row| row.get(0))
            .unwrap();
        assert_ne!(stored, "hunter2");
        assert_eq!(stored.len(), 64);
    }
}
