use std::path::Path;

use anyhow::Context;
use log::{debug, warn};
use rusqlite::{params, Connection};

use crate::error::Result;
use crate::model::{Friendship, User, UserId};
use crate::store::{MemoryStore, UserStore};
use crate::validate::{UserValidator, Validator};

const SCHEMA: &str = "
PRAGMA foreign_keys = ON;
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS friendships (
    user1_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    user2_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    PRIMARY KEY (user1_id, user2_id)
);
";

/// Persists users and friendships in a SQLite database.
///
/// Each friendship is one row in `friendships`, stored in whichever direction it was first saved.
/// Deleting a user cascades to its friendships. The database is read fully on open and every
/// change is written to it before being applied in memory, so a failed statement leaves the store
/// as it was.
#[derive(Debug)]
pub struct SqliteStore<V: Validator<User> = UserValidator> {
    conn: Connection,
    users: MemoryStore<V>,
}

impl SqliteStore {
    /// Creates the database and its tables if they do not exist yet.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_validator(path, UserValidator)
    }
}

impl<V: Validator<User>> SqliteStore<V> {
    pub fn open_with_validator<P: AsRef<Path>>(path: P, validator: V) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch(SCHEMA)
            .context("Failed to create database schema")?;
        let mut s = Self {
            conn,
            users: MemoryStore::with_validator(validator),
        };
        s.load()?;
        Ok(s)
    }

    /// Friendships in the order they were saved.
    pub fn friendships(&self) -> Result<Vec<Friendship>> {
        Ok(read_friendships(&self.conn).context("Failed to read friendships")?)
    }

    fn load(&mut self) -> Result<()> {
        for user in read_users(&self.conn).context("Failed to read users")? {
            let id = user.id().clone();
            match self.users.save(user) {
                Ok(None) => {}
                Ok(Some(_)) => warn!("skipping duplicate user '{}'", id),
                Err(err) => warn!("skipping user '{}': {}", id, err),
            }
        }
        for friendship in self.friendships()? {
            if self.users.link(&friendship.user1, &friendship.user2) {
                debug!("loaded friendship {}", friendship);
            } else {
                warn!("skipping invalid or duplicate friendship '{}'", friendship);
            }
        }
        Ok(())
    }
}

impl<V: Validator<User>> UserStore for SqliteStore<V> {
    fn find_by_id(&self, id: &UserId) -> Option<User> {
        self.users.find_by_id(id)
    }

    fn find_all(&self) -> Vec<User> {
        self.users.find_all()
    }

    fn save(&mut self, user: User) -> Result<Option<User>> {
        let record = user.clone();
        if let Some(existing) = self.users.save(user)? {
            return Ok(Some(existing));
        }
        let inserted = self
            .conn
            .execute(
                "INSERT INTO users (id, first_name, last_name) VALUES (?1, ?2, ?3)",
                params![record.id().as_str(), record.first_name, record.last_name],
            )
            .with_context(|| format!("Failed to insert user '{}'", record.id()));
        if let Err(err) = inserted {
            self.users.delete(record.id())?;
            return Err(err.into());
        }
        Ok(None)
    }

    fn delete(&mut self, id: &UserId) -> Result<Option<User>> {
        if !self.users.exists(id) {
            return Ok(None);
        }
        self.conn
            .execute("DELETE FROM users WHERE id = ?1", params![id.as_str()])
            .with_context(|| format!("Failed to delete user '{}'", id))?;
        self.users.delete(id)
    }

    fn update(&mut self, user: User) -> Result<Option<User>> {
        let previous = self.users.find_by_id(user.id());
        let record = user.clone();
        if let Some(unchanged) = self.users.update(user)? {
            return Ok(Some(unchanged));
        }
        let updated = self
            .conn
            .execute(
                "UPDATE users SET first_name = ?1, last_name = ?2 WHERE id = ?3",
                params![record.first_name, record.last_name, record.id().as_str()],
            )
            .with_context(|| format!("Failed to update user '{}'", record.id()));
        if let Err(err) = updated {
            if let Some(previous) = previous {
                self.users.update(previous)?;
            }
            return Err(err.into());
        }
        Ok(None)
    }

    fn save_friendship(&mut self, friendship: &Friendship) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO friendships (user1_id, user2_id)
                 SELECT ?1, ?2 WHERE NOT EXISTS (
                     SELECT 1 FROM friendships
                     WHERE (user1_id = ?1 AND user2_id = ?2) OR (user1_id = ?2 AND user2_id = ?1)
                 )",
                params![friendship.user1.as_str(), friendship.user2.as_str()],
            )
            .with_context(|| format!("Failed to save friendship {}", friendship))?;
        Ok(())
    }

    fn delete_friendship(&mut self, friendship: &Friendship) -> Result<()> {
        self.conn
            .execute(
                "DELETE FROM friendships
                 WHERE (user1_id = ?1 AND user2_id = ?2) OR (user1_id = ?2 AND user2_id = ?1)",
                params![friendship.user1.as_str(), friendship.user2.as_str()],
            )
            .with_context(|| format!("Failed to delete friendship {}", friendship))?;
        Ok(())
    }

    fn exists(&self, id: &UserId) -> bool {
        self.users.exists(id)
    }
}

fn read_users(conn: &Connection) -> rusqlite::Result<Vec<User>> {
    let mut stmt = conn.prepare("SELECT id, first_name, last_name FROM users ORDER BY rowid")?;
    let users = stmt
        .query_map([], |row| {
            Ok(User::new(
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(users)
}

fn read_friendships(conn: &Connection) -> rusqlite::Result<Vec<Friendship>> {
    let mut stmt = conn.prepare("SELECT user1_id, user2_id FROM friendships ORDER BY rowid")?;
    let friendships = stmt
        .query_map([], |row| {
            Ok(Friendship::new(
                UserId::from(row.get::<_, String>(0)?),
                UserId::from(row.get::<_, String>(1)?),
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(friendships)
}
