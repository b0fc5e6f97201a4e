use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use itertools::Itertools;
use log::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{Friendship, User, UserId};
use crate::store::{MemoryStore, UserStore};
use crate::validate::{UserValidator, Validator};

const DELIMITER: char = ',';

/// Persists users and friendships as delimited text.
///
/// The users file holds one `id,first_name,last_name` record per line, the friendships file one
/// `user1,user2` record per line. Both are read fully on open and rewritten whenever they change.
/// Neighbor sets are never written to the users file; they are rebuilt from the friendships file
/// on open.
#[derive(Debug)]
pub struct FileStore<V: Validator<User> = UserValidator> {
    users_path: PathBuf,
    friendships_path: PathBuf,
    users: MemoryStore<V>,
    friendships: Vec<Friendship>,
}

impl FileStore {
    /// Missing files are treated as empty and created on the first write.
    pub fn open<P: Into<PathBuf>>(users_path: P, friendships_path: P) -> Result<Self> {
        Self::open_with_validator(users_path, friendships_path, UserValidator)
    }
}

impl<V: Validator<User>> FileStore<V> {
    pub fn open_with_validator<P: Into<PathBuf>>(
        users_path: P,
        friendships_path: P,
        validator: V,
    ) -> Result<Self> {
        let mut s = Self {
            users_path: users_path.into(),
            friendships_path: friendships_path.into(),
            users: MemoryStore::with_validator(validator),
            friendships: vec![],
        };
        s.load()?;
        Ok(s)
    }

    pub fn friendships(&self) -> &[Friendship] {
        &self.friendships
    }

    fn load(&mut self) -> Result<()> {
        for (line, fields) in read_records(&self.users_path, 3)? {
            let user = User::new(fields[0].as_str(), &fields[1], &fields[2]);
            let id = user.id().clone();
            match self.users.save(user) {
                Ok(None) => {}
                Ok(Some(_)) => warn!(
                    "{}:{}: skipping duplicate user '{}'",
                    self.users_path.display(),
                    line,
                    id
                ),
                Err(err) => warn!(
                    "{}:{}: skipping user '{}': {}",
                    self.users_path.display(),
                    line,
                    id,
                    err
                ),
            }
        }

        for (line, fields) in read_records(&self.friendships_path, 2)? {
            let friendship = Friendship::new(
                UserId::from(fields[0].as_str()),
                UserId::from(fields[1].as_str()),
            );
            if !self.users.link(&friendship.user1, &friendship.user2) {
                warn!(
                    "{}:{}: skipping unknown, self or duplicate friendship '{}'",
                    self.friendships_path.display(),
                    line,
                    friendship
                );
                continue;
            }
            debug!("loaded friendship {}", friendship);
            self.friendships.push(friendship);
        }
        Ok(())
    }

    fn write_users(&self) -> Result<()> {
        write_file(&self.users_path, &encode_users(&self.users.find_all()))
    }

    fn write_friendships(&self, friendships: &[Friendship]) -> Result<()> {
        write_file(&self.friendships_path, &encode_friendships(friendships))
    }
}

/// Every change reaches disk before it is kept in memory. A failed write leaves the store exactly
/// as it was before the call.
impl<V: Validator<User>> UserStore for FileStore<V> {
    fn find_by_id(&self, id: &UserId) -> Option<User> {
        self.users.find_by_id(id)
    }

    fn find_all(&self) -> Vec<User> {
        self.users.find_all()
    }

    fn save(&mut self, user: User) -> Result<Option<User>> {
        check_encodable(&user)?;
        let id = user.id().clone();
        if let Some(existing) = self.users.save(user)? {
            return Ok(Some(existing));
        }
        if let Err(err) = self.write_users() {
            self.users.delete(&id)?;
            return Err(err);
        }
        Ok(None)
    }

    fn delete(&mut self, id: &UserId) -> Result<Option<User>> {
        let Some(removed) = self.users.find_by_id(id) else {
            return Ok(None);
        };
        let remaining = self
            .users
            .find_all()
            .into_iter()
            .filter(|user| user.id() != id)
            .collect_vec();
        write_file(&self.users_path, &encode_users(&remaining))?;

        let friendships = self
            .friendships
            .iter()
            .filter(|f| !f.involves(id))
            .cloned()
            .collect_vec();
        if friendships.len() != self.friendships.len() {
            if let Err(err) = self.write_friendships(&friendships) {
                if let Err(restore) = self.write_users() {
                    warn!("failed to restore {}: {}", self.users_path.display(), restore);
                }
                return Err(err);
            }
            self.friendships = friendships;
        }
        self.users.delete(id)?;
        Ok(Some(removed))
    }

    fn update(&mut self, user: User) -> Result<Option<User>> {
        check_encodable(&user)?;
        let previous = self.users.find_by_id(user.id());
        if let Some(unchanged) = self.users.update(user)? {
            return Ok(Some(unchanged));
        }
        if let Err(err) = self.write_users() {
            if let Some(previous) = previous {
                self.users.update(previous)?;
            }
            return Err(err);
        }
        Ok(None)
    }

    fn save_friendship(&mut self, friendship: &Friendship) -> Result<()> {
        if self
            .friendships
            .iter()
            .any(|f| f.connects(&friendship.user1, &friendship.user2))
        {
            return Ok(());
        }
        let mut friendships = self.friendships.clone();
        friendships.push(friendship.clone());
        self.write_friendships(&friendships)?;
        self.friendships = friendships;
        Ok(())
    }

    fn delete_friendship(&mut self, friendship: &Friendship) -> Result<()> {
        let friendships = self
            .friendships
            .iter()
            .filter(|f| !f.connects(&friendship.user1, &friendship.user2))
            .cloned()
            .collect_vec();
        if friendships.len() == self.friendships.len() {
            return Ok(());
        }
        self.write_friendships(&friendships)?;
        self.friendships = friendships;
        Ok(())
    }

    fn exists(&self, id: &UserId) -> bool {
        self.users.exists(id)
    }
}

fn encode_users(users: &[User]) -> String {
    users
        .iter()
        .map(|user| {
            format!(
                "{}{DELIMITER}{}{DELIMITER}{}\n",
                user.id(),
                user.first_name,
                user.last_name
            )
        })
        .join("")
}

fn encode_friendships(friendships: &[Friendship]) -> String {
    friendships
        .iter()
        .map(|f| format!("{}{DELIMITER}{}\n", f.user1, f.user2))
        .join("")
}

/// Reads `path` as delimited records, returning each with its 1-based line number. Blank lines
/// are ignored; records with the wrong number of fields are skipped.
fn read_records(path: &Path, field_count: usize) -> Result<Vec<(usize, Vec<String>)>> {
    if !path.exists() {
        debug!("{} does not exist, starting empty", path.display());
        return Ok(vec![]);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file to string: {}", path.display()))?;
    let mut records = vec![];
    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields = line.split(DELIMITER).map(str::to_string).collect_vec();
        if fields.len() != field_count {
            warn!(
                "{}:{}: expected {} fields, found {}",
                path.display(),
                i + 1,
                field_count,
                fields.len()
            );
            continue;
        }
        records.push((i + 1, fields));
    }
    Ok(records)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    fs::write(path, content)
        .with_context(|| format!("Failed to write file: {}", path.display()))?;
    Ok(())
}

fn check_encodable(user: &User) -> Result<()> {
    let fields = [user.id().as_str(), &user.first_name, &user.last_name];
    if fields
        .iter()
        .any(|field| field.contains(|c| c == DELIMITER || c == '\n' || c == '\r'))
    {
        return Err(Error::ValidationFailed(format!(
            "Fields cannot contain '{}' or line breaks.",
            DELIMITER
        )));
    }
    Ok(())
}
