use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use socialnet::store::{FileStore, MemoryStore, SqliteStore};
use socialnet::UserStore;

#[derive(Parser, Debug)]
#[command(name = "socialnet", author, version, about)]
pub struct Config {
    /// Where users and friendships are kept.
    #[arg(short, long, value_enum, default_value = "memory")]
    pub store: StoreName,

    /// Users file used by `--store file`. One `id,first_name,last_name` record per line.
    #[arg(long, value_name = "PATH", default_value = "users.txt")]
    pub users: PathBuf,

    /// Friendships file used by `--store file`. One `user1,user2` record per line.
    #[arg(long, value_name = "PATH", default_value = "friendships.txt")]
    pub friendships: PathBuf,

    /// Database used by `--store sqlite`. Created if missing.
    #[arg(long, value_name = "PATH", default_value = "socialnet.db")]
    pub db: PathBuf,

    /// Path to a [socialnet::Seed] in json format, applied on startup.
    ///
    /// Users and friendships that already exist are skipped.
    #[arg(long, value_name = "PATH")]
    pub seed: Option<PathBuf>,

    /// Fill an empty store with twenty-one sample users.
    #[arg(long)]
    pub sample: bool,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum StoreName {
    Memory,
    File,
    Sqlite,
}

impl StoreName {
    pub fn create_impl(&self, config: &Config) -> Result<Box<dyn UserStore>> {
        let store: Box<dyn UserStore> = match self {
            StoreName::Memory => Box::new(MemoryStore::new()),
            StoreName::File => Box::new(
                FileStore::open(&config.users, &config.friendships).with_context(|| {
                    format!(
                        "open file store '{}' / '{}'",
                        config.users.display(),
                        config.friendships.display()
                    )
                })?,
            ),
            StoreName::Sqlite => Box::new(
                SqliteStore::open(&config.db)
                    .with_context(|| format!("open database '{}'", config.db.display()))?,
            ),
        };
        Ok(store)
    }
}
