use std::fs::File;
use std::io::{self, BufReader};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use socialnet::{Seed, SocialNetwork};

use crate::config::Config;
use crate::menu::Menu;

mod config;
mod menu;

fn main() -> Result<()> {
    env_logger::init();
    let config = Config::parse();
    let store = config.store.create_impl(&config)?;
    let mut network = SocialNetwork::new(store);
    if config.sample && network.all_users().is_empty() {
        let applied = Seed::sample().apply(&mut network).context("apply sample")?;
        info!("Sample added {} users", applied.users);
    }
    if let Some(seed) = seed(&config)? {
        let applied = seed.apply(&mut network).context("apply seed")?;
        info!(
            "Seed added {} users and {} friendships",
            applied.users, applied.friendships
        );
    }
    let stdin = io::stdin();
    let stdout = io::stdout();
    Menu::new(stdin.lock(), stdout.lock()).run(&mut network)
}

fn seed(config: &Config) -> Result<Option<Seed>> {
    match &config.seed {
        None => Ok(None),
        Some(path) => {
            let file = File::open(path).context("read seed")?;
            let reader = BufReader::new(file);
            Ok(Some(serde_json::from_reader(reader)?))
        }
    }
}
