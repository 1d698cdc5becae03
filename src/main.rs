mod app;
mod game;
mod grid;
mod input;
mod powerup;
mod snake;
mod term;

use std::fs::File;

use anyhow::{Context, Result};
use log::{LevelFilter, info};
use simplelog::{Config, WriteLogger};

// The screen belongs to the game, so logs go to a file in the temp dir
const LOG_FILE: &str = "snake_arcade.log";

fn main() -> Result<()> {
    init_logging()?;
    info!("Starting snake arcade");

    let mut app = app::App::new()?;
    app.run()?;

    info!("Bye");
    Ok(())
}

fn init_logging() -> Result<()> {
    let path = std::env::temp_dir().join(LOG_FILE);
    let file = File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    let level = if cfg!(debug_assertions) { LevelFilter::Debug } else { LevelFilter::Info };

    WriteLogger::init(level, Config::default(), file).context("Failed to initialize logger")
}
