//! Configuration for the AI search and 2048 sessions

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Probability that a spawned 2048 tile is a 4 rather than a 2
pub const DEFAULT_FOUR_PROBABILITY: f64 = 0.1;

/// Tile value that marks a 2048 game as won
pub const DEFAULT_WIN_TILE: u32 = 2048;

/// Tiles placed on a fresh 2048 board
pub const DEFAULT_START_TILES: usize = 2;

/// Tic-Tac-Toe search configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Score top-level moves on the rayon pool (needs the `parallel` feature)
    pub parallel: bool,
}

impl SearchConfig {
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// 2048 session configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideConfig {
    /// RNG seed for tile spawns (None = entropy)
    pub seed: Option<u64>,
    /// Tiles placed at start and on restart
    pub start_tiles: usize,
    /// Chance that a spawned tile is a 4
    pub four_probability: f64,
    /// Tile value that sets the `won` flag
    pub win_tile: u32,
}

impl Default for SlideConfig {
    fn default() -> Self {
        Self {
            seed: None,
            start_tiles: DEFAULT_START_TILES,
            four_probability: DEFAULT_FOUR_PROBABILITY,
            win_tile: DEFAULT_WIN_TILE,
        }
    }
}

impl SlideConfig {
    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the tile that counts as a win
    pub fn with_win_tile(mut self, win_tile: u32) -> Self {
        self.win_tile = win_tile;
        self
    }

    pub fn with_start_tiles(mut self, start_tiles: usize) -> Self {
        self.start_tiles = start_tiles;
        self
    }

    /// Load from JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: SlideConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config.check()?;
        Ok(config)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn check(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.four_probability) {
            anyhow::bail!(
                "four_probability must be within [0, 1], got {}",
                self.four_probability
            );
        }
        if self.win_tile < 2 || !self.win_tile.is_power_of_two() {
            anyhow::bail!("win_tile must be a power of two >= 2, got {}", self.win_tile);
        }
        Ok(())
    }
}
