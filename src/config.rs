//! # Arena Configuration
//!
//! Settings shared by the binaries. Values come from an optional JSON file;
//! any field the file leaves out takes its default, and command-line flags
//! override the result.
//!
//! ```json
//! { "seed": 7, "bot_delay_ms": 800, "pong": { "ball_speed": 6.0, "win_score": 3 } }
//! ```

use crate::game_wrapper::GameSetup;
use crate::games::pong::{PongConfig, BALL_SPEED_MAX, BALL_SPEED_MIN};
use crate::ArenaError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Pause before the bot answers a human move.
pub const DEFAULT_BOT_DELAY_MS: u64 = 1200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArenaConfig {
    /// Seed for the game and bot generators. `None` picks one at startup.
    pub seed: Option<u64>,
    pub bot_delay_ms: u64,
    /// Let the bots play both seats.
    pub autoplay: bool,
    /// Directory for snapshot files. `None` keeps snapshots in memory only.
    pub snapshot_dir: Option<PathBuf>,
    pub pong: PongConfig,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            seed: None,
            bot_delay_ms: DEFAULT_BOT_DELAY_MS,
            autoplay: false,
            snapshot_dir: None,
            pong: PongConfig::default(),
        }
    }
}

impl ArenaConfig {
    /// Reads a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArenaError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| ArenaError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ArenaError> {
        let config: Self = serde_json::from_str(text).map_err(|e| ArenaError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the engines would silently clamp.
    pub fn validate(&self) -> Result<(), ArenaError> {
        let speed = self.pong.ball_speed;
        if !(BALL_SPEED_MIN..=BALL_SPEED_MAX).contains(&speed) {
            return Err(ArenaError::Config(format!(
                "pong.ball_speed {} must be within {}..={}",
                speed, BALL_SPEED_MIN, BALL_SPEED_MAX
            )));
        }
        if self.pong.win_score == 0 {
            return Err(ArenaError::Config("pong.win_score must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn bot_delay(&self) -> Duration {
        Duration::from_millis(self.bot_delay_ms)
    }

    pub fn setup(&self, seed: u64) -> GameSetup {
        GameSetup { seed, pong: self.pong }
    }
}
