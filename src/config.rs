/// Tunable constants, loadable from a TOML file.
///
/// Every field has a default so a partial file (or no file at all) works.
/// Example `flappy_gesture.toml`:
///
/// ```toml
/// [physics]
/// gravity = 0.5
/// max_fall_speed = 8.0
///
/// [obstacles]
/// spawn_interval_ms = 1500
/// ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{GameError, Result};

/// Env var naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "FLAPPY_GESTURE_CONFIG";
/// Looked up in the working directory when the env var is unset.
pub const DEFAULT_CONFIG_FILE: &str = "flappy_gesture.toml";

// ── Sections ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Velocity added per tick while flying (units/tick²).
    pub gravity: f32,
    /// Downward velocity cap (units/tick).
    pub max_fall_speed: f32,
    /// Velocity set by a flap; negative is upward.
    pub flap_impulse: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            max_fall_speed: 8.0,
            flap_impulse: -10.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AvatarConfig {
    /// Horizontal centre of the bird, in playfield units.
    pub start_x: f32,
    /// Bird size relative to the playfield.
    pub width_fraction: f32,
    pub height_fraction: f32,
    /// Number of wing-flap animation frames.
    pub frame_count: usize,
    /// The frame advances once the tick counter exceeds this.
    pub flap_cooldown: u32,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            start_x: 100.0,
            width_fraction: 0.1,
            height_fraction: 0.1,
            frame_count: 3,
            flap_cooldown: 5,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ObstacleConfig {
    /// Leftward movement per tick.
    pub scroll_speed: f32,
    pub spawn_interval_ms: u64,
    pub radius: f32,
    /// Vertical spawn band, as fractions of play height.
    pub spawn_min_fraction: f32,
    pub spawn_max_fraction: f32,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            scroll_speed: 4.0,
            spawn_interval_ms: 1500,
            radius: 25.0,
            spawn_min_fraction: 0.1,
            spawn_max_fraction: 0.8,
        }
    }
}

impl ObstacleConfig {
    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Ground line as a fraction of play height.
    pub ground_fraction: f32,
    /// Ground scroll offset resets once its magnitude exceeds this.
    pub scroll_wrap: f32,
    pub tick_rate_hz: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            ground_fraction: 0.9,
            scroll_wrap: 35.0,
            tick_rate_hz: 60,
        }
    }
}

/// Playfield units covered by one terminal cell.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerminalConfig {
    pub cell_width: f32,
    pub cell_height: f32,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            cell_width: 10.0,
            cell_height: 20.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GestureConfig {
    /// A held key stays "closed" this long after its last press/repeat.
    pub hold_window_ms: u64,
    /// Fingertip distance below which the hand counts as closed.
    pub closed_hand_threshold: f32,
    /// File or FIFO an external hand tracker writes landmark frames to, one
    /// frame per line.  Unset means the keyboard/mouse stand-in is used.
    pub landmark_feed: Option<PathBuf>,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            hold_window_ms: 130,
            closed_hand_threshold: 100.0,
            landmark_feed: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub file: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("flappy_gesture.log"),
        }
    }
}

// ── Root ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub avatar: AvatarConfig,
    pub obstacles: ObstacleConfig,
    pub world: WorldConfig,
    pub terminal: TerminalConfig,
    pub gesture: GestureConfig,
    pub log: LogConfig,
}

impl GameConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Resolve the config file from the environment, falling back to defaults
    /// when no file is present.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::from_file(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::from_file(local);
        }
        Ok(Self::default())
    }

    pub fn hold_window(&self) -> Duration {
        Duration::from_millis(self.gesture.hold_window_ms)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("physics.gravity", self.physics.gravity),
            ("physics.max_fall_speed", self.physics.max_fall_speed),
            ("avatar.width_fraction", self.avatar.width_fraction),
            ("avatar.height_fraction", self.avatar.height_fraction),
            ("obstacles.scroll_speed", self.obstacles.scroll_speed),
            ("obstacles.radius", self.obstacles.radius),
            ("world.ground_fraction", self.world.ground_fraction),
            ("world.scroll_wrap", self.world.scroll_wrap),
            ("terminal.cell_width", self.terminal.cell_width),
            ("terminal.cell_height", self.terminal.cell_height),
            ("gesture.closed_hand_threshold", self.gesture.closed_hand_threshold),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(GameError::Config(format!("{name} must be positive, got {value}")));
            }
        }
        if !self.physics.flap_impulse.is_finite() {
            return Err(GameError::Config("physics.flap_impulse must be finite".into()));
        }
        if self.avatar.frame_count == 0 {
            return Err(GameError::Config("avatar.frame_count must be at least 1".into()));
        }
        if self.world.tick_rate_hz == 0 {
            return Err(GameError::Config("world.tick_rate_hz must be positive".into()));
        }
        if self.world.ground_fraction > 1.0 {
            return Err(GameError::Config("world.ground_fraction must be <= 1".into()));
        }
        let (lo, hi) = (self.obstacles.spawn_min_fraction, self.obstacles.spawn_max_fraction);
        if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) || lo > hi {
            return Err(GameError::Config(format!(
                "obstacle spawn band [{lo}, {hi}] must lie within [0, 1] and be ordered"
            )));
        }
        Ok(())
    }
}
