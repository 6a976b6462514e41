/// Error types for startup and configuration.
///
/// The per-tick simulation never fails; everything here happens before the
/// first frame or while tearing the terminal down.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GameError>;

#[derive(Error, Debug)]
pub enum GameError {
    /// Playfield must have finite, strictly positive dimensions.
    #[error("invalid playfield {width}x{height}: dimensions must be positive")]
    InvalidPlayfield { width: f32, height: f32 },

    /// A config value is out of range.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("logger error: {0}")]
    Logger(String),
}
