//! Error types

use thiserror::Error;

/// Errors surfaced by character creation and configuration
#[derive(Debug, Error)]
pub enum RpgError {
    /// Archetype name outside the known class list
    #[error("invalid archetype: {0:?}")]
    InvalidArchetype(String),
    /// Gender tag outside the known set
    #[error("invalid gender: {0:?}")]
    InvalidGender(String),
    /// Character submitted without a gender selection
    #[error("no gender selected")]
    MissingSelection,
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("settings parse error")]
    Settings(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RpgError>;
