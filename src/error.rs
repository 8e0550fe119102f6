//! Error types for configuration and scene construction
//!
//! Numeric kernels do not return errors: a broken topology or a mis-shaped array
//! inside a timestep is a bug and aborts with an assertion. Everything that can be
//! caught while a scene is being set up is reported through [`PstdError`].

use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, PstdError>;

/// Errors raised while loading settings or assembling a scene
#[derive(Error, Debug)]
pub enum PstdError {
    /// A simulation setting is out of range
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// A domain description is unusable
    #[error("invalid domain '{id}': {reason}")]
    InvalidDomain { id: String, reason: String },

    /// Two domains cover the same grid cells
    #[error("domains '{first}' and '{second}' overlap")]
    OverlappingDomains { first: String, second: String },

    /// A generated PML domain would cover cells of an existing domain
    #[error("PML domain '{pml}' would overlap '{other}': {reason}")]
    PmlCollision {
        pml: String,
        other: String,
        reason: String,
    },

    /// Neighbour links or PML layout violate the kernel preconditions
    #[error("inconsistent topology at domain '{id}': {details}")]
    InconsistentTopology { id: String, details: String },

    /// The configuration file could not be read
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for a scene
    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),
}

impl PstdError {
    pub fn invalid_settings(reason: impl Into<String>) -> Self {
        Self::InvalidSettings(reason.into())
    }

    pub fn invalid_domain(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDomain {
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub fn inconsistent_topology(id: impl Into<String>, details: impl Into<String>) -> Self {
        Self::InconsistentTopology {
            id: id.into(),
            details: details.into(),
        }
    }
}
