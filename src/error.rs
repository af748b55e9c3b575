//! Error types for track creation.
//!
//! Errors fall into two classes. Recoverable errors describe a single record
//! (a collection, a vertex or a trajectory) that cannot be used; the caller
//! logs them and moves on to the next record. Fatal errors describe a
//! run-level problem (inconsistent geometry, a downstream engine refusing
//! calls, unreadable configuration) and are propagated.

use thiserror::Error;

/// Result type for track creation operations
pub type TrackResult<T> = Result<T, TrackError>;

/// Errors that can occur while creating tracks
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackError {
    /// A named input collection cannot be read from the event
    #[error("Collection unavailable: {name}")]
    CollectionUnavailable { name: String },

    /// An individual vertex or trajectory entry cannot be interpreted
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Particle identity code without a mass table entry
    #[error("Unknown particle identity code: {0}")]
    UnknownParticleId(i32),

    /// Detector geometry is inconsistent or incomplete
    #[error("Invalid geometry parameter: {0}")]
    InvalidGeometry(String),

    /// Fewer than two hits, so no helix can be fitted
    #[error("Insufficient hits for helix fit: found {found}, need at least 2")]
    InsufficientHits { found: usize },

    /// Helix construction or least-squares fit is numerically degenerate
    #[error("Degenerate helix fit: {0}")]
    DegenerateFit(String),

    /// Helix reaches neither the calorimeter barrel nor the endcap plane
    #[error("Helix does not intersect any calorimeter surface")]
    NoCalorimeterIntersection,

    /// Downstream particle-flow engine rejected a call
    #[error("Track sink error: {0}")]
    Sink(String),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TrackError {
    /// Check if this error must abort processing instead of skipping a record
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TrackError::InvalidGeometry(_) | TrackError::Sink(_) | TrackError::Config(_)
        )
    }
}
