//! # Track Creator
//!
//! Turns tracker trajectories into track descriptors for particle-flow
//! reconstruction.
//!
//! This library provides:
//! - Helix fits to the two ends of each trajectory and projection onto the
//!   calorimeter inner surface (cylindrical or polygonal barrel, planar endcap)
//! - Classification of whether a trajectory reaches the calorimeter and
//!   whether it can seed a particle-flow object, with or without a cluster
//! - Extraction of parent/daughter/sibling relationships and particle
//!   identities from kink, prong/split and V0 vertices
//!
//! ## Features
//!
//! - **`parallel`** - Build track descriptors in parallel with rayon
//! - **`serde`** - (De)serialize settings and geometry, load JSON configuration
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use track_creator::{
//!     CollectingSink, DetectorGeometry, Event, GeometryParameters, TrackCreator,
//!     TrackCreatorSettings,
//! };
//!
//! let geometry = DetectorGeometry::new(&GeometryParameters::default()).unwrap();
//! let creator = TrackCreator::new(TrackCreatorSettings::default(), geometry);
//!
//! // An event without any collections: nothing is created, nothing fails
//! let event = Event::new();
//! let mut sink = CollectingSink::default();
//! let summary = creator.process_event(&event, &mut sink).unwrap();
//! assert_eq!(summary.tracks.created, 0);
//! ```
//!
//! ## Processing Model
//!
//! Each event is processed in two phases. Relationship extraction reads the
//! vertex collections and produces [`TrackAssociations`] (membership sets and
//! identity hints). Descriptor building then reads those associations while
//! fitting and classifying every trajectory.

use nalgebra::Vector3;
use std::fmt;

#[cfg(feature = "serde")]
pub mod config;
pub mod creator;
pub mod error;
pub mod event;
pub mod fit;
pub mod geometry;
pub mod helix;
pub mod pdg;
pub mod projection;
pub mod reach;
pub mod relations;
pub mod usage;

pub use creator::{CreationSummary, EventSummary, TrackCreator, TrackCreatorSettings};
pub use error::{TrackError, TrackResult};
pub use event::{CollectingSink, Event, EventSource, TrackSink, VertexRecord};
pub use fit::{fit_track_helices, FittedTrack, TrackEnd};
pub use geometry::{DetectorGeometry, GeometryParameters};
pub use helix::{Helix, HelixFit};
pub use pdg::ParticleId;
pub use relations::{ExtractionSummary, Relationship, TrackAssociations, VertexCategory};
pub use usage::PfoUsage;

// ============================================================================
// Core Types
// ============================================================================

/// Opaque identity of a trajectory in the event-data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackHandle(pub u64);

impl fmt::Display for TrackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "track#{}", self.0)
    }
}

/// A tracker hit position (mm).
///
/// # Example
/// ```
/// use track_creator::Hit;
/// let hit = Hit::new(300.0, 400.0, -120.0);
/// assert_eq!(hit.radius(), 500.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hit {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Hit {
    /// Create a new hit.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Distance from the beam axis.
    pub fn radius(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Check that all coordinates are finite.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<Vector3<f64>> for Hit {
    fn from(v: Vector3<f64>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// The five canonical helix parameters of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackParameters {
    /// Transverse impact parameter (mm)
    pub d0: f64,
    /// Longitudinal impact parameter (mm)
    pub z0: f64,
    /// Azimuth of the momentum at the point of closest approach (rad)
    pub phi: f64,
    /// Signed curvature (1/mm); positive for positive charge
    pub omega: f64,
    /// Dip angle tangent, pz / pT
    pub tan_lambda: f64,
}

impl TrackParameters {
    pub fn is_valid(&self) -> bool {
        self.d0.is_finite()
            && self.z0.is_finite()
            && self.phi.is_finite()
            && self.omega.is_finite()
            && self.tan_lambda.is_finite()
    }

    /// Sign of the curvature; 0 when the curvature is exactly zero.
    pub fn charge(&self) -> i32 {
        if self.omega > 0.0 {
            1
        } else if self.omega < 0.0 {
            -1
        } else {
            0
        }
    }
}

/// A reconstructed trajectory as read from the event.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trajectory {
    pub handle: TrackHandle,
    pub parameters: TrackParameters,
    /// Hit positions in arbitrary order
    pub hits: Vec<Hit>,
}

impl Trajectory {
    pub fn new(handle: TrackHandle, parameters: TrackParameters, hits: Vec<Hit>) -> Self {
        Self {
            handle,
            parameters,
            hits,
        }
    }
}

/// Position and momentum at one point along a trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackState {
    /// Position (mm)
    pub position: Vector3<f64>,
    /// Momentum (GeV)
    pub momentum: Vector3<f64>,
}

impl TrackState {
    pub fn new(position: Vector3<f64>, momentum: Vector3<f64>) -> Self {
        Self { position, momentum }
    }
}

impl fmt::Display for TrackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pos ({:.2}, {:.2}, {:.2}) mom ({:.4}, {:.4}, {:.4})",
            self.position.x,
            self.position.y,
            self.position.z,
            self.momentum.x,
            self.momentum.y,
            self.momentum.z
        )
    }
}

/// Everything the particle-flow engine needs to know about one track.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackDescriptor {
    /// Source trajectory
    pub handle: TrackHandle,
    pub d0: f64,
    pub z0: f64,
    pub particle_id: ParticleId,
    /// Rest mass for the assigned identity (GeV)
    pub mass: f64,
    /// Sign of the curvature, 0 for exactly straight tracks
    pub charge: i32,
    pub momentum_at_dca: Vector3<f64>,
    pub state_at_start: TrackState,
    pub state_at_end: TrackState,
    pub state_at_calorimeter: TrackState,
    pub reaches_calorimeter: bool,
    pub can_form_pfo: bool,
    pub can_form_clusterless_pfo: bool,
}

// ============================================================================
// Tests
// ============================================================================
