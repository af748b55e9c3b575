//! # Vertex Relationships
//!
//! Turns secondary-vertex findings into track relationships and particle
//! identity hints.
//!
//! ## Vertex Categories
//!
//! | Category | Membership | Declarations | Identities |
//! |----------|------------|--------------|------------|
//! | [`VertexCategory::Kink`] | first track parent, others daughters | parent→daughter, daughter siblings | vertex identity, then [`kink_daughter`] |
//! | [`VertexCategory::ProngSplit`] | first track parent, others daughters | parent→daughter, daughter siblings | none |
//! | [`VertexCategory::V0`] | all tracks V0 members | siblings | [`v0_daughter`] |
//!
//! ## Conflicts
//!
//! A track takes part in at most one vertex. When any track of a vertex
//! already belongs to a parent, daughter or V0 set, the whole vertex is
//! dropped: no membership, identity or declaration is recorded for it.
//! Vertices are processed kinks first, then prongs/splits, then V0s, each in
//! collection order, so earlier findings win.

use crate::event::{EventSource, TrackSink, VertexRecord};
use crate::pdg::{kink_daughter, v0_daughter, ParticleId};
use crate::{TrackError, TrackHandle, TrackResult, Trajectory};
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// The three kinds of vertex collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexCategory {
    Kink,
    ProngSplit,
    V0,
}

impl fmt::Display for VertexCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VertexCategory::Kink => write!(f, "kink"),
            VertexCategory::ProngSplit => write!(f, "prong/split"),
            VertexCategory::V0 => write!(f, "v0"),
        }
    }
}

/// A relationship declared to the particle-flow engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Relationship {
    ParentDaughter {
        parent: TrackHandle,
        daughter: TrackHandle,
    },
    Sibling {
        first: TrackHandle,
        second: TrackHandle,
    },
}

/// Vertex memberships of a single track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Membership {
    pub is_parent: bool,
    pub is_daughter: bool,
    pub is_v0: bool,
}

/// What happened to one vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexOutcome {
    Accepted,
    /// Shares a track with an earlier vertex
    Vetoed,
}

/// Counters of one extraction pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub accepted: usize,
    pub vetoed: usize,
    pub malformed: usize,
    pub missing_collections: Vec<String>,
}

/// Per-event track memberships and identity hints.
///
/// The parent, daughter and V0 sets are pairwise disjoint.
#[derive(Debug, Clone, Default)]
pub struct TrackAssociations {
    parents: HashSet<TrackHandle>,
    daughters: HashSet<TrackHandle>,
    v0_tracks: HashSet<TrackHandle>,
    particle_ids: HashMap<TrackHandle, ParticleId>,
}

impl TrackAssociations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_parent(&self, handle: TrackHandle) -> bool {
        self.parents.contains(&handle)
    }

    pub fn is_daughter(&self, handle: TrackHandle) -> bool {
        self.daughters.contains(&handle)
    }

    pub fn is_v0(&self, handle: TrackHandle) -> bool {
        self.v0_tracks.contains(&handle)
    }

    pub fn membership(&self, handle: TrackHandle) -> Membership {
        Membership {
            is_parent: self.is_parent(handle),
            is_daughter: self.is_daughter(handle),
            is_v0: self.is_v0(handle),
        }
    }

    /// Identity hint recorded for a track, if any.
    pub fn particle_id(&self, handle: TrackHandle) -> Option<ParticleId> {
        self.particle_ids.get(&handle).copied()
    }

    pub fn parents(&self) -> &HashSet<TrackHandle> {
        &self.parents
    }

    pub fn daughters(&self) -> &HashSet<TrackHandle> {
        &self.daughters
    }

    pub fn v0_tracks(&self) -> &HashSet<TrackHandle> {
        &self.v0_tracks
    }

    /// Whether the track already belongs to any vertex.
    pub fn is_associated(&self, handle: TrackHandle) -> bool {
        self.is_parent(handle) || self.is_daughter(handle) || self.is_v0(handle)
    }

    /// Record one vertex.
    ///
    /// Returns [`TrackError::MalformedRecord`] (before any side effect) when
    /// the vertex has no tracks, references a track the event cannot
    /// resolve, or lists a track twice. Declarations go to `sink` only when
    /// `declare` is set; a sink failure is returned as is.
    pub fn add_vertex<E, S>(
        &mut self,
        category: VertexCategory,
        vertex: &VertexRecord,
        event: &E,
        sink: &mut S,
        declare: bool,
    ) -> TrackResult<VertexOutcome>
    where
        E: EventSource + ?Sized,
        S: TrackSink + ?Sized,
    {
        let tracks = resolve_tracks(vertex, event)?;

        if vertex.tracks.iter().any(|&h| self.is_associated(h)) {
            debug!(
                "Dropping {} vertex {:?}: track already associated",
                category, vertex.tracks
            );
            return Ok(VertexOutcome::Vetoed);
        }

        let vertex_id = ParticleId(vertex.particle_id);
        for (i, track) in tracks.iter().enumerate() {
            let handle = track.handle;
            match category {
                VertexCategory::Kink | VertexCategory::ProngSplit => {
                    if i == 0 {
                        self.parents.insert(handle);
                    } else {
                        self.daughters.insert(handle);
                    }
                }
                VertexCategory::V0 => {
                    self.v0_tracks.insert(handle);
                }
            }

            let identity = match category {
                VertexCategory::Kink if i == 0 => Some(vertex_id),
                VertexCategory::Kink => Some(kink_daughter(vertex_id, track.parameters.omega)),
                VertexCategory::V0 => Some(v0_daughter(vertex_id, track.parameters.omega)),
                VertexCategory::ProngSplit => None,
            };
            if let Some(id) = identity {
                self.particle_ids.insert(handle, id);
            }
            debug!(
                "{} track {} ({}), {} hits, identity {:?}",
                category,
                i,
                handle,
                track.hits.len(),
                identity.map(|id| id.code())
            );
        }

        if declare {
            for relationship in vertex_relationships(category, &vertex.tracks) {
                sink.declare_relationship(relationship)?;
            }
        }

        Ok(VertexOutcome::Accepted)
    }
}

/// Resolve every track of a vertex, rejecting empty, unknown or repeated entries.
fn resolve_tracks<'e, E>(vertex: &VertexRecord, event: &'e E) -> TrackResult<Vec<&'e Trajectory>>
where
    E: EventSource + ?Sized,
{
    if vertex.tracks.is_empty() {
        return Err(TrackError::MalformedRecord(format!(
            "vertex (identity {}) has no tracks",
            vertex.particle_id
        )));
    }

    let mut seen = HashSet::with_capacity(vertex.tracks.len());
    vertex
        .tracks
        .iter()
        .map(|&handle| {
            if !seen.insert(handle) {
                return Err(TrackError::MalformedRecord(format!(
                    "vertex lists {} more than once",
                    handle
                )));
            }
            event.trajectory(handle).ok_or_else(|| {
                TrackError::MalformedRecord(format!("vertex references unknown {}", handle))
            })
        })
        .collect()
}

/// Declarations implied by a vertex, in emission order.
pub fn vertex_relationships(category: VertexCategory, tracks: &[TrackHandle]) -> Vec<Relationship> {
    let mut relationships = Vec::new();
    for (i, &first) in tracks.iter().enumerate() {
        for &second in &tracks[i + 1..] {
            let relationship = if category != VertexCategory::V0 && i == 0 {
                Relationship::ParentDaughter {
                    parent: first,
                    daughter: second,
                }
            } else {
                Relationship::Sibling { first, second }
            };
            relationships.push(relationship);
        }
    }
    relationships
}

/// Read every configured vertex collection and build the event's associations.
///
/// Categories are processed kinks, then prongs/splits, then V0s. Unreadable
/// collections and malformed vertices are logged and skipped; sink failures
/// abort the extraction.
pub fn extract_associations<E, S>(
    event: &E,
    collections: &[(VertexCategory, &[String])],
    sink: &mut S,
    declare: bool,
) -> TrackResult<(TrackAssociations, ExtractionSummary)>
where
    E: EventSource + ?Sized,
    S: TrackSink + ?Sized,
{
    let mut associations = TrackAssociations::new();
    let mut summary = ExtractionSummary::default();

    for &(category, names) in collections {
        for name in names {
            let vertices = match event.vertices(name) {
                Ok(vertices) => vertices,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    info!("Failed to extract {} vertex collection: {}", category, e);
                    summary.missing_collections.push(name.clone());
                    continue;
                }
            };

            for vertex in vertices {
                match associations.add_vertex(category, vertex, event, sink, declare) {
                    Ok(VertexOutcome::Accepted) => summary.accepted += 1,
                    Ok(VertexOutcome::Vetoed) => summary.vetoed += 1,
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        warn!("Failed to extract {} vertex from {}: {}", category, name, e);
                        summary.malformed += 1;
                    }
                }
            }
        }
    }

    Ok((associations, summary))
}
