//! # Event Model
//!
//! The two seams of the track creator:
//!
//! - [`EventSource`] yields named collections of trajectories and vertices
//!   for one event, and resolves trajectory handles;
//! - [`TrackSink`] receives track descriptors and relationship declarations
//!   on behalf of the particle-flow engine.
//!
//! [`Event`] and [`CollectingSink`] are in-memory implementations, used by
//! the demos and tests and by callers that already hold decoded data.

use crate::relations::Relationship;
use crate::{TrackDescriptor, TrackError, TrackHandle, TrackResult, Trajectory};
use std::collections::HashMap;

/// A secondary vertex found by a vertex finder.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexRecord {
    /// Identity code of the decaying (or converting) particle
    pub particle_id: i32,
    /// Constituent trajectories; for kinks and prongs the parent comes first
    pub tracks: Vec<TrackHandle>,
}

impl VertexRecord {
    pub fn new(particle_id: i32, tracks: Vec<TrackHandle>) -> Self {
        Self { particle_id, tracks }
    }
}

/// Read access to the collections of one event.
pub trait EventSource {
    /// Trajectories of the named collection, in collection order.
    fn tracks(&self, collection: &str) -> TrackResult<&[Trajectory]>;

    /// Vertices of the named collection, in collection order.
    fn vertices(&self, collection: &str) -> TrackResult<&[VertexRecord]>;

    /// Resolve a trajectory handle referenced by a vertex.
    fn trajectory(&self, handle: TrackHandle) -> Option<&Trajectory>;
}

/// Receiver of the track creator's output.
pub trait TrackSink {
    fn create_track(&mut self, descriptor: &TrackDescriptor) -> TrackResult<()>;

    fn declare_relationship(&mut self, relationship: Relationship) -> TrackResult<()>;
}

// ============================================================================
// In-Memory Event
// ============================================================================

/// An event held in memory.
#[derive(Debug, Clone, Default)]
pub struct Event {
    track_collections: HashMap<String, Vec<Trajectory>>,
    vertex_collections: HashMap<String, Vec<VertexRecord>>,
    /// handle -> (collection, index)
    index: HashMap<TrackHandle, (String, usize)>,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append trajectories to a collection.
    ///
    /// A handle that is already known keeps resolving to its first
    /// occurrence.
    pub fn add_tracks(&mut self, collection: &str, tracks: Vec<Trajectory>) -> &mut Self {
        let entries = self
            .track_collections
            .entry(collection.to_string())
            .or_default();
        for track in tracks {
            self.index
                .entry(track.handle)
                .or_insert_with(|| (collection.to_string(), entries.len()));
            entries.push(track);
        }
        self
    }

    /// Append vertices to a collection.
    pub fn add_vertices(&mut self, collection: &str, vertices: Vec<VertexRecord>) -> &mut Self {
        self.vertex_collections
            .entry(collection.to_string())
            .or_default()
            .extend(vertices);
        self
    }

    /// Total number of trajectories across all collections.
    pub fn track_count(&self) -> usize {
        self.track_collections.values().map(Vec::len).sum()
    }
}

impl EventSource for Event {
    fn tracks(&self, collection: &str) -> TrackResult<&[Trajectory]> {
        self.track_collections
            .get(collection)
            .map(Vec::as_slice)
            .ok_or_else(|| TrackError::CollectionUnavailable {
                name: collection.to_string(),
            })
    }

    fn vertices(&self, collection: &str) -> TrackResult<&[VertexRecord]> {
        self.vertex_collections
            .get(collection)
            .map(Vec::as_slice)
            .ok_or_else(|| TrackError::CollectionUnavailable {
                name: collection.to_string(),
            })
    }

    fn trajectory(&self, handle: TrackHandle) -> Option<&Trajectory> {
        let (collection, position) = self.index.get(&handle)?;
        self.track_collections.get(collection)?.get(*position)
    }
}

// ============================================================================
// Collecting Sink
// ============================================================================

/// Sink that keeps everything it receives, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    pub tracks: Vec<TrackDescriptor>,
    pub relationships: Vec<Relationship>,
}

impl CollectingSink {
    /// Descriptor created for `handle`, if any.
    pub fn track(&self, handle: TrackHandle) -> Option<&TrackDescriptor> {
        self.tracks.iter().find(|t| t.handle == handle)
    }
}

impl TrackSink for CollectingSink {
    fn create_track(&mut self, descriptor: &TrackDescriptor) -> TrackResult<()> {
        self.tracks.push(descriptor.clone());
        Ok(())
    }

    fn declare_relationship(&mut self, relationship: Relationship) -> TrackResult<()> {
        self.relationships.push(relationship);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Hit, TrackParameters};

    fn track(id: u64) -> Trajectory {
        let params = TrackParameters {
            d0: 0.0,
            z0: 0.0,
            phi: 0.0,
            omega: 0.001,
            tan_lambda: 0.0,
        };
        Trajectory::new(TrackHandle(id), params, vec![Hit::new(400.0, 0.0, 0.0)])
    }

    #[test]
    fn test_missing_collection() {
        let event = Event::new();
        assert_eq!(
            event.tracks("MarlinTrkTracks").unwrap_err(),
            TrackError::CollectionUnavailable {
                name: "MarlinTrkTracks".to_string()
            }
        );
        assert!(event.vertices("V0Vertices").is_err());
    }

    #[test]
    fn test_handle_resolution() {
        let mut event = Event::new();
        event
            .add_tracks("A", vec![track(1), track(2)])
            .add_tracks("B", vec![track(3)]);

        assert_eq!(event.track_count(), 3);
        assert_eq!(event.trajectory(TrackHandle(2)).unwrap().handle, TrackHandle(2));
        assert_eq!(event.trajectory(TrackHandle(3)).unwrap().handle, TrackHandle(3));
        assert!(event.trajectory(TrackHandle(4)).is_none());
    }

    #[test]
    fn test_duplicate_handle_keeps_first() {
        let mut event = Event::new();
        let mut second = track(1);
        second.parameters.omega = -0.002;
        event.add_tracks("A", vec![track(1)]).add_tracks("B", vec![second]);
        let resolved = event.trajectory(TrackHandle(1)).unwrap();
        assert_eq!(resolved.parameters.omega, 0.001);
    }

    #[test]
    fn test_vertices_keep_order() {
        let mut event = Event::new();
        event.add_vertices("KinkVertices", vec![VertexRecord::new(321, vec![TrackHandle(1)])]);
        event.add_vertices("KinkVertices", vec![VertexRecord::new(211, vec![TrackHandle(2)])]);
        let vertices = event.vertices("KinkVertices").unwrap();
        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[1].particle_id, 211);
    }
}
