//! # Track Creator
//!
//! Orchestrates one event: relationship extraction first, then one track
//! descriptor per selected trajectory.
//!
//! ## Per-Trajectory Pipeline
//!
//! 1. Hit-count selection, with a lower requirement for forward tracks that
//!    can only cross a few forward disks
//! 2. Identity and mass, from the vertex hints or a charged-pion default
//! 3. Helix fits and calorimeter projection ([`crate::fit`])
//! 4. Calorimeter reach ([`crate::reach`])
//! 5. PFO usability ([`crate::usage`])
//!
//! A trajectory that fails any step is logged and skipped; the rest of the
//! event carries on. Only run-level failures (a sink refusing calls) abort
//! the event.

use crate::event::{EventSource, TrackSink};
use crate::fit::{fit_track_helices, FitOptions};
use crate::geometry::DetectorGeometry;
use crate::reach::classify_reach;
use crate::relations::{extract_associations, ExtractionSummary, TrackAssociations, VertexCategory};
use crate::usage::{PfoUsage, UsageInput};
use crate::{ParticleId, TrackDescriptor, TrackError, TrackHandle, TrackResult, Trajectory};
use log::{debug, info, warn};

/// Configuration of the track creator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct TrackCreatorSettings {
    /// Trajectory collections to turn into tracks.
    /// Default: ["MarlinTrkTracks"]
    pub track_collections: Vec<String>,

    /// Default: ["KinkVertices"]
    pub kink_vertex_collections: Vec<String>,

    /// Default: ["ProngVertices", "SplitVertices"]
    pub prong_split_vertex_collections: Vec<String>,

    /// Default: ["V0Vertices"]
    pub v0_vertex_collections: Vec<String>,

    /// Declare parent/daughter and sibling relationships to the sink.
    /// Identities and memberships are recorded either way. Default: true
    pub should_form_track_relationships: bool,

    /// Minimum hits for a central track. Default: 5
    pub min_track_hits: usize,

    /// Minimum hits for a forward track, raised to the number of forward
    /// disks it is expected to cross. Default: 0
    pub min_ftd_track_hits: usize,

    /// Default: 5000
    pub max_track_hits: usize,

    /// Hits used for each of the start and end helix fits. Default: 50
    pub hits_for_helix_fits: usize,

    /// Project the end-of-track helix (rather than the helix at the point of
    /// closest approach) onto the calorimeter. Default: true
    pub use_end_track_helix_for_ecal_projection: bool,

    /// |d0| cut for vertex tracks. Default: 50 mm
    pub d0_track_cut: f64,

    /// |z0| cut for vertex tracks. Default: 50 mm
    pub z0_track_cut: f64,

    /// Allow tracks failing the impact-parameter cuts but passing the r-z
    /// cuts to form PFOs. Default: true
    pub using_non_vertex_tracks: bool,

    /// Also allow such tracks to form clusterless PFOs. Default: false
    pub using_unmatched_non_vertex_tracks: bool,

    /// Allow vertex tracks to form clusterless PFOs. Default: true
    pub using_unmatched_vertex_tracks: bool,

    /// Maximum energy of a clusterless PFO track. Default: 5 GeV
    pub unmatched_vertex_track_max_energy: f64,

    /// Default: 5 mm
    pub d0_unmatched_vertex_track_cut: f64,

    /// Default: 5 mm
    pub z0_unmatched_vertex_track_cut: f64,

    /// Added to the expected |z| of the first hit for non-vertex tracks.
    /// Default: 250 mm
    pub z_cut_for_non_vertex_tracks: f64,

    /// Main-tracker hits needed before the hit extent is examined. Default: 20
    pub reaches_ecal_n_tpc_hits: usize,

    /// Forward-disk hits needed before the hit extent is examined. Default: 4
    pub reaches_ecal_n_ftd_hits: usize,

    /// Outermost hit radius minus tracker outer radius must exceed this.
    /// Default: -100 mm
    pub reaches_ecal_tpc_outer_distance: f64,

    /// Extreme hit |z| minus tracker half-length must exceed this.
    /// Default: -50 mm
    pub reaches_ecal_tpc_z_max_distance: f64,

    /// Tolerance in z for a hit to count as on a forward disk. Default: 1 mm
    pub reaches_ecal_ftd_z_max_distance: f64,

    /// Tracks with pT below `factor · B · tracker outer radius` may curl
    /// before reaching the calorimeter. Default: 0.00015
    pub curvature_to_momentum_factor: f64,

    /// Minimum distance of the calorimeter projection from the origin.
    /// Default: 100 mm
    pub min_track_ecal_distance_from_ip: f64,

    /// First hit must lie within this distance outside the tracker inner
    /// radius. Default: 50 mm
    pub max_tpc_inner_r_distance: f64,
}

impl Default for TrackCreatorSettings {
    fn default() -> Self {
        Self {
            track_collections: vec!["MarlinTrkTracks".to_string()],
            kink_vertex_collections: vec!["KinkVertices".to_string()],
            prong_split_vertex_collections: vec![
                "ProngVertices".to_string(),
                "SplitVertices".to_string(),
            ],
            v0_vertex_collections: vec!["V0Vertices".to_string()],
            should_form_track_relationships: true,
            min_track_hits: 5,
            min_ftd_track_hits: 0,
            max_track_hits: 5000,
            hits_for_helix_fits: 50,
            use_end_track_helix_for_ecal_projection: true,
            d0_track_cut: 50.0,
            z0_track_cut: 50.0,
            using_non_vertex_tracks: true,
            using_unmatched_non_vertex_tracks: false,
            using_unmatched_vertex_tracks: true,
            unmatched_vertex_track_max_energy: 5.0,
            d0_unmatched_vertex_track_cut: 5.0,
            z0_unmatched_vertex_track_cut: 5.0,
            z_cut_for_non_vertex_tracks: 250.0,
            reaches_ecal_n_tpc_hits: 20,
            reaches_ecal_n_ftd_hits: 4,
            reaches_ecal_tpc_outer_distance: -100.0,
            reaches_ecal_tpc_z_max_distance: -50.0,
            reaches_ecal_ftd_z_max_distance: 1.0,
            curvature_to_momentum_factor: 0.00015,
            min_track_ecal_distance_from_ip: 100.0,
            max_tpc_inner_r_distance: 50.0,
        }
    }
}

impl TrackCreatorSettings {
    /// Check the settings for values no event could satisfy.
    pub fn validate(&self) -> TrackResult<()> {
        if self.max_track_hits < self.min_track_hits {
            return Err(TrackError::Config(format!(
                "max_track_hits ({}) is below min_track_hits ({})",
                self.max_track_hits, self.min_track_hits
            )));
        }
        if self.hits_for_helix_fits < 2 {
            return Err(TrackError::Config(format!(
                "hits_for_helix_fits must be at least 2, got {}",
                self.hits_for_helix_fits
            )));
        }

        let cuts = [
            ("d0_track_cut", self.d0_track_cut),
            ("z0_track_cut", self.z0_track_cut),
            ("unmatched_vertex_track_max_energy", self.unmatched_vertex_track_max_energy),
            ("d0_unmatched_vertex_track_cut", self.d0_unmatched_vertex_track_cut),
            ("z0_unmatched_vertex_track_cut", self.z0_unmatched_vertex_track_cut),
            ("z_cut_for_non_vertex_tracks", self.z_cut_for_non_vertex_tracks),
            ("reaches_ecal_tpc_outer_distance", self.reaches_ecal_tpc_outer_distance),
            ("reaches_ecal_tpc_z_max_distance", self.reaches_ecal_tpc_z_max_distance),
            ("reaches_ecal_ftd_z_max_distance", self.reaches_ecal_ftd_z_max_distance),
            ("curvature_to_momentum_factor", self.curvature_to_momentum_factor),
            ("min_track_ecal_distance_from_ip", self.min_track_ecal_distance_from_ip),
            ("max_tpc_inner_r_distance", self.max_tpc_inner_r_distance),
        ];
        match cuts.iter().find(|(_, value)| !value.is_finite()) {
            Some((name, value)) => Err(TrackError::Config(format!(
                "{} must be finite, got {}",
                name, value
            ))),
            None => Ok(()),
        }
    }

    fn fit_options(&self) -> FitOptions {
        FitOptions {
            hits_for_fit: self.hits_for_helix_fits,
            project_end_helix: self.use_end_track_helix_for_ecal_projection,
        }
    }
}

/// Outcome of descriptor building for one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreationSummary {
    /// Descriptors handed to the sink
    pub created: usize,
    /// Trajectories outside the hit-count window
    pub rejected: usize,
    /// Trajectories skipped because of a per-track failure
    pub skipped: usize,
    pub missing_collections: Vec<String>,
    /// Handles of created tracks, in creation order
    pub track_handles: Vec<TrackHandle>,
}

/// Outcome of processing one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventSummary {
    pub associations: ExtractionSummary,
    pub tracks: CreationSummary,
}

/// Builds track descriptors from trajectories for a fixed geometry and
/// configuration.
#[derive(Debug, Clone)]
pub struct TrackCreator {
    settings: TrackCreatorSettings,
    geometry: DetectorGeometry,
}

impl TrackCreator {
    pub fn new(settings: TrackCreatorSettings, geometry: DetectorGeometry) -> Self {
        Self { settings, geometry }
    }

    pub fn settings(&self) -> &TrackCreatorSettings {
        &self.settings
    }

    pub fn geometry(&self) -> &DetectorGeometry {
        &self.geometry
    }

    /// Extract relationships, then create tracks.
    pub fn process_event<E, S>(&self, event: &E, sink: &mut S) -> TrackResult<EventSummary>
    where
        E: EventSource + ?Sized,
        S: TrackSink + ?Sized,
    {
        let (associations, association_summary) = self.create_track_associations(event, sink)?;
        let track_summary = self.create_tracks(event, &associations, sink)?;

        info!(
            "Event: {} vertices accepted ({} vetoed, {} malformed), {} tracks created ({} rejected, {} skipped)",
            association_summary.accepted,
            association_summary.vetoed,
            association_summary.malformed,
            track_summary.created,
            track_summary.rejected,
            track_summary.skipped
        );

        Ok(EventSummary {
            associations: association_summary,
            tracks: track_summary,
        })
    }

    /// Read the kink, prong/split and V0 collections, in that order.
    pub fn create_track_associations<E, S>(
        &self,
        event: &E,
        sink: &mut S,
    ) -> TrackResult<(TrackAssociations, ExtractionSummary)>
    where
        E: EventSource + ?Sized,
        S: TrackSink + ?Sized,
    {
        let collections = [
            (VertexCategory::Kink, self.settings.kink_vertex_collections.as_slice()),
            (
                VertexCategory::ProngSplit,
                self.settings.prong_split_vertex_collections.as_slice(),
            ),
            (VertexCategory::V0, self.settings.v0_vertex_collections.as_slice()),
        ];
        extract_associations(
            event,
            &collections,
            sink,
            self.settings.should_form_track_relationships,
        )
    }

    /// Create descriptors for every trajectory of the configured collections
    /// and hand them to the sink in collection order.
    pub fn create_tracks<E, S>(
        &self,
        event: &E,
        associations: &TrackAssociations,
        sink: &mut S,
    ) -> TrackResult<CreationSummary>
    where
        E: EventSource + ?Sized,
        S: TrackSink + ?Sized,
    {
        let mut summary = CreationSummary::default();

        for name in &self.settings.track_collections {
            let tracks = match event.tracks(name) {
                Ok(tracks) => tracks,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    info!("Failed to extract track collection: {}", e);
                    summary.missing_collections.push(name.clone());
                    continue;
                }
            };

            for (trajectory, result) in tracks.iter().zip(self.build_all(tracks, associations)) {
                match result {
                    Ok(Some(descriptor)) => {
                        sink.create_track(&descriptor)?;
                        summary.created += 1;
                        summary.track_handles.push(descriptor.handle);
                    }
                    Ok(None) => summary.rejected += 1,
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        warn!("Failed to extract {}: {}", trajectory.handle, e);
                        summary.skipped += 1;
                    }
                }
            }
        }

        Ok(summary)
    }

    #[cfg(not(feature = "parallel"))]
    fn build_all(
        &self,
        tracks: &[Trajectory],
        associations: &TrackAssociations,
    ) -> Vec<TrackResult<Option<TrackDescriptor>>> {
        tracks
            .iter()
            .map(|t| self.create_track(t, associations))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn build_all(
        &self,
        tracks: &[Trajectory],
        associations: &TrackAssociations,
    ) -> Vec<TrackResult<Option<TrackDescriptor>>> {
        use rayon::prelude::*;

        tracks
            .par_iter()
            .map(|t| self.create_track(t, associations))
            .collect()
    }

    /// Build the descriptor of one trajectory.
    ///
    /// Returns `Ok(None)` when the hit count is outside the accepted window.
    pub fn create_track(
        &self,
        trajectory: &Trajectory,
        associations: &TrackAssociations,
    ) -> TrackResult<Option<TrackDescriptor>> {
        let params = &trajectory.parameters;
        if !params.is_valid() || !trajectory.hits.iter().all(|h| h.is_valid()) {
            return Err(TrackError::MalformedRecord(format!(
                "{} has non-finite parameters or hits",
                trajectory.handle
            )));
        }

        let n_hits = trajectory.hits.len();
        let min_hits = self.minimum_track_hits(params.tan_lambda);
        if n_hits < min_hits || n_hits > self.settings.max_track_hits {
            debug!(
                "Rejecting {}: {} hits outside [{}, {}]",
                trajectory.handle, n_hits, min_hits, self.settings.max_track_hits
            );
            return Ok(None);
        }

        let handle = trajectory.handle;
        let particle_id = associations
            .particle_id(handle)
            .unwrap_or_else(|| ParticleId::charged_pion(params.omega));
        let mass = particle_id
            .mass()
            .ok_or(TrackError::UnknownParticleId(particle_id.code()))?;

        let fitted = fit_track_helices(trajectory, &self.geometry, &self.settings.fit_options())?;
        let calorimeter = fitted.calorimeter.state;

        let reach = classify_reach(
            &trajectory.hits,
            &fitted.momentum_at_dca,
            &self.geometry,
            &self.settings,
        );
        let usage = PfoUsage::classify(
            &UsageInput {
                trajectory,
                reaches_calorimeter: reach.reaches_calorimeter(),
                membership: associations.membership(handle),
                momentum_at_dca: fitted.momentum_at_dca,
                mass,
                state_at_calorimeter: calorimeter,
            },
            &self.geometry,
            &self.settings,
        );

        debug!(
            "{}: id {}, start {}, end {}, calo {}, reach {:?}, {:?}",
            handle,
            particle_id,
            fitted.state_at_start,
            fitted.state_at_end,
            calorimeter,
            reach,
            usage
        );

        Ok(Some(TrackDescriptor {
            handle,
            d0: params.d0,
            z0: params.z0,
            particle_id,
            mass,
            charge: params.charge(),
            momentum_at_dca: fitted.momentum_at_dca,
            state_at_start: fitted.state_at_start,
            state_at_end: fitted.state_at_end,
            state_at_calorimeter: calorimeter,
            reaches_calorimeter: reach.reaches_calorimeter(),
            can_form_pfo: usage.can_form_pfo,
            can_form_clusterless_pfo: usage.can_form_clusterless_pfo,
        }))
    }

    /// Minimum number of hits for a track with the given dip.
    ///
    /// Forward tracks (steeper than the innermost forward disk's outer edge)
    /// need as many hits as forward disks they cross, but at least
    /// `min_ftd_track_hits`.
    pub fn minimum_track_hits(&self, tan_lambda: f64) -> usize {
        let abs_tan_lambda = tan_lambda.abs();
        if abs_tan_lambda > self.geometry.forward_tan_lambda() {
            let expected = self
                .geometry
                .forward_disks()
                .iter()
                .filter(|disk| disk.is_crossed_by(abs_tan_lambda))
                .count();
            self.settings.min_ftd_track_hits.max(expected)
        } else {
            self.settings.min_track_hits
        }
    }
}
