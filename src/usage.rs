//! # PFO Usability
//!
//! Decides whether a track may seed a particle-flow object (PFO), either
//! matched to a calorimeter cluster or on its own.
//!
//! A track that does not reach the calorimeter, or that is the parent of a
//! kink or prong/split vertex, is never usable: its energy is carried by its
//! daughters.

use crate::creator::TrackCreatorSettings;
use crate::geometry::DetectorGeometry;
use crate::relations::Membership;
use crate::{Hit, TrackState, Trajectory};
use nalgebra::Vector3;

/// Usability flags of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PfoUsage {
    /// May be associated with a cluster to form a charged PFO
    pub can_form_pfo: bool,
    /// May form a charged PFO without any cluster
    pub can_form_clusterless_pfo: bool,
}

/// Everything the usability decision needs to know about one track.
#[derive(Debug, Clone, Copy)]
pub struct UsageInput<'a> {
    pub trajectory: &'a Trajectory,
    pub reaches_calorimeter: bool,
    pub membership: Membership,
    pub momentum_at_dca: Vector3<f64>,
    pub mass: f64,
    pub state_at_calorimeter: TrackState,
}

impl PfoUsage {
    /// Decide both usability flags.
    pub fn classify(
        input: &UsageInput<'_>,
        geometry: &DetectorGeometry,
        settings: &TrackCreatorSettings,
    ) -> PfoUsage {
        if !input.reaches_calorimeter || input.membership.is_parent {
            return PfoUsage::default();
        }

        let (r_inner, z_min) = innermost(&input.trajectory.hits);

        if input.state_at_calorimeter.position.norm() < settings.min_track_ecal_distance_from_ip {
            return PfoUsage::default();
        }

        let d0 = input.trajectory.parameters.d0.abs();
        let z0 = input.trajectory.parameters.z0.abs();
        let p = input.momentum_at_dca;
        let pt = p.xy().norm();

        let tpc_inner_radius = geometry.main_tracker().inner_radius;
        let passes_r = r_inner < tpc_inner_radius + settings.max_tpc_inner_r_distance;
        let z_cut = tpc_inner_radius * (p.z / pt).abs() + settings.z_cut_for_non_vertex_tracks;
        let passes_rz = z_min < z_cut && passes_r;
        let from_vertex = input.membership.is_v0 || input.membership.is_daughter;

        let can_form_pfo = (d0 < settings.d0_track_cut && z0 < settings.z0_track_cut && passes_r)
            || (passes_rz && settings.using_non_vertex_tracks)
            || from_vertex;

        let energy = (p.norm_squared() + input.mass * input.mass).sqrt();
        let can_form_clusterless_pfo = settings.using_unmatched_vertex_tracks
            && energy < settings.unmatched_vertex_track_max_energy
            && ((d0 < settings.d0_unmatched_vertex_track_cut
                && z0 < settings.z0_unmatched_vertex_track_cut
                && passes_r)
                || (passes_rz
                    && settings.using_non_vertex_tracks
                    && settings.using_unmatched_non_vertex_tracks)
                || from_vertex);

        PfoUsage {
            can_form_pfo,
            can_form_clusterless_pfo,
        }
    }
}

/// Smallest hit radius and smallest |z|.
fn innermost(hits: &[Hit]) -> (f64, f64) {
    hits.iter().fold((f64::MAX, f64::MAX), |(r, z), hit| {
        (r.min(hit.radius()), z.min(hit.z.abs()))
    })
}
