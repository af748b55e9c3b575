//! # Calorimeter Reach
//!
//! Decides whether a trajectory plausibly reaches the calorimeter, from its
//! hit pattern and its momentum at the point of closest approach.
//!
//! Rules are tried in order and the first one that applies decides:
//!
//! | Rule | Reaches when |
//! |------|--------------|
//! | [`Reach::OuterLayers`] | a hit lies beyond the outer tracker radius, or beyond the outer endcap extension z (signed, so only on the +z side) |
//! | [`Reach::TrackerExtent`] | enough main-tracker or forward-disk hits, and the hits extend close to the tracker boundary |
//! | [`Reach::Curling`] | the track is too forward or too soft to be judged by its hits |
//!
//! Otherwise the track is [`Reach::Contained`].

use crate::creator::TrackCreatorSettings;
use crate::geometry::DetectorGeometry;
use crate::Hit;
use nalgebra::Vector3;

/// Outcome of the reach classification, naming the deciding rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reach {
    OuterLayers,
    TrackerExtent,
    Curling,
    Contained,
}

impl Reach {
    pub fn reaches_calorimeter(&self) -> bool {
        !matches!(self, Reach::Contained)
    }
}

/// Summary of where a trajectory's hits lie.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitPattern {
    /// Hits beyond the main tracker inner radius
    pub main_tracker_hits: usize,
    /// Remaining hits that sit on a forward disk
    pub forward_disk_hits: usize,
    pub max_radius: f64,
    pub z_min: f64,
    pub z_max: f64,
}

impl HitPattern {
    pub fn new(hits: &[Hit], geometry: &DetectorGeometry, disk_z_tolerance: f64) -> Self {
        let inner_radius = geometry.main_tracker().inner_radius;
        let mut pattern = HitPattern {
            main_tracker_hits: 0,
            forward_disk_hits: 0,
            max_radius: 0.0,
            z_min: f64::INFINITY,
            z_max: f64::NEG_INFINITY,
        };

        for hit in hits {
            let r = hit.radius();
            pattern.z_min = pattern.z_min.min(hit.z);
            pattern.z_max = pattern.z_max.max(hit.z);
            pattern.max_radius = pattern.max_radius.max(r);

            if r > inner_radius {
                pattern.main_tracker_hits += 1;
            } else if geometry
                .forward_disks()
                .iter()
                .any(|disk| disk.contains(r, hit.z.abs(), disk_z_tolerance))
            {
                pattern.forward_disk_hits += 1;
            }
        }
        pattern
    }
}

/// Classify whether a trajectory reaches the calorimeter.
pub fn classify_reach(
    hits: &[Hit],
    momentum_at_dca: &Vector3<f64>,
    geometry: &DetectorGeometry,
    settings: &TrackCreatorSettings,
) -> Reach {
    let pattern = HitPattern::new(hits, geometry, settings.reaches_ecal_ftd_z_max_distance);

    if pattern.max_radius > geometry.min_outer_tracker_radius()
        || pattern.z_max > geometry.min_outer_endcap_z()
    {
        return Reach::OuterLayers;
    }

    let tracker = geometry.main_tracker();
    if pattern.main_tracker_hits >= settings.reaches_ecal_n_tpc_hits
        || pattern.forward_disk_hits >= settings.reaches_ecal_n_ftd_hits
    {
        let z_margin = settings.reaches_ecal_tpc_z_max_distance;
        if pattern.max_radius - tracker.outer_radius > settings.reaches_ecal_tpc_outer_distance
            || pattern.z_max.abs() - tracker.max_drift_length > z_margin
            || pattern.z_min.abs() - tracker.max_drift_length > z_margin
        {
            return Reach::TrackerExtent;
        }
    }

    let p = momentum_at_dca.norm();
    let pt = momentum_at_dca.xy().norm();
    let cos_angle = if p > 0.0 { momentum_at_dca.z.abs() / p } else { 0.0 };
    let curl_momentum =
        settings.curvature_to_momentum_factor * geometry.b_field() * tracker.outer_radius;

    if cos_angle > tracker.cos_aspect() || pt < curl_momentum {
        return Reach::Curling;
    }

    Reach::Contained
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeometryParameters;

    fn geometry() -> DetectorGeometry {
        DetectorGeometry::new(&GeometryParameters::default()).unwrap()
    }

    /// Radial line of hits at fixed azimuth from `r0` to `r1`.
    fn radial_hits(r0: f64, r1: f64, count: usize, z_per_mm: f64) -> Vec<Hit> {
        (0..count)
            .map(|i| {
                let r = r0 + (r1 - r0) * i as f64 / (count - 1) as f64;
                Hit::new(r * 0.6, r * 0.8, r * z_per_mm)
            })
            .collect()
    }

    /// Stiff, central momentum that never triggers the curling rule.
    fn stiff() -> Vector3<f64> {
        Vector3::new(3.0, 4.0, 0.5)
    }

    #[test]
    fn test_outer_layer_hit_reaches() {
        let hits = vec![Hit::new(1840.0, 0.0, 10.0)];
        let reach = classify_reach(&hits, &stiff(), &geometry(), &TrackCreatorSettings::default());
        assert_eq!(reach, Reach::OuterLayers);
    }

    #[test]
    fn test_outer_endcap_rule_compares_signed_z() {
        let settings = TrackCreatorSettings::default();
        let forward = vec![Hit::new(500.0, 0.0, 2430.0)];
        assert_eq!(
            classify_reach(&forward, &stiff(), &geometry(), &settings),
            Reach::OuterLayers
        );

        // The same hit at -z is left to the later rules
        let backward = vec![Hit::new(500.0, 0.0, -2430.0)];
        assert_eq!(
            classify_reach(&backward, &stiff(), &geometry(), &settings),
            Reach::Contained
        );
        let soft = Vector3::new(0.3, 0.4, -0.1);
        assert_eq!(
            classify_reach(&backward, &soft, &geometry(), &settings),
            Reach::Curling
        );
    }

    #[test]
    fn test_backward_track_reaches_by_extent() {
        // 25 hits running back to z = -2330, within 50 mm of the tracker end
        let hits: Vec<Hit> = (0..25)
            .map(|i| {
                let r = 400.0 + 10.0 * i as f64;
                Hit::new(r, 0.0, -1130.0 - 50.0 * i as f64)
            })
            .collect();
        let reach = classify_reach(&hits, &stiff(), &geometry(), &TrackCreatorSettings::default());
        assert_eq!(reach, Reach::TrackerExtent);
    }

    #[test]
    fn test_long_tracker_track_reaches() {
        // 30 hits out to 1750 mm, within 100 mm of the tracker outer radius
        let hits = radial_hits(400.0, 1750.0, 30, 0.1);
        let reach = classify_reach(&hits, &stiff(), &geometry(), &TrackCreatorSettings::default());
        assert_eq!(reach, Reach::TrackerExtent);
    }

    #[test]
    fn test_short_tracker_track_is_contained() {
        let hits = radial_hits(400.0, 1200.0, 30, 0.1);
        let reach = classify_reach(&hits, &stiff(), &geometry(), &TrackCreatorSettings::default());
        assert_eq!(reach, Reach::Contained);
        assert!(!reach.reaches_calorimeter());
    }

    #[test]
    fn test_too_few_hits_skip_extent_rule() {
        let hits = radial_hits(400.0, 1750.0, 10, 0.1);
        let reach = classify_reach(&hits, &stiff(), &geometry(), &TrackCreatorSettings::default());
        assert_eq!(reach, Reach::Contained);
    }

    #[test]
    fn test_forward_disk_hits_count() {
        let geometry = geometry();
        let disks = geometry.forward_disks();
        let hits: Vec<Hit> = disks[2..6]
            .iter()
            .map(|d| Hit::new(0.5 * (d.inner_radius + d.outer_radius), 0.0, d.z + 0.5))
            .collect();
        let pattern = HitPattern::new(&hits, &geometry, 1.0);
        assert_eq!(pattern.forward_disk_hits, 4);
        assert_eq!(pattern.main_tracker_hits, 0);

        // Off the disk plane by more than the tolerance
        let off: Vec<Hit> = hits.iter().map(|h| Hit::new(h.x, h.y, h.z + 5.0)).collect();
        assert_eq!(HitPattern::new(&off, &geometry, 1.0).forward_disk_hits, 0);
    }

    #[test]
    fn test_forward_track_reaching_tracker_end() {
        let geometry = geometry();
        let settings = TrackCreatorSettings::default();
        let mut hits: Vec<Hit> = geometry.forward_disks()[2..6]
            .iter()
            .map(|d| Hit::new(0.5 * (d.inner_radius + d.outer_radius), 0.0, d.z))
            .collect();
        hits.push(Hit::new(250.0, 0.0, 2320.0));
        assert_eq!(
            classify_reach(&hits, &stiff(), &geometry, &settings),
            Reach::TrackerExtent
        );
    }

    #[test]
    fn test_soft_track_curls() {
        let hits = radial_hits(400.0, 900.0, 10, 0.1);
        let soft = Vector3::new(0.3, 0.4, 0.1);
        let reach = classify_reach(&hits, &soft, &geometry(), &TrackCreatorSettings::default());
        assert_eq!(reach, Reach::Curling);
    }

    #[test]
    fn test_very_forward_track_curls() {
        let hits = radial_hits(50.0, 100.0, 5, 1.0);
        let forward = Vector3::new(0.3, 0.4, 50.0);
        let reach = classify_reach(&hits, &forward, &geometry(), &TrackCreatorSettings::default());
        assert_eq!(reach, Reach::Curling);
    }

    #[test]
    fn test_reach_is_monotonic_in_outer_hits() {
        let geometry = geometry();
        let settings = TrackCreatorSettings::default();
        let mut hits = radial_hits(400.0, 1200.0, 8, 0.1);
        let before = classify_reach(&hits, &stiff(), &geometry, &settings);
        hits.push(Hit::new(0.0, 1900.0, 50.0));
        let after = classify_reach(&hits, &stiff(), &geometry, &settings);
        assert!(!before.reaches_calorimeter());
        assert!(after.reaches_calorimeter());
    }
}
