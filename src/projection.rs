//! # Calorimeter Projection
//!
//! Extrapolates a helix to the inner surface of the electromagnetic
//! calorimeter.
//!
//! The surface is made of two endcap planes at `z = ±endcap_z` and a barrel
//! that is either a cylinder (symmetry order 0) or a regular polygon whose
//! faces sit at distance `barrel_radius` from the beam axis. The projection
//! is the earliest crossing, counted from the helix reference point, among:
//!
//! 1. the endcap plane on the side given by the track orientation,
//! 2. the barrel cylinder, or each polygon face in index order.
//!
//! Ties keep the first candidate in that order.

use crate::geometry::CalorimeterSurface;
use crate::helix::{Helix, HelixIntersection};
use crate::{TrackError, TrackResult, TrackState};
use log::debug;
use nalgebra::Vector2;
use std::f64::consts::TAU;

/// Which part of the calorimeter surface a projection landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceRegion {
    Endcap,
    /// Cylindrical barrel
    Barrel,
    /// Polygonal barrel face, by index
    BarrelFace(u32),
}

/// Result of projecting a helix onto the calorimeter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalorimeterProjection {
    pub region: SurfaceRegion,
    /// Helix time from the reference point; negative only for the endcap fallback
    pub time: f64,
    pub state: TrackState,
}

/// Project `helix` onto the calorimeter inner surface.
///
/// `sign_pz` (±1) selects the endcap plane. When no surface is reached at a
/// non-negative time, the endcap-plane crossing is used whatever its sign;
/// a helix without longitudinal motion that never reaches the barrel has no
/// projection.
pub fn project_to_calorimeter(
    helix: &Helix,
    sign_pz: f64,
    surface: &CalorimeterSurface,
) -> TrackResult<CalorimeterProjection> {
    let endcap = helix.point_in_z(sign_pz.signum() * surface.endcap_z);

    let mut best: Option<(SurfaceRegion, HelixIntersection)> = None;
    let mut consider = |region: SurfaceRegion, candidate: Option<HelixIntersection>| {
        if let Some(hit) = candidate {
            let closer = match &best {
                Some((_, current)) => hit.time < current.time,
                None => true,
            };
            if hit.time >= 0.0 && closer {
                best = Some((region, hit));
            }
        }
    };

    consider(SurfaceRegion::Endcap, endcap);

    if surface.symmetry_order == 0 {
        consider(
            SurfaceRegion::Barrel,
            helix.point_on_circle(surface.barrel_radius),
        );
    } else {
        for face in 0..surface.symmetry_order {
            let (origin, direction) = barrel_face(surface, face);
            consider(
                SurfaceRegion::BarrelFace(face),
                helix.point_in_xy(origin, direction),
            );
        }
    }

    let (region, hit) = match best.or_else(|| endcap.map(|hit| (SurfaceRegion::Endcap, hit))) {
        Some(found) => found,
        None => return Err(TrackError::NoCalorimeterIntersection),
    };

    debug!(
        "Projected to {:?} at ({:.1}, {:.1}, {:.1}), t = {:.3}",
        region, hit.point.x, hit.point.y, hit.point.z, hit.time
    );

    Ok(CalorimeterProjection {
        region,
        time: hit.time,
        state: TrackState::new(hit.point, helix.momentum_at(&hit.point)),
    })
}

/// Point at the centre of a polygon face and the direction along the face.
fn barrel_face(surface: &CalorimeterSurface, face: u32) -> (Vector2<f64>, Vector2<f64>) {
    let angle = TAU * f64::from(face) / f64::from(surface.symmetry_order) + surface.phi0;
    let (sin, cos) = angle.sin_cos();
    (
        Vector2::new(surface.barrel_radius * cos, surface.barrel_radius * sin),
        Vector2::new(-sin, cos),
    )
}
