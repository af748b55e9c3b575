//! # Trajectory Fitting
//!
//! Turns the hits of a trajectory into the four track states the
//! particle-flow engine needs.
//!
//! ## Algorithm
//!
//! 1. Evaluate the canonical helix at its point of closest approach to obtain
//!    the momentum at the DCA.
//! 2. Sort the hits by z (then by radius). The track is taken to move towards
//!    +z when `|zMin| < |zMax|`, otherwise towards -z. A track whose hits
//!    share one z is taken to move outwards from its innermost hit.
//! 3. Fit a helix to the first K hits and, independently, to the last K hits
//!    (K = `hits_for_fit`, capped by the hit count):
//!    - algebraic (Kåsa) circle fit in the transverse plane,
//!    - linear fit of the unwrapped azimuth about the centre against z.
//! 4. Anchor the front helix at zMin and the back helix at zMax. The start
//!    state belongs to the helix the track leaves from, the end state to the
//!    other one.
//! 5. Project either the canonical helix or the end helix onto the
//!    calorimeter.
//!
//! ## Degenerate Hit Sets
//!
//! | Hits | End helix |
//! |------|-----------|
//! | fewer than three, or collinear in the transverse plane | circle of the canonical helix |
//! | all at one z | circle without longitudinal motion, charge of the canonical helix |
//! | no circle at all (straight canonical helix) | straight line, transverse position linear in z |

use crate::geometry::DetectorGeometry;
use crate::helix::{Helix, HelixFit};
use crate::projection::{project_to_calorimeter, CalorimeterProjection};
use crate::{Hit, TrackError, TrackResult, TrackState, Trajectory};
use nalgebra::{Matrix2, Vector2, Vector3};
use std::f64::consts::{PI, TAU};

/// Relative size below which the circle-fit normal matrix is treated as
/// singular (hits on a straight line).
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Relative z extent below which hits are taken to share one z.
const FLAT_TOLERANCE: f64 = 1e-9;

/// Fit options, a subset of the creator settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    /// Maximum number of hits used for each end fit. Default: 50
    pub hits_for_fit: usize,
    /// Project the end helix instead of the canonical helix. Default: true
    pub project_end_helix: bool,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            hits_for_fit: 50,
            project_end_helix: true,
        }
    }
}

/// States of a fitted trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedTrack {
    /// Momentum at the point of closest approach to the origin (GeV)
    pub momentum_at_dca: Vector3<f64>,
    pub state_at_start: TrackState,
    pub state_at_end: TrackState,
    pub calorimeter: CalorimeterProjection,
    /// +1 when the track moves towards +z, -1 otherwise
    pub sign_pz: f64,
}

/// Which end of the z-sorted hits a helix is fitted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackEnd {
    /// Anchored at the first hit
    Front,
    /// Anchored at the last hit
    Back,
}

/// Fit the helices of a trajectory and project it onto the calorimeter.
///
/// # Errors
///
/// - [`TrackError::InsufficientHits`] with fewer than two hits
/// - [`TrackError::DegenerateFit`] for non-finite curvature, or a straight
///   track without transverse motion
/// - [`TrackError::NoCalorimeterIntersection`] when the projected helix
///   reaches no calorimeter surface
pub fn fit_track_helices(
    trajectory: &Trajectory,
    geometry: &DetectorGeometry,
    options: &FitOptions,
) -> TrackResult<FittedTrack> {
    let n = trajectory.hits.len();
    if n < 2 {
        return Err(TrackError::InsufficientHits { found: n });
    }

    let b_field = geometry.b_field();
    let canonical = Helix::from_canonical(&trajectory.parameters, b_field)?;

    let mut hits = trajectory.hits.clone();
    hits.sort_by(|a, b| a.z.total_cmp(&b.z).then(a.radius().total_cmp(&b.radius())));

    let z_min = hits[0].z;
    let z_max = hits[n - 1].z;
    let sign_pz = if shares_one_z(z_min, z_max) || z_min.abs() < z_max.abs() {
        1.0
    } else {
        -1.0
    };

    let k = options.hits_for_fit.clamp(1, n);
    let front = fit_helix(&hits[..k], TrackEnd::Front, &canonical, b_field, sign_pz)?;
    let back = fit_helix(&hits[n - k..], TrackEnd::Back, &canonical, b_field, sign_pz)?;
    let (start, end) = if sign_pz > 0.0 {
        (front, back)
    } else {
        (back, front)
    };

    let projected = if options.project_end_helix {
        &end
    } else {
        &canonical
    };
    let calorimeter = project_to_calorimeter(projected, sign_pz, geometry.calorimeter())?;

    Ok(FittedTrack {
        momentum_at_dca: canonical.momentum(),
        state_at_start: start.state(),
        state_at_end: end.state(),
        calorimeter,
        sign_pz,
    })
}

// ============================================================================
// Least-Squares Fits
// ============================================================================

/// Fit a helix to hits sorted by z, anchored at the `end` hit.
///
/// `prior` stands in for what the hits cannot constrain: its circle when
/// they do not define one, its charge when they share one z, its direction
/// when it is a straight line. `sign_pz` is the orientation of the track
/// along z.
pub fn fit_helix(
    hits: &[Hit],
    end: TrackEnd,
    prior: &Helix,
    b_field: f64,
    sign_pz: f64,
) -> TrackResult<Helix> {
    let (first, last) = match (hits.first(), hits.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(TrackError::InsufficientHits { found: 0 }),
    };
    let anchor = match end {
        TrackEnd::Front => first.position(),
        TrackEnd::Back => last.position(),
    };
    let flat = shares_one_z(first.z, last.z);

    match fit_circle(hits).or_else(|| prior.circle()) {
        Some((centre, radius)) if !flat => {
            let fit = fit_pitch(hits, centre, radius)?;
            Helix::from_fit(&fit, b_field, sign_pz, anchor.z)
        }
        Some((centre, radius)) if prior.charge() != 0.0 => {
            Helix::transverse(centre, radius, prior.charge(), b_field, &anchor)
        }
        _ => fit_straight(hits, &anchor, prior, sign_pz, flat),
    }
}

/// Azimuth about the centre against z, unwrapped along the hits.
fn fit_pitch(hits: &[Hit], centre: Vector2<f64>, radius: f64) -> TrackResult<HelixFit> {
    let mut azimuths = Vec::with_capacity(hits.len());
    let mut previous: Option<f64> = None;
    for hit in hits {
        let raw = (hit.y - centre.y).atan2(hit.x - centre.x);
        let phi = match previous {
            Some(last) => last + wrap_angle(raw - last),
            None => raw,
        };
        azimuths.push(phi);
        previous = Some(phi);
    }

    let (bz, phase0) = fit_line(hits.iter().map(|h| h.z).zip(azimuths.iter().copied()))
        .ok_or_else(|| {
            TrackError::DegenerateFit(format!("{} hits share a single z", hits.len()))
        })?;

    Ok(HelixFit {
        x_centre: centre.x,
        y_centre: centre.y,
        radius,
        bz,
        phase0,
    })
}

/// Straight line through the hits, transverse position linear in z.
///
/// Hits at one z keep the direction of `prior` and pass through the anchor.
fn fit_straight(
    hits: &[Hit],
    anchor: &Vector3<f64>,
    prior: &Helix,
    sign_pz: f64,
    flat: bool,
) -> TrackResult<Helix> {
    if flat {
        let heading = prior.momentum();
        return Helix::straight(*anchor, Vector3::new(heading.x, heading.y, 0.0));
    }

    let along = |coordinate: fn(&Hit) -> f64| {
        fit_line(hits.iter().map(|h| (h.z, coordinate(h)))).ok_or_else(|| {
            TrackError::DegenerateFit(format!("{} hits share a single z", hits.len()))
        })
    };
    let (slope_x, offset_x) = along(|h| h.x)?;
    let (slope_y, offset_y) = along(|h| h.y)?;

    let point = Vector3::new(
        slope_x * anchor.z + offset_x,
        slope_y * anchor.z + offset_y,
        anchor.z,
    );
    Helix::straight(point, Vector3::new(slope_x, slope_y, 1.0) * sign_pz)
}

/// Whether `z_first..=z_last` is too short to measure a pitch over.
fn shares_one_z(z_first: f64, z_last: f64) -> bool {
    z_last - z_first <= FLAT_TOLERANCE * (1.0 + z_first.abs().max(z_last.abs()))
}

/// Algebraic circle fit on centroid-shifted coordinates.
///
/// Solves the normal equations of `u² + v² = 2·a·u + 2·b·v + c` for the
/// centre `(a, b)` in shifted coordinates.
fn fit_circle(hits: &[Hit]) -> Option<(Vector2<f64>, f64)> {
    if hits.len() < 3 {
        return None;
    }

    let n = hits.len() as f64;
    let mean = hits
        .iter()
        .fold(Vector2::zeros(), |acc, h| acc + Vector2::new(h.x, h.y))
        / n;

    let (mut suu, mut suv, mut svv) = (0.0, 0.0, 0.0);
    let (mut suuu_vv, mut svuu_vv, mut sr2) = (0.0, 0.0, 0.0);
    for hit in hits {
        let u = hit.x - mean.x;
        let v = hit.y - mean.y;
        let r2 = u * u + v * v;
        suu += u * u;
        suv += u * v;
        svv += v * v;
        suuu_vv += u * r2;
        svuu_vv += v * r2;
        sr2 += r2;
    }

    let normal = Matrix2::new(suu, suv, suv, svv);
    if normal.determinant().abs() <= SINGULAR_TOLERANCE * suu * svv {
        return None;
    }
    let rhs = Vector2::new(suuu_vv, svuu_vv) * 0.5;
    let shifted = normal.lu().solve(&rhs)?;

    let radius = (shifted.norm_squared() + sr2 / n).sqrt();
    radius
        .is_finite()
        .then_some((shifted + mean, radius))
}

/// Least-squares line `y = slope · x + intercept`; `None` when all x coincide.
fn fit_line(points: impl Iterator<Item = (f64, f64)>) -> Option<(f64, f64)> {
    let points: Vec<(f64, f64)> = points.collect();
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

    let (sxx, sxy) = points.iter().fold((0.0, 0.0), |(sxx, sxy), &(x, y)| {
        let dx = x - mean_x;
        (sxx + dx * dx, sxy + dx * (y - mean_y))
    });
    if sxx <= 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    Some((slope, mean_y - slope * mean_x))
}

/// Wrap an angle difference into (-π, π].
fn wrap_angle(delta: f64) -> f64 {
    let wrapped = (delta + PI).rem_euclid(TAU) - PI;
    if wrapped == -PI {
        PI
    } else {
        wrapped
    }
}
