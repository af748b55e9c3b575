//! # Helix Model
//!
//! A charged particle in a uniform field along z follows a helix: a circle in
//! the transverse plane combined with uniform motion along z.
//!
//! A [`Helix`] can be built from:
//!
//! - [`Helix::from_canonical`], the five canonical track parameters
//!   (d0, z0, phi, omega, tanλ), with the point of closest approach to the
//!   origin as reference point;
//! - [`Helix::from_fit`], a least-squares parameter set ([`HelixFit`]),
//!   anchored at a chosen z;
//! - [`Helix::transverse`], a circle without longitudinal motion;
//! - [`Helix::straight`], a line. Zero curvature in the canonical
//!   parameters also gives a line.
//!
//! ## Straight Tracks
//!
//! A straight track has charge 0 and an infinite radius. Its momentum is not
//! measured, so it is reported along the direction of flight with a
//! transverse component of [`STRAIGHT_TRACK_PT`].
//!
//! ## Time Parameter
//!
//! Positions along the helix are parameterised by a "time" `t` measured from
//! the reference point, such that the transverse arc length is `pT · t` and
//! the z displacement is `pz · t`. Intersections only report forward
//! crossings in the transverse plane (`t` within one turn after the reference
//! point); plane crossings in z may lie behind the reference point and report
//! a negative time.
//!
//! ## Sign Conventions
//!
//! The charge is ±1 on a circle. A positive particle in a positive field turns clockwise
//! when viewed from +z, so its azimuth about the circle centre decreases with
//! time.

use crate::{TrackError, TrackParameters, TrackResult, TrackState};
use nalgebra::{Vector2, Vector3};
use std::f64::consts::{FRAC_PI_2, TAU};

/// Transverse momentum per unit field and radius, in GeV / (T · mm).
pub const MOMENTUM_FACTOR: f64 = 2.997_924_58e-4;

/// Transverse momentum reported for a straight track (GeV).
pub const STRAIGHT_TRACK_PT: f64 = 1.0;

/// Helix parameters from a least-squares fit.
///
/// Points on the helix satisfy
/// `x = x_centre + radius · cos(bz · z + phase0)` and
/// `y = y_centre + radius · sin(bz · z + phase0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelixFit {
    pub x_centre: f64,
    pub y_centre: f64,
    pub radius: f64,
    /// Rate of change of the azimuth about the centre with z (rad/mm)
    pub bz: f64,
    pub phase0: f64,
}

/// Crossing of a helix with a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelixIntersection {
    pub time: f64,
    pub point: Vector3<f64>,
}

/// Projection of the path onto the transverse plane.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Path {
    Circle(Circle),
    /// Unit direction of flight
    Line(Vector2<f64>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Circle {
    centre: Vector2<f64>,
    radius: f64,
    /// Azimuth of the reference point about the centre
    phi_reference: f64,
}

/// A helical (or straight) trajectory with a reference point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Helix {
    path: Path,
    charge: f64,
    pxy: f64,
    pz: f64,
    reference_point: Vector3<f64>,
}

impl Helix {
    /// Build the helix described by canonical track parameters.
    ///
    /// The reference point is the point of closest approach to the origin,
    /// `(-d0 · sin(phi), d0 · cos(phi), z0)`. Zero curvature gives a straight
    /// line along `(cos(phi), sin(phi), tanλ)`.
    ///
    /// Fails when the curvature is not finite.
    pub fn from_canonical(params: &TrackParameters, b_field: f64) -> TrackResult<Self> {
        let TrackParameters {
            d0,
            z0,
            phi,
            omega,
            tan_lambda,
        } = *params;

        if !omega.is_finite() {
            return Err(TrackError::DegenerateFit(format!(
                "canonical helix needs a finite curvature (omega = {})",
                omega
            )));
        }

        let reference_point = Vector3::new(-d0 * phi.sin(), d0 * phi.cos(), z0);
        if omega == 0.0 {
            return Self::straight(
                reference_point,
                Vector3::new(phi.cos(), phi.sin(), tan_lambda),
            );
        }

        let radius = 1.0 / omega.abs();
        let charge = omega.signum();
        let pxy = MOMENTUM_FACTOR * b_field * radius;
        let centre_direction = phi - FRAC_PI_2 * charge;
        let centre = Vector2::new(
            reference_point.x + radius * centre_direction.cos(),
            reference_point.y + radius * centre_direction.sin(),
        );

        Ok(Self::circular(centre, radius, charge, pxy, tan_lambda * pxy, reference_point))
    }

    /// Build a helix from fitted parameters, anchored at `z_begin`.
    ///
    /// `sign_pz` is the orientation of the track along z (±1): together with
    /// the sign of `bz` it fixes the charge, and therefore the direction of
    /// travel.
    pub fn from_fit(fit: &HelixFit, b_field: f64, sign_pz: f64, z_begin: f64) -> TrackResult<Self> {
        let product = fit.bz * sign_pz;
        if !(product.is_finite() && product != 0.0) {
            return Err(TrackError::DegenerateFit(format!(
                "fitted helix has no z pitch (bz = {}, orientation = {})",
                fit.bz, sign_pz
            )));
        }
        if !(fit.radius.is_finite() && fit.radius > 0.0) {
            return Err(TrackError::DegenerateFit(format!(
                "fitted helix radius {} is not usable",
                fit.radius
            )));
        }

        let charge = -product.signum();
        let pxy = MOMENTUM_FACTOR * b_field * fit.radius;
        let pz = -charge * pxy / (fit.bz * fit.radius);

        let phase = fit.bz * z_begin + fit.phase0;
        let reference_point = Vector3::new(
            fit.x_centre + fit.radius * phase.cos(),
            fit.y_centre + fit.radius * phase.sin(),
            z_begin,
        );

        Ok(Self::circular(
            Vector2::new(fit.x_centre, fit.y_centre),
            fit.radius,
            charge,
            pxy,
            pz,
            reference_point,
        ))
    }

    /// Helix without longitudinal motion on the circle of `centre` and
    /// `radius`, with the reference point on the circle next to `anchor`
    /// and at its z.
    pub fn transverse(
        centre: Vector2<f64>,
        radius: f64,
        charge: f64,
        b_field: f64,
        anchor: &Vector3<f64>,
    ) -> TrackResult<Self> {
        let offset = anchor.xy() - centre;
        let distance = offset.norm();
        if !(radius.is_finite() && radius > 0.0 && charge != 0.0 && distance > 0.0) {
            return Err(TrackError::DegenerateFit(format!(
                "no transverse helix of radius {} and charge {} through the anchor",
                radius, charge
            )));
        }

        let on_circle = centre + offset * (radius / distance);
        let pxy = MOMENTUM_FACTOR * b_field * radius;
        Ok(Self::circular(
            centre,
            radius,
            charge.signum(),
            pxy,
            0.0,
            Vector3::new(on_circle.x, on_circle.y, anchor.z),
        ))
    }

    /// Straight line through `reference_point` along `direction`.
    ///
    /// Fails for a direction without transverse component.
    pub fn straight(reference_point: Vector3<f64>, direction: Vector3<f64>) -> TrackResult<Self> {
        let transverse = direction.xy().norm();
        if !(transverse.is_finite() && transverse > 0.0 && direction.z.is_finite()) {
            return Err(TrackError::DegenerateFit(format!(
                "straight track needs a transverse direction ({}, {}, {})",
                direction.x, direction.y, direction.z
            )));
        }

        Ok(Self {
            path: Path::Line(direction.xy() / transverse),
            charge: 0.0,
            pxy: STRAIGHT_TRACK_PT,
            pz: STRAIGHT_TRACK_PT * direction.z / transverse,
            reference_point,
        })
    }

    fn circular(
        centre: Vector2<f64>,
        radius: f64,
        charge: f64,
        pxy: f64,
        pz: f64,
        reference_point: Vector3<f64>,
    ) -> Self {
        let phi_reference =
            (reference_point.y - centre.y).atan2(reference_point.x - centre.x);
        Self {
            path: Path::Circle(Circle {
                centre,
                radius,
                phi_reference,
            }),
            charge,
            pxy,
            pz,
            reference_point,
        }
    }

    pub fn reference_point(&self) -> Vector3<f64> {
        self.reference_point
    }

    /// Momentum at the reference point (GeV).
    pub fn momentum(&self) -> Vector3<f64> {
        match self.path {
            Path::Circle(circle) => self.momentum_at_azimuth(circle.phi_reference),
            Path::Line(direction) => self.line_momentum(direction),
        }
    }

    /// Reference point and momentum there.
    pub fn state(&self) -> TrackState {
        TrackState::new(self.reference_point, self.momentum())
    }

    /// +1 or -1, 0 for a straight line.
    pub fn charge(&self) -> f64 {
        self.charge
    }

    /// Radius of curvature; infinite for a straight line.
    pub fn radius(&self) -> f64 {
        match self.path {
            Path::Circle(circle) => circle.radius,
            Path::Line(_) => f64::INFINITY,
        }
    }

    /// Centre and radius of the transverse circle, `None` for a straight line.
    pub fn circle(&self) -> Option<(Vector2<f64>, f64)> {
        match self.path {
            Path::Circle(circle) => Some((circle.centre, circle.radius)),
            Path::Line(_) => None,
        }
    }

    pub fn is_straight(&self) -> bool {
        matches!(self.path, Path::Line(_))
    }

    /// Momentum of the particle where it passes closest to `point` in the
    /// transverse plane.
    pub fn momentum_at(&self, point: &Vector3<f64>) -> Vector3<f64> {
        match self.path {
            Path::Circle(circle) => self.momentum_at_azimuth(
                (point.y - circle.centre.y).atan2(point.x - circle.centre.x),
            ),
            Path::Line(direction) => self.line_momentum(direction),
        }
    }

    /// Position after `time` (negative times go backwards).
    pub fn position_at(&self, time: f64) -> Vector3<f64> {
        let xy = match self.path {
            Path::Circle(circle) => {
                let phi = circle.phi_reference - self.charge * self.pxy * time / circle.radius;
                circle.centre + Vector2::new(circle.radius * phi.cos(), circle.radius * phi.sin())
            }
            Path::Line(direction) => self.reference_point.xy() + direction * (self.pxy * time),
        };
        Vector3::new(xy.x, xy.y, self.reference_point.z + self.pz * time)
    }

    /// Crossing with the plane `z = z_plane`; `None` for a helix without
    /// longitudinal motion.
    pub fn point_in_z(&self, z_plane: f64) -> Option<HelixIntersection> {
        if self.pz == 0.0 {
            return None;
        }
        let time = (z_plane - self.reference_point.z) / self.pz;
        let mut point = self.position_at(time);
        point.z = z_plane;
        time.is_finite().then_some(HelixIntersection { time, point })
    }

    /// Earliest forward crossing with the infinite line through `origin`
    /// along `direction` in the transverse plane.
    pub fn point_in_xy(
        &self,
        origin: Vector2<f64>,
        direction: Vector2<f64>,
    ) -> Option<HelixIntersection> {
        let norm = direction.norm();
        if !(norm > 0.0) {
            return None;
        }
        let a = direction / norm;

        let circle = match self.path {
            Path::Circle(circle) => circle,
            Path::Line(heading) => {
                let denominator = cross(&heading, &a);
                if denominator == 0.0 {
                    return None;
                }
                let s = cross(&(origin - self.reference_point.xy()), &a) / denominator;
                return self.line_crossing(s);
            }
        };

        let offset = origin - circle.centre;
        let bb = a.dot(&offset);
        let cc = offset.norm_squared() - circle.radius * circle.radius;
        let det = bb * bb - cc;
        if det < 0.0 {
            return None;
        }

        let root = det.sqrt();
        [-bb + root, -bb - root]
            .into_iter()
            .map(|s| {
                let p = origin + a * s;
                self.circle_crossing(&circle, (p.y - circle.centre.y).atan2(p.x - circle.centre.x))
            })
            .min_by(|first, second| first.time.total_cmp(&second.time))
    }

    /// Earliest forward crossing with the cylinder of radius `cylinder_radius`
    /// around the z axis.
    pub fn point_on_circle(&self, cylinder_radius: f64) -> Option<HelixIntersection> {
        let circle = match self.path {
            Path::Circle(circle) => circle,
            Path::Line(heading) => {
                let start = self.reference_point.xy();
                let bb = start.dot(&heading);
                let det = bb * bb - (start.norm_squared() - cylinder_radius * cylinder_radius);
                if det < 0.0 {
                    return None;
                }
                let root = det.sqrt();
                return [-bb - root, -bb + root]
                    .into_iter()
                    .find(|s| *s >= 0.0)
                    .and_then(|s| self.line_crossing(s));
            }
        };

        let distance = circle.centre.norm();
        if distance == 0.0
            || distance + circle.radius < cylinder_radius
            || circle.radius + cylinder_radius < distance
            || cylinder_radius + distance < circle.radius
        {
            return None;
        }

        let cos_star = ((cylinder_radius * cylinder_radius + distance * distance
            - circle.radius * circle.radius)
            / (2.0 * cylinder_radius * distance))
            .clamp(-1.0, 1.0);
        let phi_star = cos_star.acos();
        let phi_centre = circle.centre.y.atan2(circle.centre.x);

        [phi_centre + phi_star, phi_centre - phi_star]
            .into_iter()
            .map(|angle| {
                let p = Vector2::new(cylinder_radius * angle.cos(), cylinder_radius * angle.sin());
                self.circle_crossing(&circle, (p.y - circle.centre.y).atan2(p.x - circle.centre.x))
            })
            .min_by(|first, second| first.time.total_cmp(&second.time))
    }

    /// Crossing at azimuth `phi` about the centre, reached forward within one turn.
    fn circle_crossing(&self, circle: &Circle, phi: f64) -> HelixIntersection {
        let travelled = if self.charge > 0.0 {
            (circle.phi_reference - phi).rem_euclid(TAU)
        } else {
            (phi - circle.phi_reference).rem_euclid(TAU)
        };
        let time = travelled * circle.radius / self.pxy;
        let point = Vector3::new(
            circle.centre.x + circle.radius * phi.cos(),
            circle.centre.y + circle.radius * phi.sin(),
            self.reference_point.z + self.pz * time,
        );
        HelixIntersection { time, point }
    }

    /// Crossing `s` mm along a straight path; only forward crossings count.
    fn line_crossing(&self, s: f64) -> Option<HelixIntersection> {
        if !(s.is_finite() && s >= 0.0) {
            return None;
        }
        let time = s / self.pxy;
        Some(HelixIntersection {
            time,
            point: self.position_at(time),
        })
    }

    fn momentum_at_azimuth(&self, phi: f64) -> Vector3<f64> {
        Vector3::new(
            self.charge * self.pxy * phi.sin(),
            -self.charge * self.pxy * phi.cos(),
            self.pz,
        )
    }

    fn line_momentum(&self, direction: Vector2<f64>) -> Vector3<f64> {
        Vector3::new(self.pxy * direction.x, self.pxy * direction.y, self.pz)
    }
}

/// z component of the cross product of two transverse vectors.
fn cross(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const B_FIELD: f64 = 3.5;

    fn params(d0: f64, phi: f64, omega: f64, tan_lambda: f64) -> TrackParameters {
        TrackParameters {
            d0,
            z0: 0.0,
            phi,
            omega,
            tan_lambda,
        }
    }

    #[test]
    fn test_canonical_momentum_at_dca() {
        let omega = 1.0 / 1000.0;
        let helix = Helix::from_canonical(&params(0.0, 0.4, omega, 0.5), B_FIELD).unwrap();
        let pt = MOMENTUM_FACTOR * B_FIELD * 1000.0;
        let p = helix.momentum();
        assert_relative_eq!(p.x, pt * 0.4f64.cos(), epsilon = 1e-12);
        assert_relative_eq!(p.y, pt * 0.4f64.sin(), epsilon = 1e-12);
        assert_relative_eq!(p.z, 0.5 * pt, epsilon = 1e-12);
    }

    #[test]
    fn test_canonical_reference_point() {
        let helix = Helix::from_canonical(&params(2.0, 0.0, -0.001, 0.0), B_FIELD).unwrap();
        let r = helix.reference_point();
        assert_relative_eq!(r.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(r.y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_non_finite_curvature_rejected() {
        assert!(matches!(
            Helix::from_canonical(&params(0.0, 0.0, f64::NAN, 1.0), B_FIELD),
            Err(TrackError::DegenerateFit(_))
        ));
    }

    #[test]
    fn test_zero_curvature_is_straight() {
        let helix = Helix::from_canonical(&params(2.0, 0.5, 0.0, 0.4), B_FIELD).unwrap();
        assert!(helix.is_straight());
        assert_eq!(helix.charge(), 0.0);
        assert_eq!(helix.radius(), f64::INFINITY);
        assert!(helix.circle().is_none());

        let p = helix.momentum();
        assert_relative_eq!(p.x, STRAIGHT_TRACK_PT * 0.5f64.cos(), epsilon = 1e-12);
        assert_relative_eq!(p.y, STRAIGHT_TRACK_PT * 0.5f64.sin(), epsilon = 1e-12);
        assert_relative_eq!(p.z, 0.4 * STRAIGHT_TRACK_PT, epsilon = 1e-12);

        // Transverse arc length is pT · t
        let start = helix.reference_point();
        let later = helix.position_at(100.0 / STRAIGHT_TRACK_PT);
        assert_relative_eq!((later - start).xy().norm(), 100.0, epsilon = 1e-9);
        assert_relative_eq!(later.z - start.z, 40.0, epsilon = 1e-9);
        assert_relative_eq!(helix.momentum_at(&later), p);
    }

    #[test]
    fn test_straight_line_crossings() {
        let helix = Helix::from_canonical(&params(0.0, 0.0, 0.0, 0.5), B_FIELD).unwrap();

        let wall = helix
            .point_in_xy(Vector2::new(1000.0, 0.0), Vector2::new(0.0, 1.0))
            .unwrap();
        assert_relative_eq!(wall.point, Vector3::new(1000.0, 0.0, 500.0), epsilon = 1e-9);
        assert_relative_eq!(wall.time, 1000.0 / STRAIGHT_TRACK_PT, epsilon = 1e-9);

        // Behind the reference point, and parallel to the flight
        assert!(helix
            .point_in_xy(Vector2::new(-1000.0, 0.0), Vector2::new(0.0, 1.0))
            .is_none());
        assert!(helix
            .point_in_xy(Vector2::new(0.0, 300.0), Vector2::new(1.0, 0.0))
            .is_none());

        let cylinder = helix.point_on_circle(1500.0).unwrap();
        assert_relative_eq!(cylinder.point, Vector3::new(1500.0, 0.0, 750.0), epsilon = 1e-9);

        let plane = helix.point_in_z(-200.0).unwrap();
        assert!(plane.time < 0.0);
        assert_relative_eq!(plane.point.x, -400.0, epsilon = 1e-9);
    }

    #[test]
    fn test_straight_needs_transverse_direction() {
        let along_beam = Helix::straight(Vector3::zeros(), Vector3::new(0.0, 0.0, 1.0));
        assert!(matches!(along_beam, Err(TrackError::DegenerateFit(_))));
    }

    #[test]
    fn test_transverse_helix_stays_in_plane() {
        let centre = Vector2::new(0.0, -800.0);
        let anchor = Vector3::new(0.0, 10.0, 42.0);
        let helix = Helix::transverse(centre, 800.0, 1.0, B_FIELD, &anchor).unwrap();

        assert_relative_eq!(helix.reference_point(), Vector3::new(0.0, 0.0, 42.0), epsilon = 1e-9);
        assert_eq!(helix.momentum().z, 0.0);
        assert_relative_eq!(
            helix.momentum().xy().norm(),
            MOMENTUM_FACTOR * B_FIELD * 800.0,
            epsilon = 1e-12
        );
        assert!(helix.point_in_z(100.0).is_none());
        assert_relative_eq!(helix.position_at(500.0).z, 42.0);

        assert!(Helix::transverse(centre, 800.0, 0.0, B_FIELD, &anchor).is_err());
        assert!(Helix::transverse(centre, 800.0, 1.0, B_FIELD, &Vector3::new(0.0, -800.0, 0.0)).is_err());
    }

    #[test]
    fn test_positive_charge_turns_clockwise() {
        let helix = Helix::from_canonical(&params(0.0, 0.0, 0.001, 0.0), B_FIELD).unwrap();
        // Moving along +x, a positive particle bends towards -y
        let (centre, _) = helix.circle().unwrap();
        assert!(centre.y < 0.0);
        assert!(helix.position_at(1.0).y < 0.0);
    }

    #[test]
    fn test_momentum_tangent_along_path() {
        let helix = Helix::from_canonical(&params(0.5, 1.1, -0.002, 0.3), B_FIELD).unwrap();
        let t = 200.0;
        let dt = 1e-4;
        let velocity = (helix.position_at(t + dt) - helix.position_at(t - dt)) / (2.0 * dt);
        let momentum = helix.momentum_at(&helix.position_at(t));
        assert_relative_eq!(velocity, momentum, epsilon = 1e-6);
    }

    #[test]
    fn test_point_in_z() {
        let helix = Helix::from_canonical(&params(0.0, 0.2, 0.001, 1.0), B_FIELD).unwrap();
        let hit = helix.point_in_z(500.0).unwrap();
        assert!(hit.time > 0.0);
        assert_relative_eq!(hit.point, helix.position_at(hit.time), epsilon = 1e-9);
        assert_relative_eq!(hit.point.z, 500.0);

        let behind = helix.point_in_z(-500.0).unwrap();
        assert!(behind.time < 0.0);

        let flat = Helix::from_canonical(&params(0.0, 0.2, 0.001, 0.0), B_FIELD).unwrap();
        assert!(flat.point_in_z(500.0).is_none());
    }

    #[test]
    fn test_point_on_circle_matches_path() {
        let helix = Helix::from_canonical(&params(0.0, 0.7, 1.0 / 2000.0, 0.2), B_FIELD).unwrap();
        let hit = helix.point_on_circle(1500.0).unwrap();
        assert!(hit.time >= 0.0);
        assert_relative_eq!(hit.point.xy().norm(), 1500.0, epsilon = 1e-6);
        assert_relative_eq!(hit.point, helix.position_at(hit.time), epsilon = 1e-6);
    }

    #[test]
    fn test_curler_misses_large_cylinder() {
        // Radius 300 mm through the origin never exceeds r = 600 mm
        let helix = Helix::from_canonical(&params(0.0, 0.0, 1.0 / 300.0, 0.2), B_FIELD).unwrap();
        assert!(helix.point_on_circle(1000.0).is_none());
        assert!(helix.point_on_circle(500.0).is_some());
    }

    #[test]
    fn test_point_in_xy_first_crossing() {
        // Stiff negative track along +x bends slowly towards +y
        let helix = Helix::from_canonical(&params(0.0, 0.0, -1.0 / 20000.0, 0.0), B_FIELD).unwrap();
        let hit = helix
            .point_in_xy(Vector2::new(1000.0, 0.0), Vector2::new(0.0, 1.0))
            .unwrap();
        assert_relative_eq!(hit.point.x, 1000.0, epsilon = 1e-6);
        // Sagitta of a 20 m radius over 1 m
        assert_relative_eq!(hit.point.y, 20000.0 - (20000.0f64.powi(2) - 1.0e6).sqrt(), epsilon = 1e-6);
        assert!(hit.time >= 0.0);
        assert_relative_eq!(hit.point, helix.position_at(hit.time), epsilon = 1e-6);

        assert!(helix
            .point_in_xy(Vector2::new(1000.0, 0.0), Vector2::new(0.0, 0.0))
            .is_none());
    }

    #[test]
    fn test_from_fit_reproduces_canonical_helix() {
        let canonical = Helix::from_canonical(&params(0.0, 0.3, 1.0 / 800.0, 0.8), B_FIELD).unwrap();
        let (centre, radius) = canonical.circle().unwrap();
        // dphase/dz = -charge / (radius * tanλ)
        let bz = -canonical.charge() / (radius * 0.8);
        let start = canonical.position_at(300.0);
        let phase = (start.y - centre.y).atan2(start.x - centre.x);
        let fit = HelixFit {
            x_centre: centre.x,
            y_centre: centre.y,
            radius,
            bz,
            phase0: phase - bz * start.z,
        };

        let helix = Helix::from_fit(&fit, B_FIELD, 1.0, start.z).unwrap();
        assert_eq!(helix.charge(), canonical.charge());
        assert_relative_eq!(helix.reference_point(), start, epsilon = 1e-9);
        assert_relative_eq!(helix.momentum(), canonical.momentum_at(&start), epsilon = 1e-9);
    }

    #[test]
    fn test_from_fit_rejects_flat_pitch() {
        let fit = HelixFit {
            x_centre: 0.0,
            y_centre: 500.0,
            radius: 500.0,
            bz: 0.0,
            phase0: 0.0,
        };
        assert!(Helix::from_fit(&fit, B_FIELD, 1.0, 0.0).is_err());
    }
}
