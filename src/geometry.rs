//! # Detector Geometry
//!
//! Read-only description of the detector envelope used by the track creator.
//!
//! The geometry provider hands over raw [`GeometryParameters`], where the
//! forward disks arrive as parallel arrays and the outer tracking layers as
//! plain lists. [`DetectorGeometry::new`] validates them once and produces an
//! immutable snapshot that every component borrows for the rest of the run.
//!
//! ## Coordinate System
//!
//! Millimetres, with the beam along z and the interaction point at the
//! origin. The magnetic field is uniform and points along +z (Tesla).
//!
//! ## Validation
//!
//! | Check | Reason |
//! |-------|--------|
//! | forward-disk arrays non-empty and of equal length | one entry per disk |
//! | outer-tracker radii and outer-endcap z non-empty | reach classification needs both |
//! | positive, finite radii and lengths | divisions by tracker and disk sizes |
//! | positive, finite field | helix momentum scale and sign conventions |
//!
//! Any failure is a [`TrackError::InvalidGeometry`], which is fatal for the run.

use crate::{TrackError, TrackResult};

/// Raw geometry as delivered by the geometry provider.
///
/// The default describes an ILD-like reference detector.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct GeometryParameters {
    /// Main tracker (TPC) inner radius. Default: 329 mm
    pub tpc_inner_radius: f64,
    /// Main tracker outer radius. Default: 1808 mm
    pub tpc_outer_radius: f64,
    /// Main tracker half-length along z. Default: 2350 mm
    pub tpc_max_drift_length: f64,
    /// Inner radius of each forward disk (FTD)
    pub ftd_inner_radii: Vec<f64>,
    /// Outer radius of each forward disk
    pub ftd_outer_radii: Vec<f64>,
    /// z position of each forward disk
    pub ftd_z_positions: Vec<f64>,
    /// Radii of the outer tracker extension layers (SET). Default: [1833] mm
    pub set_layer_radii: Vec<f64>,
    /// z positions of the outer endcap extension layers (ETD). Default: [2426] mm
    pub etd_layer_z: Vec<f64>,
    /// Calorimeter barrel symmetry order; 0 means a cylinder. Default: 8
    pub ecal_symmetry_order: u32,
    /// Angle of the centre of the first barrel face (radians). Default: 0
    pub ecal_phi0: f64,
    /// Calorimeter barrel inner radius. Default: 1847.4 mm
    pub ecal_barrel_inner_radius: f64,
    /// Calorimeter endcap inner z. Default: 2450 mm
    pub ecal_endcap_inner_z: f64,
    /// Field z-component at the origin. Default: 3.5 T
    pub b_field: f64,
}

impl Default for GeometryParameters {
    fn default() -> Self {
        Self {
            tpc_inner_radius: 329.0,
            tpc_outer_radius: 1808.0,
            tpc_max_drift_length: 2350.0,
            ftd_inner_radii: vec![39.0, 49.6, 70.1, 100.3, 130.4, 160.5, 190.5],
            ftd_outer_radii: vec![164.1, 164.1, 308.0, 309.0, 309.0, 309.0, 309.0],
            ftd_z_positions: vec![220.0, 371.3, 644.9, 1046.1, 1447.3, 1848.5, 2250.0],
            set_layer_radii: vec![1833.0],
            etd_layer_z: vec![2426.0],
            ecal_symmetry_order: 8,
            ecal_phi0: 0.0,
            ecal_barrel_inner_radius: 1847.4,
            ecal_endcap_inner_z: 2450.0,
            b_field: 3.5,
        }
    }
}

/// The main tracker (TPC) envelope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MainTracker {
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub max_drift_length: f64,
}

impl MainTracker {
    /// Cosine of the polar angle of the line joining the origin to the
    /// tracker's inner corner.
    pub fn cos_aspect(&self) -> f64 {
        self.max_drift_length
            / (self.max_drift_length * self.max_drift_length
                + self.inner_radius * self.inner_radius)
                .sqrt()
    }
}

/// One annular forward tracking disk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForwardDisk {
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub z: f64,
}

impl ForwardDisk {
    /// Whether a track with this |tanλ| crosses the disk annulus.
    pub fn is_crossed_by(&self, abs_tan_lambda: f64) -> bool {
        abs_tan_lambda > self.z / self.outer_radius && abs_tan_lambda < self.z / self.inner_radius
    }

    /// Whether a hit lies in the annulus and within `z_tolerance` of the disk.
    pub fn contains(&self, r: f64, abs_z: f64, z_tolerance: f64) -> bool {
        r > self.inner_radius
            && r < self.outer_radius
            && abs_z - z_tolerance < self.z
            && abs_z + z_tolerance > self.z
    }
}

/// Calorimeter inner surface used for track projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalorimeterSurface {
    /// 0 for a cylindrical barrel, otherwise the number of polygon faces
    pub symmetry_order: u32,
    /// Angle of the centre of face 0
    pub phi0: f64,
    /// Cylinder radius, or distance from the axis to each polygon face
    pub barrel_radius: f64,
    /// |z| of the endcap plane
    pub endcap_z: f64,
}

/// Validated, immutable detector geometry snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorGeometry {
    main_tracker: MainTracker,
    forward_disks: Vec<ForwardDisk>,
    min_outer_tracker_radius: f64,
    min_outer_endcap_z: f64,
    calorimeter: CalorimeterSurface,
    b_field: f64,
}

impl DetectorGeometry {
    /// Validate raw geometry parameters and build the snapshot.
    pub fn new(params: &GeometryParameters) -> TrackResult<Self> {
        let n_disks = params.ftd_z_positions.len();

        if n_disks == 0 || params.etd_layer_z.is_empty() || params.set_layer_radii.is_empty() {
            return Err(TrackError::InvalidGeometry(format!(
                "empty tracking layer description (ftd: {}, etd: {}, set: {})",
                n_disks,
                params.etd_layer_z.len(),
                params.set_layer_radii.len()
            )));
        }

        if params.ftd_inner_radii.len() != n_disks || params.ftd_outer_radii.len() != n_disks {
            return Err(TrackError::InvalidGeometry(format!(
                "forward disk arrays differ in length (z: {}, inner: {}, outer: {})",
                n_disks,
                params.ftd_inner_radii.len(),
                params.ftd_outer_radii.len()
            )));
        }

        let main_tracker = MainTracker {
            inner_radius: positive("tpc_inner_radius", params.tpc_inner_radius)?,
            outer_radius: positive("tpc_outer_radius", params.tpc_outer_radius)?,
            max_drift_length: positive("tpc_max_drift_length", params.tpc_max_drift_length)?,
        };
        if main_tracker.outer_radius <= main_tracker.inner_radius {
            return Err(TrackError::InvalidGeometry(
                "tpc_outer_radius must exceed tpc_inner_radius".to_string(),
            ));
        }

        let mut forward_disks = Vec::with_capacity(n_disks);
        for i in 0..n_disks {
            let disk = ForwardDisk {
                inner_radius: params.ftd_inner_radii[i],
                outer_radius: positive("ftd_outer_radii", params.ftd_outer_radii[i])?,
                z: positive("ftd_z_positions", params.ftd_z_positions[i])?,
            };
            if !(disk.inner_radius >= 0.0 && disk.inner_radius < disk.outer_radius) {
                return Err(TrackError::InvalidGeometry(format!(
                    "forward disk {} has inner radius {} outside [0, {})",
                    i, disk.inner_radius, disk.outer_radius
                )));
            }
            forward_disks.push(disk);
        }

        let min_outer_tracker_radius = minimum("set_layer_radii", &params.set_layer_radii)?;
        let min_outer_endcap_z = minimum("etd_layer_z", &params.etd_layer_z)?;

        if !params.ecal_phi0.is_finite() {
            return Err(TrackError::InvalidGeometry("ecal_phi0 is not finite".to_string()));
        }
        let calorimeter = CalorimeterSurface {
            symmetry_order: params.ecal_symmetry_order,
            phi0: params.ecal_phi0,
            barrel_radius: positive("ecal_barrel_inner_radius", params.ecal_barrel_inner_radius)?,
            endcap_z: positive("ecal_endcap_inner_z", params.ecal_endcap_inner_z)?,
        };

        Ok(Self {
            main_tracker,
            forward_disks,
            min_outer_tracker_radius,
            min_outer_endcap_z,
            calorimeter,
            b_field: positive("b_field", params.b_field)?,
        })
    }

    pub fn main_tracker(&self) -> &MainTracker {
        &self.main_tracker
    }

    /// Forward disks in provider order; the first one is the innermost.
    pub fn forward_disks(&self) -> &[ForwardDisk] {
        &self.forward_disks
    }

    /// |tanλ| above which a track leaves the barrel through the first forward disk.
    pub fn forward_tan_lambda(&self) -> f64 {
        let first = &self.forward_disks[0];
        first.z / first.outer_radius
    }

    /// Innermost outer-tracker-extension radius.
    pub fn min_outer_tracker_radius(&self) -> f64 {
        self.min_outer_tracker_radius
    }

    /// Nearest outer-endcap-extension z.
    pub fn min_outer_endcap_z(&self) -> f64 {
        self.min_outer_endcap_z
    }

    pub fn calorimeter(&self) -> &CalorimeterSurface {
        &self.calorimeter
    }

    /// Field z-component at the origin (Tesla).
    pub fn b_field(&self) -> f64 {
        self.b_field
    }
}

fn positive(name: &str, value: f64) -> TrackResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(TrackError::InvalidGeometry(format!(
            "{} must be positive and finite, got {}",
            name, value
        )))
    }
}

fn minimum(name: &str, values: &[f64]) -> TrackResult<f64> {
    values
        .iter()
        .map(|&v| positive(name, v))
        .try_fold(f64::INFINITY, |acc, v| v.map(|v| acc.min(v)))
}
