#![allow(dead_code)]

use nalgebra::Vector3;
use track_creator::helix::Helix;
use track_creator::{Hit, TrackHandle, TrackParameters, Trajectory};

pub const B_FIELD: f64 = 3.5;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn parameters(d0: f64, z0: f64, phi: f64, omega: f64, tan_lambda: f64) -> TrackParameters {
    TrackParameters {
        d0,
        z0,
        phi,
        omega,
        tan_lambda,
    }
}

/// Hits sampled along the trajectory's own helix, evenly in transverse arc
/// length between `from` and `to` (mm).
pub fn helix_hits(params: &TrackParameters, from: f64, to: f64, count: usize) -> Vec<Hit> {
    let helix = Helix::from_canonical(params, B_FIELD).expect("finite curvature");
    let pt = helix.momentum().xy().norm();
    (0..count)
        .map(|i| {
            let step = if count > 1 {
                (to - from) * i as f64 / (count - 1) as f64
            } else {
                0.0
            };
            Hit::from(helix.position_at((from + step) / pt))
        })
        .collect()
}

pub fn trajectory(id: u64, params: TrackParameters, hits: Vec<Hit>) -> Trajectory {
    Trajectory::new(TrackHandle(id), params, hits)
}

pub fn radius(v: &Vector3<f64>) -> f64 {
    v.xy().norm()
}
