//! Build track descriptors for a small synthetic event.
//!
//! Run with: RUST_LOG=debug cargo run --example basic_event

use track_creator::helix::Helix;
use track_creator::{
    CollectingSink, DetectorGeometry, Event, GeometryParameters, Hit, TrackCreator,
    TrackCreatorSettings, TrackHandle, TrackParameters, Trajectory, VertexRecord,
};

/// A trajectory whose hits lie exactly on its own helix.
fn make_track(id: u64, params: TrackParameters, n_hits: usize, b_field: f64) -> Trajectory {
    let helix = Helix::from_canonical(&params, b_field).unwrap();
    let pt = helix.momentum().xy().norm();
    let hits = (0..n_hits)
        .map(|i| {
            let arc = 350.0 + 100.0 * i as f64;
            Hit::from(helix.position_at(arc / pt))
        })
        .collect();
    Trajectory::new(TrackHandle(id), params, hits)
}

fn main() {
    env_logger::init();

    let geometry = DetectorGeometry::new(&GeometryParameters::default()).unwrap();
    let b_field = geometry.b_field();
    let creator = TrackCreator::new(TrackCreatorSettings::default(), geometry);

    let params = |d0, phi, omega, tan_lambda| TrackParameters {
        d0,
        z0: 0.05,
        phi,
        omega,
        tan_lambda,
    };

    let tracks = vec![
        // Soft primary pion
        make_track(1, params(0.01, 0.3, 1.0 / 667.0, 1.0), 15, b_field),
        // Stiff central track
        make_track(2, params(0.02, 2.0, -1.0 / 4000.0, 0.2), 14, b_field),
        // Kaon and its decay muon
        make_track(3, params(0.01, -1.0, 1.0 / 1500.0, 0.5), 15, b_field),
        make_track(4, params(25.0, -0.7, -1.0 / 600.0, 0.6), 15, b_field),
        // Lambda decay products
        make_track(5, params(40.0, 1.2, 1.0 / 2500.0, -0.4), 20, b_field),
        make_track(6, params(40.0, 1.5, -1.0 / 500.0, -0.4), 12, b_field),
        // Too few hits to be used
        make_track(7, params(0.1, 0.8, 1.0 / 900.0, 0.3), 3, b_field),
    ];

    let mut event = Event::new();
    event.add_tracks("MarlinTrkTracks", tracks);
    event.add_vertices(
        "KinkVertices",
        vec![VertexRecord::new(321, vec![TrackHandle(3), TrackHandle(4)])],
    );
    event.add_vertices(
        "V0Vertices",
        vec![VertexRecord::new(3122, vec![TrackHandle(5), TrackHandle(6)])],
    );

    let mut sink = CollectingSink::default();
    let summary = creator.process_event(&event, &mut sink).unwrap();

    println!("Track Creation Example\n");
    println!(
        "Vertices: {} accepted, {} vetoed, {} malformed",
        summary.associations.accepted, summary.associations.vetoed, summary.associations.malformed
    );
    println!(
        "Tracks:   {} created, {} rejected, {} skipped\n",
        summary.tracks.created, summary.tracks.rejected, summary.tracks.skipped
    );

    for track in &sink.tracks {
        println!(
            "{}: id {:>5}  |p| {:.3} GeV  reaches ECal: {:<5}  PFO: {:<5}  clusterless: {}",
            track.handle,
            track.particle_id,
            track.momentum_at_dca.norm(),
            track.reaches_calorimeter,
            track.can_form_pfo,
            track.can_form_clusterless_pfo
        );
        println!("    calorimeter {}", track.state_at_calorimeter);
    }

    println!();
    for relationship in &sink.relationships {
        println!("{:?}", relationship);
    }
}
