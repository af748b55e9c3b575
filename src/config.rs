//! JSON configuration for the track creator.
//!
//! Both documents are plain JSON objects whose keys are the field names of
//! [`TrackCreatorSettings`] and [`GeometryParameters`]. Missing keys take
//! their default values, so a file only needs the options it changes:
//!
//! ```json
//! {
//!   "track_collections": ["SiliconTracks", "ForwardTracks"],
//!   "min_track_hits": 4,
//!   "should_form_track_relationships": false
//! }
//! ```

use crate::creator::TrackCreatorSettings;
use crate::geometry::{DetectorGeometry, GeometryParameters};
use crate::{TrackError, TrackResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings and geometry in one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatorConfig {
    pub settings: TrackCreatorSettings,
    pub geometry: GeometryParameters,
}

/// Parse and validate creator settings from a JSON string.
pub fn parse_settings(json: &str) -> TrackResult<TrackCreatorSettings> {
    let settings: TrackCreatorSettings = parse(json)?;
    settings.validate()?;
    Ok(settings)
}

/// Parse geometry parameters from a JSON string and validate them.
///
/// Geometry inconsistencies are reported as [`TrackError::InvalidGeometry`].
pub fn parse_geometry(json: &str) -> TrackResult<DetectorGeometry> {
    let params: GeometryParameters = parse(json)?;
    DetectorGeometry::new(&params)
}

/// Load creator settings from a JSON file.
pub fn load_settings(path: &Path) -> TrackResult<TrackCreatorSettings> {
    parse_settings(&read(path)?)
}

/// Load and validate detector geometry from a JSON file.
pub fn load_geometry(path: &Path) -> TrackResult<DetectorGeometry> {
    parse_geometry(&read(path)?)
}

/// Load a combined settings + geometry document.
pub fn load_config(path: &Path) -> TrackResult<(TrackCreatorSettings, DetectorGeometry)> {
    let config: CreatorConfig = parse(&read(path)?)?;
    config.settings.validate()?;
    let geometry = DetectorGeometry::new(&config.geometry)?;
    Ok((config.settings, geometry))
}

fn read(path: &Path) -> TrackResult<String> {
    fs::read_to_string(path)
        .map_err(|e| TrackError::Config(format!("Failed to read config {}: {e}", path.display())))
}

fn parse<T: DeserializeOwned>(json: &str) -> TrackResult<T> {
    serde_json::from_str(json).map_err(|e| TrackError::Config(format!("Failed to parse config: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_use_defaults() {
        let settings = parse_settings(
            r#"{ "track_collections": ["SiliconTracks"], "min_track_hits": 4 }"#,
        )
        .unwrap();
        assert_eq!(settings.track_collections, vec!["SiliconTracks".to_string()]);
        assert_eq!(settings.min_track_hits, 4);
        assert_eq!(settings.max_track_hits, 5000);
        assert_eq!(settings.v0_vertex_collections, vec!["V0Vertices".to_string()]);
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(parse_settings("{}").unwrap(), TrackCreatorSettings::default());
        let geometry = parse_geometry("{}").unwrap();
        assert_eq!(geometry.b_field(), 3.5);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_settings("{ not json"), Err(TrackError::Config(_))));
        assert!(matches!(
            parse_settings(r#"{ "min_track_hits": "five" }"#),
            Err(TrackError::Config(_))
        ));
        assert!(matches!(
            parse_settings(r#"{ "min_track_hits": 10, "max_track_hits": 5 }"#),
            Err(TrackError::Config(_))
        ));
    }

    #[test]
    fn test_inconsistent_geometry() {
        let result = parse_geometry(r#"{ "ftd_z_positions": [] }"#);
        assert!(matches!(result, Err(TrackError::InvalidGeometry(_))));
    }

    #[test]
    fn test_round_trip_through_file() {
        let config = CreatorConfig {
            settings: TrackCreatorSettings {
                hits_for_helix_fits: 30,
                ..TrackCreatorSettings::default()
            },
            geometry: GeometryParameters {
                ecal_symmetry_order: 12,
                ..GeometryParameters::default()
            },
        };
        let path = std::env::temp_dir().join(format!("track-creator-{}.json", std::process::id()));
        fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        let (settings, geometry) = load_config(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(settings.hits_for_helix_fits, 30);
        assert_eq!(geometry.calorimeter().symmetry_order, 12);
    }

    #[test]
    fn test_missing_file() {
        let result = load_settings(Path::new("/nonexistent/track-creator.json"));
        assert!(matches!(result, Err(TrackError::Config(_))));
    }
}
