// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewer configuration
//!
//! Every constant of the scene lifecycle lives here with its default. The
//! host may pass a partial JSON object; missing fields keep their defaults.

use crate::{Result, VisualError};
use serde::{Deserialize, Serialize};

/// Top-level viewer configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
    pub camera: CameraConfig,
    pub navigation: NavigationConfig,
    pub lighting: LightingConfig,
    pub helpers: HelperConfig,
    pub render_loop: LoopConfig,
    pub surface: SurfaceConfig,
}

impl ViewerConfig {
    /// Parse a (possibly partial) JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reject values the camera, navigation or surface cannot work with
    pub fn validate(&self) -> Result<()> {
        let camera = &self.camera;
        if !(camera.fov > 0.0 && camera.fov < 180.0) {
            return Err(VisualError::config_value(format!(
                "camera.fov must be in (0, 180), got {}",
                camera.fov
            )));
        }
        if !(camera.near.is_finite() && camera.near > 0.0) {
            return Err(VisualError::config_value(format!(
                "camera.near must be positive, got {}",
                camera.near
            )));
        }
        if !(camera.far.is_finite() && camera.far > camera.near) {
            return Err(VisualError::config_value(format!(
                "camera.far must be greater than near ({}), got {}",
                camera.near, camera.far
            )));
        }
        if !all_finite(&camera.position) {
            return Err(VisualError::config_value("camera.position must be finite"));
        }

        let nav = &self.navigation;
        if !all_finite(&nav.target) {
            return Err(VisualError::config_value("navigation.target must be finite"));
        }
        if !(nav.min_distance >= 0.0) {
            return Err(VisualError::config_value(format!(
                "navigation.minDistance must be non-negative, got {}",
                nav.min_distance
            )));
        }
        if !(nav.max_distance >= nav.min_distance) {
            return Err(VisualError::config_value(format!(
                "navigation.maxDistance ({}) must not be below minDistance ({})",
                nav.max_distance, nav.min_distance
            )));
        }
        let factors = [
            ("dampingFactor", nav.damping_factor),
            ("rotateSpeed", nav.rotate_speed),
            ("panSpeed", nav.pan_speed),
            ("zoomSpeed", nav.zoom_speed),
        ];
        if let Some((name, value)) = factors.iter().find(|(_, v)| !v.is_finite()) {
            return Err(VisualError::config_value(format!(
                "navigation.{} must be finite, got {}",
                name, value
            )));
        }

        let ratio = self.surface.max_pixel_ratio;
        if !(ratio.is_finite() && ratio > 0.0) {
            return Err(VisualError::config_value(format!(
                "surface.maxPixelRatio must be positive, got {}",
                ratio
            )));
        }
        Ok(())
    }
}

fn all_finite(values: &[f32; 3]) -> bool {
    values.iter().all(|v| v.is_finite())
}

/// Perspective camera parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Initial camera position
    pub position: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 0.1,
            far: 2000.0,
            position: [8.0, 13.0, 15.0],
        }
    }
}

/// Orbit navigation parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NavigationConfig {
    /// Point the camera orbits around
    pub target: [f32; 3],
    pub enable_damping: bool,
    /// Fraction of the pending motion applied per frame
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            target: [-2.0, 0.0, 0.0],
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            pan_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.01,
            max_distance: f32::INFINITY,
        }
    }
}

/// Ambient + directional light parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LightingConfig {
    /// 0xRRGGBB
    pub color: u32,
    pub ambient_intensity: f32,
    pub directional_intensity: f32,
    pub directional_position: [f32; 3],
    pub directional_target: [f32; 3],
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            color: 0xffffff,
            ambient_intensity: 0.5,
            directional_intensity: 1.0,
            directional_position: [0.0, 10.0, 0.0],
            directional_target: [-5.0, 0.0, 0.0],
        }
    }
}

/// Grid and axes helpers
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HelperConfig {
    pub grid_size: f32,
    pub grid_divisions: u32,
    pub axes_size: f32,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            grid_size: 50.0,
            grid_divisions: 30,
            axes_size: 1.0,
        }
    }
}

/// Render loop failure policy
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoopConfig {
    /// Consecutive failed frames tolerated before the loop stops
    pub max_consecutive_failures: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_consecutive_failures: 60,
        }
    }
}

/// Draw surface and DOM wiring
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SurfaceConfig {
    /// Upper bound on the device pixel ratio used for the backing store
    pub max_pixel_ratio: f32,
    pub canvas_id: String,
    pub file_input_id: String,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            max_pixel_ratio: 2.0,
            canvas_id: "three-canvas".to_string(),
            file_input_id: "file-input".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.camera.fov, 75.0);
        assert_eq!(config.camera.position, [8.0, 13.0, 15.0]);
        assert_eq!(config.navigation.target, [-2.0, 0.0, 0.0]);
        assert!(config.navigation.enable_damping);
        assert_eq!(config.surface.max_pixel_ratio, 2.0);
        assert_eq!(config.helpers.grid_divisions, 30);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            ViewerConfig::from_json(r#"{"camera":{"fov":60},"renderLoop":{"maxConsecutiveFailures":3}}"#)
                .unwrap();
        assert_eq!(config.camera.fov, 60.0);
        assert_eq!(config.camera.near, 0.1);
        assert_eq!(config.render_loop.max_consecutive_failures, 3);
        assert_eq!(config.lighting, LightingConfig::default());
    }

    #[test]
    fn test_malformed_json() {
        assert!(ViewerConfig::from_json("{camera:").is_err());
    }

    #[test]
    fn test_defaults_validate() {
        assert!(ViewerConfig::default().validate().is_ok());
        assert!(ViewerConfig::default().navigation.min_distance > 0.0);
    }

    fn rejected(json: &str) -> bool {
        matches!(
            ViewerConfig::from_json(json).unwrap().validate(),
            Err(VisualError::ConfigValue(_))
        )
    }

    #[test]
    fn test_validate_rejects_inverted_distance_range() {
        assert!(rejected(r#"{"navigation":{"minDistance":10,"maxDistance":5}}"#));
        assert!(rejected(r#"{"navigation":{"minDistance":-1}}"#));
    }

    #[test]
    fn test_validate_rejects_degenerate_frustum() {
        assert!(rejected(r#"{"camera":{"near":1,"far":1}}"#));
        assert!(rejected(r#"{"camera":{"near":5,"far":2}}"#));
        assert!(rejected(r#"{"camera":{"near":0}}"#));
        assert!(rejected(r#"{"camera":{"fov":180}}"#));
        assert!(rejected(r#"{"camera":{"fov":0}}"#));
    }

    #[test]
    fn test_validate_rejects_non_positive_pixel_ratio() {
        assert!(rejected(r#"{"surface":{"maxPixelRatio":0}}"#));
    }

    #[test]
    fn test_validate_rejects_nan() {
        let mut config = ViewerConfig::default();
        config.navigation.zoom_speed = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = ViewerConfig::default();
        config.navigation.max_distance = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = ViewerConfig::default();
        config.camera.position[1] = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_bounded_distance_range() {
        let config =
            ViewerConfig::from_json(r#"{"navigation":{"minDistance":2,"maxDistance":2}}"#).unwrap();
        assert!(config.validate().is_ok());
    }
}
