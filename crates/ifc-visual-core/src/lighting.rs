// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lighting set: one ambient light and one directional light
//!
//! The directional light shines from its position towards a target node.
//! The target is a scene node of its own and must be installed alongside the
//! light, otherwise the light has no direction.

use crate::config::LightingConfig;
use crate::scene::{NodeId, NodeKind, SceneGraph};
use nalgebra::{Point3, Vector3};

/// Uniform fill light
#[derive(Clone, Debug, PartialEq)]
pub struct AmbientLight {
    /// Linear RGB
    pub color: [f32; 3],
    pub intensity: f32,
}

/// Light with a position and a target node
#[derive(Clone, Debug, PartialEq)]
pub struct DirectionalLight {
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: Point3<f32>,
    /// Scene node the light points at
    pub target: NodeId,
}

/// Node ids of an installed lighting set
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LightingSet {
    pub ambient: NodeId,
    pub directional: NodeId,
    pub target: NodeId,
}

impl LightingSet {
    /// Add ambient light, directional light and the light target to `scene`
    pub fn install(config: &LightingConfig, scene: &mut SceneGraph) -> Self {
        let color = rgb_from_hex(config.color);
        let [tx, ty, tz] = config.directional_target;
        let [px, py, pz] = config.directional_position;

        let ambient = scene.add(NodeKind::AmbientLight(AmbientLight {
            color,
            intensity: config.ambient_intensity,
        }));
        // Target first so the light can reference it
        let target = scene.add(NodeKind::LightTarget {
            position: Point3::new(tx, ty, tz),
        });
        let directional = scene.add(NodeKind::DirectionalLight(DirectionalLight {
            color,
            intensity: config.directional_intensity,
            position: Point3::new(px, py, pz),
            target,
        }));

        log::debug!(
            "[Lighting] Installed ambient {:?}, directional {:?} -> target {:?}",
            ambient,
            directional,
            target
        );

        Self {
            ambient,
            directional,
            target,
        }
    }
}

/// Direction the light travels, from `position` towards `target`.
/// Degenerate configurations point straight down.
pub fn light_direction(position: Point3<f32>, target: Point3<f32>) -> Vector3<f32> {
    let dir = target - position;
    if dir.norm_squared() > f32::EPSILON {
        dir.normalize()
    } else {
        -Vector3::y()
    }
}

/// Convert 0xRRGGBB into linear-ish [0, 1] RGB
pub fn rgb_from_hex(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_install_adds_target_node() {
        let mut scene = SceneGraph::new();
        let lights = LightingSet::install(&LightingConfig::default(), &mut scene);

        assert!(scene.contains(lights.ambient));
        assert!(scene.contains(lights.directional));
        assert!(scene.contains(lights.target));
        assert!(scene.validate().is_ok());

        let (light, target) = scene.directional_light().unwrap();
        assert_eq!(light.position, Point3::new(0.0, 10.0, 0.0));
        assert_eq!(target, Point3::new(-5.0, 0.0, 0.0));
        assert_eq!(light.intensity, 1.0);

        let ambient = scene.ambient_light().unwrap();
        assert_eq!(ambient.color, [1.0, 1.0, 1.0]);
        assert_eq!(ambient.intensity, 0.5);
    }

    #[test]
    fn test_light_direction() {
        let dir = light_direction(Point3::new(0.0, 10.0, 0.0), Point3::new(-5.0, 0.0, 0.0));
        assert_relative_eq!(dir.norm(), 1.0, epsilon = 1e-6);
        assert!(dir.x < 0.0 && dir.y < 0.0);

        let degenerate = light_direction(Point3::origin(), Point3::origin());
        assert_eq!(degenerate, -Vector3::y());
    }

    #[test]
    fn test_rgb_from_hex() {
        assert_eq!(rgb_from_hex(0xffffff), [1.0, 1.0, 1.0]);
        assert_eq!(rgb_from_hex(0xff0000), [1.0, 0.0, 0.0]);
        assert_eq!(rgb_from_hex(0x000000), [0.0, 0.0, 0.0]);
    }
}
