// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Perspective camera rig
//!
//! The projection matrix is cached and recomputed lazily: changing the
//! aspect marks it dirty and [`CameraRig::update_projection_matrix`] rebuilds
//! it before the next frame is drawn.

use crate::config::CameraConfig;
use nalgebra::{Matrix4, Perspective3, Point3, Vector3};

/// Perspective camera with a cached projection
#[derive(Clone, Debug)]
pub struct CameraRig {
    position: Point3<f32>,
    /// Point the camera looks at (owned by the navigation controller)
    look_at: Point3<f32>,
    up: Vector3<f32>,
    /// Vertical field of view in degrees
    fov: f32,
    near: f32,
    far: f32,
    aspect: f32,
    projection: Matrix4<f32>,
    projection_dirty: bool,
}

impl CameraRig {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        let [x, y, z] = config.position;
        let mut rig = Self {
            position: Point3::new(x, y, z),
            look_at: Point3::origin(),
            up: Vector3::y(),
            fov: config.fov,
            near: config.near,
            far: config.far,
            aspect,
            projection: Matrix4::identity(),
            projection_dirty: true,
        };
        rig.update_projection_matrix();
        rig
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn set_position(&mut self, position: Point3<f32>) {
        self.position = position;
    }

    pub fn look_at_point(&self) -> Point3<f32> {
        self.look_at
    }

    /// Orient the camera towards `target`
    pub fn look_at(&mut self, target: Point3<f32>) {
        self.look_at = target;
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Set a new aspect ratio; the projection is rebuilt on the next update.
    /// Non-finite or non-positive values are ignored.
    pub fn set_aspect(&mut self, aspect: f32) {
        if !(aspect.is_finite() && aspect > 0.0) {
            return;
        }
        if aspect != self.aspect {
            self.aspect = aspect;
            self.projection_dirty = true;
        }
    }

    pub fn is_projection_dirty(&self) -> bool {
        self.projection_dirty
    }

    /// Rebuild the projection matrix if it is stale
    pub fn update_projection_matrix(&mut self) {
        if self.projection_dirty {
            self.projection =
                Perspective3::new(self.aspect, self.fov.to_radians(), self.near, self.far)
                    .to_homogeneous();
            self.projection_dirty = false;
        }
    }

    /// Cached projection (call `update_projection_matrix` first)
    pub fn projection_matrix(&self) -> &Matrix4<f32> {
        &self.projection
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.look_at, &self.up)
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection * self.view_matrix()
    }

    /// Unit vector pointing right in world space
    pub fn right(&self) -> Vector3<f32> {
        let forward = (self.look_at - self.position).normalize();
        let right = forward.cross(&self.up);
        if right.norm_squared() > f32::EPSILON {
            right.normalize()
        } else {
            Vector3::x()
        }
    }

    /// Unit vector pointing up in screen space
    pub fn screen_up(&self) -> Vector3<f32> {
        let forward = (self.look_at - self.position).normalize();
        self.right().cross(&forward).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_initial_state() {
        let rig = CameraRig::new(&CameraConfig::default(), 1920.0 / 1080.0);
        assert_eq!(rig.position(), Point3::new(8.0, 13.0, 15.0));
        assert_eq!(rig.fov(), 75.0);
        assert!(!rig.is_projection_dirty());
        assert_relative_eq!(rig.aspect(), 1.777_777_8, epsilon = 1e-4);
    }

    #[test]
    fn test_aspect_marks_projection_dirty() {
        let mut rig = CameraRig::new(&CameraConfig::default(), 1.0);
        let before = *rig.projection_matrix();

        rig.set_aspect(2.0);
        assert!(rig.is_projection_dirty());
        assert_eq!(*rig.projection_matrix(), before);

        rig.update_projection_matrix();
        assert!(!rig.is_projection_dirty());
        // m00 = f / aspect, so doubling the aspect halves it
        assert_relative_eq!(rig.projection_matrix()[(0, 0)], before[(0, 0)] / 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_invalid_aspect_ignored() {
        let mut rig = CameraRig::new(&CameraConfig::default(), 1.5);
        rig.set_aspect(f32::NAN);
        rig.set_aspect(0.0);
        rig.set_aspect(f32::INFINITY);
        assert_eq!(rig.aspect(), 1.5);
        assert!(!rig.is_projection_dirty());
    }

    #[test]
    fn test_view_matrix_maps_target_to_forward_axis() {
        let mut rig = CameraRig::new(&CameraConfig::default(), 1.0);
        rig.set_position(Point3::new(0.0, 0.0, 10.0));
        rig.look_at(Point3::origin());

        let target_in_view = rig.view_matrix().transform_point(&Point3::origin());
        assert_relative_eq!(target_in_view.z, -10.0, epsilon = 1e-5);
        assert_relative_eq!(rig.right(), Vector3::x(), epsilon = 1e-5);
        assert_relative_eq!(rig.screen_up(), Vector3::y(), epsilon = 1e-5);
    }
}
