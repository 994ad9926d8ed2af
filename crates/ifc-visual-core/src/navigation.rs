// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Orbit navigation with inertial damping
//!
//! Pointer input accumulates pending rotation / pan / zoom. [`advance`]
//! integrates a fraction of the pending motion into the camera once per
//! frame and decays the remainder, so it has to run every frame even when no
//! input arrived.
//!
//! [`advance`]: NavigationController::advance

use crate::camera::CameraRig;
use crate::config::NavigationConfig;
use nalgebra::{Point3, Vector3};
use std::f32::consts::PI;

/// Keeps the polar angle away from the poles
const POLAR_EPSILON: f32 = 1e-6;
/// Pending motion below this is treated as settled
const REST_THRESHOLD: f32 = 1e-6;
/// Camera displacement below this does not count as movement
const MOVE_EPSILON: f32 = 1e-4;
/// Wheel zoom step base (per notch, raised to zoom speed)
const ZOOM_BASE: f32 = 0.95;

/// Pointer buttons the controller reacts to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// What a drag gesture does
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragMode {
    Rotate,
    Pan,
    Dolly,
}

#[derive(Clone, Copy, Debug)]
struct DragState {
    mode: DragMode,
    last: (f32, f32),
}

/// Spherical coordinates around the target (Y up)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Spherical {
    radius: f32,
    /// Polar angle from +Y
    phi: f32,
    /// Azimuth around Y, measured from +Z
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: &Vector3<f32>) -> Self {
        let radius = offset.norm();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vector3<f32> {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vector3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

/// Damped orbit / pan / zoom controller
#[derive(Clone, Debug)]
pub struct NavigationController {
    target: Point3<f32>,
    enable_damping: bool,
    damping_factor: f32,
    rotate_speed: f32,
    pan_speed: f32,
    zoom_speed: f32,
    min_distance: f32,
    max_distance: f32,
    /// Pending (theta, phi) rotation
    spherical_delta: (f32, f32),
    pan_offset: Vector3<f32>,
    scale: f32,
    drag: Option<DragState>,
    /// Client height of the draw surface, used to scale gestures
    surface_height: f32,
    frames: u64,
}

impl NavigationController {
    /// Create a controller and aim `camera` at the configured target
    pub fn new(config: &NavigationConfig, camera: &mut CameraRig) -> Self {
        let [x, y, z] = config.target;
        let target = Point3::new(x, y, z);
        camera.look_at(target);

        Self {
            target,
            enable_damping: config.enable_damping,
            damping_factor: config.damping_factor.clamp(0.0, 1.0),
            rotate_speed: config.rotate_speed,
            pan_speed: config.pan_speed,
            zoom_speed: config.zoom_speed,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            spherical_delta: (0.0, 0.0),
            pan_offset: Vector3::zeros(),
            scale: 1.0,
            drag: None,
            surface_height: 1.0,
            frames: 0,
        }
    }

    pub fn target(&self) -> Point3<f32> {
        self.target
    }

    pub fn is_damping_enabled(&self) -> bool {
        self.enable_damping
    }

    /// Number of `advance` calls so far
    pub fn frames_advanced(&self) -> u64 {
        self.frames
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// True while some pending motion has not yet been applied
    pub fn has_pending_motion(&self) -> bool {
        self.spherical_delta.0.abs() > REST_THRESHOLD
            || self.spherical_delta.1.abs() > REST_THRESHOLD
            || self.pan_offset.norm() > REST_THRESHOLD
            || (self.scale - 1.0).abs() > REST_THRESHOLD
    }

    /// Record the draw surface's client height (CSS pixels)
    pub fn set_surface_height(&mut self, height: f32) {
        if height.is_finite() && height > 0.0 {
            self.surface_height = height;
        }
    }

    // ------------------------------------------------------------------
    // Pointer input
    // ------------------------------------------------------------------

    pub fn pointer_down(&mut self, button: PointerButton, x: f32, y: f32, shift: bool) {
        let mode = match (button, shift) {
            (PointerButton::Primary, false) => DragMode::Rotate,
            (PointerButton::Primary, true) | (PointerButton::Secondary, _) => DragMode::Pan,
            (PointerButton::Middle, _) => DragMode::Dolly,
        };
        self.drag = Some(DragState { mode, last: (x, y) });
    }

    pub fn pointer_move(&mut self, x: f32, y: f32, camera: &CameraRig) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let dx = x - drag.last.0;
        let dy = y - drag.last.1;
        drag.last = (x, y);
        let mode = drag.mode;

        match mode {
            DragMode::Rotate => self.rotate(dx, dy),
            DragMode::Pan => self.pan(dx, dy, camera),
            DragMode::Dolly => {
                if dy > 0.0 {
                    self.dolly_out(self.zoom_scale());
                } else if dy < 0.0 {
                    self.dolly_in(self.zoom_scale());
                }
            }
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
    }

    /// Wheel input: negative deltas zoom in
    pub fn wheel(&mut self, delta_y: f32) {
        if delta_y < 0.0 {
            self.dolly_in(self.zoom_scale());
        } else if delta_y > 0.0 {
            self.dolly_out(self.zoom_scale());
        }
    }

    /// Rotate by a pointer delta in CSS pixels
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        let h = self.surface_height;
        self.spherical_delta.0 -= 2.0 * PI * dx / h * self.rotate_speed;
        self.spherical_delta.1 -= 2.0 * PI * dy / h * self.rotate_speed;
    }

    /// Pan by a pointer delta in CSS pixels, in the camera's screen plane
    pub fn pan(&mut self, dx: f32, dy: f32, camera: &CameraRig) {
        let distance = (camera.position() - self.target).norm();
        // Half the visible height at the target distance
        let half_height = distance * (camera.fov().to_radians() / 2.0).tan();
        let world_per_px = 2.0 * half_height / self.surface_height * self.pan_speed;

        self.pan_offset -= camera.right() * (dx * world_per_px);
        self.pan_offset += camera.screen_up() * (dy * world_per_px);
    }

    fn zoom_scale(&self) -> f32 {
        ZOOM_BASE.powf(self.zoom_speed)
    }

    fn dolly_in(&mut self, factor: f32) {
        self.scale *= factor;
    }

    fn dolly_out(&mut self, factor: f32) {
        self.scale /= factor;
    }

    // ------------------------------------------------------------------
    // Per-frame integration
    // ------------------------------------------------------------------

    /// Integrate pending motion into `camera`. Call exactly once per frame.
    /// Returns true when the camera moved.
    pub fn advance(&mut self, camera: &mut CameraRig) -> bool {
        self.frames += 1;

        let previous = camera.position();
        let offset = previous - self.target;
        let mut spherical = Spherical::from_offset(&offset);

        let step = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        spherical.theta += self.spherical_delta.0 * step;
        spherical.phi += self.spherical_delta.1 * step;
        spherical.phi = spherical.phi.clamp(POLAR_EPSILON, PI - POLAR_EPSILON);

        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.target += self.pan_offset * step;

        camera.set_position(self.target + spherical.to_offset());
        camera.look_at(self.target);

        if self.enable_damping {
            let decay = 1.0 - self.damping_factor;
            self.spherical_delta.0 *= decay;
            self.spherical_delta.1 *= decay;
            self.pan_offset *= decay;
        } else {
            self.spherical_delta = (0.0, 0.0);
            self.pan_offset = Vector3::zeros();
        }
        self.scale = 1.0;

        (camera.position() - previous).norm() > MOVE_EPSILON
    }
}
