// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewport state: draw surface size and pixel ratio

/// Size of the draw surface in CSS pixels. Both fields are strictly positive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportSize {
    width: f32,
    height: f32,
}

impl ViewportSize {
    /// Returns `None` unless both dimensions are finite and strictly positive
    pub fn new(width: f32, height: f32) -> Option<Self> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        (valid(width) && valid(height)).then_some(Self { width, height })
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

/// Current draw surface state
///
/// Resizes are applied whole or not at all; an invalid size leaves the last
/// valid one in place.
#[derive(Clone, Debug)]
pub struct Viewport {
    size: ViewportSize,
    pixel_ratio: f32,
    max_pixel_ratio: f32,
    /// Set when the draw surface must be resized before the next frame
    dirty: bool,
}

impl Viewport {
    /// Create a viewport from the initial container size.
    ///
    /// A hidden container (zero size) falls back to 1x1 until the first
    /// valid resize arrives.
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32, max_pixel_ratio: f32) -> Self {
        let size = ViewportSize::new(width, height).unwrap_or_else(|| {
            log::debug!("[Viewport] Initial size {}x{} invalid, using 1x1", width, height);
            ViewportSize {
                width: 1.0,
                height: 1.0,
            }
        });

        Self {
            size,
            pixel_ratio: effective_pixel_ratio(device_pixel_ratio, max_pixel_ratio),
            max_pixel_ratio,
            dirty: true,
        }
    }

    /// Apply a resize notification. Returns false (and changes nothing) when
    /// either dimension is not strictly positive.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        match ViewportSize::new(width, height) {
            Some(size) => {
                self.size = size;
                self.dirty = true;
                true
            }
            None => {
                log::debug!("[Viewport] Ignoring resize to {}x{}", width, height);
                false
            }
        }
    }

    /// Update the device pixel ratio (capped). Returns true when it changed.
    pub fn set_device_pixel_ratio(&mut self, device_pixel_ratio: f32) -> bool {
        let ratio = effective_pixel_ratio(device_pixel_ratio, self.max_pixel_ratio);
        if (ratio - self.pixel_ratio).abs() > f32::EPSILON {
            self.pixel_ratio = ratio;
            self.dirty = true;
            true
        } else {
            false
        }
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    pub fn aspect(&self) -> f32 {
        self.size.aspect()
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Backing store size in device pixels
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        let w = (self.size.width * self.pixel_ratio).floor().max(1.0);
        let h = (self.size.height * self.pixel_ratio).floor().max(1.0);
        (w as u32, h as u32)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Consume the pending-resize flag
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

fn effective_pixel_ratio(device_pixel_ratio: f32, max_pixel_ratio: f32) -> f32 {
    if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio.min(max_pixel_ratio)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_size_validation() {
        assert!(ViewportSize::new(800.0, 600.0).is_some());
        assert!(ViewportSize::new(0.0, 600.0).is_none());
        assert!(ViewportSize::new(800.0, -1.0).is_none());
        assert!(ViewportSize::new(f32::NAN, 600.0).is_none());
    }

    #[test]
    fn test_zero_resize_keeps_last_size() {
        let mut viewport = Viewport::new(800.0, 600.0, 1.0, 2.0);
        viewport.take_dirty();

        assert!(!viewport.resize(0.0, 0.0));
        assert!(!viewport.resize(1024.0, 0.0));
        assert!(!viewport.is_dirty());
        assert_relative_eq!(viewport.aspect(), 800.0 / 600.0);
    }

    #[test]
    fn test_resize_sets_both_dimensions() {
        let mut viewport = Viewport::new(1920.0, 1080.0, 1.0, 2.0);
        viewport.take_dirty();

        assert!(viewport.resize(800.0, 600.0));
        assert!(viewport.is_dirty());
        assert_eq!(viewport.size().width(), 800.0);
        assert_eq!(viewport.size().height(), 600.0);
        assert!(viewport.take_dirty());
        assert!(!viewport.take_dirty());
    }

    #[test]
    fn test_pixel_ratio_capped() {
        let viewport = Viewport::new(100.0, 50.0, 3.0, 2.0);
        assert_eq!(viewport.pixel_ratio(), 2.0);
        assert_eq!(viewport.drawing_buffer_size(), (200, 100));

        let viewport = Viewport::new(100.0, 50.0, 1.5, 2.0);
        assert_eq!(viewport.drawing_buffer_size(), (150, 75));

        let viewport = Viewport::new(100.0, 50.0, 0.0, 2.0);
        assert_eq!(viewport.pixel_ratio(), 1.0);
    }

    #[test]
    fn test_hidden_container_fallback() {
        let viewport = Viewport::new(0.0, 0.0, 1.0, 2.0);
        assert_eq!(viewport.aspect(), 1.0);
    }
}
