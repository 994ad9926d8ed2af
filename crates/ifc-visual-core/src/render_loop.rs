// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Render loop state machine
//!
//! ```text
//! Idle --start--> Running --stop handle / failure limit--> Stopped
//! ```
//!
//! The loop does not schedule anything itself. The host adapter asks the
//! browser for a frame, calls [`RenderLoop::run_frame`] from the callback and
//! requests the next frame only when it returns [`FrameOutcome::Continue`].
//! A failed frame is logged and counted; the chain keeps going until
//! `max_consecutive_failures` frames in a row have failed.

use crate::camera::CameraRig;
use crate::error::RenderError;
use crate::scene::SceneGraph;
use crate::viewport::Viewport;
use crate::{Result, VisualError};
use std::cell::Cell;
use std::rc::Rc;

/// Lifecycle state of the loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopped,
}

/// Whether the host should request another frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    Stop,
}

/// Drawing backend driven by the loop
pub trait FrameRenderer {
    /// Match the draw surface to the viewport (backing store and GL viewport)
    fn resize(&mut self, viewport: &Viewport);

    /// Draw `scene` as seen from `camera`
    fn draw(&mut self, scene: &SceneGraph, camera: &CameraRig) -> std::result::Result<(), RenderError>;
}

/// Cancellation token for a running loop. Clones share the same flag.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Rc<Cell<bool>>);

impl StopHandle {
    /// Request the loop to stop before its next reschedule
    pub fn stop(&self) {
        self.0.set(true);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.get()
    }
}

/// Frame bookkeeping and failure policy
#[derive(Debug)]
pub struct RenderLoop {
    state: LoopState,
    stop: StopHandle,
    max_consecutive_failures: u32,
    consecutive_failures: u32,
    frames: u64,
    last_error: Option<RenderError>,
}

impl RenderLoop {
    pub fn new(max_consecutive_failures: u32) -> Self {
        Self {
            state: LoopState::Idle,
            stop: StopHandle::default(),
            max_consecutive_failures: max_consecutive_failures.max(1),
            consecutive_failures: 0,
            frames: 0,
            last_error: None,
        }
    }

    /// Idle -> Running. Only legal once.
    pub fn start(&mut self) -> Result<StopHandle> {
        if self.state != LoopState::Idle {
            return Err(VisualError::LoopState(self.state));
        }
        self.state = LoopState::Running;
        log::debug!("[RenderLoop] Started");
        Ok(self.stop.clone())
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Frames whose work ran (successful or not)
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn last_error(&self) -> Option<&RenderError> {
        self.last_error.as_ref()
    }

    /// Run one frame's work inside the error boundary.
    ///
    /// `frame` is invoked exactly once when the loop is running and not
    /// cancelled, and never otherwise.
    pub fn run_frame<F>(&mut self, frame: F) -> FrameOutcome
    where
        F: FnOnce() -> std::result::Result<(), RenderError>,
    {
        if self.state != LoopState::Running {
            return FrameOutcome::Stop;
        }
        if self.stop.is_stopped() {
            self.state = LoopState::Stopped;
            log::info!("[RenderLoop] Stopped after {} frames", self.frames);
            return FrameOutcome::Stop;
        }

        self.frames += 1;
        match frame() {
            Ok(()) => {
                if self.consecutive_failures > 0 {
                    log::info!(
                        "[RenderLoop] Recovered after {} failed frames",
                        self.consecutive_failures
                    );
                }
                self.consecutive_failures = 0;
                FrameOutcome::Continue
            }
            Err(e) => {
                self.consecutive_failures += 1;
                log::warn!(
                    "[RenderLoop] Frame {} failed ({}/{}): {}",
                    self.frames,
                    self.consecutive_failures,
                    self.max_consecutive_failures,
                    e
                );
                self.last_error = Some(e);

                if self.consecutive_failures >= self.max_consecutive_failures {
                    self.state = LoopState::Stopped;
                    self.stop.stop();
                    log::error!(
                        "[RenderLoop] Giving up after {} consecutive failed frames",
                        self.consecutive_failures
                    );
                    FrameOutcome::Stop
                } else {
                    FrameOutcome::Continue
                }
            }
        }
    }
}
