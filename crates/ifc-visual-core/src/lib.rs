// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC Visual Core - scene lifecycle of the IFC dashboard visual
//!
//! Everything here is platform independent and runs (and is tested) on the
//! native target. The web adapter owns the DOM, the browser events and the
//! WebGL context and drives a [`VisualCore`] through three triggers:
//!
//! - host `update` calls, which only touch the [`SettingsBridge`]
//! - browser resizes, which update the [`Viewport`] and the [`CameraRig`]
//! - animation frames, which run [`VisualCore::frame`]
//!
//! # Example
//!
//! ```ignore
//! use ifc_visual_core::{ViewerConfig, VisualCore, FrameOutcome};
//!
//! let mut visual = VisualCore::new(ViewerConfig::default(), 1920.0, 1080.0, 1.0)?;
//! let stop = visual.start()?;
//!
//! // From each animation frame callback
//! if visual.frame(&mut renderer) == FrameOutcome::Continue {
//!     request_next_frame();
//! }
//! ```

pub mod camera;
pub mod config;
pub mod error;
pub mod lighting;
pub mod loader;
pub mod navigation;
pub mod plugin;
pub mod render_loop;
pub mod scene;
pub mod settings;
pub mod viewport;
pub mod visual;

pub use camera::CameraRig;
pub use config::ViewerConfig;
pub use error::{RenderError, Result, VisualError};
pub use lighting::{light_direction, rgb_from_hex, AmbientLight, DirectionalLight, LightingSet};
pub use loader::{load_ifc, IfcModel, ModelMesh, SceneBounds};
pub use navigation::{NavigationController, PointerButton};
pub use plugin::{HostVisual, PluginDescriptor};
pub use render_loop::{FrameOutcome, FrameRenderer, LoopState, RenderLoop, StopHandle};
pub use scene::{LineVertex, NodeId, NodeKind, SceneGraph, SceneNode};
pub use settings::{
    EnumerateOptions, SettingsBridge, UpdateOptions, VisualObjectInstance, VisualSettings,
};
pub use viewport::{Viewport, ViewportSize};
pub use visual::VisualCore;
