// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Platform-independent visual
//!
//! Owns the scene graph, camera, lights, navigation controller, render loop
//! and settings bridge. The web adapter feeds it host calls, browser resizes
//! and animation frames; a [`FrameRenderer`] does the actual drawing.

use crate::camera::CameraRig;
use crate::config::ViewerConfig;
use crate::lighting::LightingSet;
use crate::loader::IfcModel;
use crate::navigation::NavigationController;
use crate::plugin::HostVisual;
use crate::render_loop::{FrameOutcome, FrameRenderer, LoopState, RenderLoop, StopHandle};
use crate::scene::{AxesHelper, GridHelper, NodeId, NodeKind, SceneGraph};
use crate::settings::{EnumerateOptions, SettingsBridge, UpdateOptions, VisualObjectInstance};
use crate::viewport::Viewport;
use crate::Result;

/// Render order of the axes helper, drawn on top of the grid
const AXES_RENDER_ORDER: i32 = 1;

/// Scene state of one visual instance
#[derive(Debug)]
pub struct VisualCore {
    config: ViewerConfig,
    viewport: Viewport,
    camera: CameraRig,
    lighting: LightingSet,
    scene: SceneGraph,
    navigation: NavigationController,
    render_loop: RenderLoop,
    settings: SettingsBridge,
    model: Option<NodeId>,
}

impl VisualCore {
    /// Build the scene for a container of `width` x `height` CSS pixels.
    /// The render loop is left Idle; call [`VisualCore::start`].
    pub fn new(config: ViewerConfig, width: f32, height: f32, device_pixel_ratio: f32) -> Result<Self> {
        config.validate()?;
        let viewport = Viewport::new(width, height, device_pixel_ratio, config.surface.max_pixel_ratio);
        let mut camera = CameraRig::new(&config.camera, viewport.aspect());

        let mut scene = SceneGraph::new();
        let lighting = LightingSet::install(&config.lighting, &mut scene);
        scene.add(NodeKind::Grid(GridHelper::new(
            config.helpers.grid_size,
            config.helpers.grid_divisions,
        )));
        scene.add_with_order(
            NodeKind::Axes(AxesHelper::new(config.helpers.axes_size)),
            AXES_RENDER_ORDER,
        );
        scene.validate()?;

        let mut navigation = NavigationController::new(&config.navigation, &mut camera);
        navigation.set_surface_height(viewport.size().height());
        let render_loop = RenderLoop::new(config.render_loop.max_consecutive_failures);

        log::info!(
            "[Visual] Created {}x{} (aspect {:.3}, pixel ratio {})",
            viewport.size().width(),
            viewport.size().height(),
            viewport.aspect(),
            viewport.pixel_ratio()
        );

        Ok(Self {
            config,
            viewport,
            camera,
            lighting,
            scene,
            navigation,
            render_loop,
            settings: SettingsBridge::new(),
            model: None,
        })
    }

    /// Idle -> Running
    pub fn start(&mut self) -> Result<StopHandle> {
        self.render_loop.start()
    }

    /// Browser resize. Invalid sizes are ignored and keep the last aspect.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        if !self.viewport.resize(width, height) {
            return false;
        }
        self.camera.set_aspect(self.viewport.aspect());
        self.navigation.set_surface_height(height);
        log::debug!("[Visual] Resized to {}x{}", width, height);
        true
    }

    pub fn set_device_pixel_ratio(&mut self, device_pixel_ratio: f32) -> bool {
        self.viewport.set_device_pixel_ratio(device_pixel_ratio)
    }

    /// One animation frame: sync the draw surface, advance navigation, draw.
    pub fn frame<R: FrameRenderer + ?Sized>(&mut self, renderer: &mut R) -> FrameOutcome {
        let Self {
            viewport,
            camera,
            scene,
            navigation,
            render_loop,
            ..
        } = self;

        render_loop.run_frame(|| {
            if viewport.take_dirty() {
                renderer.resize(viewport);
            }
            camera.update_projection_matrix();
            navigation.advance(camera);
            renderer.draw(scene, camera)
        })
    }

    /// Put a loaded model into the scene, replacing the previous one
    pub fn load_model(&mut self, model: IfcModel) -> NodeId {
        if let Some(bounds) = model.bounds.as_ref() {
            log::info!(
                "[Visual] Model bounds {:?} .. {:?} (center {:?})",
                bounds.min,
                bounds.max,
                bounds.center()
            );
        }
        let id = self.scene.replace_model(model);
        self.model = Some(id);
        id
    }

    pub fn model_node(&self) -> Option<NodeId> {
        self.model
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn lighting(&self) -> &LightingSet {
        &self.lighting
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    /// Pointer handlers need the camera alongside the controller
    pub fn navigation_mut(&mut self) -> (&mut NavigationController, &CameraRig) {
        (&mut self.navigation, &self.camera)
    }

    pub fn loop_state(&self) -> LoopState {
        self.render_loop.state()
    }

    pub fn render_loop(&self) -> &RenderLoop {
        &self.render_loop
    }

    pub fn settings(&self) -> &SettingsBridge {
        &self.settings
    }
}

impl HostVisual for VisualCore {
    fn update(&mut self, options: &UpdateOptions) {
        if self.settings.update(options) {
            log::debug!("[Visual] Settings updated");
        }
    }

    fn enumerate_object_instances(&self, options: &EnumerateOptions) -> Vec<VisualObjectInstance> {
        self.settings.enumerate(options)
    }
}
