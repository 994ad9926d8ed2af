// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene graph
//!
//! A flat list of nodes (lights, light targets, helpers and the loaded
//! model). Draw order follows `render_order`, then insertion order. Every
//! structural change bumps the revision so backends know when to re-upload
//! GPU buffers.

use crate::lighting::{AmbientLight, DirectionalLight};
use crate::loader::IfcModel;
use crate::{Result, VisualError};
use bytemuck::{Pod, Zeroable};
use nalgebra::Point3;

/// Stable identifier of a scene node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// What a node contributes to the scene
#[derive(Clone, Debug)]
pub enum NodeKind {
    AmbientLight(AmbientLight),
    DirectionalLight(DirectionalLight),
    /// Point a directional light aims at
    LightTarget { position: Point3<f32> },
    Grid(GridHelper),
    Axes(AxesHelper),
    Model(IfcModel),
}

/// A node in the scene graph
#[derive(Clone, Debug)]
pub struct SceneNode {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Higher values draw later
    pub render_order: i32,
    pub visible: bool,
}

/// Interleaved line vertex (position + color), uploaded as-is
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

/// Square grid on the XZ plane, centered at the origin
#[derive(Clone, Debug, PartialEq)]
pub struct GridHelper {
    pub size: f32,
    pub divisions: u32,
    pub center_color: [f32; 3],
    pub line_color: [f32; 3],
}

impl GridHelper {
    pub fn new(size: f32, divisions: u32) -> Self {
        Self {
            size,
            divisions: divisions.max(1),
            center_color: crate::lighting::rgb_from_hex(0x444444),
            line_color: crate::lighting::rgb_from_hex(0x888888),
        }
    }

    /// Line list: one pair of segments per division line
    pub fn line_vertices(&self) -> Vec<LineVertex> {
        let half = self.size / 2.0;
        let step = self.size / self.divisions as f32;
        let center = self.divisions / 2;

        let mut vertices = Vec::with_capacity((self.divisions as usize + 1) * 4);
        for i in 0..=self.divisions {
            let k = -half + i as f32 * step;
            let color = if i == center {
                self.center_color
            } else {
                self.line_color
            };
            vertices.push(LineVertex { position: [-half, 0.0, k], color });
            vertices.push(LineVertex { position: [half, 0.0, k], color });
            vertices.push(LineVertex { position: [k, 0.0, -half], color });
            vertices.push(LineVertex { position: [k, 0.0, half], color });
        }
        vertices
    }
}

/// RGB axes of length `size` from the origin
#[derive(Clone, Debug, PartialEq)]
pub struct AxesHelper {
    pub size: f32,
}

impl AxesHelper {
    pub fn new(size: f32) -> Self {
        Self { size }
    }

    pub fn line_vertices(&self) -> Vec<LineVertex> {
        let s = self.size;
        let red = [1.0, 0.0, 0.0];
        let green = [0.0, 1.0, 0.0];
        let blue = [0.0, 0.0, 1.0];
        vec![
            LineVertex { position: [0.0, 0.0, 0.0], color: red },
            LineVertex { position: [s, 0.0, 0.0], color: red },
            LineVertex { position: [0.0, 0.0, 0.0], color: green },
            LineVertex { position: [0.0, s, 0.0], color: green },
            LineVertex { position: [0.0, 0.0, 0.0], color: blue },
            LineVertex { position: [0.0, 0.0, s], color: blue },
        ]
    }
}

/// Collection of scene nodes
#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    next_id: u32,
    revision: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with render order 0
    pub fn add(&mut self, kind: NodeKind) -> NodeId {
        self.add_with_order(kind, 0)
    }

    pub fn add_with_order(&mut self, kind: NodeKind, render_order: i32) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.push(SceneNode {
            id,
            kind,
            render_order,
            visible: true,
        });
        self.revision += 1;
        id
    }

    /// Remove a node. Returns the removed node, if present.
    pub fn remove(&mut self, id: NodeId) -> Option<SceneNode> {
        let index = self.nodes.iter().position(|n| n.id == id)?;
        self.revision += 1;
        Some(self.nodes.remove(index))
    }

    /// Replace any loaded model with `model`
    pub fn replace_model(&mut self, model: IfcModel) -> NodeId {
        let before = self.nodes.len();
        self.nodes.retain(|n| !matches!(n.kind, NodeKind::Model(_)));
        if self.nodes.len() != before {
            log::debug!("[Scene] Removed previous model");
        }
        self.add(NodeKind::Model(model))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Monotonic counter of structural changes
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Visible nodes in draw order (stable by insertion within equal order)
    pub fn draw_order(&self) -> Vec<&SceneNode> {
        let mut ordered: Vec<&SceneNode> = self.nodes.iter().filter(|n| n.visible).collect();
        ordered.sort_by_key(|n| n.render_order);
        ordered
    }

    pub fn ambient_light(&self) -> Option<&AmbientLight> {
        self.nodes.iter().find_map(|n| match &n.kind {
            NodeKind::AmbientLight(light) => Some(light),
            _ => None,
        })
    }

    /// First directional light together with its resolved target position
    pub fn directional_light(&self) -> Option<(&DirectionalLight, Point3<f32>)> {
        self.nodes.iter().find_map(|n| match &n.kind {
            NodeKind::DirectionalLight(light) => {
                self.target_position(light.target).map(|t| (light, t))
            }
            _ => None,
        })
    }

    pub fn model(&self) -> Option<&IfcModel> {
        self.nodes.iter().find_map(|n| match &n.kind {
            NodeKind::Model(model) => Some(model),
            _ => None,
        })
    }

    /// Every directional light must reference a light target present in the scene
    pub fn validate(&self) -> Result<()> {
        for node in &self.nodes {
            if let NodeKind::DirectionalLight(light) = &node.kind {
                if self.target_position(light.target).is_none() {
                    return Err(VisualError::InvalidScene(format!(
                        "directional light {:?} targets {:?}, which is not in the scene",
                        node.id, light.target
                    )));
                }
            }
        }
        Ok(())
    }

    fn target_position(&self, id: NodeId) -> Option<Point3<f32>> {
        self.get(id).and_then(|n| match &n.kind {
            NodeKind::LightTarget { position } => Some(*position),
            _ => None,
        })
    }
}
