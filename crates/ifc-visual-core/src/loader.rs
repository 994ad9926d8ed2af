// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC model loading
//!
//! Parsing and tessellation are delegated to `ifc-lite-core` and
//! `ifc-lite-geometry`. This module only walks the building elements, converts
//! the resulting meshes from IFC's Z-up frame to the viewer's Y-up frame and
//! assigns a display color per IFC type.

use crate::{Result, VisualError};
use ifc_lite_core::{EntityDecoder, EntityScanner, IfcType};
use ifc_lite_geometry::GeometryRouter;
use nalgebra::Point3;

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneBounds {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl SceneBounds {
    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn diagonal(&self) -> f32 {
        (self.max - self.min).norm()
    }

    fn grow(&mut self, p: [f32; 3]) {
        self.min = Point3::new(self.min.x.min(p[0]), self.min.y.min(p[1]), self.min.z.min(p[2]));
        self.max = Point3::new(self.max.x.max(p[0]), self.max.y.max(p[1]), self.max.z.max(p[2]));
    }
}

/// One building element's triangle mesh, in viewer (Y-up) coordinates
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelMesh {
    pub entity_id: u64,
    pub entity_type: String,
    pub name: Option<String>,
    /// Flat xyz triples
    pub positions: Vec<f32>,
    /// Flat xyz triples, same length as `positions`
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
    /// RGBA
    pub color: [f32; 4],
}

impl ModelMesh {
    /// Build a mesh from Z-up IFC geometry buffers
    pub fn from_z_up(
        entity_id: u64,
        entity_type: String,
        name: Option<String>,
        positions: &[f32],
        normals: &[f32],
        indices: Vec<u32>,
    ) -> Self {
        let color = default_color(&entity_type);
        let normals = if normals.len() == positions.len() {
            z_up_to_y_up(normals)
        } else {
            // Missing normals: point everything up
            positions
                .chunks_exact(3)
                .flat_map(|_| [0.0, 1.0, 0.0])
                .collect()
        };

        Self {
            entity_id,
            entity_type,
            name,
            positions: z_up_to_y_up(positions),
            normals,
            indices,
            color,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }

    /// Interleaved position + normal buffer for upload
    pub fn interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.positions.len() * 2);
        for (p, n) in self.positions.chunks_exact(3).zip(self.normals.chunks_exact(3)) {
            out.extend_from_slice(p);
            out.extend_from_slice(n);
        }
        out
    }

    pub fn is_transparent(&self) -> bool {
        self.color[3] < 1.0
    }
}

/// A loaded model: its meshes and overall bounds
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IfcModel {
    pub meshes: Vec<ModelMesh>,
    pub bounds: Option<SceneBounds>,
}

impl IfcModel {
    pub fn from_meshes(meshes: Vec<ModelMesh>) -> Self {
        let mut bounds: Option<SceneBounds> = None;
        for p in meshes.iter().flat_map(|m| m.positions.chunks_exact(3)) {
            let point = [p[0], p[1], p[2]];
            match bounds.as_mut() {
                Some(b) => b.grow(point),
                None => {
                    let origin = Point3::new(p[0], p[1], p[2]);
                    bounds = Some(SceneBounds {
                        min: origin,
                        max: origin,
                    });
                }
            }
        }
        Self { meshes, bounds }
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(ModelMesh::triangle_count).sum()
    }
}

/// Parse IFC (STEP) text and tessellate every building element
pub fn load_ifc(content: &str) -> Result<IfcModel> {
    if !content.trim_start().starts_with("ISO-10303-21") {
        return Err(VisualError::load("not an IFC/STEP file (missing ISO-10303-21 header)"));
    }

    let mut decoder = EntityDecoder::new(content);
    let router = GeometryRouter::new();

    // First pass: collect elements that can carry geometry
    let mut scanner = EntityScanner::new(content);
    let mut element_ids: Vec<(u32, String)> = Vec::new();
    while let Some((id, type_name, _, _)) = scanner.next_entity() {
        if !ifc_lite_core::has_geometry_by_name(type_name) {
            continue;
        }
        if matches!(IfcType::from_str(type_name), IfcType::Unknown(_)) {
            log::debug!("[Loader] Skipping #{} of unknown type {}", id, type_name);
            continue;
        }
        element_ids.push((id, type_name.to_string()));
    }

    log::info!("[Loader] Found {} building elements", element_ids.len());

    let mut meshes = Vec::with_capacity(element_ids.len());
    for (id, type_name) in element_ids {
        let entity = match decoder.decode_by_id(id) {
            Ok(e) => e,
            Err(e) => {
                log::debug!("[Loader] Failed to decode #{}: {}", id, e);
                continue;
            }
        };

        let name = entity.get_string(2).map(|s| s.to_string());

        let mesh = match router.process_element(&entity, &mut decoder) {
            Ok(m) => m,
            Err(e) => {
                log::debug!("[Loader] Failed to process #{} ({}): {}", id, type_name, e);
                continue;
            }
        };

        if mesh.is_empty() {
            continue;
        }

        meshes.push(ModelMesh::from_z_up(
            id as u64,
            type_name,
            name,
            &mesh.positions,
            &mesh.normals,
            mesh.indices,
        ));
    }

    let model = IfcModel::from_meshes(meshes);
    log::info!(
        "[Loader] Loaded {} meshes, {} triangles",
        model.meshes.len(),
        model.triangle_count()
    );
    Ok(model)
}

/// Z-up (x, y, z) -> Y-up (x, z, -y)
fn z_up_to_y_up(values: &[f32]) -> Vec<f32> {
    values
        .chunks_exact(3)
        .flat_map(|v| [v[0], v[2], -v[1]])
        .collect()
}

/// Display color by IFC type name
pub fn default_color(entity_type: &str) -> [f32; 4] {
    let upper = entity_type.to_uppercase();

    if upper.contains("WALL") {
        [0.92, 0.85, 0.75, 1.0]
    } else if upper.contains("SLAB") {
        [0.75, 0.73, 0.70, 1.0]
    } else if upper.contains("ROOF") {
        [0.72, 0.55, 0.45, 1.0]
    } else if upper.contains("BEAM") || upper.contains("COLUMN") || upper.contains("MEMBER") {
        [0.60, 0.65, 0.72, 1.0]
    } else if upper.contains("DOOR") {
        [0.55, 0.35, 0.20, 1.0]
    } else if upper.contains("WINDOW") || upper.contains("CURTAINWALL") {
        // Glass
        [0.5, 0.7, 0.85, 0.35]
    } else if upper.contains("STAIR") || upper.contains("RAMP") {
        [0.65, 0.62, 0.58, 1.0]
    } else if upper.contains("RAILING") {
        [0.35, 0.35, 0.38, 1.0]
    } else if upper.contains("SPACE") {
        [0.8, 0.85, 0.95, 0.12]
    } else {
        [0.8, 0.8, 0.8, 1.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const PROJECT_ONLY: &str = r#"ISO-10303-21;
HEADER;
FILE_SCHEMA(('IFC2X3'));
ENDSEC;
DATA;
#1=IFCPROJECT('guid',$,'Project',$,$,$,$,$,#2);
#2=IFCUNITASSIGNMENT((#3));
#3=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);
ENDSEC;
END-ISO-10303-21;
"#;

    /// One 4 m x 0.2 m wall footprint extruded 3 m along IFC +Z
    const EXTRUDED_WALL: &str = r#"ISO-10303-21;
HEADER;
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
#10=IFCRECTANGLEPROFILEDEF(.AREA.,$,$,4.0,0.2);
#11=IFCDIRECTION((0.0,0.0,1.0));
#12=IFCEXTRUDEDAREASOLID(#10,$,#11,3.0);
#13=IFCSHAPEREPRESENTATION($,'Body','SweptSolid',(#12));
#14=IFCPRODUCTDEFINITIONSHAPE($,$,(#13));
#15=IFCWALL('wall-guid',$,'Partition',$,$,$,#14,$,$);
ENDSEC;
END-ISO-10303-21;
"#;

    #[test]
    fn test_extruded_wall_is_tessellated() {
        let model = load_ifc(EXTRUDED_WALL).unwrap();
        assert_eq!(model.meshes.len(), 1);

        let wall = &model.meshes[0];
        assert_eq!(wall.entity_id, 15);
        assert!(wall.entity_type.to_uppercase().contains("WALL"));
        assert_eq!(wall.name.as_deref(), Some("Partition"));
        assert_eq!(wall.color, default_color("IfcWall"));
        assert!(!wall.is_empty());
        assert_eq!(wall.normals.len(), wall.positions.len());
        assert!(wall.triangle_count() >= 12);

        // Extrusion height ends up on the viewer's Y axis
        let bounds = model.bounds.unwrap();
        assert_relative_eq!(bounds.max.y - bounds.min.y, 3.0, epsilon = 1e-4);
        assert_relative_eq!(bounds.max.x - bounds.min.x, 4.0, epsilon = 1e-4);
        assert_relative_eq!(bounds.max.z - bounds.min.z, 0.2, epsilon = 1e-4);
    }

    #[test]
    fn test_rejects_non_step_content() {
        let result = load_ifc("hello world");
        assert!(matches!(result, Err(VisualError::Load(_))));
    }

    #[test]
    fn test_model_without_elements() {
        let model = load_ifc(PROJECT_ONLY).unwrap();
        assert!(model.meshes.is_empty());
        assert!(model.bounds.is_none());
    }

    #[test]
    fn test_z_up_conversion() {
        let mesh = ModelMesh::from_z_up(
            7,
            "IfcWall".to_string(),
            None,
            &[1.0, 2.0, 3.0],
            &[0.0, 0.0, 1.0],
            vec![0, 0, 0],
        );
        assert_eq!(mesh.positions, vec![1.0, 3.0, -2.0]);
        // Z-up normal becomes Y-up
        assert_eq!(mesh.normals, vec![0.0, 1.0, 0.0]);
        assert_eq!(mesh.color, default_color("IfcWall"));
        assert_eq!(mesh.interleaved(), vec![1.0, 3.0, -2.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_missing_normals_default_up() {
        let mesh = ModelMesh::from_z_up(
            1,
            "IfcSlab".to_string(),
            None,
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            &[],
            vec![0, 1, 1],
        );
        assert_eq!(mesh.normals, vec![0.0, 1.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_bounds() {
        let a = ModelMesh::from_z_up(1, "IfcWall".into(), None, &[0.0, 0.0, 0.0], &[], vec![0, 0, 0]);
        let b = ModelMesh::from_z_up(2, "IfcWall".into(), None, &[2.0, 4.0, 6.0], &[], vec![0, 0, 0]);
        let model = IfcModel::from_meshes(vec![a, b]);
        let bounds = model.bounds.unwrap();
        assert_eq!(bounds.min, Point3::new(0.0, 0.0, -4.0));
        assert_eq!(bounds.max, Point3::new(2.0, 6.0, 0.0));
        assert_eq!(bounds.center(), Point3::new(1.0, 3.0, -2.0));
    }

    #[test]
    fn test_default_colors() {
        assert!(default_color("IFCWINDOW")[3] < 1.0);
        assert_eq!(default_color("IfcSlab"), [0.75, 0.73, 0.70, 1.0]);
        assert_eq!(default_color("IfcProxy"), [0.8, 0.8, 0.8, 1.0]);
    }
}
