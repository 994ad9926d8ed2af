//! WebGL2 renderer
//!
//! Two programs: unlit colored lines for the grid and axes helpers, and
//! lambert-shaded triangles for model meshes (one ambient plus one
//! directional light). GPU buffers are rebuilt whenever the scene revision
//! changes. The clear color is fully transparent so the host background
//! shows through.

use bytemuck::cast_slice;
use ifc_visual_core::lighting::light_direction;
use ifc_visual_core::scene::LineVertex;
use ifc_visual_core::{
    CameraRig, FrameRenderer, ModelMesh, NodeId, NodeKind, RenderError, SceneGraph, Viewport,
    VisualError,
};
use nalgebra::Vector3;
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlContextAttributes,
    WebGlProgram, WebGlShader, WebGlUniformLocation, WebGlVertexArrayObject,
};

const LINE_VERTEX_SHADER: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_color;
uniform mat4 u_view_projection;
out vec3 v_color;
void main() {
    v_color = a_color;
    gl_Position = u_view_projection * vec4(a_position, 1.0);
}
"#;

const LINE_FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;
in vec3 v_color;
out vec4 out_color;
void main() {
    out_color = vec4(v_color, 1.0);
}
"#;

const MESH_VERTEX_SHADER: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
uniform mat4 u_view_projection;
out vec3 v_normal;
void main() {
    v_normal = a_normal;
    gl_Position = u_view_projection * vec4(a_position, 1.0);
}
"#;

const MESH_FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;
in vec3 v_normal;
uniform vec4 u_color;
uniform vec3 u_ambient;
uniform vec3 u_light_color;
uniform vec3 u_light_direction;
out vec4 out_color;
void main() {
    vec3 n = normalize(v_normal);
    float diffuse = max(dot(n, -u_light_direction), 0.0);
    vec3 lit = u_color.rgb * (u_ambient + u_light_color * diffuse);
    out_color = vec4(lit, u_color.a);
}
"#;

const POSITION_LOCATION: u32 = 0;
const SECOND_ATTRIBUTE_LOCATION: u32 = 1;
/// Six floats per vertex in both layouts
const VERTEX_STRIDE: i32 = 6 * 4;

/// Vertex array plus the buffers it references
struct GpuBatch {
    vao: WebGlVertexArrayObject,
    buffers: Vec<WebGlBuffer>,
    count: i32,
    color: [f32; 4],
}

enum NodeBatches {
    Lines(GpuBatch),
    Meshes(Vec<GpuBatch>),
}

struct LineProgram {
    program: WebGlProgram,
    view_projection: Option<WebGlUniformLocation>,
}

struct MeshProgram {
    program: WebGlProgram,
    view_projection: Option<WebGlUniformLocation>,
    color: Option<WebGlUniformLocation>,
    ambient: Option<WebGlUniformLocation>,
    light_color: Option<WebGlUniformLocation>,
    light_direction: Option<WebGlUniformLocation>,
}

/// Lighting uniforms resolved from the scene for one frame
struct FrameLights {
    ambient: [f32; 3],
    color: [f32; 3],
    direction: Vector3<f32>,
}

pub struct WebGlRenderer {
    gl: GL,
    canvas: HtmlCanvasElement,
    lines: LineProgram,
    meshes: MeshProgram,
    batches: Vec<(NodeId, NodeBatches)>,
    uploaded_revision: Option<u64>,
}

impl WebGlRenderer {
    /// Create a WebGL2 context on `canvas` with an alpha channel
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, VisualError> {
        let attributes = WebGlContextAttributes::new();
        attributes.set_alpha(true);
        attributes.set_antialias(true);

        let gl: GL = canvas
            .get_context_with_context_options("webgl2", &attributes)
            .map_err(|e| VisualError::context(format!("{:?}", e)))?
            .ok_or_else(|| VisualError::context("WebGL2 not supported"))?
            .dyn_into()
            .map_err(|_| VisualError::context("unexpected context type"))?;

        let line_program = link_program(&gl, LINE_VERTEX_SHADER, LINE_FRAGMENT_SHADER)?;
        let lines = LineProgram {
            view_projection: gl.get_uniform_location(&line_program, "u_view_projection"),
            program: line_program,
        };

        let mesh_program = link_program(&gl, MESH_VERTEX_SHADER, MESH_FRAGMENT_SHADER)?;
        let meshes = MeshProgram {
            view_projection: gl.get_uniform_location(&mesh_program, "u_view_projection"),
            color: gl.get_uniform_location(&mesh_program, "u_color"),
            ambient: gl.get_uniform_location(&mesh_program, "u_ambient"),
            light_color: gl.get_uniform_location(&mesh_program, "u_light_color"),
            light_direction: gl.get_uniform_location(&mesh_program, "u_light_direction"),
            program: mesh_program,
        };

        gl.enable(GL::DEPTH_TEST);
        gl.clear_color(0.0, 0.0, 0.0, 0.0);

        log::debug!("[Renderer] WebGL2 context ready");

        Ok(Self {
            gl,
            canvas,
            lines,
            meshes,
            batches: Vec::new(),
            uploaded_revision: None,
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Release every GPU buffer
    pub fn release(&mut self) {
        for (_, batches) in self.batches.drain(..) {
            match batches {
                NodeBatches::Lines(batch) => delete_batch(&self.gl, batch),
                NodeBatches::Meshes(list) => list.into_iter().for_each(|b| delete_batch(&self.gl, b)),
            }
        }
        self.uploaded_revision = None;
    }

    fn upload(&mut self, scene: &SceneGraph) -> Result<(), RenderError> {
        self.release();

        for node in scene.nodes() {
            let batches = match &node.kind {
                NodeKind::Grid(grid) => NodeBatches::Lines(self.upload_lines(&grid.line_vertices())?),
                NodeKind::Axes(axes) => NodeBatches::Lines(self.upload_lines(&axes.line_vertices())?),
                NodeKind::Model(model) => {
                    let mut list = Vec::with_capacity(model.meshes.len());
                    for mesh in model.meshes.iter().filter(|m| !m.is_empty()) {
                        list.push(self.upload_mesh(mesh)?);
                    }
                    NodeBatches::Meshes(list)
                }
                _ => continue,
            };
            self.batches.push((node.id, batches));
        }

        self.uploaded_revision = Some(scene.revision());
        log::debug!(
            "[Renderer] Uploaded {} node batches (revision {})",
            self.batches.len(),
            scene.revision()
        );
        Ok(())
    }

    fn upload_lines(&self, vertices: &[LineVertex]) -> Result<GpuBatch, RenderError> {
        let gl = &self.gl;
        let vao = create_vao(gl)?;
        gl.bind_vertex_array(Some(&vao));

        let buffer = create_buffer(gl, GL::ARRAY_BUFFER, cast_slice(vertices))?;
        enable_attributes(gl);

        gl.bind_vertex_array(None);
        Ok(GpuBatch {
            vao,
            buffers: vec![buffer],
            count: vertices.len() as i32,
            color: [1.0; 4],
        })
    }

    fn upload_mesh(&self, mesh: &ModelMesh) -> Result<GpuBatch, RenderError> {
        let gl = &self.gl;
        let vao = create_vao(gl)?;
        gl.bind_vertex_array(Some(&vao));

        let vertices = create_buffer(gl, GL::ARRAY_BUFFER, cast_slice(&mesh.interleaved()))?;
        enable_attributes(gl);
        let indices = create_buffer(gl, GL::ELEMENT_ARRAY_BUFFER, cast_slice(&mesh.indices))?;

        gl.bind_vertex_array(None);
        Ok(GpuBatch {
            vao,
            buffers: vec![vertices, indices],
            count: mesh.indices.len() as i32,
            color: mesh.color,
        })
    }

    fn batches_for(&self, id: NodeId) -> Option<&NodeBatches> {
        self.batches.iter().find(|(node, _)| *node == id).map(|(_, b)| b)
    }

    fn draw_lines(&self, batch: &GpuBatch, view_projection: &[f32]) {
        let gl = &self.gl;
        gl.use_program(Some(&self.lines.program));
        gl.uniform_matrix4fv_with_f32_array(self.lines.view_projection.as_ref(), false, view_projection);
        gl.bind_vertex_array(Some(&batch.vao));
        gl.draw_arrays(GL::LINES, 0, batch.count);
    }

    fn draw_meshes(&self, list: &[GpuBatch], view_projection: &[f32], lights: &FrameLights) {
        let gl = &self.gl;
        let program = &self.meshes;
        gl.use_program(Some(&program.program));
        gl.uniform_matrix4fv_with_f32_array(program.view_projection.as_ref(), false, view_projection);
        gl.uniform3fv_with_f32_array(program.ambient.as_ref(), &lights.ambient);
        gl.uniform3fv_with_f32_array(program.light_color.as_ref(), &lights.color);
        gl.uniform3fv_with_f32_array(program.light_direction.as_ref(), lights.direction.as_slice());

        // Opaque first, then transparent without depth writes
        let (transparent, opaque): (Vec<&GpuBatch>, Vec<&GpuBatch>) =
            list.iter().partition(|b| b.color[3] < 1.0);

        for batch in opaque {
            self.draw_triangles(batch);
        }

        if !transparent.is_empty() {
            gl.enable(GL::BLEND);
            gl.blend_func(GL::SRC_ALPHA, GL::ONE_MINUS_SRC_ALPHA);
            gl.depth_mask(false);
            for batch in transparent {
                self.draw_triangles(batch);
            }
            gl.depth_mask(true);
            gl.disable(GL::BLEND);
        }
    }

    fn draw_triangles(&self, batch: &GpuBatch) {
        let gl = &self.gl;
        gl.uniform4fv_with_f32_array(self.meshes.color.as_ref(), &batch.color);
        gl.bind_vertex_array(Some(&batch.vao));
        gl.draw_elements_with_i32(GL::TRIANGLES, batch.count, GL::UNSIGNED_INT, 0);
    }
}

impl FrameRenderer for WebGlRenderer {
    fn resize(&mut self, viewport: &Viewport) {
        crate::dom::apply_viewport(&self.canvas, viewport);
        let (width, height) = viewport.drawing_buffer_size();
        self.gl.viewport(0, 0, width as i32, height as i32);
        log::debug!("[Renderer] Drawing buffer {}x{}", width, height);
    }

    fn draw(&mut self, scene: &SceneGraph, camera: &CameraRig) -> Result<(), RenderError> {
        if self.gl.is_context_lost() {
            return Err(RenderError::ContextLost);
        }
        if self.uploaded_revision != Some(scene.revision()) {
            self.upload(scene)?;
        }

        let gl = &self.gl;
        gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);

        let view_projection = camera.view_projection();
        let lights = frame_lights(scene);

        for node in scene.draw_order() {
            match self.batches_for(node.id) {
                Some(NodeBatches::Lines(batch)) => self.draw_lines(batch, view_projection.as_slice()),
                Some(NodeBatches::Meshes(list)) => {
                    self.draw_meshes(list, view_projection.as_slice(), &lights)
                }
                None => {}
            }
        }
        gl.bind_vertex_array(None);

        match gl.get_error() {
            GL::NO_ERROR => Ok(()),
            code => Err(RenderError::draw(format!("WebGL error 0x{:04X}", code))),
        }
    }
}

impl Drop for WebGlRenderer {
    fn drop(&mut self) {
        self.release();
    }
}

fn frame_lights(scene: &SceneGraph) -> FrameLights {
    let ambient = scene
        .ambient_light()
        .map(|l| l.color.map(|c| c * l.intensity))
        .unwrap_or([0.0; 3]);

    match scene.directional_light() {
        Some((light, target)) => FrameLights {
            ambient,
            color: light.color.map(|c| c * light.intensity),
            direction: light_direction(light.position, target),
        },
        None => FrameLights {
            ambient,
            color: [0.0; 3],
            direction: -Vector3::y(),
        },
    }
}

fn create_vao(gl: &GL) -> Result<WebGlVertexArrayObject, RenderError> {
    gl.create_vertex_array()
        .ok_or_else(|| RenderError::draw("failed to create vertex array"))
}

fn create_buffer(gl: &GL, target: u32, data: &[u8]) -> Result<WebGlBuffer, RenderError> {
    let buffer = gl
        .create_buffer()
        .ok_or_else(|| RenderError::draw("failed to create buffer"))?;
    gl.bind_buffer(target, Some(&buffer));
    gl.buffer_data_with_u8_array(target, data, GL::STATIC_DRAW);
    Ok(buffer)
}

/// Position at offset 0, color or normal at offset 12
fn enable_attributes(gl: &GL) {
    gl.enable_vertex_attrib_array(POSITION_LOCATION);
    gl.vertex_attrib_pointer_with_i32(POSITION_LOCATION, 3, GL::FLOAT, false, VERTEX_STRIDE, 0);
    gl.enable_vertex_attrib_array(SECOND_ATTRIBUTE_LOCATION);
    gl.vertex_attrib_pointer_with_i32(SECOND_ATTRIBUTE_LOCATION, 3, GL::FLOAT, false, VERTEX_STRIDE, 12);
}

fn delete_batch(gl: &GL, batch: GpuBatch) {
    for buffer in &batch.buffers {
        gl.delete_buffer(Some(buffer));
    }
    gl.delete_vertex_array(Some(&batch.vao));
}

fn compile_shader(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader, VisualError> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| VisualError::shader("failed to create shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let message = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(VisualError::shader(message))
    }
}

fn link_program(gl: &GL, vertex: &str, fragment: &str) -> Result<WebGlProgram, VisualError> {
    let vertex = compile_shader(gl, GL::VERTEX_SHADER, vertex)?;
    let fragment = compile_shader(gl, GL::FRAGMENT_SHADER, fragment)?;

    let program = gl
        .create_program()
        .ok_or_else(|| VisualError::shader("failed to create program"))?;
    gl.attach_shader(&program, &vertex);
    gl.attach_shader(&program, &fragment);
    gl.link_program(&program);
    gl.delete_shader(Some(&vertex));
    gl.delete_shader(Some(&fragment));

    if gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let message = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(VisualError::shader(message))
    }
}
