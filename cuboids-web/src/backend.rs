/// WebGL2 renderer backend
use cuboids_core::{ClearPolicy, DrawUniforms, Mesh, Presentation, RendererBackend};
use js_sys::{Float32Array, Uint16Array};
use nalgebra::Matrix4;
use wasm_bindgen::JsValue;
use web_sys::{
    WebGl2RenderingContext as Gl, WebGlBuffer, WebGlProgram, WebGlShader, WebGlUniformLocation,
};

use crate::shaders::{names, FRAGMENT_SHADER, VERTEX_SHADER};

/// Owns the compiled lighting program and the uploaded cube buffers
pub struct WebGlBackend {
    gl: Gl,
    _program: WebGlProgram,
    _buffers: [WebGlBuffer; 3],
    mvp: Option<WebGlUniformLocation>,
    model: Option<WebGlUniformLocation>,
    inverse_transpose: Option<WebGlUniformLocation>,
}

impl WebGlBackend {
    pub fn new(gl: Gl, mesh: &Mesh, presentation: &Presentation) -> Result<Self, JsValue> {
        let program = link_program(&gl, VERTEX_SHADER, FRAGMENT_SHADER)?;
        gl.use_program(Some(&program));

        let positions = upload_attribute(&gl, &program, names::POSITION, &mesh.positions())?;
        let normals = upload_attribute(&gl, &program, names::NORMAL, &mesh.normals())?;

        let indices = gl
            .create_buffer()
            .ok_or_else(|| JsValue::from_str("failed to create index buffer"))?;
        gl.bind_buffer(Gl::ELEMENT_ARRAY_BUFFER, Some(&indices));
        gl.buffer_data_with_array_buffer_view(
            Gl::ELEMENT_ARRAY_BUFFER,
            &Uint16Array::from(mesh.indices()),
            Gl::STATIC_DRAW,
        );

        // Constant per-vertex colour
        let color = attrib_location(&gl, &program, names::COLOR)?;
        let [r, g, b] = presentation.base_color;
        gl.vertex_attrib3f(color, r, g, b);

        let lighting = &presentation.lighting;
        let [r, g, b] = lighting.light_color;
        gl.uniform3f(gl.get_uniform_location(&program, names::LIGHT_COLOR).as_ref(), r, g, b);
        let [x, y, z] = lighting.light_position;
        gl.uniform3f(gl.get_uniform_location(&program, names::LIGHT_POSITION).as_ref(), x, y, z);
        let [r, g, b] = lighting.ambient;
        gl.uniform3f(gl.get_uniform_location(&program, names::AMBIENT_LIGHT).as_ref(), r, g, b);

        gl.clear_color(0.0, 0.0, 0.0, 1.0);
        gl.enable(Gl::DEPTH_TEST);

        Ok(Self {
            mvp: gl.get_uniform_location(&program, names::MVP),
            model: gl.get_uniform_location(&program, names::MODEL),
            inverse_transpose: gl.get_uniform_location(&program, names::INVERSE_TRANSPOSE),
            gl,
            _program: program,
            _buffers: [positions, normals, indices],
        })
    }

    pub fn set_viewport(&self, width: i32, height: i32) {
        self.gl.viewport(0, 0, width, height);
    }

    fn upload_matrix(&self, location: Option<&WebGlUniformLocation>, m: &Matrix4<f32>) {
        // nalgebra storage is column-major, as GL expects
        self.gl.uniform_matrix4fv_with_f32_array(location, false, m.as_slice());
    }
}

impl RendererBackend for WebGlBackend {
    type Error = JsValue;

    fn begin_frame(&mut self, clear: ClearPolicy) -> Result<(), JsValue> {
        let mask = match clear {
            ClearPolicy::ColorAndDepth => Gl::COLOR_BUFFER_BIT | Gl::DEPTH_BUFFER_BIT,
            ClearPolicy::DepthOnly => Gl::DEPTH_BUFFER_BIT,
        };
        self.gl.clear(mask);
        Ok(())
    }

    fn draw_indexed(&mut self, uniforms: &DrawUniforms, index_count: usize) -> Result<(), JsValue> {
        self.upload_matrix(self.mvp.as_ref(), &uniforms.mvp);
        self.upload_matrix(self.model.as_ref(), &uniforms.model);
        self.upload_matrix(self.inverse_transpose.as_ref(), &uniforms.inverse_transpose);

        let count = i32::try_from(index_count)
            .map_err(|_| JsValue::from_str("index count exceeds i32"))?;
        self.gl.draw_elements_with_i32(Gl::TRIANGLES, count, Gl::UNSIGNED_SHORT, 0);
        Ok(())
    }
}

fn compile_shader(gl: &Gl, kind: u32, source: &str) -> Result<WebGlShader, JsValue> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| JsValue::from_str("failed to create shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    let compiled = gl
        .get_shader_parameter(&shader, Gl::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false);
    if compiled {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        Err(JsValue::from_str(&format!("shader compile failed: {log}")))
    }
}

fn link_program(gl: &Gl, vertex: &str, fragment: &str) -> Result<WebGlProgram, JsValue> {
    let vs = compile_shader(gl, Gl::VERTEX_SHADER, vertex)?;
    let fs = compile_shader(gl, Gl::FRAGMENT_SHADER, fragment)?;
    let program = gl
        .create_program()
        .ok_or_else(|| JsValue::from_str("failed to create program"))?;
    gl.attach_shader(&program, &vs);
    gl.attach_shader(&program, &fs);
    gl.link_program(&program);

    let linked = gl
        .get_program_parameter(&program, Gl::LINK_STATUS)
        .as_bool()
        .unwrap_or(false);
    if linked {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        Err(JsValue::from_str(&format!("program link failed: {log}")))
    }
}

fn attrib_location(gl: &Gl, program: &WebGlProgram, name: &str) -> Result<u32, JsValue> {
    u32::try_from(gl.get_attrib_location(program, name))
        .map_err(|_| JsValue::from_str(&format!("attribute '{name}' not found")))
}

/// Upload three floats per vertex and bind them to the named attribute
fn upload_attribute(
    gl: &Gl,
    program: &WebGlProgram,
    name: &str,
    data: &[f32],
) -> Result<WebGlBuffer, JsValue> {
    let buffer = gl
        .create_buffer()
        .ok_or_else(|| JsValue::from_str("failed to create buffer"))?;
    gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&buffer));
    gl.buffer_data_with_array_buffer_view(
        Gl::ARRAY_BUFFER,
        &Float32Array::from(data),
        Gl::STATIC_DRAW,
    );

    let location = attrib_location(gl, program, name)?;
    gl.vertex_attrib_pointer_with_i32(location, 3, Gl::FLOAT, false, 0, 0);
    gl.enable_vertex_attrib_array(location);
    Ok(buffer)
}
