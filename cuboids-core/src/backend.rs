/// The seam between the frame protocol and whatever draws the pixels
use nalgebra::Matrix4;

use crate::config::ClearPolicy;

/// Per-draw uniform triple consumed by the lighting shader
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawUniforms {
    /// Camera (projection and view) times model
    pub mvp: Matrix4<f32>,
    /// Local to world, used for the fragment's world position
    pub model: Matrix4<f32>,
    /// Normal correction for `model`
    pub inverse_transpose: Matrix4<f32>,
}

/// A renderer that owns a compiled lighting program and the uploaded cube
/// mesh, and draws it once per call with the given uniforms.
///
/// Lighting, base colour and the mesh buffers are fixed when the backend is
/// constructed.
pub trait RendererBackend {
    type Error;

    fn begin_frame(&mut self, clear: ClearPolicy) -> Result<(), Self::Error>;

    /// One indexed draw of the shared mesh covering `index_count` indices
    fn draw_indexed(
        &mut self,
        uniforms: &DrawUniforms,
        index_count: usize,
    ) -> Result<(), Self::Error>;

    fn end_frame(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
