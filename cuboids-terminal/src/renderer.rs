/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use cuboids_core::shading::{luminance, to_rgb8};
use cuboids_core::{ClearPolicy, DrawUniforms, Mesh, Presentation, RendererBackend, Triangle};
use nalgebra::{Point3, Vector3, Vector4};
use std::io::{self, Write};

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Triangles with a vertex this close to (or behind) the eye are dropped
const MIN_CLIP_W: f32 = 1e-3;

/// Terminal cells are roughly twice as tall as they are wide
pub const CELL_ASPECT: f32 = 0.5;

/// One vertex after the vertex stage
#[derive(Debug, Clone, Copy)]
struct ShadedVertex {
    screen: (f32, f32),
    depth: f32,
    inv_w: f32,
    world: Point3<f32>,
    normal: Vector3<f32>,
}

/// ASCII renderer that rasterizes the shared mesh into terminal cells,
/// lighting every cell with the point-light model
pub struct AsciiRenderer {
    mesh: Mesh,
    presentation: Presentation,
    surface: Surface,
}

/// Cell grid with its depth, character and colour buffers
struct Surface {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize, mesh: Mesh, presentation: Presentation) -> Self {
        Self {
            mesh,
            presentation,
            surface: Surface::new(width, height),
        }
    }

    pub fn width(&self) -> usize {
        self.surface.width
    }

    pub fn height(&self) -> usize {
        self.surface.height
    }

    /// Aspect ratio the camera should use for this grid
    pub fn aspect(&self) -> f32 {
        if self.surface.height == 0 {
            1.0
        } else {
            self.surface.width as f32 * CELL_ASPECT / self.surface.height as f32
        }
    }

    pub fn index_count(&self) -> usize {
        self.mesh.index_count()
    }

    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        if x >= self.surface.width || y >= self.surface.height {
            return None;
        }
        Some(self.surface.char_buffer[y * self.surface.width + x])
    }

    pub fn clear(&mut self) {
        self.surface.clear_depth();
        self.surface.char_buffer.fill(' ');
        self.surface.color_buffer.fill(Color::Reset);
    }

    pub fn clear_depth(&mut self) {
        self.surface.clear_depth();
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let Surface {
            width,
            height,
            char_buffer,
            color_buffer,
            ..
        } = &self.surface;
        for y in 0..*height {
            for x in 0..*width {
                let idx = y * width + x;
                writer.queue(SetForegroundColor(color_buffer[idx]))?;
                writer.queue(Print(char_buffer[idx]))?;
            }
            if y + 1 < *height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl Surface {
    fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
        }
    }

    fn clear_depth(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
    }

    fn shade_vertex(
        &self,
        position: &Point3<f32>,
        normal: &Vector3<f32>,
        uniforms: &DrawUniforms,
    ) -> Option<ShadedVertex> {
        let p = position.to_homogeneous();
        let clip = uniforms.mvp * p;
        if clip.w <= MIN_CLIP_W {
            return None;
        }

        let inv_w = 1.0 / clip.w;
        let ndc = clip.xyz() * inv_w;
        let screen_x = (ndc.x + 1.0) * 0.5 * self.width as f32;
        let screen_y = (1.0 - ndc.y) * 0.5 * self.height as f32;

        let world = uniforms.model * p;
        let n = uniforms.inverse_transpose * Vector4::new(normal.x, normal.y, normal.z, 0.0);

        Some(ShadedVertex {
            screen: (screen_x, screen_y),
            depth: ndc.z,
            inv_w,
            world: Point3::from(world.xyz()),
            normal: n.xyz(),
        })
    }

    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        uniforms: &DrawUniforms,
        presentation: &Presentation,
    ) {
        let mut shaded = [None; 3];
        for (slot, vertex) in shaded.iter_mut().zip(&triangle.vertices) {
            *slot = self.shade_vertex(&vertex.position, &vertex.normal, uniforms);
        }
        // Triangle crosses the eye plane
        let [Some(v0), Some(v1), Some(v2)] = shaded else {
            return;
        };

        self.rasterize_triangle(&[v0, v1, v2], presentation);
    }

    fn rasterize_triangle(&mut self, verts: &[ShadedVertex; 3], presentation: &Presentation) {
        let [v0, v1, v2] = verts;

        // Bounding box
        let min_x = v0.screen.0.min(v1.screen.0).min(v2.screen.0).floor() as i32;
        let max_x = v0.screen.0.max(v1.screen.0).max(v2.screen.0).ceil() as i32;
        let min_y = v0.screen.1.min(v1.screen.1).min(v2.screen.1).floor() as i32;
        let max_y = v0.screen.1.max(v1.screen.1).max(v2.screen.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) = barycentric(v0.screen, v1.screen, v2.screen, (px, py))
                else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.depth + w1 * v1.depth + w2 * v2.depth;
                if !(-1.0..=1.0).contains(&depth) {
                    continue;
                }
                let idx = y as usize * self.width + x as usize;
                if depth >= self.depth_buffer[idx] {
                    continue;
                }

                // Perspective-correct attribute weights
                let p0 = w0 * v0.inv_w;
                let p1 = w1 * v1.inv_w;
                let p2 = w2 * v2.inv_w;
                let sum = p0 + p1 + p2;
                let (p0, p1, p2) = (p0 / sum, p1 / sum, p2 / sum);

                let world = Point3::from(
                    v0.world.coords * p0 + v1.world.coords * p1 + v2.world.coords * p2,
                );
                let normal = v0.normal * p0 + v1.normal * p1 + v2.normal * p2;
                let color = presentation.lighting.shade(presentation.base_color, &world, &normal);

                self.depth_buffer[idx] = depth;
                self.char_buffer[idx] = ramp_char(luminance(color));
                let [r, g, b] = to_rgb8(color);
                self.color_buffer[idx] = Color::Rgb { r, g, b };
            }
        }
    }
}

impl RendererBackend for AsciiRenderer {
    type Error = io::Error;

    fn begin_frame(&mut self, clear: ClearPolicy) -> io::Result<()> {
        match clear {
            ClearPolicy::ColorAndDepth => self.clear(),
            ClearPolicy::DepthOnly => self.clear_depth(),
        }
        Ok(())
    }

    fn draw_indexed(&mut self, uniforms: &DrawUniforms, index_count: usize) -> io::Result<()> {
        let Self {
            mesh,
            presentation,
            surface,
        } = self;
        for triangle in mesh.triangles().take(index_count / 3) {
            surface.render_triangle(&triangle, uniforms, presentation);
        }
        Ok(())
    }
}

/// Map a brightness in `[0, 1]` onto the luminosity ramp. Any lit surface
/// gets at least the first visible character.
fn ramp_char(brightness: f32) -> char {
    let last = LUMINOSITY_RAMP.len() - 1;
    let index = (brightness.clamp(0.0, 1.0) * last as f32).round() as usize;
    LUMINOSITY_RAMP[index.clamp(1, last)]
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
