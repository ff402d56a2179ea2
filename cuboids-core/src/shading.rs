/// Point-light Lambertian lighting shared by every backend
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Light uniforms handed to a renderer backend at construction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lighting {
    pub light_color: [f32; 3],
    pub light_position: [f32; 3],
    pub ambient: [f32; 3],
}

impl Lighting {
    pub fn new(light_color: [f32; 3], light_position: [f32; 3], ambient: [f32; 3]) -> Self {
        Self {
            light_color,
            light_position,
            ambient,
        }
    }

    /// Colour of a fragment at `position` (world space) facing `normal`.
    ///
    /// `diffuse = light * base * max(dot(normalize(light_pos - pos), n), 0)`,
    /// `ambient = ambient * base`, result `diffuse + ambient`. Not clamped.
    pub fn shade(
        &self,
        base_color: [f32; 3],
        position: &Point3<f32>,
        normal: &Vector3<f32>,
    ) -> [f32; 3] {
        let to_light = Point3::from(self.light_position) - *position;
        let light_dir = to_light.try_normalize(f32::EPSILON);
        let n_dot_l = match (light_dir, normal.try_normalize(f32::EPSILON)) {
            (Some(l), Some(n)) => l.dot(&n).max(0.0),
            _ => 0.0,
        };

        let mut out = [0.0; 3];
        for (i, channel) in out.iter_mut().enumerate() {
            let diffuse = self.light_color[i] * base_color[i] * n_dot_l;
            let ambient = self.ambient[i] * base_color[i];
            *channel = diffuse + ambient;
        }
        out
    }
}

/// Convert a linear colour to 8-bit channels, clamping to `[0, 1]`.
pub fn to_rgb8(color: [f32; 3]) -> [u8; 3] {
    color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// Perceived brightness of a colour, in `[0, 1]` for clamped inputs.
pub fn luminance(color: [f32; 3]) -> f32 {
    let [r, g, b] = color.map(|c| c.clamp(0.0, 1.0));
    0.2126 * r + 0.7152 * g + 0.0722 * b
}
