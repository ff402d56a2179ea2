/// Camera and projection utilities
///
/// Projection follows the OpenGL convention: view space is right-handed and
/// looks down -Z, and the frustum `[near, far]` maps to NDC z in `[-1, 1]`
/// (near plane at -1, far plane at +1).
use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::error::{Error, Result};
use crate::transform::{Transform, TransformSpec};

/// Convert degrees to radians
pub fn deg_to_rad(degrees: f32) -> f32 {
    PI * degrees / 180.0
}

/// Perspective frustum parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveConfig {
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveConfig {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov,
            aspect,
            near,
            far,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let values = [self.fov, self.aspect, self.near, self.far];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::projection(format!(
                "non-finite value in {:?}",
                self
            )));
        }
        if self.near <= 0.0 {
            return Err(Error::projection(format!(
                "near must be positive, got {}",
                self.near
            )));
        }
        if self.far <= self.near {
            return Err(Error::projection(format!(
                "far ({}) must be greater than near ({})",
                self.far, self.near
            )));
        }
        if self.aspect <= 0.0 {
            return Err(Error::projection(format!(
                "aspect must be positive, got {}",
                self.aspect
            )));
        }
        if self.fov <= 0.0 || self.fov >= PI {
            return Err(Error::projection(format!(
                "fov must lie in (0, pi), got {}",
                self.fov
            )));
        }
        Ok(())
    }
}

impl Default for PerspectiveConfig {
    fn default() -> Self {
        Self::new(deg_to_rad(30.0), 1.0, 1.0, 100.0)
    }
}

/// Create the perspective projection matrix for a validated frustum
pub fn perspective(config: &PerspectiveConfig) -> Result<Matrix4<f32>> {
    config.validate()?;
    Ok(Matrix4::new_perspective(
        config.aspect,
        config.fov,
        config.near,
        config.far,
    ))
}

/// Shared camera: projection composed with the view transform.
///
/// When an increment is set, [`Camera::advance`] appends it to the current
/// matrix every frame. The increments accumulate by composition, so
/// floating-point error accumulates with them; the matrix is never rebuilt
/// from absolute angles.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub matrix: Matrix4<f32>,
    pub increment: Option<TransformSpec>,
}

impl Camera {
    pub fn new(
        config: &PerspectiveConfig,
        eye_offset: &TransformSpec,
        increment: Option<TransformSpec>,
    ) -> Result<Self> {
        let projection = perspective(config)?;
        Ok(Self {
            matrix: Transform::transform(&projection, eye_offset),
            increment,
        })
    }

    /// Append the per-frame increment, if any
    pub fn advance(&mut self) {
        if let Some(increment) = &self.increment {
            self.matrix = Transform::transform(&self.matrix, increment);
        }
    }
}
