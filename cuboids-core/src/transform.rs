/// 3D transformation matrices, sparse transform specs and rotation state
///
/// Matrices are `nalgebra::Matrix4<f32>` acting on column vectors. Every
/// composing operation appends on the right (`m * op`), so the operation
/// applied last is the first one a vertex goes through.
use nalgebra::{Matrix3, Matrix4, Vector3};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::error::{Error, Result};

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Fold an angle into `[0, 2π)`.
pub fn wrap_angle(theta: f32) -> f32 {
    let wrapped = theta.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Sparse set of transform operations.
///
/// Each field is optional; an absent field skips its operation entirely.
/// Translation is appended when any of `x`, `y`, `z` is present (missing
/// components count as zero), scale when any of `sx`, `sy`, `sz` is present
/// (missing components count as one).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ry: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rz: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sx: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sy: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sz: Option<f32>,
}

impl TransformSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
            ..Self::default()
        }
    }

    pub fn rotation(rx: f32, ry: f32, rz: f32) -> Self {
        Self {
            rx: Some(rx),
            ry: Some(ry),
            rz: Some(rz),
            ..Self::default()
        }
    }

    pub fn scaling(sx: f32, sy: f32, sz: f32) -> Self {
        Self {
            sx: Some(sx),
            sy: Some(sy),
            sz: Some(sz),
            ..Self::default()
        }
    }

    pub fn with_x(mut self, x: f32) -> Self {
        self.x = Some(x);
        self
    }

    pub fn with_y(mut self, y: f32) -> Self {
        self.y = Some(y);
        self
    }

    pub fn with_z(mut self, z: f32) -> Self {
        self.z = Some(z);
        self
    }

    pub fn with_rx(mut self, rx: f32) -> Self {
        self.rx = Some(rx);
        self
    }

    pub fn with_ry(mut self, ry: f32) -> Self {
        self.ry = Some(ry);
        self
    }

    pub fn with_rz(mut self, rz: f32) -> Self {
        self.rz = Some(rz);
        self
    }

    /// True when applying this spec is a no-op.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn translation_part(&self) -> Option<Vector3<f32>> {
        if self.x.is_none() && self.y.is_none() && self.z.is_none() {
            return None;
        }
        Some(Vector3::new(
            self.x.unwrap_or(0.0),
            self.y.unwrap_or(0.0),
            self.z.unwrap_or(0.0),
        ))
    }

    fn scale_part(&self) -> Option<Vector3<f32>> {
        if self.sx.is_none() && self.sy.is_none() && self.sz.is_none() {
            return None;
        }
        Some(Vector3::new(
            self.sx.unwrap_or(1.0),
            self.sy.unwrap_or(1.0),
            self.sz.unwrap_or(1.0),
        ))
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    pub fn identity() -> Matrix4<f32> {
        Matrix4::identity()
    }

    /// Append a translation; `translate(identity, d)` maps the origin to `d`.
    pub fn translate(m: &Matrix4<f32>, dx: f32, dy: f32, dz: f32) -> Matrix4<f32> {
        m * Self::translation_matrix(dx, dy, dz)
    }

    /// Append a right-handed rotation about X.
    pub fn rotate_x(m: &Matrix4<f32>, theta: f32) -> Matrix4<f32> {
        m * Matrix4::new_rotation(Vector3::new(theta, 0.0, 0.0))
    }

    /// Append a right-handed rotation about Y.
    pub fn rotate_y(m: &Matrix4<f32>, theta: f32) -> Matrix4<f32> {
        m * Matrix4::new_rotation(Vector3::new(0.0, theta, 0.0))
    }

    /// Append a right-handed rotation about Z.
    pub fn rotate_z(m: &Matrix4<f32>, theta: f32) -> Matrix4<f32> {
        m * Matrix4::new_rotation(Vector3::new(0.0, 0.0, theta))
    }

    pub fn scale(m: &Matrix4<f32>, sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
        m * Self::scale_matrix(sx, sy, sz)
    }

    /// Apply a sparse spec in the fixed order translate, rotate X, rotate Y,
    /// rotate Z, scale. Absent fields are skipped.
    pub fn transform(m: &Matrix4<f32>, spec: &TransformSpec) -> Matrix4<f32> {
        let mut out = *m;
        if let Some(t) = spec.translation_part() {
            out = Self::translate(&out, t.x, t.y, t.z);
        }
        if let Some(rx) = spec.rx {
            out = Self::rotate_x(&out, rx);
        }
        if let Some(ry) = spec.ry {
            out = Self::rotate_y(&out, ry);
        }
        if let Some(rz) = spec.rz {
            out = Self::rotate_z(&out, rz);
        }
        if let Some(s) = spec.scale_part() {
            out = Self::scale(&out, s.x, s.y, s.z);
        }
        out
    }

    /// Standard matrix product `a * b`.
    pub fn multiply(a: &Matrix4<f32>, b: &Matrix4<f32>) -> Matrix4<f32> {
        a * b
    }

    /// Transpose of the inverse of the upper 3x3 block, embedded in an
    /// identity 4x4. Used to carry normals through non-uniform scale.
    pub fn invert_transpose(m: &Matrix4<f32>) -> Result<Matrix4<f32>> {
        let block: Matrix3<f32> = m.fixed_view::<3, 3>(0, 0).into_owned();
        let determinant = block.determinant();
        // Relative to the column lengths, so small uniform scales stay invertible
        let extent: f32 = block.column_iter().map(|c| c.norm()).product();
        if !determinant.is_finite() || determinant.abs() <= f32::EPSILON * extent {
            return Err(Error::SingularMatrix { determinant });
        }
        let inverse = block
            .try_inverse()
            .filter(|inv| inv.iter().all(|v| v.is_finite()))
            .ok_or(Error::SingularMatrix { determinant })?;

        let mut out = Matrix4::identity();
        out.fixed_view_mut::<3, 3>(0, 0)
            .copy_from(&inverse.transpose());
        Ok(out)
    }

    /// Like [`Transform::invert_transpose`], but substitutes `fallback` when
    /// the model matrix is singular.
    pub fn normal_matrix_or(m: &Matrix4<f32>, fallback: &Matrix4<f32>) -> Matrix4<f32> {
        match Self::invert_transpose(m) {
            Ok(normal) => normal,
            Err(err) => {
                tracing::warn!(%err, "substituting fallback normal matrix");
                *fallback
            }
        }
    }

    /// Create a translation matrix
    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Create a scale matrix
    pub fn scale_matrix(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }
}
