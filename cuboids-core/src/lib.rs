/// Cuboids Core Library - Transform pipeline and demo state
///
/// This library provides the stateless core of the cuboid demos: 4x4
/// transform composition, perspective projection, the shared cube mesh, the
/// point-light shading model, scene state and the per-frame protocol that
/// drives a renderer backend.

pub mod backend;
pub mod config;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod projection;
pub mod scene;
pub mod shading;
pub mod transform;

// Re-export commonly used types
pub use backend::{DrawUniforms, RendererBackend};
pub use config::{ClearPolicy, DemoConfig, DemoKind, FrameClock, Presentation};
pub use error::{Error, Result};
pub use frame::{compose_draw, render, update, FrameContext, FrameStats};
pub use geometry::{Mesh, Triangle, Vertex};
pub use projection::{deg_to_rad, perspective, Camera, PerspectiveConfig};
pub use scene::{ArmRig, CuboidField, Drawable, Scene, Shape};
pub use shading::Lighting;
pub use transform::{RotationState, Transform, TransformSpec};
