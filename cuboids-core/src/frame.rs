/// Per-frame protocol: advance state, then compose and submit draws
use nalgebra::Matrix4;

use crate::backend::{DrawUniforms, RendererBackend};
use crate::config::{ClearPolicy, DemoConfig};
use crate::error::Result;
use crate::projection::Camera;
use crate::scene::Scene;
use crate::transform::Transform;

/// Everything one frame reads and writes, owned by the driver
#[derive(Debug, Clone, PartialEq)]
pub struct FrameContext {
    pub camera: Camera,
    pub scene: Scene,
    /// Number of completed updates
    pub frame: u64,
    pub clear: ClearPolicy,
    /// Last invertible normal matrix per draw slot
    normal_cache: Vec<Matrix4<f32>>,
}

/// What a single `render` call submitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frame: u64,
    pub draws: usize,
    /// Draws whose model matrix could not be inverted
    pub singular: usize,
}

impl FrameContext {
    pub fn new(config: &DemoConfig) -> Result<Self> {
        config.validate()?;
        let camera = Camera::new(
            &config.projection,
            &config.eye_offset,
            config.camera_increment,
        )?;
        Ok(Self::from_parts(camera, Scene::from_config(config), config.presentation.clear))
    }

    pub fn from_parts(camera: Camera, scene: Scene, clear: ClearPolicy) -> Self {
        Self {
            camera,
            scene,
            frame: 0,
            clear,
            normal_cache: Vec::new(),
        }
    }
}

/// Uniforms for one draw of `model` seen through `camera`. A singular
/// model gets `fallback` as its normal matrix.
pub fn compose_draw(
    camera: &Matrix4<f32>,
    model: &Matrix4<f32>,
    fallback: &Matrix4<f32>,
) -> DrawUniforms {
    draw_uniforms(camera, model, Transform::normal_matrix_or(model, fallback))
}

fn draw_uniforms(
    camera: &Matrix4<f32>,
    model: &Matrix4<f32>,
    normal: Matrix4<f32>,
) -> DrawUniforms {
    DrawUniforms {
        mvp: Transform::multiply(camera, model),
        model: *model,
        inverse_transpose: normal,
    }
}

/// Advance the camera increment and every object by one frame.
pub fn update(mut ctx: FrameContext) -> FrameContext {
    ctx.camera.advance();
    ctx.scene.advance();
    ctx.frame += 1;
    ctx
}

/// Submit the current state to `backend`: one clear, then one indexed draw
/// of `index_count` indices per shape.
pub fn render<B: RendererBackend>(
    ctx: &mut FrameContext,
    backend: &mut B,
    index_count: usize,
) -> std::result::Result<FrameStats, B::Error> {
    let shapes = ctx.scene.shapes();
    ctx.normal_cache.resize(shapes.len(), Matrix4::identity());

    let mut stats = FrameStats {
        frame: ctx.frame,
        ..FrameStats::default()
    };

    backend.begin_frame(ctx.clear)?;
    for (slot, (shape, cached)) in shapes.iter().zip(ctx.normal_cache.iter_mut()).enumerate() {
        let model = shape.model_matrix();
        let normal = match Transform::invert_transpose(&model) {
            Ok(normal) => {
                *cached = normal;
                normal
            }
            Err(err) => {
                stats.singular += 1;
                tracing::debug!(%err, slot, "reusing cached normal matrix");
                *cached
            }
        };
        let uniforms = draw_uniforms(&ctx.camera.matrix, &model, normal);
        backend.draw_indexed(&uniforms, index_count)?;
        stats.draws += 1;
    }
    backend.end_frame()?;

    tracing::trace!(frame = stats.frame, draws = stats.draws, "frame submitted");
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DemoKind;
    use crate::scene::{CuboidField, Drawable};
    use crate::transform::RotationState;
    use nalgebra::Vector3;
    use crate::transform::TransformSpec;

    #[test]
    fn test_compose_draw() {
        let camera = Transform::translation_matrix(0.0, 0.0, -15.0);
        let model = Transform::rotate_y(&Transform::identity(), 0.5);
        let uniforms = compose_draw(&camera, &model, &Matrix4::identity());
        assert!((uniforms.mvp - camera * model).norm() < 1e-6);
        assert_eq!(uniforms.model, model);
        let expected = Transform::invert_transpose(&model).unwrap();
        assert!((uniforms.inverse_transpose - expected).norm() < 1e-6);
    }

    #[test]
    fn test_compose_draw_singular_uses_fallback() {
        let camera = Matrix4::identity();
        let model = Transform::scale_matrix(1.0, 0.0, 1.0);
        let fallback = Transform::rotate_x(&Transform::identity(), 0.25);
        let uniforms = compose_draw(&camera, &model, &fallback);
        assert_eq!(uniforms.inverse_transpose, fallback);
    }

    #[derive(Default)]
    struct Collect(Vec<DrawUniforms>);

    impl RendererBackend for Collect {
        type Error = std::convert::Infallible;

        fn begin_frame(&mut self, _clear: ClearPolicy) -> std::result::Result<(), Self::Error> {
            Ok(())
        }

        fn draw_indexed(
            &mut self,
            uniforms: &DrawUniforms,
            _index_count: usize,
        ) -> std::result::Result<(), Self::Error> {
            self.0.push(*uniforms);
            Ok(())
        }
    }

    #[test]
    fn test_render_matches_compose_draw() {
        let mut ctx = FrameContext::new(&DemoConfig::preset(DemoKind::Arm)).unwrap();
        let mut backend = Collect::default();
        render(&mut ctx, &mut backend, 36).unwrap();

        let shapes = ctx.scene.shapes();
        assert_eq!(backend.0.len(), shapes.len());
        for (drawn, shape) in backend.0.iter().zip(&shapes) {
            let expected =
                compose_draw(&ctx.camera.matrix, &shape.model_matrix(), &Matrix4::identity());
            assert_eq!(*drawn, expected);
        }
    }

    #[test]
    fn test_render_singular_slot_uses_cache() {
        let camera = Camera::new(
            &DemoConfig::preset(DemoKind::Cuboids).projection,
            &TransformSpec::new().with_z(-15.0),
            None,
        )
        .unwrap();
        let mut flat = Drawable::new(Vector3::new(1.0, 0.0, 0.0), RotationState::zero());
        flat.scale = Some(Vector3::zeros());
        let scene = Scene::Cuboids(CuboidField { cuboids: vec![flat] });
        let mut ctx = FrameContext::from_parts(camera, scene, ClearPolicy::DepthOnly);
        let mut backend = Collect::default();

        let stats = render(&mut ctx, &mut backend, 36).unwrap();
        assert_eq!(stats.singular, 1);
        assert_eq!(backend.0[0].inverse_transpose, Matrix4::identity());

        let cached = Transform::rotate_x(&Transform::identity(), 0.3);
        ctx.normal_cache[0] = cached;
        render(&mut ctx, &mut backend, 36).unwrap();
        let drawn = backend.0[1];
        assert_eq!(drawn.inverse_transpose, cached);
        assert_eq!(drawn.mvp, ctx.camera.matrix * flat.shape().model_matrix());
    }

    #[test]
    fn test_update_is_pure_on_input() {
        let ctx = FrameContext::new(&DemoConfig::preset(DemoKind::Cuboids)).unwrap();
        let snapshot = ctx.clone();
        let next = update(ctx);
        assert_eq!(next.frame, 1);
        assert_ne!(next.camera.matrix, snapshot.camera.matrix);
        assert_ne!(next.scene, snapshot.scene);

        // The same input always produces the same output.
        assert_eq!(update(snapshot.clone()), update(snapshot));
    }

    #[test]
    fn test_update_arm_keeps_camera_fixed() {
        let ctx = FrameContext::new(&DemoConfig::preset(DemoKind::Arm)).unwrap();
        let camera = ctx.camera.matrix;
        let next = update(update(ctx));
        assert_eq!(next.frame, 2);
        assert_eq!(next.camera.matrix, camera);
    }

    #[test]
    fn test_context_rejects_invalid_config() {
        let config = DemoConfig::preset(DemoKind::Arm).with_aspect(-1.0);
        assert!(FrameContext::new(&config).is_err());
    }

    #[test]
    fn test_from_parts_starts_at_frame_zero() {
        let camera = Camera::new(
            &DemoConfig::preset(DemoKind::Arm).projection,
            &TransformSpec::new(),
            None,
        )
        .unwrap();
        let scene = Scene::Arm(Default::default());
        let ctx = FrameContext::from_parts(camera, scene, ClearPolicy::DepthOnly);
        assert_eq!(ctx.frame, 0);
        assert_eq!(ctx.clear, ClearPolicy::DepthOnly);
    }
}
