use std::convert::Infallible;

use cuboids_core::{
    deg_to_rad, render, update, Camera, ClearPolicy, CuboidField, DemoConfig, DemoKind,
    DrawUniforms, Drawable, FrameContext, Mesh, PerspectiveConfig, RendererBackend,
    RotationState, Scene, Transform, TransformSpec,
};
use nalgebra::{Matrix4, Vector3, Vector4};

#[derive(Default)]
struct RecordingBackend {
    clears: Vec<ClearPolicy>,
    draws: Vec<(DrawUniforms, usize)>,
    frames_ended: usize,
}

impl RendererBackend for RecordingBackend {
    type Error = Infallible;

    fn begin_frame(&mut self, clear: ClearPolicy) -> Result<(), Infallible> {
        self.clears.push(clear);
        Ok(())
    }

    fn draw_indexed(
        &mut self,
        uniforms: &DrawUniforms,
        index_count: usize,
    ) -> Result<(), Infallible> {
        self.draws.push((*uniforms, index_count));
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), Infallible> {
        self.frames_ended += 1;
        Ok(())
    }
}

struct FailingBackend;

impl RendererBackend for FailingBackend {
    type Error = String;

    fn begin_frame(&mut self, _clear: ClearPolicy) -> Result<(), String> {
        Ok(())
    }

    fn draw_indexed(
        &mut self,
        _uniforms: &DrawUniforms,
        _index_count: usize,
    ) -> Result<(), String> {
        Err("context lost".to_string())
    }
}

#[test]
fn arm_frame_submits_three_draws() {
    let mesh = Mesh::cube(1.0);
    let mut ctx = FrameContext::new(&DemoConfig::preset(DemoKind::Arm)).unwrap();
    let mut backend = RecordingBackend::default();

    ctx = update(ctx);
    let stats = render(&mut ctx, &mut backend, mesh.index_count()).unwrap();

    assert_eq!(stats.frame, 1);
    assert_eq!(stats.draws, 3);
    assert_eq!(stats.singular, 0);
    assert_eq!(backend.clears, vec![ClearPolicy::ColorAndDepth]);
    assert_eq!(backend.frames_ended, 1);
    for (uniforms, count) in &backend.draws {
        assert_eq!(*count, 36);
        let expected = ctx.camera.matrix * uniforms.model;
        assert!((uniforms.mvp - expected).norm() < 1e-5);
    }

    // The shoulder is scaled (2, 1, 1) around x = -3.
    let shoulder = &backend.draws[0].0;
    let corner = shoulder.model * Vector4::new(1.0, 1.0, 1.0, 1.0);
    assert!((corner - Vector4::new(-1.0, 1.0, 1.0, 1.0)).norm() < 1e-5);
}

#[test]
fn cuboid_frames_clear_depth_only_and_rotate_camera() {
    let mut ctx = FrameContext::new(&DemoConfig::preset(DemoKind::Cuboids)).unwrap();
    let mut backend = RecordingBackend::default();
    let initial_camera = ctx.camera.matrix;

    for _ in 0..3 {
        ctx = update(ctx);
        render(&mut ctx, &mut backend, 36).unwrap();
    }

    assert_eq!(backend.clears, vec![ClearPolicy::DepthOnly; 3]);
    assert_eq!(backend.draws.len(), 3 * 42);
    assert_eq!(ctx.frame, 3);

    let increment = TransformSpec::rotation(0.00541, 0.00181, 0.00317);
    let mut expected = initial_camera;
    for _ in 0..3 {
        expected = Transform::transform(&expected, &increment);
    }
    assert!((ctx.camera.matrix - expected).norm() < 1e-5);
}

#[test]
fn model_matrix_follows_drawable_state() {
    let drawable = Drawable::new(Vector3::new(5.0, 0.0, 0.0), RotationState::zero())
        .with_angular_velocity(Vector3::new(0.0, 0.0, std::f32::consts::FRAC_PI_2));
    let scene = Scene::Cuboids(CuboidField {
        cuboids: vec![drawable],
    });
    let camera = Camera {
        matrix: Matrix4::identity(),
        increment: None,
    };
    let mut ctx = FrameContext::from_parts(camera, scene, ClearPolicy::ColorAndDepth);
    let mut backend = RecordingBackend::default();

    ctx = update(ctx);
    render(&mut ctx, &mut backend, 36).unwrap();

    // Translated to x = 5 and then turned a quarter about Z.
    let model = backend.draws[0].0.model;
    let tip = model * Vector4::new(1.0, 0.0, 0.0, 1.0);
    assert!((tip - Vector4::new(5.0, 1.0, 0.0, 1.0)).norm() < 1e-5);
}

#[test]
fn singular_model_reuses_last_good_normal_matrix() {
    let mut drawable = Drawable::new(Vector3::zeros(), RotationState::new(0.0, 0.3, 0.0));
    drawable.scale = Some(Vector3::new(1.0, 1.0, 1.0));
    let scene = Scene::Cuboids(CuboidField {
        cuboids: vec![drawable],
    });
    let camera = Camera::new(
        &PerspectiveConfig::new(deg_to_rad(30.0), 1.0, 1.0, 100.0),
        &TransformSpec::new().with_z(-15.0),
        None,
    )
    .unwrap();
    let mut ctx = FrameContext::from_parts(camera, scene, ClearPolicy::ColorAndDepth);
    let mut backend = RecordingBackend::default();

    let good = render(&mut ctx, &mut backend, 36).unwrap();
    assert_eq!(good.singular, 0);
    let last_good = backend.draws[0].0.inverse_transpose;

    if let Scene::Cuboids(field) = &mut ctx.scene {
        field.cuboids[0].scale = Some(Vector3::new(1.0, 0.0, 1.0));
    }
    let stats = render(&mut ctx, &mut backend, 36).unwrap();
    assert_eq!(stats.singular, 1);
    let substituted = backend.draws[1].0.inverse_transpose;
    assert_eq!(substituted, last_good);
    assert!(substituted.iter().all(|v| v.is_finite()));
}

#[test]
fn first_singular_model_gets_identity() {
    let mut drawable = Drawable::new(Vector3::zeros(), RotationState::zero());
    drawable.scale = Some(Vector3::zeros());
    let scene = Scene::Cuboids(CuboidField {
        cuboids: vec![drawable],
    });
    let camera = Camera {
        matrix: Matrix4::identity(),
        increment: None,
    };
    let mut ctx = FrameContext::from_parts(camera, scene, ClearPolicy::ColorAndDepth);
    let mut backend = RecordingBackend::default();
    render(&mut ctx, &mut backend, 36).unwrap();
    assert_eq!(backend.draws[0].0.inverse_transpose, Matrix4::identity());
}

#[test]
fn backend_errors_propagate() {
    let mut ctx = FrameContext::new(&DemoConfig::preset(DemoKind::Arm)).unwrap();
    let err = render(&mut ctx, &mut FailingBackend, 36).unwrap_err();
    assert_eq!(err, "context lost");
}

#[test]
fn scenario_camera_dolly_back_fifteen_units() {
    let config = PerspectiveConfig::new(deg_to_rad(30.0), 16.0 / 9.0, 1.0, 100.0);
    let camera = Camera::new(&config, &TransformSpec::new().with_z(-15.0), None).unwrap();

    // A point at the world origin ends up 15 units in front of the eye.
    let clip = camera.matrix * Vector4::new(0.0, 0.0, 0.0, 1.0);
    assert!((clip.w - 15.0).abs() < 1e-4);
    let ndc_z = clip.z / clip.w;
    let (near, far) = (1.0_f32, 100.0_f32);
    let expected = (far + near) / (far - near) - 2.0 * far * near / ((far - near) * 15.0);
    assert!((ndc_z - expected).abs() < 1e-5);
}
