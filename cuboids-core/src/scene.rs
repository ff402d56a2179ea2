/// Demo scene state: the swinging arm and the tumbling cuboid field
use nalgebra::{Matrix4, Vector3};
use std::f32::consts::PI;

use crate::config::{CuboidFieldConfig, DemoConfig, DemoKind};
use crate::projection::deg_to_rad;
use crate::transform::{wrap_angle, RotationState, Transform, TransformSpec};

/// Small deterministic generator for scene layout (SplitMix64)
#[derive(Debug, Clone, Copy)]
pub struct Rng64 {
    state: u64,
}

impl Rng64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform sample in `[0, 1)`
    pub fn next_f32(&mut self) -> f32 {
        // 24 bits of precision.
        (self.next_u64() >> 40) as f32 * (1.0 / (1u32 << 24) as f32)
    }
}

/// One drawable instance: pose plus per-frame velocities
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drawable {
    pub translation: Vector3<f32>,
    pub rotation: RotationState,
    /// Radians added to `rotation` every frame
    pub angular_velocity: Vector3<f32>,
    /// Units added to `translation` every frame
    pub linear_velocity: Vector3<f32>,
    pub scale: Option<Vector3<f32>>,
}

impl Drawable {
    pub fn new(translation: Vector3<f32>, rotation: RotationState) -> Self {
        Self {
            translation,
            rotation,
            angular_velocity: Vector3::zeros(),
            linear_velocity: Vector3::zeros(),
            scale: None,
        }
    }

    pub fn with_angular_velocity(mut self, velocity: Vector3<f32>) -> Self {
        self.angular_velocity = velocity;
        self
    }

    pub fn advance(&mut self) {
        let v = self.angular_velocity;
        self.rotation.rotate(v.x, v.y, v.z);
        self.translation += self.linear_velocity;
    }

    /// Pose as a sparse spec with every translation and rotation field set
    pub fn spec(&self) -> TransformSpec {
        TransformSpec::translation(self.translation.x, self.translation.y, self.translation.z)
            .with_rx(self.rotation.x)
            .with_ry(self.rotation.y)
            .with_rz(self.rotation.z)
    }

    pub fn shape(&self) -> Shape {
        Shape {
            pose: Transform::transform(&Transform::identity(), &self.spec()),
            scale: self.scale,
        }
    }
}

/// A single draw: pose matrix plus a scale that applies to this draw only
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shape {
    pub pose: Matrix4<f32>,
    pub scale: Option<Vector3<f32>>,
}

impl Shape {
    pub fn model_matrix(&self) -> Matrix4<f32> {
        match self.scale {
            Some(s) => Transform::transform(&self.pose, &TransformSpec::scaling(s.x, s.y, s.z)),
            None => self.pose,
        }
    }
}

/// Shoulder, arm and hand. The hand hangs off the arm's unscaled pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmRig {
    pub arm_angle: f32,
    pub hand_angle: f32,
    pub step: f32,
}

impl ArmRig {
    pub fn new() -> Self {
        Self {
            arm_angle: deg_to_rad(180.0),
            hand_angle: deg_to_rad(45.0),
            step: deg_to_rad(3.0),
        }
    }

    pub fn advance(&mut self) {
        self.arm_angle = wrap_angle(self.arm_angle + self.step);
        self.hand_angle = wrap_angle(self.hand_angle + self.step);
    }

    pub fn shapes(&self) -> Vec<Shape> {
        let id = Transform::identity();

        let shoulder = Transform::transform(&id, &TransformSpec::new().with_x(-3.0));

        let arm = Transform::transform(&id, &TransformSpec::new().with_rx(self.arm_angle));
        let arm = Transform::transform(&arm, &TransformSpec::new().with_y(-2.0));

        let hand = Transform::transform(&arm, &TransformSpec::new().with_ry(self.hand_angle));
        let hand = Transform::transform(&hand, &TransformSpec::new().with_y(-3.0));

        vec![
            Shape {
                pose: shoulder,
                scale: Some(Vector3::new(2.0, 1.0, 1.0)),
            },
            Shape {
                pose: arm,
                scale: Some(Vector3::new(1.0, 3.0, 1.0)),
            },
            Shape {
                pose: hand,
                scale: Some(Vector3::new(2.0, 0.1, 2.0)),
            },
        ]
    }
}

impl Default for ArmRig {
    fn default() -> Self {
        Self::new()
    }
}

/// Randomly scattered cuboids, each tumbling at its own rate
#[derive(Debug, Clone, PartialEq)]
pub struct CuboidField {
    pub cuboids: Vec<Drawable>,
}

impl CuboidField {
    /// Positions fall in `(-spread/2, spread/2]` per axis, orientations in
    /// `[0, π)`, angular velocities in `(-1.5°, 1.5°]` per frame.
    pub fn random(config: &CuboidFieldConfig) -> Self {
        let mut rng = Rng64::new(config.seed);
        let half = config.spread / 2.0;

        let cuboids = (0..config.count)
            .map(|_| {
                let translation = Vector3::new(
                    half - rng.next_f32() * config.spread,
                    half - rng.next_f32() * config.spread,
                    half - rng.next_f32() * config.spread,
                );
                let rotation = RotationState::new(
                    rng.next_f32() * PI,
                    rng.next_f32() * PI,
                    rng.next_f32() * PI,
                );
                let velocity = Vector3::new(
                    deg_to_rad(1.5 - rng.next_f32() * 3.0),
                    deg_to_rad(1.5 - rng.next_f32() * 3.0),
                    deg_to_rad(1.5 - rng.next_f32() * 3.0),
                );
                Drawable::new(translation, rotation).with_angular_velocity(velocity)
            })
            .collect();

        Self { cuboids }
    }

    pub fn advance(&mut self) {
        for cuboid in &mut self.cuboids {
            cuboid.advance();
        }
    }

    pub fn shapes(&self) -> Vec<Shape> {
        self.cuboids.iter().map(Drawable::shape).collect()
    }
}

/// State of whichever demo is running
#[derive(Debug, Clone, PartialEq)]
pub enum Scene {
    Arm(ArmRig),
    Cuboids(CuboidField),
}

impl Scene {
    pub fn from_config(config: &DemoConfig) -> Self {
        let scene = match config.demo {
            DemoKind::Arm => Scene::Arm(ArmRig::new()),
            DemoKind::Cuboids => Scene::Cuboids(CuboidField::random(&config.cuboids)),
        };
        tracing::debug!(demo = %config.demo, shapes = scene.shape_count(), "scene built");
        scene
    }

    pub fn advance(&mut self) {
        match self {
            Scene::Arm(rig) => rig.advance(),
            Scene::Cuboids(field) => field.advance(),
        }
    }

    pub fn shapes(&self) -> Vec<Shape> {
        match self {
            Scene::Arm(rig) => rig.shapes(),
            Scene::Cuboids(field) => field.shapes(),
        }
    }

    pub fn shape_count(&self) -> usize {
        match self {
            Scene::Arm(_) => 3,
            Scene::Cuboids(field) => field.cuboids.len(),
        }
    }
}
