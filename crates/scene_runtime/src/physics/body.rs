//! Rigid body properties and deployment state

use serde::{Deserialize, Serialize};

use super::PhysicsError;
use crate::foundation::math::Vec2;

slotmap::new_key_type! {
    /// Handle to a body inside a [`PhysicsWorld2D`](super::PhysicsWorld2D)
    pub struct BodyHandle;
}

/// How a body participates in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RigidBodyType {
    /// Never moves
    Static,
    /// Moves by its velocity only, unaffected by gravity
    Kinematic,
    /// Fully simulated
    #[default]
    Dynamic,
}

/// Construction properties of a rigid body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigidBody2DProps {
    /// Simulation mode
    pub body_type: RigidBodyType,
    /// Initial linear velocity
    pub linear_velocity: Vec2,
    /// Initial angular velocity in radians per second
    pub angular_velocity: f32,
    /// Linear velocity damping
    pub linear_damping: f32,
    /// Angular velocity damping
    pub angular_damping: f32,
    /// Multiplier on world gravity
    pub gravity_scale: f32,
    /// Body mass
    pub mass: f32,
    /// Prevent rotation
    pub fixed_rotation: bool,
    /// Let the backend put the body to sleep when resting
    pub allow_sleep: bool,
    /// Initial awake state
    pub awake: bool,
}

impl Default for RigidBody2DProps {
    fn default() -> Self {
        Self {
            body_type: RigidBodyType::Dynamic,
            linear_velocity: Vec2::zeros(),
            angular_velocity: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            gravity_scale: 1.0,
            mass: 1.0,
            fixed_rotation: false,
            allow_sleep: true,
            awake: true,
        }
    }
}

impl RigidBody2DProps {
    /// Dynamic body with a mass
    pub fn dynamic(mass: f32) -> Self {
        Self {
            mass,
            ..Self::default()
        }
    }

    /// Immovable body
    pub fn fixed() -> Self {
        Self {
            body_type: RigidBodyType::Static,
            ..Self::default()
        }
    }

    /// Builder pattern: set body type
    pub fn with_body_type(mut self, body_type: RigidBodyType) -> Self {
        self.body_type = body_type;
        self
    }

    /// Builder pattern: set initial linear velocity
    pub fn with_linear_velocity(mut self, velocity: Vec2) -> Self {
        self.linear_velocity = velocity;
        self
    }

    /// Builder pattern: set gravity scale
    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    /// Check values a backend cannot simulate
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if self.body_type == RigidBodyType::Dynamic && !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(PhysicsError::InvalidProps(format!(
                "dynamic body mass must be positive, got {}",
                self.mass
            )));
        }

        let finite = self.linear_velocity.iter().all(|v| v.is_finite())
            && self.angular_velocity.is_finite()
            && self.gravity_scale.is_finite();
        if !finite {
            return Err(PhysicsError::InvalidProps("body velocities must be finite".to_string()));
        }

        if self.linear_damping < 0.0 || self.angular_damping < 0.0 {
            return Err(PhysicsError::InvalidProps("damping must not be negative".to_string()));
        }

        Ok(())
    }
}

/// Position and angle of a body in world space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BodyPose {
    /// World position
    pub position: Vec2,
    /// Rotation around Z in radians
    pub angle: f32,
}

/// Ownership state of a rigid body component's physics resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyState {
    /// Properties only, nothing registered in a world
    #[default]
    Constructed,
    /// Registered in a world under this handle
    Deployed(BodyHandle),
}

impl BodyState {
    /// Handle of the deployed body, if any
    pub fn handle(self) -> Option<BodyHandle> {
        match self {
            Self::Constructed => None,
            Self::Deployed(handle) => Some(handle),
        }
    }

    /// True while a body is registered in a world
    pub fn is_deployed(self) -> bool {
        matches!(self, Self::Deployed(_))
    }
}
