//! Physics world contract

use super::{BodyHandle, BodyPose, Collider2DProps, PhysicsError, RigidBody2DProps};
use crate::config::Physics2DSettings;
use crate::ecs::EntityId;
use crate::foundation::math::Vec2;
use crate::foundation::time::TimeStep;

/// Start or end of contact between the bodies of two entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollisionEvent {
    /// Owner of the first body
    pub entity_a: EntityId,
    /// Owner of the second body
    pub entity_b: EntityId,
    /// `true` when contact begins, `false` when it ends
    pub is_enter: bool,
}

impl CollisionEvent {
    /// Create an event with the pair stored in ascending id order
    pub fn new(a: EntityId, b: EntityId, is_enter: bool) -> Self {
        let (entity_a, entity_b) = if a <= b { (a, b) } else { (b, a) };
        Self {
            entity_a,
            entity_b,
            is_enter,
        }
    }

    /// Ordered entity pair
    pub fn pair(&self) -> (EntityId, EntityId) {
        (self.entity_a, self.entity_b)
    }
}

/// A 2D physics world exclusively owned by one scene.
///
/// Only the scene steps the world and consumes its collision feed.
pub trait PhysicsWorld2D {
    /// Register a body with its colliders at a world pose
    fn create_body(
        &mut self,
        owner: EntityId,
        props: &RigidBody2DProps,
        colliders: &[Collider2DProps],
        position: Vec2,
        angle: f32,
    ) -> Result<BodyHandle, PhysicsError>;

    /// Remove a body. Contacts involving it disappear without exit events.
    fn destroy_body(&mut self, handle: BodyHandle) -> Result<(), PhysicsError>;

    /// Advance the simulation and report contact transitions
    fn step(&mut self, dt: TimeStep) -> Result<Vec<CollisionEvent>, PhysicsError>;

    /// Current pose of a body
    fn body_pose(&self, handle: BodyHandle) -> Option<BodyPose>;

    /// Current linear velocity of a body
    fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec2>;

    /// Override the linear velocity of a body
    fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> Result<(), PhysicsError>;

    /// World gravity
    fn gravity(&self) -> Vec2;

    /// Change world gravity
    fn set_gravity(&mut self, gravity: Vec2);

    /// Number of registered bodies
    fn body_count(&self) -> usize;

    /// Fresh, empty world of the same backend
    fn new_world(&self, settings: &Physics2DSettings) -> Box<dyn PhysicsWorld2D>;
}
