//! 2D physics binding
//!
//! [`PhysicsWorld2D`] is the contract a physics backend fulfils for a scene:
//! create and destroy bodies, step the simulation and report collision
//! transitions. [`SimplePhysicsWorld2D`] is the built-in backend.
//!
//! Rigid-body components drive the deploy/undeploy state machine in
//! [`body::BodyState`]; collider props travel with the body on deploy.

pub mod body;
pub mod collider;
pub mod collision_layers;
pub mod world;
pub mod simple_world;

pub use body::{BodyHandle, BodyPose, BodyState, RigidBody2DProps, RigidBodyType};
pub use collider::{Collider2DProps, ColliderShape};
pub use collision_layers::CollisionLayers;
pub use world::{CollisionEvent, PhysicsWorld2D};
pub use simple_world::SimplePhysicsWorld2D;

/// Physics errors
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// Deploy called on a body that already lives in a world
    #[error("Rigid body is already deployed as {0:?}")]
    AlreadyDeployed(BodyHandle),

    /// Handle does not name a body in this world
    #[error("Unknown body handle {0:?}")]
    UnknownBody(BodyHandle),

    /// Body, collider or step parameters rejected by the backend
    #[error("Invalid physics properties: {0}")]
    InvalidProps(String),

    /// Backend could not allocate a body
    #[error("Physics allocation failed: {0}")]
    Allocation(String),
}
