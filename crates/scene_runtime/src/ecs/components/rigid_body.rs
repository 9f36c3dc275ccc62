//! Rigid body component
//!
//! Owns at most one body in the scene's physics world. The component moves
//! between [`BodyState::Constructed`] and [`BodyState::Deployed`] only through
//! [`RigidBody2DComponent::deploy`] and [`RigidBody2DComponent::undeploy`].

use log::{debug, warn};

use crate::ecs::{Component, EntityId, ReleaseContext};
use crate::foundation::math::Vec2;
use crate::physics::{BodyHandle, BodyState, Collider2DProps, PhysicsError, PhysicsWorld2D, RigidBody2DProps};

/// Binds an entity to a rigid body in the physics world
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RigidBody2DComponent {
    /// Properties used whenever the body is (re)deployed
    pub props: RigidBody2DProps,
    state: BodyState,
}

impl RigidBody2DComponent {
    /// Create a constructed body
    pub fn new(props: RigidBody2DProps) -> Self {
        Self {
            props,
            state: BodyState::Constructed,
        }
    }

    /// Current deployment state
    pub fn state(&self) -> BodyState {
        self.state
    }

    /// Handle of the deployed body
    pub fn handle(&self) -> Option<BodyHandle> {
        self.state.handle()
    }

    /// True while registered in a physics world
    pub fn is_deployed(&self) -> bool {
        self.state.is_deployed()
    }

    /// Register the body and its colliders in `world`.
    ///
    /// Deploying twice is an error: the existing body is kept.
    pub fn deploy(
        &mut self,
        world: &mut dyn PhysicsWorld2D,
        owner: EntityId,
        colliders: &[Collider2DProps],
        position: Vec2,
        angle: f32,
    ) -> Result<BodyHandle, PhysicsError> {
        if let BodyState::Deployed(handle) = self.state {
            return Err(PhysicsError::AlreadyDeployed(handle));
        }

        let handle = world.create_body(owner, &self.props, colliders, position, angle)?;
        self.state = BodyState::Deployed(handle);
        Ok(handle)
    }

    /// Remove the body from `world`. Returns whether a body was removed.
    ///
    /// Undeploying a constructed body is a no-op. The state is reset before
    /// the world is asked, so a backend error never leaves a dangling handle.
    pub fn undeploy(&mut self, world: &mut dyn PhysicsWorld2D) -> Result<bool, PhysicsError> {
        match std::mem::take(&mut self.state) {
            BodyState::Constructed => Ok(false),
            BodyState::Deployed(handle) => {
                world.destroy_body(handle)?;
                Ok(true)
            }
        }
    }
}

impl Component for RigidBody2DComponent {
    const NAME: &'static str = "RigidBody2DComponent";

    /// Copies never share a body: the copy is constructed from the same props
    fn duplicate(&self) -> Self {
        Self::new(self.props.clone())
    }

    fn release(&mut self, ctx: &mut ReleaseContext<'_>) {
        match self.undeploy(&mut *ctx.physics) {
            Ok(true) => debug!("Released rigid body on component teardown"),
            Ok(false) => {}
            Err(e) => warn!("Rigid body teardown failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::SimplePhysicsWorld2D;

    fn owner() -> EntityId {
        EntityId::new(0, 0)
    }

    #[test]
    fn test_deploy_then_undeploy_twice() {
        let mut world = SimplePhysicsWorld2D::default();
        let mut body = RigidBody2DComponent::new(RigidBody2DProps::dynamic(1.0));

        body.deploy(&mut world, owner(), &[], Vec2::zeros(), 0.0).unwrap();
        assert!(body.is_deployed());
        assert_eq!(world.body_count(), 1);

        assert_eq!(body.undeploy(&mut world), Ok(true));
        assert_eq!(body.undeploy(&mut world), Ok(false));
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn test_double_deploy_is_rejected() {
        let mut world = SimplePhysicsWorld2D::default();
        let mut body = RigidBody2DComponent::default();
        let handle = body.deploy(&mut world, owner(), &[], Vec2::zeros(), 0.0).unwrap();

        let second = body.deploy(&mut world, owner(), &[], Vec2::zeros(), 0.0);
        assert_eq!(second, Err(PhysicsError::AlreadyDeployed(handle)));
        assert_eq!(world.body_count(), 1);
        assert_eq!(body.handle(), Some(handle));
    }

    #[test]
    fn test_duplicate_of_deployed_body_is_constructed() {
        let mut world = SimplePhysicsWorld2D::default();
        let mut body = RigidBody2DComponent::new(RigidBody2DProps::dynamic(2.0));
        body.deploy(&mut world, owner(), &[], Vec2::zeros(), 0.0).unwrap();

        let copy = body.duplicate();
        assert!(!copy.is_deployed());
        assert_eq!(copy.props, body.props);
    }

    #[test]
    fn test_failed_deploy_stays_constructed() {
        let mut world = SimplePhysicsWorld2D::default();
        let mut body = RigidBody2DComponent::new(RigidBody2DProps::dynamic(-1.0));

        assert!(body.deploy(&mut world, owner(), &[], Vec2::zeros(), 0.0).is_err());
        assert_eq!(body.state(), BodyState::Constructed);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut world = SimplePhysicsWorld2D::default();
        let mut body = RigidBody2DComponent::default();
        body.deploy(&mut world, owner(), &[], Vec2::zeros(), 0.0).unwrap();

        let mut ctx = ReleaseContext::new(&mut world);
        body.release(&mut ctx);
        body.release(&mut ctx);
        assert!(!body.is_deployed());
        assert_eq!(world.body_count(), 0);
    }
}
