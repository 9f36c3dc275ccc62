//! Collider list component

use crate::ecs::{Component, ReleaseContext};
use crate::physics::{BodyHandle, Collider2DProps};

/// One collider and the body it is currently attached to
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Collider2D {
    /// Shape and material
    pub props: Collider2DProps,
    attached_to: Option<BodyHandle>,
}

impl Collider2D {
    /// Unattached collider
    pub fn new(props: Collider2DProps) -> Self {
        Self {
            props,
            attached_to: None,
        }
    }

    /// Body this collider was deployed with
    pub fn attached_to(&self) -> Option<BodyHandle> {
        self.attached_to
    }

    /// True while part of a deployed body
    pub fn is_deployed(&self) -> bool {
        self.attached_to.is_some()
    }

    pub(crate) fn attach(&mut self, body: BodyHandle) {
        self.attached_to = Some(body);
    }

    pub(crate) fn detach(&mut self) {
        self.attached_to = None;
    }
}

/// Ordered colliders of an entity, simulated with the entity's rigid body
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Colliders2DComponent {
    /// Colliders in declaration order
    pub colliders: Vec<Collider2D>,
}

impl Colliders2DComponent {
    /// Empty collider list
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: append a collider
    pub fn with_collider(mut self, props: Collider2DProps) -> Self {
        self.push(props);
        self
    }

    /// Append a collider. A deployed body picks it up after
    /// `Scene::refresh_colliders`.
    pub fn push(&mut self, props: Collider2DProps) {
        self.colliders.push(Collider2D::new(props));
    }

    /// Props of every collider in order
    pub fn props(&self) -> Vec<Collider2DProps> {
        self.colliders.iter().map(|collider| collider.props.clone()).collect()
    }

    pub(crate) fn attach_all(&mut self, body: BodyHandle) {
        for collider in &mut self.colliders {
            collider.attach(body);
        }
    }

    pub(crate) fn detach_all(&mut self) {
        for collider in &mut self.colliders {
            collider.detach();
        }
    }
}

impl Component for Colliders2DComponent {
    const NAME: &'static str = "Colliders2DComponent";

    /// Fresh colliders from the same props
    fn duplicate(&self) -> Self {
        Self {
            colliders: self.colliders.iter().map(|c| Collider2D::new(c.props.clone())).collect(),
        }
    }

    // The owning body frees collider geometry
    fn release(&mut self, _ctx: &mut ReleaseContext<'_>) {
        self.detach_all();
    }
}
