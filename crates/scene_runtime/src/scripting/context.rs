//! Explicit context handed to script hooks

use crate::ecs::{Component, Entity};
use crate::scene::{Scene, SceneError};

/// Collision notification delivered to both participants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collision2D {
    /// The entity on the other side of the contact
    pub other: Entity,
}

/// The entity a script runs on and mutable access to its scene.
///
/// The running instance is detached from its component for the duration of
/// the call, so a script may freely add or remove components (including its
/// own scripts) through the scene.
pub struct ScriptContext<'a> {
    entity: Entity,
    scene: &'a mut Scene,
}

impl<'a> ScriptContext<'a> {
    pub(crate) fn new(entity: Entity, scene: &'a mut Scene) -> Self {
        Self { entity, scene }
    }

    /// Entity the script is attached to
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// The owning scene
    pub fn scene(&self) -> &Scene {
        self.scene
    }

    /// The owning scene, mutably
    pub fn scene_mut(&mut self) -> &mut Scene {
        self.scene
    }

    /// Borrow a component of the script's entity
    pub fn get<T: Component>(&self) -> Option<&T> {
        self.scene.try_get_component::<T>(self.entity)
    }

    /// Mutably borrow a component of the script's entity
    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.scene.try_get_component_mut::<T>(self.entity)
    }

    /// Attach a component to the script's entity
    pub fn add<T: Component>(&mut self, component: T) -> Result<&mut T, SceneError> {
        self.scene.add_component(self.entity, component)
    }
}
