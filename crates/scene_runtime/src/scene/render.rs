//! World transforms, cameras and sprite extraction

use log::trace;

use super::{Scene, SceneError};
use crate::ecs::components::{CameraComponent, SpriteRendererComponent, TransformComponent};
use crate::ecs::{Entity, EntityId};
use crate::foundation::math::{Transform, Vec3};
use crate::render::{CameraFrame, SceneRenderer2D, SpriteDraw};

impl Scene {
    /// Last viewport size given to [`Scene::set_viewport_size`]
    pub fn viewport_size(&self) -> (u32, u32) {
        self.viewport
    }

    /// Store the viewport size and resize every camera without a fixed
    /// aspect ratio
    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
        if let Some(cameras) = self.storage.store_mut::<CameraComponent>() {
            for (_, slot) in cameras.iter_mut() {
                slot.value_mut().on_viewport_resized(width, height);
            }
        }
        trace!("Scene {} viewport {}x{}", self.id.get(), width, height);
    }

    /// Recompute cached world transforms, parents before children.
    ///
    /// A node is recomputed when its own transform changed or an ancestor
    /// was recomputed. Entities without a transform pass their parent's world
    /// transform through to their children.
    pub fn update_world_transforms(&mut self) {
        let mut stack: Vec<(EntityId, Transform, bool)> = self
            .hierarchy
            .roots()
            .iter()
            .rev()
            .map(|root| (*root, Transform::identity(), false))
            .collect();

        while let Some((id, parent_world, parent_changed)) = stack.pop() {
            let (world, changed) = match self.storage.get_mut::<TransformComponent>(id) {
                Some(transform) => {
                    let changed = parent_changed || transform.is_dirty();
                    if changed {
                        transform.set_world(parent_world.combine(&transform.local()));
                    }
                    (transform.world(), changed)
                }
                None => (parent_world, parent_changed),
            };

            for child in self.hierarchy.children(id).iter().rev() {
                stack.push((*child, world, changed));
            }
        }
    }

    /// World transform composed along the parent chain, independent of the
    /// cached value
    pub fn world_transform(&self, entity: Entity) -> Result<Transform, SceneError> {
        let id = self.resolve(entity)?;
        Ok(self.world_transform_of(id))
    }

    pub(super) fn world_transform_of(&self, id: EntityId) -> Transform {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.hierarchy.parent(current) {
            chain.push(parent);
            current = parent;
        }

        chain.iter().rev().fold(Transform::identity(), |world, node| {
            match self.storage.get::<TransformComponent>(*node) {
                Some(transform) => world.combine(&transform.local()),
                None => world,
            }
        })
    }

    pub(super) fn parent_world_transform(&self, id: EntityId) -> Transform {
        self.hierarchy
            .parent(id)
            .map_or_else(Transform::identity, |parent| self.world_transform_of(parent))
    }

    /// First enabled camera in storage order
    pub fn primary_camera(&self) -> Option<Entity> {
        self.storage
            .store::<CameraComponent>()?
            .iter()
            .find(|(_, slot)| slot.is_enabled())
            .map(|(_, slot)| slot.owner())
    }

    fn camera_frame(&self, entity: Entity) -> Option<CameraFrame> {
        let camera = self.storage.get::<CameraComponent>(entity.id())?;
        let world = self
            .storage
            .get::<TransformComponent>(entity.id())
            .map_or_else(Transform::identity, TransformComponent::world);

        // Scale does not affect the view
        let eye = Transform {
            scale: Vec3::new(1.0, 1.0, 1.0),
            ..world
        };
        let view = eye.inverse().to_matrix();
        let projection = camera.camera.projection();

        Some(CameraFrame {
            entity,
            view,
            projection,
            view_projection: projection * view,
            position: world.position,
            clear_flags: camera.camera.clear_flags,
            clear_color: camera.camera.clear_color,
        })
    }

    /// Draw the scene through the primary camera.
    ///
    /// Returns `Ok(false)` without touching the renderer when no camera is
    /// enabled, otherwise whether any sprite was submitted.
    pub fn on_render(&mut self, renderer: &mut dyn SceneRenderer2D) -> Result<bool, SceneError> {
        self.update_world_transforms();

        let Some(frame) = self.primary_camera().and_then(|camera| self.camera_frame(camera)) else {
            trace!("Scene {} has no enabled camera", self.id.get());
            return Ok(false);
        };

        renderer.begin_scene(&frame)?;

        let mut submitted = 0usize;
        if let Some(sprites) = self.storage.store::<SpriteRendererComponent>() {
            for (id, slot) in sprites.iter() {
                if !slot.is_enabled() {
                    continue;
                }
                let Some(transform) = self.storage.get::<TransformComponent>(id) else {
                    continue;
                };
                renderer.submit_sprite(&SpriteDraw::from_component(slot.owner(), transform.local_to_world(), slot.value()))?;
                submitted += 1;
            }
        }

        renderer.end_scene()?;
        trace!("Scene {} submitted {} sprites", self.id.get(), submitted);
        Ok(submitted > 0)
    }
}
