//! Scene and entity duplication

use std::collections::{BTreeSet, HashMap};

use log::debug;

use super::{Scene, SceneError};
use crate::ecs::components::{IdComponent, NativeScriptsComponent};
use crate::ecs::{Entity, SceneId};

impl Scene {
    /// Deep copy into a new, stopped scene.
    ///
    /// Entities keep their ids and stable ids but the handles are bound to
    /// the copy. Bodies come out undeployed and scripts without instances;
    /// the copy gets a fresh physics world of the same backend.
    pub fn duplicate(&self) -> Scene {
        let id = SceneId::next();

        let mut physics = self.physics.new_world(&self.settings.physics_2d);
        physics.set_gravity(self.physics.gravity());

        let mut storage = self.storage.duplicate(id);
        if let Some(scripts) = storage.store_mut::<NativeScriptsComponent>() {
            for (_, slot) in scripts.iter_mut() {
                slot.value_mut().set_runtime(false);
            }
        }

        debug!(
            "Duplicated scene {} into {} ({} entities)",
            self.id.get(),
            id.get(),
            self.allocator.len()
        );

        Scene {
            id,
            settings: self.settings.clone(),
            allocator: self.allocator.clone(),
            storage,
            hierarchy: self.hierarchy.clone(),
            uuids: self.uuids.clone(),
            physics,
            viewport: self.viewport,
            running: false,
            active_contacts: BTreeSet::new(),
        }
    }

    /// Copy an entity and its subtree next to the original.
    ///
    /// Every copy gets a fresh stable id. In a running scene copied bodies
    /// deploy on the next physics update.
    pub fn duplicate_entity(&mut self, entity: Entity) -> Result<Entity, SceneError> {
        let source = self.resolve(entity)?;
        let source_parent = self.hierarchy.parent(source);

        let mut copies = HashMap::new();
        let mut root_copy = None;
        for original in self.hierarchy.subtree(source) {
            let copy = self.allocator.allocate();
            let copy_entity = self.handle(copy);

            let parent = if original == source {
                source_parent
            } else {
                self.hierarchy.parent(original).and_then(|parent| copies.get(&parent).copied())
            };
            match parent {
                Some(parent) => self.hierarchy.insert_child(parent, copy),
                None => self.hierarchy.insert_root(copy),
            };

            self.storage.duplicate_entity(original, copy_entity);
            let uuid = self.fresh_uuid();
            if let Some(id) = self.storage.get_mut::<IdComponent>(copy) {
                id.id = uuid;
                self.uuids.insert(uuid, copy);
            }

            copies.insert(original, copy);
            root_copy.get_or_insert(copy_entity);
        }

        let copy = root_copy.ok_or_else(|| self.violation(SceneError::StaleEntity(entity)))?;
        debug!("Duplicated {} as {} ({} entities)", entity, copy, copies.len());
        Ok(copy)
    }
}
