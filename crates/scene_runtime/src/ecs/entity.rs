//! Entity identity
//!
//! An [`EntityId`] is a generational index: the index addresses component
//! storage, the generation detects handles that outlived their entity.
//! An [`Entity`] pairs that id with the [`SceneId`] of its owning scene so a
//! handle from one scene can never silently address another.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::Component;
use crate::scene::{Scene, SceneError};

/// Generational entity identifier, unique within one scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    /// Create an entity id from raw parts
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index into component storage
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot at the time this id was issued
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Identity of a scene instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneId(u64);

impl SceneId {
    /// Allocate a process-unique scene id
    pub(crate) fn next() -> Self {
        static NEXT_SCENE_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Lightweight, copyable reference to an entity inside a specific scene.
///
/// The handle has no lifetime of its own: it is valid while its id is alive
/// in the owning scene. Scene methods check both the scene and the
/// generation and report stale or foreign handles as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity {
    id: EntityId,
    scene: SceneId,
}

impl Entity {
    pub(crate) const fn new(id: EntityId, scene: SceneId) -> Self {
        Self { id, scene }
    }

    /// Identity within the owning scene
    pub const fn id(self) -> EntityId {
        self.id
    }

    /// Owning scene
    pub const fn scene(self) -> SceneId {
        self.scene
    }

    /// Shorthand for [`Scene::get_component`]
    pub fn get<T: Component>(self, scene: &Scene) -> Result<&T, SceneError> {
        scene.get_component::<T>(self)
    }

    /// Shorthand for [`Scene::get_component_mut`]
    pub fn get_mut<T: Component>(self, scene: &mut Scene) -> Result<&mut T, SceneError> {
        scene.get_component_mut::<T>(self)
    }

    /// Shorthand for [`Scene::has_component`]
    pub fn has<T: Component>(self, scene: &Scene) -> Result<bool, SceneError> {
        scene.has_component::<T>(self)
    }

    /// True if the handle is still alive in `scene`
    pub fn is_valid(self, scene: &Scene) -> bool {
        scene.is_valid(self)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({} @ scene {})", self.id, self.scene.0)
    }
}

/// Issues entity ids and recycles freed slots with a bumped generation
#[derive(Debug, Clone, Default)]
pub struct EntityAllocator {
    generations: Vec<u32>,
    alive: Vec<bool>,
    free: VecDeque<u32>,
    alive_count: usize,
}

impl EntityAllocator {
    /// Create an empty allocator
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id, reusing the oldest freed slot first
    pub fn allocate(&mut self) -> EntityId {
        self.alive_count += 1;
        if let Some(index) = self.free.pop_front() {
            let slot = index as usize;
            self.alive[slot] = true;
            return EntityId::new(index, self.generations[slot]);
        }

        let index = u32::try_from(self.generations.len()).unwrap_or(u32::MAX);
        self.generations.push(0);
        self.alive.push(true);
        EntityId::new(index, 0)
    }

    /// Free an id. Returns `false` if the id was already stale.
    pub fn free(&mut self, id: EntityId) -> bool {
        if !self.is_alive(id) {
            return false;
        }

        let slot = id.index as usize;
        self.alive[slot] = false;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.free.push_back(id.index);
        self.alive_count -= 1;
        true
    }

    /// Check whether an id refers to a living entity
    pub fn is_alive(&self, id: EntityId) -> bool {
        let slot = id.index as usize;
        slot < self.generations.len() && self.alive[slot] && self.generations[slot] == id.generation
    }

    /// Number of living entities
    pub fn len(&self) -> usize {
        self.alive_count
    }

    /// True when no entity is alive
    pub fn is_empty(&self) -> bool {
        self.alive_count == 0
    }

    /// Living ids in index order
    pub fn iter_alive(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.generations
            .iter()
            .zip(self.alive.iter())
            .enumerate()
            .filter(|(_, (_, alive))| **alive)
            .map(|(index, (generation, _))| EntityId::new(index as u32, *generation))
    }
}
