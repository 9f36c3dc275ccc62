//! Entity-Component storage
//!
//! Entities are generational ids; components live in one sparse set per type.
//! The [`Scene`](crate::scene::Scene) owns a [`Storage`] and is the only
//! place that validates handles before touching it.

pub mod entity;
pub mod component;
pub mod storage;
pub mod components;

pub use entity::{Entity, EntityAllocator, EntityId, SceneId};
pub use component::{AttachContext, Component, ReleaseContext};
pub use storage::{ComponentSlot, ComponentStore, Storage};
