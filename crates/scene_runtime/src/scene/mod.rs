//! Scene management
//!
//! A [`Scene`] owns the component storage, the hierarchy and the physics world
//! of one loaded world. Per frame the host calls, in order:
//!
//! 1. [`Scene::on_scripts_update`]
//! 2. [`Scene::on_physics_update`] (step, transform write-back, collision dispatch)
//! 3. [`Scene::on_render`]
//!
//! [`Scene::on_update`] runs the first two.

mod error;
mod hierarchy;
mod registry;
mod runtime;
mod render;
mod copy;

#[cfg(test)]
mod tests;

pub use error::SceneError;
pub use hierarchy::Hierarchy;
pub use registry::Scene;
