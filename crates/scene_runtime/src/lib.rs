//! # Scene Runtime
//!
//! Runtime scene model for a 2D game engine.
//!
//! ## Features
//!
//! - **Entities**: generational handles bound to their owning scene
//! - **Components**: typed sparse-set storage with per-type copy and release
//! - **Hierarchy**: parent/child tracking with cascading destroy
//! - **Native Scripts**: lazily created behaviors with explicit lifecycle hooks
//! - **2D Physics**: body deployment, pose write-back and exactly-once collision dispatch
//! - **Rendering**: camera and sprite extraction for a pluggable 2D renderer
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_runtime::prelude::*;
//!
//! #[derive(Default)]
//! struct Spin;
//!
//! impl ScriptableEntity for Spin {
//!     fn on_update(&mut self, ctx: &mut ScriptContext<'_>, dt: TimeStep) {
//!         if let Some(transform) = ctx.get_mut::<TransformComponent>() {
//!             let angles = transform.local_euler_angles();
//!             transform.set_local_euler_angles(angles + Vec3::new(0.0, 0.0, dt.seconds()));
//!         }
//!     }
//! }
//!
//! impl NativeScript for Spin {
//!     const NAME: &'static str = "Spin";
//! }
//!
//! fn main() -> Result<(), SceneError> {
//!     let mut scene = Scene::new(SceneSettings::default());
//!     let player = scene.create_entity("Player");
//!     scene.add_component(player, RigidBody2DComponent::new(RigidBody2DProps::dynamic(1.0)))?;
//!     scene.add_script::<Spin>(player)?;
//!
//!     scene.on_scene_play()?;
//!     scene.on_update(TimeStep::from_hz(60.0))?;
//!     scene.on_scene_stop()
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod ecs;
pub mod physics;
pub mod scripting;
pub mod render;
pub mod scene;

/// Common imports for runtime users
pub mod prelude {
    pub use crate::{
        config::{Config, EngineConfig, Physics2DSettings, SceneSettings},
        ecs::{
            components::{
                CameraComponent, Colliders2DComponent, IdComponent, NameComponent, NativeScriptsComponent,
                RigidBody2DComponent, SceneCamera, SpriteRendererComponent, TransformComponent,
            },
            Component, Entity,
        },
        foundation::{
            math::{Color, Mat4, Quat, Transform, Vec2, Vec3, Vec4},
            time::{TimeStep, Timer},
        },
        physics::{Collider2DProps, PhysicsWorld2D, RigidBody2DProps, RigidBodyType},
        render::{CameraFrame, RenderError, SceneRenderer2D, SpriteDraw},
        scene::{Scene, SceneError},
        scripting::{Collision2D, NativeScript, ScriptContext, ScriptableEntity},
    };
}
