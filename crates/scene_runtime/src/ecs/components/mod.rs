//! Built-in components

pub mod identity;
pub mod transform;
pub mod camera;
pub mod sprite;
pub mod rigid_body;
pub mod colliders;
pub mod native_scripts;

pub use identity::{IdComponent, NameComponent};
pub use transform::{ChangedFlags, TransformComponent};
pub use camera::{CameraComponent, ClearFlags, ProjectionType, SceneCamera};
pub use sprite::{SpriteRendererComponent, TextureFiltering, TextureRef, TextureWrapping};
pub use rigid_body::RigidBody2DComponent;
pub use colliders::{Collider2D, Colliders2DComponent};
pub use native_scripts::NativeScriptsComponent;
