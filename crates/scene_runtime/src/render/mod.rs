//! Renderer contract
//!
//! The scene extracts draw data and hands it to a [`SceneRenderer2D`]. The
//! backend (shaders, textures, batching) lives outside this crate.

use crate::ecs::components::{ClearFlags, SpriteRendererComponent, TextureFiltering, TextureRef, TextureWrapping};
use crate::ecs::Entity;
use crate::foundation::math::{Color, Mat4, Vec2, Vec3};

/// Per-frame camera data
#[derive(Debug, Clone, PartialEq)]
pub struct CameraFrame {
    /// Entity holding the camera
    pub entity: Entity,
    /// World-to-view matrix
    pub view: Mat4,
    /// View-to-clip matrix
    pub projection: Mat4,
    /// `projection * view`
    pub view_projection: Mat4,
    /// Camera position in world space
    pub position: Vec3,
    /// Buffers to clear
    pub clear_flags: ClearFlags,
    /// Clear color
    pub clear_color: Color,
}

/// Texture coordinate and sampler parameters of a sprite
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvParams {
    /// UV repeat count
    pub tiling: Vec2,
    /// UV offset
    pub offset: Vec2,
    /// Mirror horizontally
    pub flip_x: bool,
    /// Mirror vertically
    pub flip_y: bool,
    /// Tile sub-textures
    pub force_tile: bool,
    /// Horizontal wrapping override
    pub wrapping_x: TextureWrapping,
    /// Vertical wrapping override
    pub wrapping_y: TextureWrapping,
    /// Filtering override
    pub filtering: TextureFiltering,
    /// Border color override
    pub border_color: Option<Color>,
}

/// One sprite to draw
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteDraw {
    /// Source entity
    pub entity: Entity,
    /// Local-to-world matrix
    pub transform: Mat4,
    /// Tint color
    pub tint: Color,
    /// Texture, solid quad when absent
    pub texture: Option<TextureRef>,
    /// UV and sampler parameters
    pub uv: UvParams,
    /// Alpha discard threshold
    pub alpha_clip_threshold: f32,
}

impl SpriteDraw {
    /// Build draw data from a sprite component and its world matrix
    pub fn from_component(entity: Entity, transform: Mat4, sprite: &SpriteRendererComponent) -> Self {
        Self {
            entity,
            transform,
            tint: sprite.tint,
            texture: sprite.texture,
            uv: UvParams {
                tiling: sprite.tiling,
                offset: sprite.offset,
                flip_x: sprite.flip_x,
                flip_y: sprite.flip_y,
                force_tile: sprite.force_tile,
                wrapping_x: sprite.wrapping_x,
                wrapping_y: sprite.wrapping_y,
                filtering: sprite.filtering,
                border_color: sprite.border_color,
            },
            alpha_clip_threshold: sprite.alpha_clip_threshold,
        }
    }
}

/// Renderer consumed by [`Scene::on_render`](crate::scene::Scene::on_render)
pub trait SceneRenderer2D {
    /// Start a frame for one camera
    fn begin_scene(&mut self, camera: &CameraFrame) -> Result<(), RenderError>;

    /// Queue one sprite
    fn submit_sprite(&mut self, sprite: &SpriteDraw) -> Result<(), RenderError>;

    /// Flush the frame
    fn end_scene(&mut self) -> Result<(), RenderError>;
}

/// Rendering errors
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// Backend rejected a submission
    #[error("Render submission failed: {0}")]
    Submission(String),

    /// Submission outside a begin/end pair
    #[error("No active scene: {0}")]
    NoActiveScene(String),
}
