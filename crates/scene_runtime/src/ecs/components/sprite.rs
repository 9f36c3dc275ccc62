//! Sprite renderer component

use serde::{Deserialize, Serialize};

use crate::ecs::Component;
use crate::foundation::math::{white, Color, Vec2};

/// Reference to a texture owned by the asset layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureRef {
    /// Asset id of the texture
    pub id: u64,
}

impl TextureRef {
    /// Reference a texture by asset id
    pub const fn new(id: u64) -> Self {
        Self { id }
    }
}

/// Per-axis wrapping override; `None` keeps the texture's own setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextureWrapping {
    /// Use the texture's wrapping
    #[default]
    None,
    /// Repeat
    Repeat,
    /// Repeat, mirroring every other tile
    MirroredRepeat,
    /// Clamp coordinates to the edge texel
    ClampToEdge,
    /// Clamp coordinates to the border color
    ClampToBorder,
}

/// Filtering override; `None` keeps the texture's own setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextureFiltering {
    /// Use the texture's filtering
    #[default]
    None,
    /// Nearest texel
    Point,
    /// Bilinear
    Linear,
}

/// Draws a textured (or solid) quad at the entity's world transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteRendererComponent {
    /// Color multiplied with the texture
    pub tint: Color,
    /// Fragments with alpha below this are discarded
    pub alpha_clip_threshold: f32,
    /// Texture to sample, solid tint when absent
    pub texture: Option<TextureRef>,
    /// UV repeat count
    pub tiling: Vec2,
    /// UV offset
    pub offset: Vec2,
    /// Mirror horizontally
    pub flip_x: bool,
    /// Mirror vertically
    pub flip_y: bool,
    /// Tile even when the texture is a sub-texture of an atlas
    pub force_tile: bool,
    /// Horizontal wrapping override
    pub wrapping_x: TextureWrapping,
    /// Vertical wrapping override
    pub wrapping_y: TextureWrapping,
    /// Filtering override
    pub filtering: TextureFiltering,
    /// Border color for [`TextureWrapping::ClampToBorder`], texture default when absent
    pub border_color: Option<Color>,
}

impl Default for SpriteRendererComponent {
    fn default() -> Self {
        Self {
            tint: white(),
            alpha_clip_threshold: 0.0,
            texture: None,
            tiling: Vec2::new(1.0, 1.0),
            offset: Vec2::zeros(),
            flip_x: false,
            flip_y: false,
            force_tile: false,
            wrapping_x: TextureWrapping::None,
            wrapping_y: TextureWrapping::None,
            filtering: TextureFiltering::None,
            border_color: None,
        }
    }
}

impl SpriteRendererComponent {
    /// Solid sprite with a tint
    pub fn new(tint: Color) -> Self {
        Self {
            tint,
            ..Self::default()
        }
    }

    /// Textured sprite
    pub fn textured(texture: TextureRef) -> Self {
        Self {
            texture: Some(texture),
            ..Self::default()
        }
    }

    /// Builder pattern: set tint
    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }

    /// Builder pattern: set tiling and offset
    pub fn with_uv(mut self, tiling: Vec2, offset: Vec2) -> Self {
        self.tiling = tiling;
        self.offset = offset;
        self
    }

    /// Builder pattern: set flips
    pub fn with_flip(mut self, flip_x: bool, flip_y: bool) -> Self {
        self.flip_x = flip_x;
        self.flip_y = flip_y;
        self
    }

    /// Builder pattern: override wrapping on both axes
    pub fn with_wrapping(mut self, wrapping: TextureWrapping) -> Self {
        self.wrapping_x = wrapping;
        self.wrapping_y = wrapping;
        self
    }

    /// True when any sampler setting differs from the texture's own
    pub fn overrides_sampler(&self) -> bool {
        self.wrapping_x != TextureWrapping::None
            || self.wrapping_y != TextureWrapping::None
            || self.filtering != TextureFiltering::None
            || self.border_color.is_some()
    }
}

impl Component for SpriteRendererComponent {
    const NAME: &'static str = "SpriteRendererComponent";

    fn duplicate(&self) -> Self {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sprite() {
        let sprite = SpriteRendererComponent::default();
        assert_eq!(sprite.tint, white());
        assert_eq!(sprite.tiling, Vec2::new(1.0, 1.0));
        assert!(!sprite.overrides_sampler());
    }

    #[test]
    fn test_wrapping_override() {
        let sprite = SpriteRendererComponent::textured(TextureRef::new(7))
            .with_wrapping(TextureWrapping::MirroredRepeat);
        assert!(sprite.overrides_sampler());
        assert_eq!(sprite.wrapping_y, TextureWrapping::MirroredRepeat);
    }

    #[test]
    fn test_ron_roundtrip_keeps_overrides() {
        let mut sprite = SpriteRendererComponent::new(Color::new(1.0, 0.0, 0.0, 1.0)).with_flip(true, false);
        sprite.border_color = Some(Color::new(0.0, 0.0, 0.0, 1.0));

        let text = ron::to_string(&sprite).unwrap();
        let parsed: SpriteRendererComponent = ron::from_str(&text).unwrap();
        assert_eq!(parsed, sprite);
    }
}
