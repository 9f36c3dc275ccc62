//! Collider shapes and properties

use serde::{Deserialize, Serialize};

use super::{CollisionLayers, PhysicsError};
use crate::foundation::math::Vec2;

/// Collider geometry in body-local space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    /// Box given by half extents
    Box {
        /// Half width and half height
        half_extents: Vec2,
    },
    /// Circle
    Circle {
        /// Radius
        radius: f32,
    },
}

impl Default for ColliderShape {
    fn default() -> Self {
        Self::Box {
            half_extents: Vec2::new(0.5, 0.5),
        }
    }
}

/// Construction properties of a collider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Collider2DProps {
    /// Geometry
    pub shape: ColliderShape,
    /// Offset from the body origin
    pub offset: Vec2,
    /// Rotation relative to the body in radians
    pub rotation: f32,
    /// Friction coefficient
    pub friction: f32,
    /// Restitution
    pub bounciness: f32,
    /// Density used for mass distribution
    pub density: f32,
    /// Report overlaps without physical response
    pub is_trigger: bool,
    /// Layers this collider is on
    pub layer: u32,
    /// Layers this collider collides with
    pub mask: u32,
}

impl Default for Collider2DProps {
    fn default() -> Self {
        Self {
            shape: ColliderShape::default(),
            offset: Vec2::zeros(),
            rotation: 0.0,
            friction: 0.2,
            bounciness: 0.0,
            density: 1.0,
            is_trigger: false,
            layer: CollisionLayers::DEFAULT,
            mask: CollisionLayers::ALL,
        }
    }
}

impl Collider2DProps {
    /// Box collider from full width and height
    pub fn boxed(width: f32, height: f32) -> Self {
        Self {
            shape: ColliderShape::Box {
                half_extents: Vec2::new(width * 0.5, height * 0.5),
            },
            ..Self::default()
        }
    }

    /// Circle collider
    pub fn circle(radius: f32) -> Self {
        Self {
            shape: ColliderShape::Circle { radius },
            ..Self::default()
        }
    }

    /// Builder pattern: set offset
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Builder pattern: make this a trigger
    pub fn with_trigger(mut self, is_trigger: bool) -> Self {
        self.is_trigger = is_trigger;
        self
    }

    /// Builder pattern: set layer and mask
    pub fn with_layers(mut self, layer: u32, mask: u32) -> Self {
        self.layer = layer;
        self.mask = mask;
        self
    }

    /// Check geometry a backend cannot simulate
    pub fn validate(&self) -> Result<(), PhysicsError> {
        let valid = match self.shape {
            ColliderShape::Box { half_extents } => {
                half_extents.x.is_finite() && half_extents.y.is_finite() && half_extents.x > 0.0 && half_extents.y > 0.0
            }
            ColliderShape::Circle { radius } => radius.is_finite() && radius > 0.0,
        };
        if !valid {
            return Err(PhysicsError::InvalidProps(format!("degenerate collider shape {:?}", self.shape)));
        }
        if self.density < 0.0 {
            return Err(PhysicsError::InvalidProps("collider density must not be negative".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boxed_uses_half_extents() {
        let props = Collider2DProps::boxed(2.0, 4.0);
        assert_eq!(props.shape, ColliderShape::Box { half_extents: Vec2::new(1.0, 2.0) });
    }

    #[test]
    fn test_validate_shapes() {
        assert!(Collider2DProps::circle(0.5).validate().is_ok());
        assert!(Collider2DProps::circle(0.0).validate().is_err());
        assert!(Collider2DProps::boxed(1.0, -1.0).validate().is_err());
    }
}
