//! Collision layer filtering
//!
//! Every collider sits on one or more layer bits and carries a mask of the
//! layers it wants to touch. A pair only collides when each side's layer is
//! in the other side's mask.

/// Collision layer bits
pub struct CollisionLayers;

impl CollisionLayers {
    /// No layer
    pub const NONE: u32 = 0;

    /// Every layer
    pub const ALL: u32 = 0xFFFF_FFFF;

    /// Layer colliders start on
    pub const DEFAULT: u32 = 1 << 0;

    /// Player character
    pub const PLAYER: u32 = 1 << 1;

    /// Enemy characters
    pub const ENEMY: u32 = 1 << 2;

    /// Projectiles
    pub const PROJECTILE: u32 = 1 << 3;

    /// Static level geometry
    pub const ENVIRONMENT: u32 = 1 << 4;

    /// Pickups and collectibles
    pub const PICKUP: u32 = 1 << 5;

    /// First bit free for game-specific layers
    pub const FIRST_CUSTOM: u32 = 1 << 8;

    /// Check whether two colliders should collide given their layers and masks
    pub fn should_collide(layer_a: u32, mask_a: u32, layer_b: u32, mask_b: u32) -> bool {
        (layer_a & mask_b) != 0 && (layer_b & mask_a) != 0
    }

    /// Combine layers into a mask
    pub fn mask(layers: &[u32]) -> u32 {
        layers.iter().fold(0, |acc, &layer| acc | layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_collide_mutual() {
        assert!(CollisionLayers::should_collide(
            CollisionLayers::PLAYER,
            CollisionLayers::ENVIRONMENT,
            CollisionLayers::ENVIRONMENT,
            CollisionLayers::ALL,
        ));
    }

    #[test]
    fn test_should_not_collide_one_way() {
        // Player wants pickups, pickups only want enemies
        assert!(!CollisionLayers::should_collide(
            CollisionLayers::PLAYER,
            CollisionLayers::PICKUP,
            CollisionLayers::PICKUP,
            CollisionLayers::ENEMY,
        ));
    }

    #[test]
    fn test_mask_creation() {
        let mask = CollisionLayers::mask(&[CollisionLayers::PLAYER, CollisionLayers::ENEMY]);
        assert_eq!(mask, CollisionLayers::PLAYER | CollisionLayers::ENEMY);
        assert_eq!(CollisionLayers::mask(&[]), CollisionLayers::NONE);
    }
}
