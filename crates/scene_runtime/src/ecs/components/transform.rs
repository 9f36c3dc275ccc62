//! Transform component
//!
//! Holds the local TRS relative to the parent entity plus the cached
//! local-to-world result. Setters mark [`ChangedFlags`]; the scene walks the
//! hierarchy in [`Scene::update_world_transforms`](crate::scene::Scene::update_world_transforms)
//! and recomputes only dirty subtrees.

use bitflags::bitflags;

use crate::ecs::Component;
use crate::foundation::math::{euler_from_quat, quat_from_euler, Mat4, Quat, Transform, Vec3};

bitflags! {
    /// Which parts of a transform changed since the last world update
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChangedFlags: u8 {
        /// Local position changed
        const POSITION = 1 << 0;
        /// Local rotation changed
        const ROTATION = 1 << 1;
        /// Local scale changed
        const SCALE = 1 << 2;
        /// Entity moved to another parent
        const PARENT = 1 << 3;
    }
}

/// Local transform relative to the parent, with a cached world transform
#[derive(Debug, Clone, PartialEq)]
pub struct TransformComponent {
    local: Transform,
    euler_angles: Vec3,
    world: Transform,
    local_to_world: Mat4,
    changed: ChangedFlags,
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            local: Transform::identity(),
            euler_angles: Vec3::zeros(),
            world: Transform::identity(),
            local_to_world: Mat4::identity(),
            changed: ChangedFlags::all(),
        }
    }
}

impl Component for TransformComponent {
    const NAME: &'static str = "TransformComponent";

    fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.changed = ChangedFlags::all();
        copy
    }
}

impl TransformComponent {
    /// Identity transform
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from a local position
    pub fn from_position(position: Vec3) -> Self {
        Self::new().with_position(position)
    }

    /// Create from a full local transform
    pub fn from_transform(local: Transform) -> Self {
        Self {
            local,
            euler_angles: euler_from_quat(&local.rotation),
            ..Self::default()
        }
    }

    /// Builder pattern: set local position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.set_local_position(position);
        self
    }

    /// Builder pattern: set local rotation
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.set_local_rotation(rotation);
        self
    }

    /// Builder pattern: set local rotation from Euler angles (radians, XYZ order)
    pub fn with_euler_angles(mut self, angles: Vec3) -> Self {
        self.set_local_euler_angles(angles);
        self
    }

    /// Builder pattern: set local scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.set_local_scale(scale);
        self
    }

    /// Local transform relative to the parent
    pub fn local(&self) -> Transform {
        self.local
    }

    /// Local position
    pub fn local_position(&self) -> Vec3 {
        self.local.position
    }

    /// Set local position
    pub fn set_local_position(&mut self, position: Vec3) {
        self.local.position = position;
        self.changed |= ChangedFlags::POSITION;
    }

    /// Local rotation
    pub fn local_rotation(&self) -> Quat {
        self.local.rotation
    }

    /// Set local rotation
    pub fn set_local_rotation(&mut self, rotation: Quat) {
        self.local.rotation = rotation;
        self.euler_angles = euler_from_quat(&rotation);
        self.changed |= ChangedFlags::ROTATION;
    }

    /// Local rotation as Euler angles in radians.
    ///
    /// Returns the angles last set, so editing one axis does not make the
    /// others jump between equivalent representations.
    pub fn local_euler_angles(&self) -> Vec3 {
        self.euler_angles
    }

    /// Set local rotation from Euler angles in radians
    pub fn set_local_euler_angles(&mut self, angles: Vec3) {
        self.euler_angles = angles;
        self.local.rotation = quat_from_euler(angles);
        self.changed |= ChangedFlags::ROTATION;
    }

    /// Local scale
    pub fn local_scale(&self) -> Vec3 {
        self.local.scale
    }

    /// Set local scale
    pub fn set_local_scale(&mut self, scale: Vec3) {
        self.local.scale = scale;
        self.changed |= ChangedFlags::SCALE;
    }

    /// Local-to-parent matrix
    pub fn local_to_parent(&self) -> Mat4 {
        self.local.to_matrix()
    }

    /// Cached local-to-world matrix, current as of the last world update
    pub fn local_to_world(&self) -> Mat4 {
        self.local_to_world
    }

    /// Cached world transform
    pub fn world(&self) -> Transform {
        self.world
    }

    /// Cached world position
    pub fn world_position(&self) -> Vec3 {
        self.world.position
    }

    /// Cached world rotation
    pub fn world_rotation(&self) -> Quat {
        self.world.rotation
    }

    /// Changes since the last world update
    pub fn changed_flags(&self) -> ChangedFlags {
        self.changed
    }

    /// True when the cached world transform may be stale
    pub fn is_dirty(&self) -> bool {
        !self.changed.is_empty()
    }

    pub(crate) fn mark_parent_changed(&mut self) {
        self.changed |= ChangedFlags::PARENT;
    }

    /// Store a freshly composed world transform and clear change flags
    pub(crate) fn set_world(&mut self, world: Transform) {
        self.world = world;
        self.local_to_world = world.to_matrix();
        self.changed = ChangedFlags::empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_transform_is_dirty() {
        let transform = TransformComponent::new();
        assert!(transform.is_dirty());
        assert_eq!(transform.changed_flags(), ChangedFlags::all());
    }

    #[test]
    fn test_setters_mark_flags() {
        let mut transform = TransformComponent::new();
        transform.set_world(Transform::identity());
        assert!(!transform.is_dirty());

        transform.set_local_position(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(transform.changed_flags(), ChangedFlags::POSITION);

        transform.set_local_scale(Vec3::new(2.0, 2.0, 2.0));
        assert!(transform.changed_flags().contains(ChangedFlags::POSITION | ChangedFlags::SCALE));
    }

    #[test]
    fn test_euler_angles_are_preserved() {
        let angles = Vec3::new(0.0, 0.0, 1.2);
        let transform = TransformComponent::new().with_euler_angles(angles);
        assert_eq!(transform.local_euler_angles(), angles);

        let (_, _, yaw) = transform.local_rotation().euler_angles();
        assert_relative_eq!(yaw, 1.2, epsilon = 1e-5);
    }

    #[test]
    fn test_set_world_updates_matrix() {
        let mut transform = TransformComponent::from_position(Vec3::new(4.0, 0.0, 0.0));
        transform.set_world(transform.local());

        assert_relative_eq!(transform.world_position().x, 4.0);
        assert_relative_eq!(transform.local_to_world()[(0, 3)], 4.0);
    }

    #[test]
    fn test_duplicate_is_dirty() {
        let mut transform = TransformComponent::new();
        transform.set_world(Transform::identity());
        assert!(transform.duplicate().is_dirty());
    }
}
