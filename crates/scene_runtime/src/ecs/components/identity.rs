//! Identity and name components

use crate::ecs::Component;

/// Stable 64-bit identity, kept across scene copies and persisted forms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdComponent {
    /// Globally unique id
    pub id: u64,
}

impl IdComponent {
    /// Wrap an explicit id
    pub const fn new(id: u64) -> Self {
        Self { id }
    }

    /// Random id
    pub fn random() -> Self {
        Self { id: rand::random() }
    }
}

impl Component for IdComponent {
    const NAME: &'static str = "IdComponent";

    fn duplicate(&self) -> Self {
        *self
    }
}

/// Display name
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameComponent {
    /// Name shown in editors and logs
    pub name: String,
}

impl NameComponent {
    /// Name used when an entity is created without one
    pub const DEFAULT_NAME: &'static str = "Entity";

    /// Create a name component, falling back to [`Self::DEFAULT_NAME`]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.is_empty() {
            Self { name: Self::DEFAULT_NAME.to_string() }
        } else {
            Self { name }
        }
    }
}

impl Component for NameComponent {
    const NAME: &'static str = "NameComponent";

    fn duplicate(&self) -> Self {
        self.clone()
    }
}
