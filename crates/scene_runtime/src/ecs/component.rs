//! Component trait and lifecycle contexts

use crate::physics::PhysicsWorld2D;

/// Data aggregate attached to at most one entity per type.
///
/// The trait is the per-type capability table used by component storage:
/// how to copy a component into another entity or scene, what to do when it
/// is attached, and how to release resources it owns in external systems.
pub trait Component: 'static {
    /// Human-readable type name reported by editors and diagnostics
    const NAME: &'static str;

    /// Copy policy used by scene and entity duplication.
    ///
    /// Data-only components clone. Components owning external resources
    /// must return a copy that owns none of them.
    #[must_use]
    fn duplicate(&self) -> Self
    where
        Self: Sized;

    /// Called right after the component is inserted into a scene
    fn on_attach(&mut self, _ctx: &AttachContext) {}

    /// Release resources held outside the component (physics bodies, live
    /// script instances). Must be safe to call more than once.
    fn release(&mut self, _ctx: &mut ReleaseContext<'_>) {}
}

/// Scene state visible to [`Component::on_attach`]
#[derive(Debug, Clone, Copy, Default)]
pub struct AttachContext {
    /// Current viewport size of the owning scene
    pub viewport: (u32, u32),
    /// Whether the owning scene is in running mode
    pub running: bool,
}

/// External systems a component may need to release its resources
pub struct ReleaseContext<'a> {
    /// The physics world owned by the scene
    pub physics: &'a mut dyn PhysicsWorld2D,
}

impl<'a> ReleaseContext<'a> {
    /// Build a release context over a physics world
    pub fn new(physics: &'a mut dyn PhysicsWorld2D) -> Self {
        Self { physics }
    }
}
