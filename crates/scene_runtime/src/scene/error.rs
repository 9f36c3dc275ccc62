use crate::ecs::Entity;
use crate::physics::PhysicsError;
use crate::render::RenderError;
use crate::scripting::ScriptTypeId;

/// Scene errors
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// Handle outlived its entity
    #[error("Stale entity handle {0}")]
    StaleEntity(Entity),

    /// Handle issued by another scene
    #[error("{0} belongs to another scene")]
    ForeignEntity(Entity),

    /// Component type already attached
    #[error("{entity} already has a {component}")]
    DuplicateComponent {
        /// Target entity
        entity: Entity,
        /// Component type name
        component: &'static str,
    },

    /// Component type not attached
    #[error("{entity} has no {component}")]
    MissingComponent {
        /// Target entity
        entity: Entity,
        /// Component type name
        component: &'static str,
    },

    /// Stable id already used by a living entity
    #[error("UUID {0:016x} is already in use")]
    DuplicateUuid(u64),

    /// Reparenting would put an entity below itself
    #[error("Cannot attach {child} under {parent}: {child} is an ancestor of {parent}")]
    HierarchyCycle {
        /// Requested parent
        parent: Entity,
        /// Entity being moved
        child: Entity,
    },

    /// Script kind already attached
    #[error("{entity} already has script {script}")]
    DuplicateScript {
        /// Target entity
        entity: Entity,
        /// Script name
        script: &'static str,
    },

    /// Script kind not attached
    #[error("{entity} has no script {script}")]
    MissingScript {
        /// Target entity
        entity: Entity,
        /// Script kind
        script: ScriptTypeId,
    },

    /// Physics backend error
    #[error("Physics error: {0}")]
    Physics(#[from] PhysicsError),

    /// Renderer error
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}
