//! Native scripting
//!
//! A script kind is declared once with a stable [`ScriptTypeId`]. Entities
//! carry [`ScriptDescriptor`]s that know how to build and destroy instances;
//! live instances only exist while the scene is running.

mod context;

pub use context::{Collision2D, ScriptContext};

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::foundation::time::TimeStep;

/// Process-wide stable identity of a script kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScriptTypeId(u64);

impl ScriptTypeId {
    /// Derive an id from a script name (64-bit FNV-1a)
    pub const fn from_name(name: &str) -> Self {
        const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0100_0000_01b3;

        let bytes = name.as_bytes();
        let mut hash = OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(PRIME);
            i += 1;
        }
        Self(hash)
    }

    /// Raw value
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ScriptTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Downcasting support for boxed scripts
pub trait AsAny: Any {
    /// Borrow as [`Any`]
    fn as_any(&self) -> &dyn Any;
    /// Mutably borrow as [`Any`]
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behavior attached to an entity, driven by the scene while running
pub trait ScriptableEntity: AsAny {
    /// Called once, right before the first update
    fn on_create(&mut self, _ctx: &mut ScriptContext<'_>) {}

    /// Called every script update
    fn on_update(&mut self, _ctx: &mut ScriptContext<'_>, _dt: TimeStep) {}

    /// Called before the instance is destroyed while its entity is alive
    fn on_destroy(&mut self, _ctx: &mut ScriptContext<'_>) {}

    /// Contact with another entity began
    fn on_collision_enter(&mut self, _ctx: &mut ScriptContext<'_>, _collision: &Collision2D) {}

    /// Contact with another entity ended
    fn on_collision_exit(&mut self, _ctx: &mut ScriptContext<'_>, _collision: &Collision2D) {}
}

/// A script kind with a compile-time name
pub trait NativeScript: ScriptableEntity + Sized {
    /// Unique script name, the source of [`ScriptTypeId`]
    const NAME: &'static str;

    /// Stable id of this script kind
    fn script_type_id() -> ScriptTypeId {
        ScriptTypeId::from_name(Self::NAME)
    }
}

/// Builds a fresh script instance
pub type InstantiateFn = Rc<dyn Fn() -> Box<dyn ScriptableEntity>>;

/// Tears down a script instance
pub type DestroyFn = Rc<dyn Fn(Box<dyn ScriptableEntity>)>;

/// Type-erased recipe for a script kind
#[derive(Clone)]
pub struct ScriptDescriptor {
    /// Script kind
    pub id: ScriptTypeId,
    /// Script name for diagnostics
    pub name: &'static str,
    /// Deferred constructor
    pub instantiate: InstantiateFn,
    /// Explicit teardown
    pub destroy: DestroyFn,
}

impl ScriptDescriptor {
    /// Descriptor for a script built by `factory`
    pub fn of<T: NativeScript>(factory: impl Fn() -> T + 'static) -> Self {
        Self {
            id: T::script_type_id(),
            name: T::NAME,
            instantiate: Rc::new(move || Box::new(factory()) as Box<dyn ScriptableEntity>),
            destroy: Rc::new(|instance: Box<dyn ScriptableEntity>| drop(instance)),
        }
    }

    /// Descriptor for a script built with [`Default`]
    pub fn of_default<T: NativeScript + Default>() -> Self {
        Self::of(T::default)
    }

    /// Builder pattern: replace the teardown callback
    pub fn with_destroy(mut self, destroy: impl Fn(Box<dyn ScriptableEntity>) + 'static) -> Self {
        self.destroy = Rc::new(destroy);
        self
    }
}

impl fmt::Debug for ScriptDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Downcast a script instance to its concrete type
pub fn downcast_ref<T: ScriptableEntity>(script: &dyn ScriptableEntity) -> Option<&T> {
    script.as_any().downcast_ref::<T>()
}

/// Mutably downcast a script instance to its concrete type
pub fn downcast_mut<T: ScriptableEntity>(script: &mut dyn ScriptableEntity) -> Option<&mut T> {
    script.as_any_mut().downcast_mut::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct Rotator {
        speed: f32,
    }

    impl ScriptableEntity for Rotator {}

    impl NativeScript for Rotator {
        const NAME: &'static str = "Rotator";
    }

    #[test]
    fn test_type_id_is_stable() {
        assert_eq!(ScriptTypeId::from_name("Rotator"), Rotator::script_type_id());
        assert_ne!(ScriptTypeId::from_name("Rotator"), ScriptTypeId::from_name("Mover"));
        // FNV-1a of the empty string is the offset basis
        assert_eq!(ScriptTypeId::from_name("").get(), 0xcbf2_9ce4_8422_2325);
    }

    #[test]
    fn test_descriptor_instantiates_and_destroys() {
        let destroyed = Rc::new(Cell::new(0));
        let counter = Rc::clone(&destroyed);
        let descriptor = ScriptDescriptor::of(|| Rotator { speed: 2.0 }).with_destroy(move |_| {
            counter.set(counter.get() + 1);
        });

        let instance = (descriptor.instantiate)();
        assert_eq!(downcast_ref::<Rotator>(instance.as_ref()).map(|r| r.speed), Some(2.0));

        (descriptor.destroy)(instance);
        assert_eq!(destroyed.get(), 1);
    }
}
