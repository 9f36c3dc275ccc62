//! Native scripts component
//!
//! Maps script kinds to their descriptor and, while the scene runs, the live
//! instance. Instances are never created here: the scene builds them on its
//! next script update and hands them back after each call.

use std::collections::BTreeMap;

use log::debug;

use crate::ecs::{AttachContext, Component, ReleaseContext};
use crate::scripting::{downcast_mut, downcast_ref, NativeScript, ScriptDescriptor, ScriptTypeId, ScriptableEntity};

/// Descriptor plus the live instance, if any
pub struct ScriptData {
    descriptor: ScriptDescriptor,
    instance: Option<Box<dyn ScriptableEntity>>,
    in_call: bool,
}

impl ScriptData {
    fn new(descriptor: ScriptDescriptor) -> Self {
        Self {
            descriptor,
            instance: None,
            in_call: false,
        }
    }

    /// How to build and destroy this script
    pub fn descriptor(&self) -> &ScriptDescriptor {
        &self.descriptor
    }

    /// True while a live instance is stored
    pub fn is_instantiated(&self) -> bool {
        self.instance.is_some()
    }

    /// True while the instance is checked out for a hook call
    pub fn is_in_call(&self) -> bool {
        self.in_call
    }

    /// Destroy the stored instance through the descriptor's callback
    fn destroy_instance(&mut self) -> bool {
        match self.instance.take() {
            Some(instance) => {
                (self.descriptor.destroy)(instance);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for ScriptData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptData")
            .field("descriptor", &self.descriptor)
            .field("instantiated", &self.is_instantiated())
            .finish()
    }
}

/// Scripts attached to an entity, ordered by [`ScriptTypeId`]
#[derive(Debug, Default)]
pub struct NativeScriptsComponent {
    runtime: bool,
    scripts: BTreeMap<ScriptTypeId, ScriptData>,
}

impl NativeScriptsComponent {
    /// Empty component
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: attach a default-constructed script
    pub fn with_script<T: NativeScript + Default>(mut self) -> Self {
        self.add_descriptor(ScriptDescriptor::of_default::<T>());
        self
    }

    /// True while the owning scene is running
    pub fn is_runtime(&self) -> bool {
        self.runtime
    }

    pub(crate) fn set_runtime(&mut self, runtime: bool) {
        self.runtime = runtime;
    }

    /// Record a script kind. Returns `false` if the kind is already attached.
    pub fn add_descriptor(&mut self, descriptor: ScriptDescriptor) -> bool {
        if self.scripts.contains_key(&descriptor.id) {
            return false;
        }
        self.scripts.insert(descriptor.id, ScriptData::new(descriptor));
        true
    }

    /// Check for a script kind
    pub fn has(&self, id: ScriptTypeId) -> bool {
        self.scripts.contains_key(&id)
    }

    /// Check for a script type
    pub fn has_script<T: NativeScript>(&self) -> bool {
        self.has(T::script_type_id())
    }

    /// Script kinds in update order
    pub fn script_ids(&self) -> Vec<ScriptTypeId> {
        self.scripts.keys().copied().collect()
    }

    /// Number of attached scripts
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    /// True when no script is attached
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Script entry by kind
    pub fn script(&self, id: ScriptTypeId) -> Option<&ScriptData> {
        self.scripts.get(&id)
    }

    /// Live instance of a script type
    pub fn instance<T: NativeScript>(&self) -> Option<&T> {
        let instance = self.scripts.get(&T::script_type_id())?.instance.as_deref()?;
        downcast_ref::<T>(instance)
    }

    /// Live instance of a script type, mutably
    pub fn instance_mut<T: NativeScript>(&mut self) -> Option<&mut T> {
        let instance = self.scripts.get_mut(&T::script_type_id())?.instance.as_deref_mut()?;
        downcast_mut::<T>(instance)
    }

    /// Detach a script. Its live instance, if stored, goes back to the caller
    /// so lifecycle hooks can run before destruction.
    pub(crate) fn remove(&mut self, id: ScriptTypeId) -> Option<(ScriptDescriptor, Option<Box<dyn ScriptableEntity>>)> {
        self.scripts.remove(&id).map(|data| (data.descriptor, data.instance))
    }

    /// Take the live instance out for teardown
    pub(crate) fn take_instance(&mut self, id: ScriptTypeId) -> Option<Box<dyn ScriptableEntity>> {
        self.scripts.get_mut(&id)?.instance.take()
    }

    /// Check a script out for a hook call.
    ///
    /// `None` when the kind is absent or already inside a call. Otherwise the
    /// stored instance, if any, moves to the caller until
    /// [`NativeScriptsComponent::restore_instance`].
    #[allow(clippy::option_option)]
    pub(crate) fn check_out(&mut self, id: ScriptTypeId) -> Option<Option<Box<dyn ScriptableEntity>>> {
        let data = self.scripts.get_mut(&id)?;
        if data.in_call {
            return None;
        }
        data.in_call = true;
        Some(data.instance.take())
    }

    /// Put an instance back after a call. Gives it back if its slot is gone
    /// or occupied, or if the scene stopped meanwhile.
    pub(crate) fn restore_instance(
        &mut self,
        id: ScriptTypeId,
        instance: Box<dyn ScriptableEntity>,
    ) -> Result<(), Box<dyn ScriptableEntity>> {
        let runtime = self.runtime;
        match self.scripts.get_mut(&id) {
            Some(data) => {
                data.in_call = false;
                if runtime && data.instance.is_none() {
                    data.instance = Some(instance);
                    Ok(())
                } else {
                    Err(instance)
                }
            }
            None => Err(instance),
        }
    }

    /// Destroy every stored instance through its destroy callback
    pub(crate) fn destroy_instances(&mut self) -> usize {
        self.scripts.values_mut().map(ScriptData::destroy_instance).filter(|destroyed| *destroyed).count()
    }
}

impl Component for NativeScriptsComponent {
    const NAME: &'static str = "NativeScriptsComponent";

    /// Descriptors only; live instances stay with the original
    fn duplicate(&self) -> Self {
        Self {
            runtime: self.runtime,
            scripts: self
                .scripts
                .iter()
                .map(|(id, data)| (*id, ScriptData::new(data.descriptor.clone())))
                .collect(),
        }
    }

    fn on_attach(&mut self, ctx: &AttachContext) {
        self.runtime = ctx.running;
    }

    fn release(&mut self, _ctx: &mut ReleaseContext<'_>) {
        let destroyed = self.destroy_instances();
        if destroyed > 0 {
            debug!("Destroyed {} script instances on component teardown", destroyed);
        }
        self.runtime = false;
    }
}
