//! Running-mode lifecycle: play/stop, script hooks, physics stepping and
//! collision dispatch

use std::collections::BTreeSet;

use log::{debug, info, trace, warn};

use super::{Scene, SceneError};
use crate::ecs::components::{Colliders2DComponent, NativeScriptsComponent, RigidBody2DComponent, TransformComponent};
use crate::ecs::{Component, Entity, EntityId};
use crate::foundation::math::{euler_from_quat, Quat, Transform, Vec2, Vec3};
use crate::foundation::time::TimeStep;
use crate::physics::{BodyHandle, CollisionEvent, PhysicsError, RigidBodyType};
use crate::scripting::{Collision2D, ScriptContext, ScriptDescriptor, ScriptTypeId, ScriptableEntity};

impl Scene {
    /// True between [`Scene::on_scene_play`] and [`Scene::on_scene_stop`]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Pairs currently in contact, as last dispatched
    pub fn active_contacts(&self) -> impl Iterator<Item = (Entity, Entity)> + '_ {
        self.active_contacts
            .iter()
            .map(|(a, b)| (self.handle(*a), self.handle(*b)))
    }

    /// Enter running mode: deploy every rigid body and arm the scripts.
    ///
    /// Script instances are created lazily by the first script update. If a
    /// body fails to deploy the scene is stopped again and the error returned.
    pub fn on_scene_play(&mut self) -> Result<(), SceneError> {
        if self.running {
            warn!("Scene {} is already running", self.id.get());
            return Ok(());
        }

        info!("Scene {} entering running mode", self.id.get());
        self.running = true;
        self.update_world_transforms();

        if let Some(store) = self.storage.store_mut::<NativeScriptsComponent>() {
            for (_, slot) in store.iter_mut() {
                slot.value_mut().set_runtime(true);
            }
        }

        if let Err(e) = self.deploy_pending_bodies() {
            if let Err(stop_error) = self.on_scene_stop() {
                warn!("Rollback after failed play: {}", stop_error);
            }
            return Err(e);
        }
        Ok(())
    }

    /// Leave running mode: destroy script instances, then undeploy bodies.
    ///
    /// Keeps going past backend errors and reports the first one.
    pub fn on_scene_stop(&mut self) -> Result<(), SceneError> {
        if !self.running {
            return Ok(());
        }

        info!("Scene {} leaving running mode", self.id.get());
        for id in self.storage.entities_with::<NativeScriptsComponent>() {
            self.teardown_scripts(id);
            if let Some(scripts) = self.storage.get_mut::<NativeScriptsComponent>(id) {
                scripts.set_runtime(false);
            }
        }

        let mut first_error: Option<PhysicsError> = None;
        for id in self.storage.entities_with::<RigidBody2DComponent>() {
            if let Some(body) = self.storage.get_mut::<RigidBody2DComponent>(id) {
                if let Err(e) = body.undeploy(self.physics.as_mut()) {
                    warn!("Failed to undeploy body of {}: {}", self.handle(id), e);
                    first_error.get_or_insert(e);
                }
            }
            if let Some(colliders) = self.storage.get_mut::<Colliders2DComponent>(id) {
                colliders.detach_all();
            }
        }

        self.active_contacts.clear();
        self.running = false;
        first_error.map_or(Ok(()), |e| Err(e.into()))
    }

    /// Per-frame simulation: scripts, then physics
    pub fn on_update(&mut self, dt: TimeStep) -> Result<(), SceneError> {
        self.on_scripts_update(dt);
        self.on_physics_update(dt)
    }

    /// Run `on_update` on every script of every enabled scripts component.
    ///
    /// Instances missing at this point are created and get `on_create`
    /// first. Does nothing while stopped.
    pub fn on_scripts_update(&mut self, dt: TimeStep) {
        if !self.running {
            return;
        }

        for id in self.storage.entities_with::<NativeScriptsComponent>() {
            let Some(slot) = self.storage.slot::<NativeScriptsComponent>(id) else {
                continue;
            };
            if !slot.is_enabled() {
                continue;
            }

            for script in slot.value().script_ids() {
                self.run_script(id, script, |instance, ctx| instance.on_update(ctx, dt));
            }
        }
    }

    /// Step physics, write body poses back into transforms and dispatch the
    /// collision feed. Does nothing while stopped.
    pub fn on_physics_update(&mut self, dt: TimeStep) -> Result<(), SceneError> {
        if !self.running {
            return Ok(());
        }

        self.deploy_pending_bodies()?;
        let events = self.physics.step(dt)?;
        self.sync_transforms_from_bodies();

        for event in events {
            self.handle_collision(event);
        }
        Ok(())
    }

    /// Apply one contact transition from the physics feed.
    ///
    /// Each unordered pair is dispatched at most once per transition:
    /// repeated enters for a pair already in contact, and exits for a pair
    /// not in contact, are dropped. Both participants' scripts are notified.
    pub fn handle_collision(&mut self, event: CollisionEvent) {
        let (a, b) = event.pair();
        let key = if a <= b { (a, b) } else { (b, a) };

        if !self.allocator.is_alive(a) || !self.allocator.is_alive(b) {
            trace!("Dropping contact event for destroyed entity");
            self.active_contacts.remove(&key);
            return;
        }

        let transition = if event.is_enter {
            self.active_contacts.insert(key)
        } else {
            self.active_contacts.remove(&key)
        };
        if !transition {
            trace!("Ignoring repeated contact event for {:?}", key);
            return;
        }

        let (first, second) = (self.handle(key.0), self.handle(key.1));
        debug!(
            "Collision {} between {} and {}",
            if event.is_enter { "enter" } else { "exit" },
            first,
            second
        );

        self.dispatch_collision(key.0, Collision2D { other: second }, event.is_enter);
        self.dispatch_collision(key.1, Collision2D { other: first }, event.is_enter);
    }

    fn dispatch_collision(&mut self, id: EntityId, collision: Collision2D, is_enter: bool) {
        if !self.allocator.is_alive(id) {
            return;
        }
        let Some(slot) = self.storage.slot::<NativeScriptsComponent>(id) else {
            return;
        };
        if !slot.is_enabled() {
            return;
        }

        for script in slot.value().script_ids() {
            self.run_script(id, script, |instance, ctx| {
                if is_enter {
                    instance.on_collision_enter(ctx, &collision);
                } else {
                    instance.on_collision_exit(ctx, &collision);
                }
            });
        }
    }

    /// Check one script out, create its instance if needed, run `hook` and
    /// put it back.
    ///
    /// Scripts already inside a call are skipped. An instance whose slot went
    /// away during the hook (its script, its component or its entity was
    /// removed) or whose scene stopped meanwhile gets `on_destroy` and its
    /// destroy callback here.
    fn run_script(
        &mut self,
        id: EntityId,
        script: ScriptTypeId,
        hook: impl FnOnce(&mut dyn ScriptableEntity, &mut ScriptContext<'_>),
    ) {
        let entity = self.handle(id);
        let Some(scripts) = self.storage.get_mut::<NativeScriptsComponent>(id) else {
            return;
        };
        let Some(descriptor) = scripts.script(script).map(|data| data.descriptor().clone()) else {
            return;
        };
        let Some(stored) = scripts.check_out(script) else {
            trace!("Script {} on {} is already running a hook", descriptor.name, entity);
            return;
        };

        let (mut instance, created) = match stored {
            Some(instance) => (instance, false),
            None => ((descriptor.instantiate)(), true),
        };

        let mut ctx = ScriptContext::new(entity, self);
        if created {
            debug!("Instantiated script {} on {}", descriptor.name, entity);
            instance.on_create(&mut ctx);
        }
        hook(&mut *instance, &mut ctx);

        let leftover = match self.storage.get_mut::<NativeScriptsComponent>(id) {
            Some(scripts) if self.allocator.is_alive(id) => scripts.restore_instance(script, instance).err(),
            _ => Some(instance),
        };
        if let Some(instance) = leftover {
            debug!("Script {} on {} was detached during a hook", descriptor.name, entity);
            self.destroy_script_instance(entity, &descriptor, instance);
        }
    }

    /// Run `on_destroy` on every live script instance of an entity, then
    /// hand each to its destroy callback
    pub(super) fn teardown_scripts(&mut self, id: EntityId) -> usize {
        let Some(scripts) = self.storage.get::<NativeScriptsComponent>(id) else {
            return 0;
        };
        let entity = self.handle(id);

        let mut destroyed = 0;
        for script in scripts.script_ids() {
            let Some(scripts) = self.storage.get_mut::<NativeScriptsComponent>(id) else {
                break;
            };
            let Some(descriptor) = scripts.script(script).map(|data| data.descriptor().clone()) else {
                continue;
            };
            let Some(instance) = scripts.take_instance(script) else {
                continue;
            };

            self.destroy_script_instance(entity, &descriptor, instance);
            destroyed += 1;
        }
        destroyed
    }

    pub(super) fn destroy_script_instance(
        &mut self,
        entity: Entity,
        descriptor: &ScriptDescriptor,
        mut instance: Box<dyn ScriptableEntity>,
    ) {
        instance.on_destroy(&mut ScriptContext::new(entity, self));
        (descriptor.destroy)(instance);
        trace!("Destroyed script {} on {}", descriptor.name, entity);
    }

    /// Deploy every enabled rigid body that is still constructed
    pub(super) fn deploy_pending_bodies(&mut self) -> Result<usize, SceneError> {
        let mut deployed = 0;
        for id in self.storage.entities_with::<RigidBody2DComponent>() {
            let pending = self
                .storage
                .slot::<RigidBody2DComponent>(id)
                .is_some_and(|slot| slot.is_enabled() && !slot.value().is_deployed());
            if pending {
                self.deploy_body(id)?;
                deployed += 1;
            }
        }
        Ok(deployed)
    }

    /// Register one body at its entity's current world pose
    fn deploy_body(&mut self, id: EntityId) -> Result<BodyHandle, SceneError> {
        let world = self.world_transform_of(id);
        let position = Vec2::new(world.position.x, world.position.y);
        let angle = euler_from_quat(&world.rotation).z;
        let colliders = self
            .storage
            .get::<Colliders2DComponent>(id)
            .map(Colliders2DComponent::props)
            .unwrap_or_default();

        let entity = self.handle(id);
        let Some(body) = self.storage.get_mut::<RigidBody2DComponent>(id) else {
            return Err(SceneError::MissingComponent {
                entity,
                component: RigidBody2DComponent::NAME,
            });
        };
        let handle = body.deploy(self.physics.as_mut(), id, &colliders, position, angle)?;

        if let Some(colliders) = self.storage.get_mut::<Colliders2DComponent>(id) {
            colliders.attach_all(handle);
        }
        debug!("Deployed body of {} at ({}, {})", entity, position.x, position.y);
        Ok(handle)
    }

    /// Rebuild a deployed body, e.g. after its colliders changed.
    ///
    /// Contacts of the old body end with an exit. Returns whether a body was
    /// rebuilt.
    pub(super) fn redeploy_body(&mut self, id: EntityId) -> Result<bool, SceneError> {
        let Some(body) = self.storage.get_mut::<RigidBody2DComponent>(id) else {
            return Ok(false);
        };
        if !body.undeploy(self.physics.as_mut())? {
            return Ok(false);
        }

        if let Some(colliders) = self.storage.get_mut::<Colliders2DComponent>(id) {
            colliders.detach_all();
        }
        self.end_contacts(&BTreeSet::from([id]), true);

        let still_attached = self.allocator.is_alive(id) && self.storage.contains::<RigidBody2DComponent>(id);
        if self.running && still_attached {
            self.deploy_body(id)?;
        }
        Ok(true)
    }

    /// Drop every active contact involving one of `involved`, dispatching
    /// the exit to participants that are still alive.
    ///
    /// With `notify_involved` unset only participants outside `involved`
    /// hear about it, for entities that are on their way out.
    pub(super) fn end_contacts(&mut self, involved: &BTreeSet<EntityId>, notify_involved: bool) -> usize {
        let ended: Vec<(EntityId, EntityId)> = self
            .active_contacts
            .iter()
            .filter(|(a, b)| involved.contains(a) || involved.contains(b))
            .copied()
            .collect();

        for pair in &ended {
            self.active_contacts.remove(pair);
        }

        for &(a, b) in &ended {
            let (first, second) = (self.handle(a), self.handle(b));
            debug!("Collision exit between {} and {} (body removed)", first, second);
            if notify_involved || !involved.contains(&a) {
                self.dispatch_collision(a, Collision2D { other: second }, false);
            }
            if notify_involved || !involved.contains(&b) {
                self.dispatch_collision(b, Collision2D { other: first }, false);
            }
        }
        ended.len()
    }

    /// Copy simulated poses of deployed, non-static bodies into their local
    /// transforms
    fn sync_transforms_from_bodies(&mut self) {
        for id in self.storage.entities_with::<RigidBody2DComponent>() {
            let Some(body) = self.storage.get::<RigidBody2DComponent>(id) else {
                continue;
            };
            if body.props.body_type == RigidBodyType::Static {
                continue;
            }
            let fixed_rotation = body.props.fixed_rotation;
            let Some(pose) = body.handle().and_then(|handle| self.physics.body_pose(handle)) else {
                continue;
            };

            let parent_world = self.parent_world_transform(id);
            let Some(transform) = self.storage.get_mut::<TransformComponent>(id) else {
                continue;
            };

            let current = parent_world.combine(&transform.local());
            let body_world = Transform {
                position: Vec3::new(pose.position.x, pose.position.y, current.position.z),
                rotation: Quat::from_axis_angle(&Vec3::z_axis(), pose.angle),
                scale: current.scale,
            };
            let local = parent_world.inverse().combine(&body_world);

            transform.set_local_position(local.position);
            if !fixed_rotation {
                transform.set_local_rotation(local.rotation);
            }
        }
    }
}
