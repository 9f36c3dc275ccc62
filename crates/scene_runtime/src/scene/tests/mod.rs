//! Scene scenario tests and their fixtures

mod entities;
mod rendering;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::config::{Physics2DSettings, SceneSettings};
use crate::ecs::components::NativeScriptsComponent;
use crate::ecs::Entity;
use crate::foundation::math::Vec2;
use crate::foundation::time::TimeStep;
use crate::physics::{
    BodyHandle, BodyPose, Collider2DProps, CollisionEvent, PhysicsError, PhysicsWorld2D, RigidBody2DProps,
    SimplePhysicsWorld2D,
};
use crate::render::{CameraFrame, RenderError, SceneRenderer2D, SpriteDraw};
use crate::scripting::{Collision2D, NativeScript, ScriptContext, ScriptableEntity};

use super::Scene;

pub(super) const FRAME: TimeStep = TimeStep::from_seconds(1.0 / 60.0);

pub(super) fn zero_gravity() -> SceneSettings {
    SceneSettings {
        physics_2d: Physics2DSettings {
            gravity: Vec2::zeros(),
            ..Physics2DSettings::default()
        },
    }
}

/// Renderer that keeps everything it is given
#[derive(Default)]
pub(super) struct RecordingRenderer {
    pub cameras: Vec<CameraFrame>,
    pub sprites: Vec<SpriteDraw>,
    pub ended: usize,
    in_scene: bool,
}

impl SceneRenderer2D for RecordingRenderer {
    fn begin_scene(&mut self, camera: &CameraFrame) -> Result<(), RenderError> {
        self.cameras.push(camera.clone());
        self.in_scene = true;
        Ok(())
    }

    fn submit_sprite(&mut self, sprite: &SpriteDraw) -> Result<(), RenderError> {
        if !self.in_scene {
            return Err(RenderError::NoActiveScene("submit_sprite".into()));
        }
        self.sprites.push(sprite.clone());
        Ok(())
    }

    fn end_scene(&mut self) -> Result<(), RenderError> {
        self.in_scene = false;
        self.ended += 1;
        Ok(())
    }
}

/// Real bodies, but the collision feed is whatever the test queued
pub(super) struct ScriptedPhysicsWorld {
    inner: SimplePhysicsWorld2D,
    feed: Rc<RefCell<VecDeque<Vec<CollisionEvent>>>>,
    destroyed: Rc<Cell<usize>>,
}

impl ScriptedPhysicsWorld {
    pub fn new() -> (Self, Rc<RefCell<VecDeque<Vec<CollisionEvent>>>>, Rc<Cell<usize>>) {
        let feed = Rc::new(RefCell::new(VecDeque::new()));
        let destroyed = Rc::new(Cell::new(0));
        let world = Self {
            inner: SimplePhysicsWorld2D::new(&Physics2DSettings::default()),
            feed: Rc::clone(&feed),
            destroyed: Rc::clone(&destroyed),
        };
        (world, feed, destroyed)
    }
}

impl PhysicsWorld2D for ScriptedPhysicsWorld {
    fn create_body(
        &mut self,
        owner: crate::ecs::EntityId,
        props: &RigidBody2DProps,
        colliders: &[Collider2DProps],
        position: Vec2,
        angle: f32,
    ) -> Result<BodyHandle, PhysicsError> {
        self.inner.create_body(owner, props, colliders, position, angle)
    }

    fn destroy_body(&mut self, handle: BodyHandle) -> Result<(), PhysicsError> {
        self.destroyed.set(self.destroyed.get() + 1);
        self.inner.destroy_body(handle)
    }

    fn step(&mut self, dt: TimeStep) -> Result<Vec<CollisionEvent>, PhysicsError> {
        self.inner.step(dt)?;
        Ok(self.feed.borrow_mut().pop_front().unwrap_or_default())
    }

    fn body_pose(&self, handle: BodyHandle) -> Option<BodyPose> {
        self.inner.body_pose(handle)
    }

    fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec2> {
        self.inner.linear_velocity(handle)
    }

    fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> Result<(), PhysicsError> {
        self.inner.set_linear_velocity(handle, velocity)
    }

    fn gravity(&self) -> Vec2 {
        self.inner.gravity()
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.inner.set_gravity(gravity);
    }

    fn body_count(&self) -> usize {
        self.inner.body_count()
    }

    fn new_world(&self, settings: &Physics2DSettings) -> Box<dyn PhysicsWorld2D> {
        Box::new(Self {
            inner: SimplePhysicsWorld2D::new(settings),
            feed: Rc::clone(&self.feed),
            destroyed: Rc::clone(&self.destroyed),
        })
    }
}

/// Shared hook journal
pub(super) type Journal = Rc<RefCell<Vec<String>>>;

/// Script that writes every hook call to a journal
pub(super) struct Recorder {
    pub label: &'static str,
    pub journal: Journal,
}

impl Recorder {
    pub fn attach(scene: &mut Scene, entity: Entity, label: &'static str, journal: &Journal) {
        let journal = Rc::clone(journal);
        scene
            .add_script_with(entity, move || Recorder {
                label,
                journal: Rc::clone(&journal),
            })
            .unwrap();
    }

    fn record(&self, ctx: &ScriptContext<'_>, event: &str, other: Option<Entity>) {
        let other = other
            .and_then(|other| ctx.scene().name(other).ok().map(str::to_owned))
            .map(|name| format!(":{name}"))
            .unwrap_or_default();
        self.journal.borrow_mut().push(format!("{}.{}{}", self.label, event, other));
    }
}

impl ScriptableEntity for Recorder {
    fn on_create(&mut self, ctx: &mut ScriptContext<'_>) {
        self.record(ctx, "create", None);
    }

    fn on_update(&mut self, ctx: &mut ScriptContext<'_>, _dt: TimeStep) {
        self.record(ctx, "update", None);
    }

    fn on_destroy(&mut self, ctx: &mut ScriptContext<'_>) {
        self.record(ctx, "destroy", None);
    }

    fn on_collision_enter(&mut self, ctx: &mut ScriptContext<'_>, collision: &Collision2D) {
        self.record(ctx, "enter", Some(collision.other));
    }

    fn on_collision_exit(&mut self, ctx: &mut ScriptContext<'_>, collision: &Collision2D) {
        self.record(ctx, "exit", Some(collision.other));
    }
}

impl NativeScript for Recorder {
    const NAME: &'static str = "Recorder";
}

pub(super) fn count(journal: &Journal, entry: &str) -> usize {
    journal.borrow().iter().filter(|line| *line == entry).count()
}

pub(super) fn scripts(scene: &Scene, entity: Entity) -> &NativeScriptsComponent {
    scene.get_component::<NativeScriptsComponent>(entity).unwrap()
}
