//! Built-in 2D physics backend
//!
//! Integrates bodies with semi-implicit Euler and reports overlaps between
//! colliders of different bodies. There is no contact resolution: bodies pass
//! through each other and only enter/exit transitions are produced.
//!
//! Overlap detection runs in two phases like any collision system: a
//! broad phase over per-body bounds, then exact shape tests. Boxes are tested
//! as the axis-aligned bounds of their rotated outline.

use std::collections::BTreeSet;

use log::{debug, trace};
use slotmap::SlotMap;

use super::{
    BodyHandle, BodyPose, Collider2DProps, ColliderShape, CollisionEvent, CollisionLayers, PhysicsError,
    PhysicsWorld2D, RigidBody2DProps, RigidBodyType,
};
use crate::config::Physics2DSettings;
use crate::ecs::EntityId;
use crate::foundation::math::Vec2;
use crate::foundation::time::TimeStep;

struct Body {
    owner: EntityId,
    props: RigidBody2DProps,
    colliders: Vec<Collider2DProps>,
    position: Vec2,
    angle: f32,
    linear_velocity: Vec2,
    angular_velocity: f32,
}

/// World-space collider geometry for one step
#[derive(Debug, Clone, Copy)]
enum WorldShape {
    Aabb { min: Vec2, max: Vec2 },
    Circle { center: Vec2, radius: f32 },
}

impl WorldShape {
    fn bounds(&self) -> (Vec2, Vec2) {
        match *self {
            Self::Aabb { min, max } => (min, max),
            Self::Circle { center, radius } => {
                let r = Vec2::new(radius, radius);
                (center - r, center + r)
            }
        }
    }

    fn intersects(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Self::Aabb { min: a_min, max: a_max }, Self::Aabb { min: b_min, max: b_max }) => {
                a_min.x <= b_max.x && a_max.x >= b_min.x && a_min.y <= b_max.y && a_max.y >= b_min.y
            }
            (Self::Circle { center: a, radius: ra }, Self::Circle { center: b, radius: rb }) => {
                (a - b).norm_squared() <= (ra + rb) * (ra + rb)
            }
            (Self::Aabb { min, max }, Self::Circle { center, radius })
            | (Self::Circle { center, radius }, Self::Aabb { min, max }) => {
                let closest = Vec2::new(center.x.clamp(min.x, max.x), center.y.clamp(min.y, max.y));
                (center - closest).norm_squared() <= radius * radius
            }
        }
    }
}

struct WorldCollider {
    shape: WorldShape,
    layer: u32,
    mask: u32,
}

struct BodySnapshot {
    owner: EntityId,
    body_type: RigidBodyType,
    min: Vec2,
    max: Vec2,
    colliders: Vec<WorldCollider>,
}

fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

fn world_collider(body: &Body, collider: &Collider2DProps) -> WorldCollider {
    let center = body.position + rotate(collider.offset, body.angle);
    let shape = match collider.shape {
        ColliderShape::Circle { radius } => WorldShape::Circle { center, radius },
        ColliderShape::Box { half_extents } => {
            let (sin, cos) = (body.angle + collider.rotation).sin_cos();
            let half = Vec2::new(
                cos.abs() * half_extents.x + sin.abs() * half_extents.y,
                sin.abs() * half_extents.x + cos.abs() * half_extents.y,
            );
            WorldShape::Aabb {
                min: center - half,
                max: center + half,
            }
        }
    };
    WorldCollider {
        shape,
        layer: collider.layer,
        mask: collider.mask,
    }
}

/// Reference physics backend: Euler integration plus overlap reporting
pub struct SimplePhysicsWorld2D {
    gravity: Vec2,
    bodies: SlotMap<BodyHandle, Body>,
    contacts: BTreeSet<(EntityId, EntityId)>,
    body_limit: Option<usize>,
}

impl Default for SimplePhysicsWorld2D {
    fn default() -> Self {
        Self::new(&Physics2DSettings::default())
    }
}

impl SimplePhysicsWorld2D {
    /// Create an empty world
    pub fn new(settings: &Physics2DSettings) -> Self {
        Self {
            gravity: settings.gravity,
            bodies: SlotMap::with_key(),
            contacts: BTreeSet::new(),
            body_limit: None,
        }
    }

    /// Builder pattern: refuse to hold more than `limit` bodies
    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = Some(limit);
        self
    }

    /// Entity pairs currently in contact, ascending
    pub fn contacts(&self) -> impl Iterator<Item = (EntityId, EntityId)> + '_ {
        self.contacts.iter().copied()
    }

    fn integrate(&mut self, dt: f32) {
        let gravity = self.gravity;
        for body in self.bodies.values_mut() {
            match body.props.body_type {
                RigidBodyType::Static => continue,
                RigidBodyType::Kinematic => {}
                RigidBodyType::Dynamic => {
                    body.linear_velocity += gravity * body.props.gravity_scale * dt;
                    body.linear_velocity *= 1.0 / (1.0 + dt * body.props.linear_damping);
                    body.angular_velocity *= 1.0 / (1.0 + dt * body.props.angular_damping);
                }
            }

            if body.props.fixed_rotation {
                body.angular_velocity = 0.0;
            }

            body.position += body.linear_velocity * dt;
            body.angle += body.angular_velocity * dt;
        }
    }

    fn snapshot(&self) -> Vec<BodySnapshot> {
        self.bodies
            .values()
            .filter(|body| !body.colliders.is_empty())
            .map(|body| {
                let colliders: Vec<_> = body.colliders.iter().map(|c| world_collider(body, c)).collect();
                let (mut min, mut max) = colliders[0].shape.bounds();
                for collider in &colliders[1..] {
                    let (c_min, c_max) = collider.shape.bounds();
                    min = min.inf(&c_min);
                    max = max.sup(&c_max);
                }
                BodySnapshot {
                    owner: body.owner,
                    body_type: body.props.body_type,
                    min,
                    max,
                    colliders,
                }
            })
            .collect()
    }

    fn detect_contacts(&self) -> BTreeSet<(EntityId, EntityId)> {
        let bodies = self.snapshot();
        let mut current = BTreeSet::new();

        for (i, a) in bodies.iter().enumerate() {
            for b in &bodies[i + 1..] {
                // Contacts need at least one dynamic body
                if a.body_type != RigidBodyType::Dynamic && b.body_type != RigidBodyType::Dynamic {
                    continue;
                }

                // Broad phase
                let overlap = a.min.x <= b.max.x && a.max.x >= b.min.x && a.min.y <= b.max.y && a.max.y >= b.min.y;
                if !overlap {
                    continue;
                }

                // Narrow phase
                let touching = a.colliders.iter().any(|ca| {
                    b.colliders.iter().any(|cb| {
                        CollisionLayers::should_collide(ca.layer, ca.mask, cb.layer, cb.mask)
                            && ca.shape.intersects(&cb.shape)
                    })
                });

                if touching {
                    let pair = if a.owner <= b.owner { (a.owner, b.owner) } else { (b.owner, a.owner) };
                    current.insert(pair);
                }
            }
        }

        current
    }

    fn body(&self, handle: BodyHandle) -> Result<&Body, PhysicsError> {
        self.bodies.get(handle).ok_or(PhysicsError::UnknownBody(handle))
    }
}

impl PhysicsWorld2D for SimplePhysicsWorld2D {
    fn create_body(
        &mut self,
        owner: EntityId,
        props: &RigidBody2DProps,
        colliders: &[Collider2DProps],
        position: Vec2,
        angle: f32,
    ) -> Result<BodyHandle, PhysicsError> {
        props.validate()?;
        for collider in colliders {
            collider.validate()?;
        }

        if let Some(limit) = self.body_limit {
            if self.bodies.len() >= limit {
                return Err(PhysicsError::Allocation(format!("body limit of {limit} reached")));
            }
        }

        let handle = self.bodies.insert(Body {
            owner,
            props: props.clone(),
            colliders: colliders.to_vec(),
            position,
            angle,
            linear_velocity: props.linear_velocity,
            angular_velocity: props.angular_velocity,
        });

        debug!("Created {:?} body {:?} for entity {} with {} colliders", props.body_type, handle, owner, colliders.len());
        Ok(handle)
    }

    fn destroy_body(&mut self, handle: BodyHandle) -> Result<(), PhysicsError> {
        let body = self.bodies.remove(handle).ok_or(PhysicsError::UnknownBody(handle))?;
        self.contacts.retain(|(a, b)| *a != body.owner && *b != body.owner);
        debug!("Destroyed body {:?} of entity {}", handle, body.owner);
        Ok(())
    }

    fn step(&mut self, dt: TimeStep) -> Result<Vec<CollisionEvent>, PhysicsError> {
        let dt = dt.seconds();
        if !(dt.is_finite() && dt >= 0.0) {
            return Err(PhysicsError::InvalidProps(format!("time step must be finite and non-negative, got {dt}")));
        }

        self.integrate(dt);
        let current = self.detect_contacts();

        let mut events: Vec<CollisionEvent> = current
            .difference(&self.contacts)
            .map(|&(a, b)| CollisionEvent::new(a, b, true))
            .collect();
        events.extend(
            self.contacts
                .difference(&current)
                .map(|&(a, b)| CollisionEvent::new(a, b, false)),
        );

        if !events.is_empty() {
            trace!("Physics step produced {} contact transitions", events.len());
        }

        self.contacts = current;
        Ok(events)
    }

    fn body_pose(&self, handle: BodyHandle) -> Option<BodyPose> {
        self.body(handle).ok().map(|body| BodyPose {
            position: body.position,
            angle: body.angle,
        })
    }

    fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec2> {
        self.body(handle).ok().map(|body| body.linear_velocity)
    }

    fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> Result<(), PhysicsError> {
        let body = self.bodies.get_mut(handle).ok_or(PhysicsError::UnknownBody(handle))?;
        body.linear_velocity = velocity;
        Ok(())
    }

    fn gravity(&self) -> Vec2 {
        self.gravity
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn new_world(&self, settings: &Physics2DSettings) -> Box<dyn PhysicsWorld2D> {
        let mut world = Self::new(settings);
        world.body_limit = self.body_limit;
        Box::new(world)
    }
}
