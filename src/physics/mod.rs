pub mod contact_filter;
pub mod event_handler;
pub mod user_data;

use super::*;
pub use contact_filter::ContactFilter;
pub use event_handler::{ContactEvent, PhysicsEventCollector};
pub use user_data::UserData;

const DEFAULT_LINEAR_DAMPING: f32 = 0.0;
const DEFAULT_ANGULAR_DAMPING: f32 = 0.05;
const DEFAULT_FRICTION: f32 = 0.3;
const DEFAULT_RESTITUTION: f32 = 0.2;
const DEFAULT_CONTACT_FORCE_EVENT_THRESHOLD: f32 = 0.0;

/// Sole owner of a rigid body.
///
/// Not `Clone`: only the physics world creates one and removing the body
/// consumes it, so a body can not outlive or be shared past its object.
#[derive(Debug, PartialEq, Eq)]
pub struct BodyHandle(RigidBodyHandle);
impl BodyHandle {
    pub fn raw(&self) -> RigidBodyHandle {
        self.0
    }
}

/// Everything needed to create a body with one collider.
#[derive(Clone)]
pub struct BodyDef {
    pub body_type: RigidBodyType,
    pub shape: SharedShape,
    pub density: f32,
    pub position: Point2<f32>,
    pub angle: f32,
    pub linvel: Vector2<f32>,
    pub angvel: f32,
    pub user_data: UserData,
    /// For small fast things.
    pub ccd: bool,
}
impl BodyDef {
    pub fn dynamic(shape: SharedShape, density: f32, user_data: UserData) -> Self {
        Self {
            body_type: RigidBodyType::Dynamic,
            shape,
            density,
            position: Point2::origin(),
            angle: 0.0,
            linvel: Vector2::zeros(),
            angvel: 0.0,
            user_data,
            ccd: false,
        }
    }

    pub fn fixed(shape: SharedShape, user_data: UserData) -> Self {
        Self {
            body_type: RigidBodyType::Fixed,
            ..Self::dynamic(shape, 1.0, user_data)
        }
    }

    pub fn at(mut self, position: Point2<f32>, angle: f32) -> Self {
        self.position = position;
        self.angle = angle;
        self
    }

    pub fn moving(mut self, linvel: Vector2<f32>, angvel: f32) -> Self {
        self.linvel = linvel;
        self.angvel = angvel;
        self
    }

    pub fn with_ccd(mut self) -> Self {
        self.ccd = true;
        self
    }

    pub fn mass(&self) -> f32 {
        self.shape.mass_properties(self.density).mass()
    }
}

/// Physics world of the near objects.
///
/// Bodies and colliders carry the packed [`UserData`] of their object.
/// Every body has exactly one collider.
pub struct Physics {
    query_pipeline: QueryPipeline,
    physics_pipeline: PhysicsPipeline,
    integration_parameters: IntegrationParameters,
    islands: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    events: PhysicsEventCollector,
}
impl Physics {
    pub fn new() -> Self {
        Self {
            query_pipeline: Default::default(),
            physics_pipeline: Default::default(),
            integration_parameters: IntegrationParameters {
                dt: DT,
                min_ccd_dt: DT / 100.0,
                ..Default::default()
            },
            islands: Default::default(),
            broad_phase: Default::default(),
            narrow_phase: Default::default(),
            bodies: Default::default(),
            colliders: Default::default(),
            impulse_joints: Default::default(),
            multibody_joints: Default::default(),
            ccd_solver: Default::default(),
            events: Default::default(),
        }
    }

    /// Advance by one fixed step.
    /// Contacts found during the step are kept until [`Physics::take_contact_events`].
    pub fn step(&mut self) {
        self.events.clear();

        self.physics_pipeline.step(
            &vector![0.0, 0.0],
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &ContactFilter,
            &self.events,
        );
    }

    pub fn take_contact_events(&mut self) -> Vec<ContactEvent> {
        self.events.take()
    }

    pub fn add_body(&mut self, def: BodyDef) -> BodyHandle {
        let user_data = def.user_data.pack();

        let rb = RigidBodyBuilder::new(def.body_type)
            .translation(def.position.coords)
            .rotation(def.angle)
            .linvel(def.linvel)
            .angvel(def.angvel)
            .linear_damping(DEFAULT_LINEAR_DAMPING)
            .angular_damping(DEFAULT_ANGULAR_DAMPING)
            .ccd_enabled(def.ccd)
            .user_data(user_data)
            .build();
        let rb = self.bodies.insert(rb);

        let coll = ColliderBuilder::new(def.shape)
            .density(def.density)
            .user_data(user_data)
            .active_hooks(ActiveHooks::FILTER_CONTACT_PAIRS)
            .active_events(ActiveEvents::CONTACT_FORCE_EVENTS)
            .contact_force_event_threshold(DEFAULT_CONTACT_FORCE_EVENT_THRESHOLD)
            .friction(DEFAULT_FRICTION)
            .restitution(DEFAULT_RESTITUTION)
            .build();
        self.colliders
            .insert_with_parent(coll, rb, &mut self.bodies);

        BodyHandle(rb)
    }

    /// Remove the body and its collider.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Option<RigidBody> {
        self.bodies.remove(
            handle.0,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        )
    }

    pub fn body(&self, handle: &BodyHandle) -> &RigidBody {
        &self.bodies[handle.0]
    }

    pub fn body_mut(&mut self, handle: &BodyHandle) -> &mut RigidBody {
        &mut self.bodies[handle.0]
    }

    pub fn num_bodies(&self) -> usize {
        self.bodies.len()
    }

    /// First collider hit going from `from` to `to`, skipping colliders
    /// for which `predicate` is false.
    pub fn cast_ray(
        &self,
        from: Point2<f32>,
        to: Point2<f32>,
        predicate: &dyn Fn(UserData) -> bool,
    ) -> Option<RayHit> {
        let dir = to - from;
        let len = dir.norm();
        if len <= f32::EPSILON {
            return None;
        }
        let ray = Ray::new(from, dir / len);

        let filter_predicate = |_: ColliderHandle, collider: &Collider| {
            UserData::unpack(collider.user_data).map_or(false, |other| predicate(other))
        };
        let filter = QueryFilter::default().predicate(&filter_predicate);

        let (handle, toi) =
            self.query_pipeline
                .cast_ray(&self.bodies, &self.colliders, &ray, len, true, filter)?;

        let user_data = UserData::unpack(self.colliders.get(handle)?.user_data)?;
        Some(RayHit {
            user_data,
            point: ray.point_at(toi),
        })
    }
}
impl Default for Physics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub user_data: UserData,
    pub point: Point2<f32>,
}
