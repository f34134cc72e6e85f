use super::*;

/// Physics body of a near object with its kinematics cached.
///
/// Cached fields stay valid after the body is destroyed,
/// which is what the far form is built from.
#[derive(Debug)]
pub struct NearBody {
    handle: Option<BodyHandle>,
    pub position: Point2<f32>,
    pub angle: f32,
    pub velocity: Vector2<f32>,
    pub angvel: f32,
    pub mass: f32,
}
impl NearBody {
    pub fn new(physics: &mut Physics, def: BodyDef) -> Self {
        let mass = def.mass();
        let position = def.position;
        let angle = def.angle;
        let velocity = def.linvel;
        let angvel = def.angvel;

        Self {
            handle: Some(physics.add_body(def)),
            position,
            angle,
            velocity,
            angvel,
            mass,
        }
    }

    pub fn sync(&mut self, physics: &Physics) {
        let Some(handle) = &self.handle else {
            return;
        };
        let body = physics.body(handle);
        self.position = Point2::from(*body.translation());
        self.angle = body.rotation().angle();
        self.velocity = *body.linvel();
        self.angvel = body.angvel();
    }

    pub fn handle(&self) -> Option<&BodyHandle> {
        self.handle.as_ref()
    }

    pub fn is_alive(&self) -> bool {
        self.handle.is_some()
    }

    pub fn receive_force(&mut self, physics: &mut Physics, force: Vector2<f32>, acc: bool) {
        let Some(handle) = &self.handle else {
            return;
        };
        let impulse = force_to_impulse(force, self.mass, acc, DT);
        physics.body_mut(handle).apply_impulse(impulse, true);
    }

    pub fn set_velocity(&mut self, physics: &mut Physics, velocity: Vector2<f32>) {
        self.velocity = velocity;
        if let Some(handle) = &self.handle {
            physics.body_mut(handle).set_linvel(velocity, true);
        }
    }

    pub fn set_angvel(&mut self, physics: &mut Physics, angvel: f32) {
        self.angvel = angvel;
        if let Some(handle) = &self.handle {
            physics.body_mut(handle).set_angvel(angvel, true);
        }
    }

    /// Later calls do nothing.
    pub fn destroy(&mut self, physics: &mut Physics) {
        if let Some(handle) = self.handle.take() {
            physics.remove_body(handle);
        }
    }
}

/// Impulse applying `force` for `dt`.
pub fn force_to_impulse(force: Vector2<f32>, mass: f32, acc: bool, dt: f32) -> Vector2<f32> {
    if acc {
        force * mass * dt
    } else {
        force * dt
    }
}

#[test]
fn test_force_to_impulse() {
    let force = Vector2::new(2.0, -1.0);
    approx::assert_relative_eq!(
        force_to_impulse(force, 3.0, true, 0.5),
        Vector2::new(3.0, -1.5)
    );
    approx::assert_relative_eq!(
        force_to_impulse(force, 3.0, false, 0.5),
        Vector2::new(1.0, -0.5)
    );
}

#[test]
fn test_destroy_once() {
    let mut physics = Physics::new();
    let def = BodyDef::dynamic(
        SharedShape::ball(0.5),
        1.0,
        UserData::new(ObjId(0), ObjKind::Other),
    )
    .at(Point2::new(1.0, 2.0), 0.3);
    let mut body = NearBody::new(&mut physics, def);
    assert_eq!(physics.num_bodies(), 1);
    approx::assert_relative_eq!(body.mass, std::f32::consts::PI * 0.25, epsilon = 1e-4);

    body.destroy(&mut physics);
    body.destroy(&mut physics);
    assert!(!body.is_alive());
    assert_eq!(physics.num_bodies(), 0);
    approx::assert_relative_eq!(body.position, Point2::new(1.0, 2.0));
}

#[test]
fn test_sync_after_step() {
    let mut physics = Physics::new();
    let def = BodyDef::dynamic(
        SharedShape::ball(0.5),
        1.0,
        UserData::new(ObjId(0), ObjKind::Other),
    )
    .moving(Vector2::new(6.0, 0.0), 0.0);
    let mut body = NearBody::new(&mut physics, def);

    // One second.
    for _ in 0..50 {
        physics.step();
    }
    body.sync(&physics);
    approx::assert_relative_eq!(body.position.x, 6.0, epsilon = 0.05);
    approx::assert_relative_eq!(body.velocity.x, 6.0, epsilon = 0.05);
}
