use super::*;

/// Ships closer than this (plus their radius) are pulled in.
pub const PULL_RADIUS: f32 = 3.0;
/// Ships touching this are sent to the paired port.
pub const CORE_RADIUS: f32 = 0.6;
pub const BODY_RADIUS: f32 = 0.25;
const PULL_ACC: f32 = 3.0;
/// Travel speed of the transcendent. Faster than anything else.
pub const TRAVEL_SPEED: f32 = 12.0;
const EXIT_SPEED: f32 = 1.0;
const TRAVEL_SOUND: &str = "transcendentCreated";
const ARRIVE_SOUND: &str = "transcendentFinished";

/// Where and how fast a ship carried to `destination` coming from `from` is released.
/// Past the pull radius, moving away from the port.
fn exit(from: Point2<f32>, destination: Point2<f32>) -> (Point2<f32>, Vector2<f32>) {
    let dir = (destination - from)
        .try_normalize(0.001)
        .unwrap_or_else(|| Vector2::new(1.0, 0.0));
    (destination + dir * (PULL_RADIUS + 1.0), dir * EXIT_SPEED)
}

pub struct StarPortBuilder {
    position: Point2<f32>,
    destination: Point2<f32>,
    remover: Option<Rc<dyn RemoveController>>,
}
impl StarPortBuilder {
    pub fn new(position: Point2<f32>, destination: Point2<f32>) -> Self {
        Self {
            position,
            destination,
            remover: None,
        }
    }

    pub fn with_remover(mut self, remover: Option<Rc<dyn RemoveController>>) -> Self {
        self.remover = remover;
        self
    }

    pub fn build(self, physics: &mut Physics, id: ObjId) -> StarPort {
        let def = BodyDef::fixed(
            SharedShape::ball(BODY_RADIUS),
            UserData::new(id, ObjKind::StarPort),
        )
        .at(self.position, 0.0);

        StarPort {
            body: NearBody::new(physics, def),
            destination: self.destination,
            remover: self.remover,
        }
    }

    pub fn build_far(self) -> FarStarPort {
        FarStarPort {
            position: self.position,
            destination: self.destination,
            remover: self.remover,
        }
    }
}

/// Fixed gate pulling nearby ships and sending them to its paired port.
pub struct StarPort {
    body: NearBody,
    destination: Point2<f32>,
    remover: Option<Rc<dyn RemoveController>>,
}
impl SolObject for StarPort {
    fn kind(&self) -> ObjKind {
        ObjKind::StarPort
    }

    fn update(&mut self, ctx: &mut UpdateCtx) {
        let position = self.body.position;
        let destination = self.destination;

        for other in ctx.others.iter() {
            if other.kind != ObjKind::Ship {
                continue;
            }

            let to_port = position - other.position;
            let dist = to_port.norm();
            if dist < CORE_RADIUS + other.radius {
                log::debug!("{:?} entering star port toward {}", other.id, destination);
                ctx.env
                    .sounds
                    .play_name(TRAVEL_SOUND, other.position, Some(other.id));
                let convert = move |ship_id: ObjId,
                                    ship: Box<dyn FarObject>,
                                    commands: &mut ObjCommands| {
                    let id = commands.reserve_id();
                    let transcendent = Transcendent::new(ship_id, ship, position, destination);
                    commands.add_delayed(id, Box::new(transcendent));
                };
                ctx.commands
                    .remove_delayed_as(other.id, Removal::Convert(Box::new(convert)));
            } else if dist < PULL_RADIUS + other.radius {
                let mut pull = ctx.vecs.obtain_with(to_port);
                *pull *= PULL_ACC / dist;
                ctx.commands.force(other.id, *pull, true);
            }
        }
    }

    fn should_be_removed(&self, env: &SimEnv) -> bool {
        should_remove(&self.remover, self.body.position, env)
    }

    fn on_remove(&mut self, ctx: &mut UpdateCtx) {
        self.body.destroy(ctx.physics);
    }

    fn receive_dmg(&mut self, _dmg: DmgEvent, _env: &mut SimEnv) {}

    fn receive_force(&mut self, _force: Vector2<f32>, _acc: bool, _physics: &mut Physics) {}

    fn to_far(self: Box<Self>) -> Option<Box<dyn FarObject>> {
        Some(Box::new(FarStarPort {
            position: self.body.position,
            destination: self.destination,
            remover: self.remover,
        }))
    }

    fn position(&self) -> Point2<f32> {
        self.body.position
    }

    fn velocity(&self) -> Option<Vector2<f32>> {
        None
    }

    fn angle(&self) -> f32 {
        self.body.angle
    }

    fn radius(&self) -> f32 {
        BODY_RADIUS
    }

    fn surface(&self) -> Surface {
        Surface::Metal
    }

    fn drawables(&self) -> Drawables {
        smallvec![
            Drawable::centered("starPort", BODY_RADIUS * 2.0, DrawLevel::Bodies),
            Drawable::centered("starPortGlow", PULL_RADIUS * 2.0, DrawLevel::Effects),
        ]
    }

    fn near_body(&self) -> Option<&NearBody> {
        Some(&self.body)
    }

    fn near_body_mut(&mut self) -> Option<&mut NearBody> {
        Some(&mut self.body)
    }
}

pub struct FarStarPort {
    position: Point2<f32>,
    destination: Point2<f32>,
    remover: Option<Rc<dyn RemoveController>>,
}
impl FarObject for FarStarPort {
    fn kind(&self) -> ObjKind {
        ObjKind::StarPort
    }

    fn should_be_removed(&self, env: &SimEnv) -> bool {
        should_remove(&self.remover, self.position, env)
    }

    fn to_near(self: Box<Self>, id: ObjId, physics: &mut Physics) -> Box<dyn SolObject> {
        let port = StarPortBuilder::new(self.position, self.destination)
            .with_remover(self.remover)
            .build(physics, id);
        Box::new(port)
    }

    fn position(&self) -> Point2<f32> {
        self.position
    }

    fn radius(&self) -> f32 {
        BODY_RADIUS
    }

    fn relocate(&mut self, position: Point2<f32>, _velocity: Vector2<f32>) {
        self.position = position;
    }
}

/// A ship travelling between star ports. Has no body.
///
/// On arrival the ship is released outside the destination's pull radius under its own id.
pub struct Transcendent {
    ship_id: ObjId,
    ship: Option<Box<dyn FarObject>>,
    position: Point2<f32>,
    from: Point2<f32>,
    destination: Point2<f32>,
}
impl Transcendent {
    pub fn new(
        ship_id: ObjId,
        ship: Box<dyn FarObject>,
        from: Point2<f32>,
        destination: Point2<f32>,
    ) -> Self {
        Self {
            ship_id,
            ship: Some(ship),
            position: from,
            from,
            destination,
        }
    }

    fn travel_velocity(&self) -> Vector2<f32> {
        (self.destination - self.from)
            .try_normalize(0.001)
            .unwrap_or_else(Vector2::zeros)
            * TRAVEL_SPEED
    }
}
impl SolObject for Transcendent {
    fn kind(&self) -> ObjKind {
        ObjKind::Transcendent
    }

    fn update(&mut self, ctx: &mut UpdateCtx) {
        let Some(mut ship) = self.ship.take() else {
            return;
        };

        if !travel(&mut self.position, self.destination, TRAVEL_SPEED * DT) {
            self.ship = Some(ship);
            return;
        }

        let (position, velocity) = exit(self.from, self.destination);
        ship.relocate(position, velocity);
        log::debug!("{:?} arrived at {}", self.ship_id, self.destination);
        ctx.env
            .sounds
            .play_name(ARRIVE_SOUND, self.destination, Some(self.ship_id));

        let near = ship.to_near(self.ship_id, ctx.physics);
        ctx.commands.add_delayed(self.ship_id, near);
        ctx.commands.remove_delayed(ctx.id);
        // The ship was demoted and promoted in the same tick.
        ctx.commands.reset_delays();
    }

    fn should_be_removed(&self, _env: &SimEnv) -> bool {
        false
    }

    fn on_remove(&mut self, _ctx: &mut UpdateCtx) {}

    fn receive_dmg(&mut self, _dmg: DmgEvent, _env: &mut SimEnv) {}

    fn to_far(self: Box<Self>) -> Option<Box<dyn FarObject>> {
        let ship = self.ship?;
        Some(Box::new(FarTranscendent {
            ship_id: self.ship_id,
            ship: Some(ship),
            position: self.position,
            from: self.from,
            destination: self.destination,
        }))
    }

    fn position(&self) -> Point2<f32> {
        self.position
    }

    fn velocity(&self) -> Option<Vector2<f32>> {
        Some(self.travel_velocity())
    }

    fn angle(&self) -> f32 {
        let v = self.travel_velocity();
        v.y.atan2(v.x)
    }

    fn radius(&self) -> f32 {
        self.ship.as_ref().map_or(0.0, |ship| ship.radius())
    }

    fn drawables(&self) -> Drawables {
        smallvec![Drawable::centered(
            "transcendent",
            self.radius() * 2.0,
            DrawLevel::Effects
        )]
    }

    fn passenger(&self) -> Option<ObjId> {
        Some(self.ship_id)
    }
}

/// Move `position` toward `destination` by at most `step`. True once there.
fn travel(position: &mut Point2<f32>, destination: Point2<f32>, step: f32) -> bool {
    let to_destination = destination - *position;
    let dist = to_destination.norm();
    if dist <= step {
        *position = destination;
        true
    } else {
        *position += to_destination * (step / dist);
        false
    }
}

pub struct FarTranscendent {
    ship_id: ObjId,
    ship: Option<Box<dyn FarObject>>,
    position: Point2<f32>,
    from: Point2<f32>,
    destination: Point2<f32>,
}
impl FarObject for FarTranscendent {
    fn kind(&self) -> ObjKind {
        ObjKind::Transcendent
    }

    fn update(&mut self, _env: &SimEnv) {
        travel(&mut self.position, self.destination, TRAVEL_SPEED * DT);
    }

    fn should_be_removed(&self, _env: &SimEnv) -> bool {
        self.ship.is_none()
    }

    fn to_near(self: Box<Self>, _id: ObjId, _physics: &mut Physics) -> Box<dyn SolObject> {
        Box::new(Transcendent {
            ship_id: self.ship_id,
            ship: self.ship,
            position: self.position,
            from: self.from,
            destination: self.destination,
        })
    }

    fn position(&self) -> Point2<f32> {
        self.position
    }

    fn radius(&self) -> f32 {
        self.ship.as_ref().map_or(0.0, |ship| ship.radius())
    }

    fn relocate(&mut self, position: Point2<f32>, _velocity: Vector2<f32>) {
        self.position = position;
    }

    fn passenger(&self) -> Option<ObjId> {
        Some(self.ship_id)
    }

    fn take_arrived_passenger(&mut self) -> Option<(ObjId, Box<dyn FarObject>)> {
        if self.position != self.destination {
            return None;
        }
        let mut ship = self.ship.take()?;
        let (position, velocity) = exit(self.from, self.destination);
        ship.relocate(position, velocity);
        Some((self.ship_id, ship))
    }
}

#[test]
fn test_travel() {
    let mut position = Point2::new(0.0, 0.0);
    let destination = Point2::new(1.0, 0.0);
    assert!(!travel(&mut position, destination, 0.4));
    approx::assert_relative_eq!(position, Point2::new(0.4, 0.0));
    assert!(!travel(&mut position, destination, 0.4));
    assert!(travel(&mut position, destination, 0.4));
    assert_eq!(position, destination);
}

#[test]
fn test_exit_outside_pull_radius() {
    let (position, velocity) = exit(Point2::new(-10.0, 0.0), Point2::new(10.0, 0.0));
    assert!((position - Point2::new(10.0, 0.0)).norm() > PULL_RADIUS);
    assert!(velocity.x > 0.0);
}
