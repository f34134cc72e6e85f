use super::*;
use std::f32::consts::{PI, TAU};

const CRASH_DURABILITY: f32 = 0.5;
const LOOT_THROW_SPEED: f32 = 0.6;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub enum WishAngVel {
    /// Do nothing.
    #[default]
    None,
    /// Try to reach 0 angvel.
    Stop,
    /// Face a world space position without overshooting.
    Aim(Point2<f32>),
    /// Turn left or right.
    /// **Force is clamped to 1**
    Force(f32),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub enum WishLinVel {
    /// Drift.
    #[default]
    None,
    /// Engine on, pushing forward.
    Thrust,
    /// Push against the current velocity until stopped.
    Cancel,
}

pub fn integrate_angular_velocity(
    angular_velocity: f32,
    wish_angular_velocity: f32,
    angular_acceleration: f32,
    delta: f32,
) -> f32 {
    angular_velocity
        + f32::clamp(
            wish_angular_velocity - angular_velocity,
            -angular_acceleration * delta,
            angular_acceleration * delta,
        )
}

/// Return an angle such that `angle + this` point toward `to`.
/// Result is in the range `[-PI, PI]`.
pub fn angle_to(angle: f32, to: Vector2<f32>) -> f32 {
    let offset = (to.y.atan2(to.x) - angle).rem_euclid(TAU);
    if offset > PI {
        offset - TAU
    } else {
        offset
    }
}

pub struct ShipBuilder {
    hull: Rc<HullConfig>,
    position: Point2<f32>,
    angle: f32,
    velocity: Vector2<f32>,
    angvel: f32,
    faction: Faction,
    money: f32,
    life: Option<f32>,
    remover: Option<Rc<dyn RemoveController>>,
}
impl ShipBuilder {
    pub fn new(hull: Rc<HullConfig>, position: Point2<f32>, faction: Faction) -> Self {
        Self {
            hull,
            position,
            angle: 0.0,
            velocity: Vector2::zeros(),
            angvel: 0.0,
            faction,
            money: 0.0,
            life: None,
            remover: None,
        }
    }

    pub fn with_velocity(mut self, velocity: Vector2<f32>, angvel: f32) -> Self {
        self.velocity = velocity;
        self.angvel = angvel;
        self
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_money(mut self, money: f32) -> Self {
        self.money = money;
        self
    }

    /// Defaults to the hull's max life.
    pub fn with_life(mut self, life: f32) -> Self {
        self.life = Some(life);
        self
    }

    pub fn with_remover(mut self, remover: Option<Rc<dyn RemoveController>>) -> Self {
        self.remover = remover;
        self
    }

    fn health(&self) -> Health {
        let mut health = Health::full(self.hull.max_life);
        if let Some(life) = self.life {
            health.current = life.clamp(0.0, health.max);
        }
        health
    }

    pub fn build(self, physics: &mut Physics, id: ObjId) -> Ship {
        let def = BodyDef::dynamic(
            SharedShape::ball(self.hull.size * 0.5),
            self.hull.density,
            UserData::new(id, ObjKind::Ship).with_faction(Some(self.faction)),
        )
        .at(self.position, self.angle)
        .moving(self.velocity, self.angvel);

        Ship {
            id,
            body: NearBody::new(physics, def),
            health: self.health(),
            hull: self.hull,
            faction: self.faction,
            money: self.money,
            wish_angvel: WishAngVel::None,
            wish_linvel: WishLinVel::None,
            remover: self.remover,
        }
    }

    pub fn build_far(self) -> FarShip {
        FarShip {
            health: self.health(),
            hull: self.hull,
            position: self.position,
            angle: self.angle,
            velocity: self.velocity,
            angvel: self.angvel,
            faction: self.faction,
            money: self.money,
            remover: self.remover,
        }
    }
}

pub struct Ship {
    id: ObjId,
    body: NearBody,
    hull: Rc<HullConfig>,
    health: Health,
    faction: Faction,
    money: f32,
    pub wish_angvel: WishAngVel,
    pub wish_linvel: WishLinVel,
    remover: Option<Rc<dyn RemoveController>>,
}
impl Ship {
    pub fn hull(&self) -> &Rc<HullConfig> {
        &self.hull
    }

    pub fn money(&self) -> f32 {
        self.money
    }

    fn steer(&mut self, ctx: &mut UpdateCtx) {
        let engine = &self.hull.engine;

        let angvel = self.body.angvel;
        let wish_angvel = match self.wish_angvel {
            WishAngVel::None => angvel,
            WishAngVel::Stop => 0.0,
            WishAngVel::Aim(target) => {
                let offset = angle_to(self.body.angle, target - self.body.position);
                (offset / DT).clamp(-engine.max_rot_speed, engine.max_rot_speed)
            }
            WishAngVel::Force(force) => force.clamp(-1.0, 1.0) * engine.max_rot_speed,
        };
        let new_angvel =
            integrate_angular_velocity(angvel, wish_angvel, engine.rot_acceleration, DT);
        if new_angvel != angvel {
            self.body.set_angvel(ctx.physics, new_angvel);
        }

        let max_speed = ctx.env.configs.object_manager.max_move_speed;
        let speed = self.body.velocity.norm();
        match self.wish_linvel {
            WishLinVel::None => {}
            WishLinVel::Thrust => {
                if speed < max_speed {
                    let acc = vec_pool::from_angle_len(ctx.vecs, self.body.angle, engine.acceleration);
                    self.body.receive_force(ctx.physics, *acc, true);
                }
                ctx.play_sound(&engine.work_sound, self.body.position);
            }
            WishLinVel::Cancel => {
                if speed > 0.01 {
                    let mut acc = ctx.vecs.obtain_with(-self.body.velocity / speed);
                    *acc *= engine.acceleration.min(speed / DT);
                    self.body.receive_force(ctx.physics, *acc, true);
                }
            }
        }

        if speed > max_speed {
            let capped = self.body.velocity * (max_speed / speed);
            self.body.set_velocity(ctx.physics, capped);
        }
    }

    fn throw_money(&mut self, ctx: &mut UpdateCtx) {
        let position = self.body.position;
        let velocity = self.body.velocity;
        for value in loot::money_to_items(self.money) {
            let angle = ctx.env.rng.gen_range(0.0..TAU);
            let offset = vec_pool::from_angle_len(ctx.vecs, angle, self.hull.size * 0.5);
            let kick = vec_pool::from_angle_len(ctx.vecs, angle, LOOT_THROW_SPEED);
            let builder = LootBuilder::new(position + *offset, value)
                .with_velocity(velocity + *kick, 0.0)
                .with_thrower(self.id)
                .with_remover(self.remover.clone());
            ctx.spawn(|id, physics| Box::new(builder.build(physics, id)));
        }
        self.money = 0.0;
    }
}
impl SolObject for Ship {
    fn kind(&self) -> ObjKind {
        ObjKind::Ship
    }

    fn update(&mut self, ctx: &mut UpdateCtx) {
        self.steer(ctx);
    }

    fn should_be_removed(&self, env: &SimEnv) -> bool {
        self.health.is_dead() || should_remove(&self.remover, self.body.position, env)
    }

    fn on_remove(&mut self, ctx: &mut UpdateCtx) {
        self.body.destroy(ctx.physics);

        if self.health.is_dead() {
            log::debug!("{} {:?} destroyed", self.hull.name, self.id);
            let hull = self.hull.clone();
            ctx.play_sound(&hull.explosion_sound, self.body.position);
            self.throw_money(ctx);
        }
    }

    fn receive_dmg(&mut self, dmg: DmgEvent, env: &mut SimEnv) {
        self.health.apply_dmg(dmg.amount);
        if let Some(sound) = dmg.dmg_type.hit_sound(Surface::Metal) {
            env.sounds.play_name(sound, self.body.position, Some(self.id));
        }
    }

    fn receive_money(&mut self, amount: f32) {
        self.money += amount.max(0.0);
    }

    fn handle_contact(
        &mut self,
        other: &ObjInfo,
        impulse: f32,
        _point: Point2<f32>,
        _ctx: &mut UpdateCtx,
    ) {
        // Projectiles deal their own damage.
        if matches!(other.kind, ObjKind::Loot | ObjKind::Projectile) {
            return;
        }
        self.health
            .apply_dmg(crash_dmg(impulse, self.body.mass, CRASH_DURABILITY));
    }

    fn to_far(self: Box<Self>) -> Option<Box<dyn FarObject>> {
        Some(Box::new(FarShip {
            hull: self.hull,
            position: self.body.position,
            angle: self.body.angle,
            velocity: self.body.velocity,
            angvel: self.body.angvel,
            faction: self.faction,
            money: self.money,
            health: self.health,
            remover: self.remover,
        }))
    }

    fn position(&self) -> Point2<f32> {
        self.body.position
    }

    fn velocity(&self) -> Option<Vector2<f32>> {
        Some(self.body.velocity)
    }

    fn angle(&self) -> f32 {
        self.body.angle
    }

    fn radius(&self) -> f32 {
        self.hull.size * 0.5
    }

    fn faction(&self) -> Option<Faction> {
        Some(self.faction)
    }

    fn surface(&self) -> Surface {
        Surface::Metal
    }

    fn health(&self) -> Option<Health> {
        Some(self.health)
    }

    fn drawables(&self) -> Drawables {
        smallvec![Drawable::centered(
            self.hull.texture.clone(),
            self.hull.size,
            DrawLevel::Bodies
        )]
    }

    fn near_body(&self) -> Option<&NearBody> {
        Some(&self.body)
    }

    fn near_body_mut(&mut self) -> Option<&mut NearBody> {
        Some(&mut self.body)
    }

    fn as_ship_mut(&mut self) -> Option<&mut Ship> {
        Some(self)
    }
}

pub struct FarShip {
    hull: Rc<HullConfig>,
    position: Point2<f32>,
    angle: f32,
    velocity: Vector2<f32>,
    angvel: f32,
    faction: Faction,
    money: f32,
    health: Health,
    remover: Option<Rc<dyn RemoveController>>,
}
impl FarShip {
    pub fn hull(&self) -> &Rc<HullConfig> {
        &self.hull
    }

    pub fn money(&self) -> f32 {
        self.money
    }
}
impl FarObject for FarShip {
    fn kind(&self) -> ObjKind {
        ObjKind::Ship
    }

    fn should_be_removed(&self, env: &SimEnv) -> bool {
        should_remove(&self.remover, self.position, env)
    }

    fn to_near(self: Box<Self>, id: ObjId, physics: &mut Physics) -> Box<dyn SolObject> {
        let ship = ShipBuilder::new(self.hull, self.position, self.faction)
            .with_angle(self.angle)
            .with_velocity(self.velocity, self.angvel)
            .with_money(self.money)
            .with_life(self.health.current)
            .with_remover(self.remover)
            .build(physics, id);
        Box::new(ship)
    }

    fn position(&self) -> Point2<f32> {
        self.position
    }

    fn radius(&self) -> f32 {
        self.hull.size * 0.5
    }

    fn relocate(&mut self, position: Point2<f32>, velocity: Vector2<f32>) {
        self.position = position;
        self.velocity = velocity;
    }
}

// ####################################################################################
// ################################### TEST ###########################################
// ####################################################################################

#[test]
fn test_angle_to() {
    let epsilon = 0.001;

    approx::assert_relative_eq!(angle_to(0.0, Vector2::new(1.0, 0.0)), 0.0, epsilon = epsilon);
    approx::assert_relative_eq!(
        angle_to(0.0, Vector2::new(0.0, -1.0)),
        -std::f32::consts::FRAC_PI_2,
        epsilon = epsilon
    );
    approx::assert_relative_eq!(
        angle_to(0.0, Vector2::new(0.0, 1.0)),
        std::f32::consts::FRAC_PI_2,
        epsilon = epsilon
    );

    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..100 {
        let a = rng.gen_range(-PI..PI);
        let b = a + rng.gen_range(-PI + 0.01..PI - 0.01);
        let expected = b - a;
        let v = Vector2::new(b.cos(), b.sin());

        approx::assert_relative_eq!(angle_to(a, v), expected, epsilon = epsilon);
    }
}

#[test]
fn test_integrate_angular_velocity() {
    approx::assert_relative_eq!(integrate_angular_velocity(0.0, 5.0, 2.0, 0.5), 1.0);
    approx::assert_relative_eq!(integrate_angular_velocity(0.0, 0.5, 2.0, 0.5), 0.5);
    approx::assert_relative_eq!(integrate_angular_velocity(1.0, -5.0, 2.0, 0.5), 0.0);
}

#[test]
fn test_money_is_never_negative() {
    let data = GameData::builtin().unwrap();
    let mut physics = Physics::new();
    let mut ship = ShipBuilder::new(data.hull("imperialSmall").unwrap(), Point2::origin(), Faction::Laani)
        .with_money(10.0)
        .build(&mut physics, ObjId(0));

    ship.receive_money(-5.0);
    assert_eq!(ship.money(), 10.0);
    ship.receive_money(5.0);
    assert_eq!(ship.money(), 15.0);
}
