use super::*;

/// Value of each kind of money item, biggest first.
pub const DENOMINATIONS: [f32; 3] = [100.0, 10.0, 1.0];
/// Seconds before the thrower can pick its own loot back.
pub const THROWER_COOLDOWN: f32 = 4.0;
const LIFE: f32 = 60.0;
const DENSITY: f32 = 0.5;
const MAX_SPIN: f32 = 4.0;

/// Split `value` into money items, biggest denominations first.
/// The fractional part is lost.
pub fn money_to_items(value: f32) -> SmallVec<[f32; 16]> {
    let mut remaining = value.max(0.0).floor();
    let mut items = SmallVec::new();
    for denomination in DENOMINATIONS {
        while remaining >= denomination {
            items.push(denomination);
            remaining -= denomination;
        }
    }
    items
}

fn radius(value: f32) -> f32 {
    if value >= 100.0 {
        0.12
    } else if value >= 10.0 {
        0.09
    } else {
        0.06
    }
}

fn texture(value: f32) -> &'static str {
    if value >= 100.0 {
        "money100"
    } else if value >= 10.0 {
        "money10"
    } else {
        "money1"
    }
}

pub struct LootBuilder {
    position: Point2<f32>,
    angle: f32,
    velocity: Vector2<f32>,
    angvel: f32,
    value: f32,
    thrower: Option<ObjId>,
    life: f32,
    remover: Option<Rc<dyn RemoveController>>,
}
impl LootBuilder {
    pub fn new(position: Point2<f32>, value: f32) -> Self {
        Self {
            position,
            angle: 0.0,
            velocity: Vector2::zeros(),
            angvel: 0.0,
            value,
            thrower: None,
            life: LIFE,
            remover: None,
        }
    }

    pub fn with_velocity(mut self, velocity: Vector2<f32>, angvel: f32) -> Self {
        self.velocity = velocity;
        self.angvel = angvel.clamp(-MAX_SPIN, MAX_SPIN);
        self
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_thrower(mut self, thrower: ObjId) -> Self {
        self.thrower = Some(thrower);
        self
    }

    pub fn with_life(mut self, life: f32) -> Self {
        self.life = life;
        self
    }

    pub fn with_remover(mut self, remover: Option<Rc<dyn RemoveController>>) -> Self {
        self.remover = remover;
        self
    }

    pub fn build(self, physics: &mut Physics, id: ObjId) -> Loot {
        let def = BodyDef::dynamic(
            SharedShape::ball(radius(self.value)),
            DENSITY,
            UserData::new(id, ObjKind::Loot),
        )
        .at(self.position, self.angle)
        .moving(self.velocity, self.angvel);

        Loot {
            body: NearBody::new(physics, def),
            value: self.value,
            thrower: self.thrower,
            thrower_cooldown: if self.thrower.is_some() {
                THROWER_COOLDOWN
            } else {
                0.0
            },
            life: self.life,
            picked: false,
            remover: self.remover,
        }
    }

    pub fn build_far(self) -> FarLoot {
        FarLoot {
            position: self.position,
            angle: self.angle,
            velocity: self.velocity,
            angvel: self.angvel,
            value: self.value,
            life: self.life,
            remover: self.remover,
        }
    }
}

/// Money floating in space, picked up by touching ships.
pub struct Loot {
    body: NearBody,
    pub value: f32,
    thrower: Option<ObjId>,
    thrower_cooldown: f32,
    life: f32,
    picked: bool,
    remover: Option<Rc<dyn RemoveController>>,
}
impl Loot {
    pub fn thrower(&self) -> Option<ObjId> {
        self.thrower
    }

    pub fn can_be_picked_by(&self, ship: ObjId) -> bool {
        !self.picked && (self.thrower != Some(ship) || self.thrower_cooldown <= 0.0)
    }
}
impl SolObject for Loot {
    fn kind(&self) -> ObjKind {
        ObjKind::Loot
    }

    fn update(&mut self, _ctx: &mut UpdateCtx) {
        self.life -= DT;
        self.thrower_cooldown = (self.thrower_cooldown - DT).max(0.0);
    }

    fn should_be_removed(&self, env: &SimEnv) -> bool {
        self.picked || self.life <= 0.0 || should_remove(&self.remover, self.body.position, env)
    }

    fn on_remove(&mut self, ctx: &mut UpdateCtx) {
        self.body.destroy(ctx.physics);
    }

    fn receive_dmg(&mut self, _dmg: DmgEvent, _env: &mut SimEnv) {}

    fn handle_contact(
        &mut self,
        other: &ObjInfo,
        _impulse: f32,
        _point: Point2<f32>,
        ctx: &mut UpdateCtx,
    ) {
        if other.kind != ObjKind::Ship || !self.can_be_picked_by(other.id) {
            return;
        }

        self.picked = true;
        ctx.commands.give_money(other.id, self.value);
        ctx.env
            .sounds
            .play_name("lootPickup", self.body.position, Some(other.id));
    }

    fn to_far(self: Box<Self>) -> Option<Box<dyn FarObject>> {
        Some(Box::new(FarLoot {
            position: self.body.position,
            angle: self.body.angle,
            velocity: self.body.velocity,
            angvel: self.body.angvel,
            value: self.value,
            life: self.life,
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
        radius(self.value)
    }

    fn surface(&self) -> Surface {
        Surface::Metal
    }

    fn drawables(&self) -> Drawables {
        smallvec![Drawable::centered(
            texture(self.value),
            radius(self.value) * 2.0,
            DrawLevel::Loot
        )]
    }

    fn near_body(&self) -> Option<&NearBody> {
        Some(&self.body)
    }

    fn near_body_mut(&mut self) -> Option<&mut NearBody> {
        Some(&mut self.body)
    }
}

pub struct FarLoot {
    position: Point2<f32>,
    angle: f32,
    velocity: Vector2<f32>,
    angvel: f32,
    value: f32,
    life: f32,
    remover: Option<Rc<dyn RemoveController>>,
}
impl FarObject for FarLoot {
    fn kind(&self) -> ObjKind {
        ObjKind::Loot
    }

    fn should_be_removed(&self, env: &SimEnv) -> bool {
        should_remove(&self.remover, self.position, env)
    }

    fn to_near(self: Box<Self>, id: ObjId, physics: &mut Physics) -> Box<dyn SolObject> {
        let loot = LootBuilder::new(self.position, self.value)
            .with_angle(self.angle)
            .with_velocity(self.velocity, self.angvel)
            .with_life(self.life)
            .with_remover(self.remover)
            .build(physics, id);
        Box::new(loot)
    }

    fn position(&self) -> Point2<f32> {
        self.position
    }

    fn radius(&self) -> f32 {
        radius(self.value)
    }

    fn relocate(&mut self, position: Point2<f32>, velocity: Vector2<f32>) {
        self.position = position;
        self.velocity = velocity;
    }
}

#[test]
fn test_money_to_items() {
    let items = money_to_items(987.6);
    assert_eq!(items.iter().filter(|&&v| v == 100.0).count(), 9);
    assert_eq!(items.iter().filter(|&&v| v == 10.0).count(), 8);
    assert_eq!(items.iter().filter(|&&v| v == 1.0).count(), 7);
    assert_eq!(items.iter().sum::<f32>(), 987.0);

    assert!(money_to_items(0.5).is_empty());
    assert!(money_to_items(-10.0).is_empty());
}

#[test]
fn test_thrower_cooldown() {
    let mut physics = Physics::new();
    let mut loot = LootBuilder::new(Point2::origin(), 10.0)
        .with_thrower(ObjId(4))
        .build(&mut physics, ObjId(5));

    assert_eq!(loot.thrower(), Some(ObjId(4)));
    assert!(!loot.can_be_picked_by(ObjId(4)));
    assert!(loot.can_be_picked_by(ObjId(6)));

    loot.thrower_cooldown = 0.0;
    assert!(loot.can_be_picked_by(ObjId(4)));
}
