use super::*;

/// Smaller asteroids do not split when destroyed.
pub const MIN_SPLIT_SIZE: f32 = 0.25;
pub const SIZE_TO_LIFE: f32 = 20.0;
/// Fragments cover at least this fraction of the parent's size².
pub const SPLIT_COVERAGE: f32 = 0.7;
/// Loot value per unit of life.
pub const SIZE_TO_MONEY: f32 = 40.0;
const MAX_SPLIT_SPEED: f32 = 1.0;
/// Space left between neighbouring fragments.
const FRAGMENT_GAP: f32 = 0.1;
/// Seconds during which fresh fragments ignore crash damage.
pub const SPLIT_CRASH_GRACE: f32 = 1.0;
const CRASH_DURABILITY: f32 = 0.5;
const DENSITY: f32 = 10.0;
const CRACK_SOUND: &str = "asteroidCrack";

/// Fragment sizes of an asteroid of `size`.
/// Each is uniform in `[0.25, 0.5] * size` until their summed size² reaches the coverage.
pub fn split_sizes(size: f32, rng: &mut impl Rng) -> SmallVec<[f32; 12]> {
    let target = size * size * SPLIT_COVERAGE;
    let mut covered = 0.0;
    let mut sizes = SmallVec::new();
    while covered < target {
        let fragment = rng.gen_range(0.25..=0.5) * size;
        covered += fragment * fragment;
        sizes.push(fragment);
    }
    sizes
}

/// Distance from the split point at which `count` fragments no bigger than `largest`
/// can sit evenly spaced on a ring without touching.
pub fn fragment_ring_radius(largest: f32, count: usize) -> f32 {
    if count < 2 {
        return 0.0;
    }
    let spacing = largest + FRAGMENT_GAP;
    let half_step = std::f32::consts::PI / count as f32;
    (spacing * 0.5 / half_step.sin()).max(spacing * 0.5)
}

/// Total value of the loot dropped by a destroyed asteroid of `size`.
pub fn loot_value(size: f32) -> f32 {
    (size * SIZE_TO_MONEY * SIZE_TO_LIFE).floor()
}

pub struct AsteroidBuilder {
    position: Point2<f32>,
    angle: f32,
    velocity: Vector2<f32>,
    angvel: f32,
    size: f32,
    life: Option<f32>,
    crash_grace: f32,
    texture: String,
    remover: Option<Rc<dyn RemoveController>>,
}
impl AsteroidBuilder {
    pub fn new(position: Point2<f32>, size: f32) -> Self {
        Self {
            position,
            angle: 0.0,
            velocity: Vector2::zeros(),
            angvel: 0.0,
            size,
            life: None,
            crash_grace: 0.0,
            texture: "asteroid".to_string(),
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

    /// Defaults to full life.
    pub fn with_life(mut self, life: f32) -> Self {
        self.life = Some(life);
        self
    }

    /// Ignore crash damage for `seconds`.
    pub fn with_crash_grace(mut self, seconds: f32) -> Self {
        self.crash_grace = seconds;
        self
    }

    pub fn with_texture(mut self, texture: impl Into<String>) -> Self {
        self.texture = texture.into();
        self
    }

    pub fn with_remover(mut self, remover: Option<Rc<dyn RemoveController>>) -> Self {
        self.remover = remover;
        self
    }

    fn health(&self) -> Health {
        let mut health = Health::full(self.size * SIZE_TO_LIFE);
        if let Some(life) = self.life {
            health.current = life.clamp(0.0, health.max);
        }
        health
    }

    pub fn build(self, physics: &mut Physics, id: ObjId) -> Asteroid {
        let def = BodyDef::dynamic(
            SharedShape::ball(self.size * 0.5),
            DENSITY,
            UserData::new(id, ObjKind::Asteroid),
        )
        .at(self.position, self.angle)
        .moving(self.velocity, self.angvel);

        Asteroid {
            id,
            body: NearBody::new(physics, def),
            size: self.size,
            health: self.health(),
            crash_grace: self.crash_grace,
            texture: self.texture,
            remover: self.remover,
        }
    }

    pub fn build_far(self) -> FarAsteroid {
        FarAsteroid {
            position: self.position,
            angle: self.angle,
            velocity: self.velocity,
            angvel: self.angvel,
            size: self.size,
            health: self.health(),
            texture: self.texture,
            remover: self.remover,
        }
    }
}

pub struct Asteroid {
    id: ObjId,
    body: NearBody,
    size: f32,
    health: Health,
    crash_grace: f32,
    texture: String,
    remover: Option<Rc<dyn RemoveController>>,
}
impl Asteroid {
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Fragments and loot, spawned around the asteroid's last position.
    fn split(&self, ctx: &mut UpdateCtx) {
        let position = self.body.position;
        let velocity = self.body.velocity;

        if self.size >= MIN_SPLIT_SIZE {
            // Evenly spaced on a ring, moving outward, so fragments never overlap.
            let sizes = split_sizes(self.size, &mut ctx.env.rng);
            let largest = sizes.iter().copied().fold(0.0, f32::max);
            let ring = fragment_ring_radius(largest, sizes.len());
            let step = std::f32::consts::TAU / sizes.len() as f32;
            let start = ctx.env.rng.gen_range(0.0..std::f32::consts::TAU);
            for (i, fragment) in sizes.into_iter().enumerate() {
                let angle = start + step * i as f32;
                let speed = ctx.env.rng.gen_range(0.0..MAX_SPLIT_SPEED);
                let offset = vec_pool::from_angle_len(ctx.vecs, angle, ring);
                let kick = vec_pool::from_angle_len(ctx.vecs, angle, speed);
                let builder = AsteroidBuilder::new(position + *offset, fragment)
                    .with_velocity(velocity + *kick, ctx.env.rng.gen_range(-1.0..1.0))
                    .with_angle(angle)
                    .with_crash_grace(SPLIT_CRASH_GRACE)
                    .with_texture(self.texture.clone())
                    .with_remover(self.remover.clone());
                ctx.spawn(|id, physics| Box::new(builder.build(physics, id)));
            }
        }

        for value in loot::money_to_items(loot_value(self.size)) {
            let angle = ctx.env.rng.gen_range(0.0..std::f32::consts::TAU);
            let offset = vec_pool::from_angle_len(ctx.vecs, angle, self.size * 0.25);
            let kick = vec_pool::from_angle_len(ctx.vecs, angle, MAX_SPLIT_SPEED * 0.5);
            let builder = LootBuilder::new(position + *offset, value)
                .with_velocity(velocity + *kick, ctx.env.rng.gen_range(-1.0..1.0))
                .with_remover(self.remover.clone());
            ctx.spawn(|id, physics| Box::new(builder.build(physics, id)));
        }
    }
}
impl SolObject for Asteroid {
    fn kind(&self) -> ObjKind {
        ObjKind::Asteroid
    }

    fn update(&mut self, _ctx: &mut UpdateCtx) {
        self.crash_grace = (self.crash_grace - DT).max(0.0);
    }

    fn should_be_removed(&self, env: &SimEnv) -> bool {
        self.health.is_dead() || should_remove(&self.remover, self.body.position, env)
    }

    fn on_remove(&mut self, ctx: &mut UpdateCtx) {
        self.body.destroy(ctx.physics);

        if self.health.is_dead() {
            log::trace!("asteroid {:?} of size {} destroyed", self.id, self.size);
            ctx.env
                .sounds
                .play_name(CRACK_SOUND, self.body.position, Some(self.id));
            self.split(ctx);
        }
    }

    fn receive_dmg(&mut self, dmg: DmgEvent, env: &mut SimEnv) {
        self.health.apply_dmg(dmg.amount);
        if let Some(sound) = dmg.dmg_type.hit_sound(Surface::Rock) {
            env.sounds.play_name(sound, self.body.position, Some(self.id));
        }
    }

    fn handle_contact(
        &mut self,
        other: &ObjInfo,
        impulse: f32,
        _point: Point2<f32>,
        _ctx: &mut UpdateCtx,
    ) {
        if other.kind == ObjKind::Loot || self.crash_grace > 0.0 {
            return;
        }
        self.health
            .apply_dmg(crash_dmg(impulse, self.body.mass, CRASH_DURABILITY));
    }

    fn to_far(self: Box<Self>) -> Option<Box<dyn FarObject>> {
        Some(Box::new(FarAsteroid {
            position: self.body.position,
            angle: self.body.angle,
            velocity: self.body.velocity,
            angvel: self.body.angvel,
            size: self.size,
            health: self.health,
            texture: self.texture,
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
        self.size * 0.5
    }

    fn surface(&self) -> Surface {
        Surface::Rock
    }

    fn health(&self) -> Option<Health> {
        Some(self.health)
    }

    fn drawables(&self) -> Drawables {
        smallvec![Drawable::centered(
            self.texture.clone(),
            self.size,
            DrawLevel::Bodies
        )]
    }

    fn near_body(&self) -> Option<&NearBody> {
        Some(&self.body)
    }

    fn near_body_mut(&mut self) -> Option<&mut NearBody> {
        Some(&mut self.body)
    }
}

pub struct FarAsteroid {
    position: Point2<f32>,
    angle: f32,
    velocity: Vector2<f32>,
    angvel: f32,
    size: f32,
    health: Health,
    texture: String,
    remover: Option<Rc<dyn RemoveController>>,
}
impl FarAsteroid {
    pub fn size(&self) -> f32 {
        self.size
    }
}
impl FarObject for FarAsteroid {
    fn kind(&self) -> ObjKind {
        ObjKind::Asteroid
    }

    fn should_be_removed(&self, env: &SimEnv) -> bool {
        should_remove(&self.remover, self.position, env)
    }

    fn to_near(self: Box<Self>, id: ObjId, physics: &mut Physics) -> Box<dyn SolObject> {
        let asteroid = AsteroidBuilder::new(self.position, self.size)
            .with_angle(self.angle)
            .with_velocity(self.velocity, self.angvel)
            .with_life(self.health.current)
            .with_texture(self.texture)
            .with_remover(self.remover)
            .build(physics, id);
        Box::new(asteroid)
    }

    fn position(&self) -> Point2<f32> {
        self.position
    }

    fn radius(&self) -> f32 {
        self.size * 0.5
    }

    fn relocate(&mut self, position: Point2<f32>, velocity: Vector2<f32>) {
        self.position = position;
        self.velocity = velocity;
    }
}

#[test]
fn test_split_coverage() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..100 {
        let size = rng.gen_range(0.25..3.0);
        let sizes = split_sizes(size, &mut rng);

        let covered: f32 = sizes.iter().map(|s| s * s).sum();
        assert!(covered >= size * size * SPLIT_COVERAGE);
        for s in sizes.iter() {
            assert!(*s >= size * 0.25 && *s <= size * 0.5);
        }
        // Dropping the last fragment falls short of the coverage.
        let last = sizes[sizes.len() - 1];
        assert!(covered - last * last < size * size * SPLIT_COVERAGE);
    }
}

#[test]
fn test_fragment_ring_spacing() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..50 {
        let size = rng.gen_range(0.25..3.0);
        let sizes = split_sizes(size, &mut rng);
        let largest = sizes.iter().copied().fold(0.0, f32::max);
        let ring = fragment_ring_radius(largest, sizes.len());
        let step = std::f32::consts::TAU / sizes.len() as f32;
        let at = |i: usize| Point2::new((step * i as f32).cos(), (step * i as f32).sin()) * ring;

        for i in 0..sizes.len() {
            for j in i + 1..sizes.len() {
                let dist = (at(i) - at(j)).norm();
                assert!(dist > (sizes[i] + sizes[j]) * 0.5, "{} fragments of {}", sizes.len(), size);
            }
        }
    }
    assert_eq!(fragment_ring_radius(1.0, 1), 0.0);
}

#[test]
fn test_crash_grace_ignores_contacts() {
    let mut physics = Physics::new();
    let mut commands = ObjCommands::default();
    let mut env = SimEnv::new(SimConfigs::default(), Rc::new(GameData::builtin().unwrap()));
    let vecs = VecPool::new();

    let mut fragment = AsteroidBuilder::new(Point2::origin(), 1.0)
        .with_crash_grace(SPLIT_CRASH_GRACE)
        .build(&mut physics, ObjId(0));
    let full = fragment.health.current;
    let rock = ObjInfo {
        id: ObjId(1),
        kind: ObjKind::Asteroid,
        position: Point2::new(1.0, 0.0),
        velocity: Vector2::zeros(),
        radius: 0.5,
        mass: 1.0,
        faction: None,
        surface: Surface::Rock,
    };
    let mut ctx = UpdateCtx {
        id: ObjId(0),
        physics: &mut physics,
        commands: &mut commands,
        env: &mut env,
        vecs: &vecs,
        others: &[],
    };

    fragment.handle_contact(&rock, 20.0, Point2::new(0.5, 0.0), &mut ctx);
    approx::assert_relative_eq!(fragment.health.current, full);

    // Just past one second.
    for _ in 0..=50 {
        fragment.update(&mut ctx);
    }
    fragment.handle_contact(&rock, 20.0, Point2::new(0.5, 0.0), &mut ctx);
    assert!(fragment.health.current < full);
    assert_eq!(fragment.size(), 1.0);
}

#[test]
fn test_loot_value() {
    assert_eq!(loot_value(1.0), 800.0);
    assert_eq!(loot_value(0.5), 400.0);
    assert_eq!(loot_value(0.0), 0.0);
}
