use super::*;

/// Whether projectile `me` may hit `other`.
///
/// - never its owner or itself
/// - another projectile only when their owners differ and one of them is massive
/// - never loot or things in transit
/// - allies only when `hits_allies`
pub fn should_collide(me: UserData, other: UserData) -> bool {
    if other.id == me.id || other.id == me.owner {
        return false;
    }

    match other.kind {
        ObjKind::Projectile => me.owner != other.owner && (me.massive || other.massive),
        ObjKind::Loot | ObjKind::Transcendent => false,
        _ => match (me.faction, other.faction) {
            (Some(a), Some(b)) if !a.are_enemies(b) => me.hits_allies,
            _ => true,
        },
    }
}

pub struct ProjectileBuilder {
    config: Rc<ProjectileConfig>,
    position: Point2<f32>,
    angle: f32,
    base_velocity: Vector2<f32>,
    owner: Option<ObjId>,
    faction: Option<Faction>,
}
impl ProjectileBuilder {
    pub fn new(config: Rc<ProjectileConfig>, position: Point2<f32>, angle: f32) -> Self {
        Self {
            config,
            position,
            angle,
            base_velocity: Vector2::zeros(),
            owner: None,
            faction: None,
        }
    }

    /// Velocity of the shooter, added to the projectile's own.
    pub fn with_base_velocity(mut self, base_velocity: Vector2<f32>) -> Self {
        self.base_velocity = base_velocity;
        self
    }

    pub fn with_owner(mut self, owner: ObjId, faction: Option<Faction>) -> Self {
        self.owner = Some(owner);
        self.faction = faction;
        self
    }

    pub fn build(self, physics: &mut Physics, id: ObjId) -> Projectile {
        let velocity = self.base_velocity
            + Vector2::new(self.angle.cos(), self.angle.sin()) * self.config.speed;
        let user_data = UserData::new(id, ObjKind::Projectile)
            .with_owner(self.owner)
            .with_faction(self.faction)
            .with_flags(self.config.is_massive(), self.config.hits_allies);

        let body = match self.config.body {
            ProjectileBodyKind::Ball { radius, density } => {
                let def = BodyDef::dynamic(SharedShape::ball(radius), density, user_data)
                    .at(self.position, self.angle)
                    .moving(velocity, 0.0)
                    .with_ccd();
                ProjectileBody::Ball(NearBody::new(physics, def))
            }
            ProjectileBodyKind::Point => ProjectileBody::Point {
                position: self.position,
                velocity,
                angle: self.angle,
            },
        };

        Projectile {
            id,
            life: self.config.life,
            config: self.config,
            user_data,
            body,
            obstacle: None,
            dead: false,
        }
    }
}

pub enum ProjectileBody {
    /// Physics body. Obstacles come from contacts.
    Ball(NearBody),
    /// No body. Obstacles come from ray casts along the path.
    Point {
        position: Point2<f32>,
        velocity: Vector2<f32>,
        angle: f32,
    },
}

/// Short lived, so it has no far form and is dropped when out of range.
pub struct Projectile {
    id: ObjId,
    config: Rc<ProjectileConfig>,
    user_data: UserData,
    body: ProjectileBody,
    life: f32,
    /// First thing hit and where.
    obstacle: Option<(ObjId, Point2<f32>)>,
    dead: bool,
}
impl Projectile {
    pub fn config(&self) -> &Rc<ProjectileConfig> {
        &self.config
    }

    pub fn owner(&self) -> Option<ObjId> {
        (self.user_data.owner != self.id).then_some(self.user_data.owner)
    }

    fn hit(&mut self, target: ObjId, point: Point2<f32>, ctx: &mut UpdateCtx) {
        ctx.commands.damage(
            target,
            DmgEvent::new(self.config.dmg, self.config.dmg_type).at(point),
        );
        let config = self.config.clone();
        ctx.play_sound(&config.collision_sound, point);
        self.dead = true;
    }
}
impl SolObject for Projectile {
    fn kind(&self) -> ObjKind {
        ObjKind::Projectile
    }

    fn update(&mut self, ctx: &mut UpdateCtx) {
        if self.dead {
            return;
        }
        self.life -= DT;

        if let ProjectileBody::Point {
            position, velocity, ..
        } = &mut self.body
        {
            let from = *position;
            let to = from + *velocity * DT;
            let me = self.user_data;
            match ctx
                .physics
                .cast_ray(from, to, &|other| should_collide(me, other))
            {
                Some(hit) => {
                    *position = hit.point;
                    self.obstacle.get_or_insert((hit.user_data.id, hit.point));
                }
                None => *position = to,
            }
        }

        if let Some((target, point)) = self.obstacle.take() {
            self.hit(target, point, ctx);
        }
    }

    fn should_be_removed(&self, _env: &SimEnv) -> bool {
        self.dead || self.life <= 0.0
    }

    fn on_remove(&mut self, ctx: &mut UpdateCtx) {
        if let ProjectileBody::Ball(body) = &mut self.body {
            body.destroy(ctx.physics);
        }
    }

    fn receive_dmg(&mut self, _dmg: DmgEvent, _env: &mut SimEnv) {
        if self.config.is_massive() {
            self.dead = true;
        }
    }

    fn handle_contact(
        &mut self,
        other: &ObjInfo,
        _impulse: f32,
        point: Point2<f32>,
        _ctx: &mut UpdateCtx,
    ) {
        self.obstacle.get_or_insert((other.id, point));
    }

    fn to_far(self: Box<Self>) -> Option<Box<dyn FarObject>> {
        None
    }

    fn position(&self) -> Point2<f32> {
        match &self.body {
            ProjectileBody::Ball(body) => body.position,
            ProjectileBody::Point { position, .. } => *position,
        }
    }

    fn velocity(&self) -> Option<Vector2<f32>> {
        match &self.body {
            ProjectileBody::Ball(body) => Some(body.velocity),
            ProjectileBody::Point { velocity, .. } => Some(*velocity),
        }
    }

    fn angle(&self) -> f32 {
        match &self.body {
            ProjectileBody::Ball(body) => body.angle,
            ProjectileBody::Point { angle, .. } => *angle,
        }
    }

    fn radius(&self) -> f32 {
        self.config.size * 0.5
    }

    fn faction(&self) -> Option<Faction> {
        self.user_data.faction
    }

    fn drawables(&self) -> Drawables {
        smallvec![Drawable::centered(
            self.config.texture.clone(),
            self.config.size,
            DrawLevel::Projectiles
        )]
    }

    fn near_body(&self) -> Option<&NearBody> {
        match &self.body {
            ProjectileBody::Ball(body) => Some(body),
            ProjectileBody::Point { .. } => None,
        }
    }

    fn near_body_mut(&mut self) -> Option<&mut NearBody> {
        match &mut self.body {
            ProjectileBody::Ball(body) => Some(body),
            ProjectileBody::Point { .. } => None,
        }
    }
}

#[cfg(test)]
fn ship(id: u32, faction: Faction) -> UserData {
    UserData::new(ObjId(id), ObjKind::Ship).with_faction(Some(faction))
}

#[cfg(test)]
fn bullet(id: u32, owner: u32, faction: Faction) -> UserData {
    UserData::new(ObjId(id), ObjKind::Projectile)
        .with_owner(Some(ObjId(owner)))
        .with_faction(Some(faction))
}

#[test]
fn test_owner_and_allies() {
    let me = bullet(10, 1, Faction::Laani);
    assert!(!should_collide(me, ship(1, Faction::Laani)));
    assert!(!should_collide(me, ship(2, Faction::Laani)));
    assert!(should_collide(me, ship(3, Faction::Ehar)));

    let friendly_fire = me.with_flags(false, true);
    assert!(should_collide(friendly_fire, ship(2, Faction::Laani)));
    assert!(!should_collide(friendly_fire, ship(1, Faction::Laani)));
}

#[test]
fn test_projectile_pairs() {
    let a = bullet(10, 1, Faction::Laani);
    let b = bullet(11, 2, Faction::Ehar);
    assert!(!should_collide(a, b));
    assert!(should_collide(a.with_flags(true, false), b));
    assert!(should_collide(a, b.with_flags(true, false)));

    let same_owner = bullet(12, 1, Faction::Laani).with_flags(true, false);
    assert!(!should_collide(a, same_owner));
}

#[test]
fn test_loot_and_neutral() {
    let me = bullet(10, 1, Faction::Laani);
    assert!(!should_collide(me, UserData::new(ObjId(5), ObjKind::Loot)));
    assert!(!should_collide(me, UserData::new(ObjId(5), ObjKind::Transcendent)));
    assert!(should_collide(me, UserData::new(ObjId(5), ObjKind::Asteroid)));
}
