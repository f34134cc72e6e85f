pub mod asteroid;
pub mod loot;
pub mod manager;
pub mod near_body;
pub mod projectile;
pub mod ship;
pub mod star_port;

use super::*;
pub use asteroid::{Asteroid, AsteroidBuilder, FarAsteroid};
pub use loot::{FarLoot, Loot, LootBuilder};
pub use manager::{FarObjData, Interaction, ObjCommands, ObjectManager, Removal};
pub use near_body::NearBody;
pub use projectile::{Projectile, ProjectileBuilder};
pub use ship::{FarShip, Ship, ShipBuilder, WishAngVel, WishLinVel};
pub use star_port::{FarStarPort, FarTranscendent, StarPort, StarPortBuilder, Transcendent};

/// Identity of a simulated thing.
///
/// Kept through promotion, demotion and star port travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ObjKind {
    Ship,
    Asteroid,
    Projectile,
    Loot,
    StarPort,
    Transcendent,
    Other,
}
impl ObjKind {
    pub fn name(self) -> &'static str {
        match self {
            ObjKind::Ship => "Ship",
            ObjKind::Asteroid => "Asteroid",
            ObjKind::Projectile => "Projectile",
            ObjKind::Loot => "Loot",
            ObjKind::StarPort => "StarPort",
            ObjKind::Transcendent => "Transcendent",
            ObjKind::Other => "Other",
        }
    }

    pub fn from_bits(bits: u8) -> Option<Self> {
        Some(match bits {
            0 => ObjKind::Ship,
            1 => ObjKind::Asteroid,
            2 => ObjKind::Projectile,
            3 => ObjKind::Loot,
            4 => ObjKind::StarPort,
            5 => ObjKind::Transcendent,
            6 => ObjKind::Other,
            _ => return None,
        })
    }
}

/// Read-only snapshot of a near object taken once per tick after the physics step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjInfo {
    pub id: ObjId,
    pub kind: ObjKind,
    pub position: Point2<f32>,
    pub velocity: Vector2<f32>,
    pub radius: f32,
    pub mass: f32,
    pub faction: Option<Faction>,
    pub surface: Surface,
}

/// Tells things spawned by some subsystem when they stopped being relevant.
pub trait RemoveController {
    fn should_remove(&self, position: Point2<f32>, env: &SimEnv) -> bool;
}

/// What a near object may touch while it is updated.
///
/// The near object collection itself is not reachable from here.
/// Structural changes go through `commands` and apply after the update pass.
pub struct UpdateCtx<'a> {
    /// The object being updated.
    pub id: ObjId,
    pub physics: &'a mut Physics,
    pub commands: &'a mut ObjCommands,
    pub env: &'a mut SimEnv,
    pub vecs: &'a VecPool,
    /// Every near object as of the start of this tick.
    pub others: &'a [ObjInfo],
}
impl UpdateCtx<'_> {
    /// Build a new near object under a fresh id. It joins the simulation when the queues drain.
    pub fn spawn(
        &mut self,
        build: impl FnOnce(ObjId, &mut Physics) -> Box<dyn SolObject>,
    ) -> ObjId {
        let id = self.commands.reserve_id();
        let obj = build(id, self.physics);
        self.commands.add_delayed(id, obj);
        id
    }

    pub fn play_sound(&mut self, sound: &SoundRef, position: Point2<f32>) {
        self.env
            .sounds
            .play(self.env.time, sound, position, Some(self.id));
    }
}

/// Near form: fully simulated, usually backed by a physics body.
pub trait SolObject {
    fn kind(&self) -> ObjKind;

    /// Copy kinematics from the physics body.
    /// Done for every near object right after the physics step.
    fn sync(&mut self, physics: &Physics) {
        if let Some(body) = self.near_body_mut() {
            body.sync(physics);
        }
    }

    fn update(&mut self, ctx: &mut UpdateCtx);

    /// Must not have side effects. Checked once per tick after [`SolObject::update`].
    fn should_be_removed(&self, env: &SimEnv) -> bool;

    /// Called exactly once when the object leaves the near collection,
    /// whether it is destroyed or demoted. Must destroy the body.
    fn on_remove(&mut self, ctx: &mut UpdateCtx);

    fn receive_dmg(&mut self, dmg: DmgEvent, env: &mut SimEnv);

    /// `acc`: `force` is an acceleration and is scaled by mass.
    fn receive_force(&mut self, force: Vector2<f32>, acc: bool, physics: &mut Physics) {
        if let Some(body) = self.near_body_mut() {
            body.receive_force(physics, force, acc);
        }
    }

    fn receive_money(&mut self, _amount: f32) {}

    /// Called for every contact with another near object that passed the contact filter.
    fn handle_contact(
        &mut self,
        _other: &ObjInfo,
        _impulse: f32,
        _point: Point2<f32>,
        _ctx: &mut UpdateCtx,
    ) {
    }

    /// `None` if this kind has no far form. It is then dropped on demotion.
    fn to_far(self: Box<Self>) -> Option<Box<dyn FarObject>>;

    fn position(&self) -> Point2<f32>;
    /// `None` if not a free body.
    fn velocity(&self) -> Option<Vector2<f32>>;
    fn angle(&self) -> f32;
    fn radius(&self) -> f32;

    fn mass(&self) -> f32 {
        self.near_body().map_or(0.0, |body| body.mass)
    }

    fn faction(&self) -> Option<Faction> {
        None
    }

    fn surface(&self) -> Surface {
        Surface::None
    }

    /// `None` for things that can not be damaged.
    fn health(&self) -> Option<Health> {
        None
    }

    fn drawables(&self) -> Drawables;

    fn near_body(&self) -> Option<&NearBody> {
        None
    }

    fn near_body_mut(&mut self) -> Option<&mut NearBody> {
        None
    }

    fn has_body(&self) -> bool {
        self.near_body().map_or(false, NearBody::is_alive)
    }

    /// Id of an object carried inside this one.
    fn passenger(&self) -> Option<ObjId> {
        None
    }

    fn as_ship_mut(&mut self) -> Option<&mut Ship> {
        None
    }

    fn info(&self, id: ObjId) -> ObjInfo {
        ObjInfo {
            id,
            kind: self.kind(),
            position: self.position(),
            velocity: self.velocity().unwrap_or_else(Vector2::zeros),
            radius: self.radius(),
            mass: self.mass(),
            faction: self.faction(),
            surface: self.surface(),
        }
    }
}

/// Far form: no physics body, just enough to rebuild the near form.
pub trait FarObject {
    fn kind(&self) -> ObjKind;

    fn update(&mut self, _env: &SimEnv) {}

    /// Must not have side effects.
    fn should_be_removed(&self, env: &SimEnv) -> bool;

    /// The only way a body is created for an existing object.
    fn to_near(self: Box<Self>, id: ObjId, physics: &mut Physics) -> Box<dyn SolObject>;

    fn position(&self) -> Point2<f32>;
    fn radius(&self) -> f32;

    /// Teleport, replacing the velocity. Fixed things ignore the velocity.
    fn relocate(&mut self, position: Point2<f32>, velocity: Vector2<f32>);

    fn passenger(&self) -> Option<ObjId> {
        None
    }

    /// A carried object that reached its destination while far.
    /// This object is discarded once it gives its passenger away.
    fn take_arrived_passenger(&mut self) -> Option<(ObjId, Box<dyn FarObject>)> {
        None
    }
}

pub(crate) fn should_remove(
    remover: &Option<Rc<dyn RemoveController>>,
    position: Point2<f32>,
    env: &SimEnv,
) -> bool {
    remover
        .as_ref()
        .map_or(false, |remover| remover.should_remove(position, env))
}

/// Crash damage from a contact impulse.
pub(crate) fn crash_dmg(impulse: f32, mass: f32, durability: f32) -> f32 {
    if mass <= 0.0 {
        return 0.0;
    }
    impulse / mass / durability
}

#[test]
fn test_kind_bits() {
    for kind in [
        ObjKind::Ship,
        ObjKind::Asteroid,
        ObjKind::Projectile,
        ObjKind::Loot,
        ObjKind::StarPort,
        ObjKind::Transcendent,
        ObjKind::Other,
    ] {
        assert_eq!(ObjKind::from_bits(kind as u8), Some(kind));
    }
    assert_eq!(ObjKind::from_bits(7), None);
}
