use super::*;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DmgType {
    Bullet,
    Energy,
    Explosion,
    Crash,
    Fire,
}
impl DmgType {
    pub const ALL: [DmgType; 5] = [
        DmgType::Bullet,
        DmgType::Energy,
        DmgType::Explosion,
        DmgType::Crash,
        DmgType::Fire,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DmgType::Bullet => "bullet",
            DmgType::Energy => "energy",
            DmgType::Explosion => "explosion",
            DmgType::Crash => "crash",
            DmgType::Fire => "fire",
        }
    }

    /// An unknown name is a packaging error and is reported with the name.
    pub fn from_name(name: &str) -> anyhow::Result<Self> {
        Self::ALL
            .into_iter()
            .find(|dmg_type| dmg_type.name() == name)
            .ok_or_else(|| anyhow::anyhow!("unknown dmg type '{}'", name))
    }

    /// Sound to play when something with `surface` receives this damage.
    pub fn hit_sound(self, surface: Surface) -> Option<&'static str> {
        match (self, surface) {
            (_, Surface::None) => None,
            (DmgType::Bullet, Surface::Metal) => Some("metalBulletHit"),
            (DmgType::Bullet, Surface::Rock) => Some("rockBulletHit"),
            (DmgType::Energy, Surface::Metal) => Some("metalEnergyHit"),
            (DmgType::Energy, Surface::Rock) => Some("rockEnergyHit"),
            (DmgType::Explosion, _) => None,
            (DmgType::Crash, Surface::Metal) => Some("metalColl"),
            (DmgType::Crash, Surface::Rock) => Some("rockColl"),
            (DmgType::Fire, _) => Some("burning"),
        }
    }
}
impl fmt::Display for DmgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What an object sounds like when hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Surface {
    Metal,
    Rock,
    #[default]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DmgEvent {
    pub amount: f32,
    pub dmg_type: DmgType,
    /// Where the damage came from, if anywhere.
    pub source_pos: Option<Point2<f32>>,
}
impl DmgEvent {
    pub fn new(amount: f32, dmg_type: DmgType) -> Self {
        Self {
            amount,
            dmg_type,
            source_pos: None,
        }
    }

    pub fn at(mut self, source_pos: Point2<f32>) -> Self {
        self.source_pos = Some(source_pos);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub max: f32,
    pub current: f32,
}
impl Health {
    pub fn full(max: f32) -> Self {
        Self { max, current: max }
    }

    /// Negative amounts do nothing: damage never heals.
    /// Returns the life actually removed.
    pub fn apply_dmg(&mut self, amount: f32) -> f32 {
        let delta = amount.max(0.0).min(self.current.max(0.0));
        self.current = (self.current - delta).max(0.0);
        delta
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }
}

#[test]
fn test_dmg_type_names_round_trip() {
    for dmg_type in DmgType::ALL {
        assert_eq!(DmgType::from_name(dmg_type.name()).unwrap(), dmg_type);
    }
}

#[test]
fn test_unknown_dmg_type() {
    let err = DmgType::from_name("plasma").unwrap_err();
    assert!(err.to_string().contains("plasma"));
}

#[test]
fn test_hit_sound_needs_surface() {
    assert_eq!(DmgType::Bullet.hit_sound(Surface::None), None);
    assert_eq!(DmgType::Bullet.hit_sound(Surface::Metal), Some("metalBulletHit"));
    assert_eq!(DmgType::Crash.hit_sound(Surface::Rock), Some("rockColl"));
}

#[test]
fn test_negative_dmg_does_not_heal() {
    let mut health = Health::full(50.0);
    assert_eq!(health.apply_dmg(-30.0), 0.0);
    assert_eq!(health.current, 50.0);

    health.current = 20.0;
    health.apply_dmg(-30.0);
    assert_eq!(health.current, 20.0);
}

#[test]
fn test_dmg_clamps_at_zero() {
    let mut health = Health::full(50.0);
    health.apply_dmg(30.0);
    assert_eq!(health.current, 20.0);

    let mut health = Health::full(50.0);
    assert_eq!(health.apply_dmg(60.0), 50.0);
    assert_eq!(health.current, 0.0);
    assert!(health.is_dead());
}
