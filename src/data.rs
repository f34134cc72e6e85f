use super::*;

/// Immutable game content: hulls, engines and projectiles.
///
/// Built once at startup and handed down by reference.
/// Configs are shared through `Rc` so far objects can keep what they need
/// to rebuild their near form.
#[derive(Debug, Default)]
pub struct GameData {
    hulls: AHashMap<String, Rc<HullConfig>>,
    engines: AHashMap<String, Rc<EngineConfig>>,
    projectiles: AHashMap<String, Rc<ProjectileConfig>>,
}
impl GameData {
    /// Content shipped with the simulation.
    pub fn builtin() -> anyhow::Result<Self> {
        Self::from_json(BUILTIN_DATA).context("builtin game data")
    }

    /// A hull whose engine is missing or of the wrong size class is an error
    /// naming the hull. Nothing is partially loaded.
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let json: GameDataJson = serde_json::from_str(text).context("parsing game data")?;

        let engines: AHashMap<String, Rc<EngineConfig>> = json
            .engines
            .into_iter()
            .map(|(name, engine)| {
                let engine = engine.parse(name.clone());
                (name, Rc::new(engine))
            })
            .collect();

        let mut hulls = AHashMap::with_capacity(json.hulls.len());
        for (name, hull) in json.hulls {
            let hull = hull
                .parse(name.clone(), &engines)
                .with_context(|| format!("loading hull '{}'", name))?;
            hulls.insert(name, Rc::new(hull));
        }

        let mut projectiles = AHashMap::with_capacity(json.projectiles.len());
        for (name, projectile) in json.projectiles {
            let projectile = projectile
                .parse(name.clone())
                .with_context(|| format!("loading projectile '{}'", name))?;
            projectiles.insert(name, Rc::new(projectile));
        }

        log::debug!(
            "Loaded {} hulls, {} engines, {} projectiles",
            hulls.len(),
            engines.len(),
            projectiles.len()
        );

        Ok(Self {
            hulls,
            engines,
            projectiles,
        })
    }

    pub fn hull(&self, name: &str) -> anyhow::Result<Rc<HullConfig>> {
        self.hulls
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown hull '{}'", name))
    }

    pub fn engine(&self, name: &str) -> anyhow::Result<Rc<EngineConfig>> {
        self.engines
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown engine '{}'", name))
    }

    pub fn projectile(&self, name: &str) -> anyhow::Result<Rc<ProjectileConfig>> {
        self.projectiles
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown projectile '{}'", name))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundRef {
    pub name: String,
    /// Looped sounds are not restarted for the same source before this many seconds.
    #[serde(default)]
    pub loop_time: Option<f32>,
}
impl SoundRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            loop_time: None,
        }
    }

    pub fn looped(name: impl Into<String>, loop_time: f32) -> Self {
        Self {
            name: name.into(),
            loop_time: Some(loop_time),
        }
    }
}

#[derive(Debug)]
pub struct HullConfig {
    pub name: String,
    /// Diameter.
    pub size: f32,
    pub max_life: f32,
    pub density: f32,
    pub texture: String,
    pub big: bool,
    pub engine: Rc<EngineConfig>,
    pub explosion_sound: SoundRef,
}

#[derive(Debug)]
pub struct EngineConfig {
    pub name: String,
    pub big: bool,
    /// In unit/seconds².
    pub acceleration: f32,
    /// In radian/seconds.
    pub max_rot_speed: f32,
    /// In radian/seconds².
    pub rot_acceleration: f32,
    pub work_sound: SoundRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProjectileBodyKind {
    /// Physical ball. Hits are reported by contacts.
    Ball { radius: f32, density: f32 },
    /// No physics body. Ray casts its path every step.
    Point,
}

#[derive(Debug)]
pub struct ProjectileConfig {
    pub name: String,
    pub body: ProjectileBodyKind,
    pub speed: f32,
    /// In seconds.
    pub life: f32,
    pub dmg: f32,
    pub dmg_type: DmgType,
    pub texture: String,
    pub size: f32,
    /// Can hit ships of its own faction.
    pub hits_allies: bool,
    pub collision_sound: SoundRef,
}
impl ProjectileConfig {
    /// Massive projectiles can hit other projectiles.
    pub fn is_massive(&self) -> bool {
        matches!(self.body, ProjectileBodyKind::Ball { density, .. } if density > 0.0)
    }
}

// ####################################################################################
// ############################## DATA JSON ###########################################
// ####################################################################################

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct GameDataJson {
    hulls: IndexMap<String, HullJson>,
    engines: IndexMap<String, EngineJson>,
    projectiles: IndexMap<String, ProjectileJson>,
}

#[derive(Debug, Deserialize)]
struct HullJson {
    size: f32,
    max_life: f32,
    #[serde(default = "default_density")]
    density: f32,
    texture: String,
    #[serde(default)]
    big: bool,
    engine: String,
    #[serde(default = "default_explosion_sound")]
    explosion_sound: SoundRef,
}
impl HullJson {
    fn parse(
        self,
        name: String,
        engines: &AHashMap<String, Rc<EngineConfig>>,
    ) -> anyhow::Result<HullConfig> {
        if self.size <= 0.0 || self.max_life <= 0.0 {
            anyhow::bail!("size and max_life must be positive");
        }

        let engine = engines
            .get(&self.engine)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown engine '{}'", self.engine))?;
        if engine.big != self.big {
            anyhow::bail!(
                "engine '{}' is {} but the hull is {}",
                engine.name,
                size_class(engine.big),
                size_class(self.big)
            );
        }

        Ok(HullConfig {
            name,
            size: self.size,
            max_life: self.max_life,
            density: self.density,
            texture: self.texture,
            big: self.big,
            engine,
            explosion_sound: self.explosion_sound,
        })
    }
}

#[derive(Debug, Deserialize)]
struct EngineJson {
    #[serde(default)]
    big: bool,
    acceleration: f32,
    max_rot_speed: f32,
    rot_acceleration: f32,
    #[serde(default = "default_engine_sound")]
    work_sound: SoundRef,
}
impl EngineJson {
    fn parse(self, name: String) -> EngineConfig {
        EngineConfig {
            name,
            big: self.big,
            acceleration: self.acceleration,
            max_rot_speed: self.max_rot_speed,
            rot_acceleration: self.rot_acceleration,
            work_sound: self.work_sound,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProjectileJson {
    body: ProjectileBodyKind,
    speed: f32,
    life: f32,
    dmg: f32,
    /// Looked up by name.
    dmg_type: String,
    texture: String,
    size: f32,
    #[serde(default)]
    hits_allies: bool,
    #[serde(default = "default_collision_sound")]
    collision_sound: SoundRef,
}
impl ProjectileJson {
    fn parse(self, name: String) -> anyhow::Result<ProjectileConfig> {
        Ok(ProjectileConfig {
            name,
            body: self.body,
            speed: self.speed,
            life: self.life,
            dmg: self.dmg,
            dmg_type: DmgType::from_name(&self.dmg_type)?,
            texture: self.texture,
            size: self.size,
            hits_allies: self.hits_allies,
            collision_sound: self.collision_sound,
        })
    }
}

fn size_class(big: bool) -> &'static str {
    if big {
        "big"
    } else {
        "small"
    }
}

fn default_density() -> f32 {
    1.0
}

fn default_explosion_sound() -> SoundRef {
    SoundRef::new("shipExplosion")
}

fn default_engine_sound() -> SoundRef {
    SoundRef::looped("engine", 1.0)
}

fn default_collision_sound() -> SoundRef {
    SoundRef::new("projectileHit")
}

const BUILTIN_DATA: &str = r#"{
    "engines": {
        "small": { "acceleration": 2.0, "max_rot_speed": 3.0, "rot_acceleration": 6.0 },
        "big": { "big": true, "acceleration": 1.2, "max_rot_speed": 1.5, "rot_acceleration": 2.0 }
    },
    "hulls": {
        "imperialSmall": { "size": 0.6, "max_life": 60.0, "texture": "imperialSmall", "engine": "small" },
        "imperialBig": { "size": 1.6, "max_life": 300.0, "density": 2.0, "texture": "imperialBig", "big": true, "engine": "big" },
        "pirateSmall": { "size": 0.5, "max_life": 45.0, "texture": "pirateSmall", "engine": "small" }
    },
    "projectiles": {
        "bullet": { "body": "Point", "speed": 9.0, "life": 1.5, "dmg": 6.0, "dmg_type": "bullet", "texture": "bullet", "size": 0.05 },
        "plasma": { "body": "Point", "speed": 7.0, "life": 1.8, "dmg": 9.0, "dmg_type": "energy", "texture": "plasma", "size": 0.08 },
        "rocket": { "body": { "Ball": { "radius": 0.08, "density": 0.5 } }, "speed": 5.0, "life": 4.0, "dmg": 40.0, "dmg_type": "explosion", "texture": "rocket", "size": 0.16, "collision_sound": { "name": "rocketExplosion" } }
    }
}"#;

// ####################################################################################
// ################################### TEST ###########################################
// ####################################################################################

#[test]
fn test_builtin_loads() {
    let data = GameData::builtin().unwrap();
    let hull = data.hull("imperialBig").unwrap();
    assert!(hull.big);
    assert!(hull.engine.big);
    let engine = data.engine(&hull.engine.name).unwrap();
    assert!(Rc::ptr_eq(&engine, &hull.engine));
    assert!(data.projectile("rocket").unwrap().is_massive());
    assert!(!data.projectile("bullet").unwrap().is_massive());
}

#[test]
fn test_engine_hull_mismatch_names_hull() {
    let text = r#"{
        "engines": { "big": { "big": true, "acceleration": 1.0, "max_rot_speed": 1.0, "rot_acceleration": 1.0 } },
        "hulls": { "tinyShip": { "size": 0.5, "max_life": 10.0, "texture": "t", "engine": "big" } }
    }"#;
    let err = GameData::from_json(text).unwrap_err();
    let msg = format!("{:#}", err);
    assert!(msg.contains("tinyShip"), "{}", msg);
    assert!(msg.contains("big"), "{}", msg);
}

#[test]
fn test_unknown_dmg_type_names_value() {
    let text = r#"{
        "projectiles": { "laser": { "body": "Point", "speed": 1.0, "life": 1.0, "dmg": 1.0, "dmg_type": "lazer", "texture": "l", "size": 0.1 } }
    }"#;
    let msg = format!("{:#}", GameData::from_json(text).unwrap_err());
    assert!(msg.contains("lazer"), "{}", msg);
    assert!(msg.contains("laser"), "{}", msg);
}

#[test]
fn test_lookup_miss() {
    let data = GameData::builtin().unwrap();
    let err = data.hull("nope").unwrap_err();
    assert!(err.to_string().contains("nope"));
}
