use super::*;

/// Everything shared by the simulation that is not an object.
///
/// Built once per session and passed down explicitly.
pub struct SimEnv {
    pub configs: SimConfigs,
    pub data: Rc<GameData>,
    /// Center of simulation range.
    pub camera: Point2<f32>,
    /// Seconds since the session started.
    pub time: f64,
    pub rng: StdRng,
    pub sounds: SoundPlayer,
    pub drawables: Box<dyn DrawableSink>,
}
impl SimEnv {
    pub fn new(configs: SimConfigs, data: Rc<GameData>) -> Self {
        Self {
            rng: StdRng::seed_from_u64(configs.chunks.seed),
            configs,
            data,
            camera: Point2::origin(),
            time: 0.0,
            sounds: SoundPlayer::default(),
            drawables: Box::new(NullSink),
        }
    }

    pub fn with_sinks(mut self, sounds: Box<dyn SoundSink>, drawables: Box<dyn DrawableSink>) -> Self {
        self.sounds = SoundPlayer::new(sounds);
        self.drawables = drawables;
        self
    }
}

/// A running session.
pub struct SolGame {
    pub env: SimEnv,
    pub objects: ObjectManager,
    pub chunks: ChunkManager,
    camera_target: Option<ObjId>,
}
impl SolGame {
    pub fn new(env: SimEnv) -> Self {
        let chunks = ChunkManager::new(
            env.configs.chunks,
            Box::new(AsteroidFieldFiller::new(
                env.configs.chunks.seed,
                env.configs.chunks.asteroids_per_chunk,
            )),
        );
        Self::with_chunks(env, chunks)
    }

    pub fn with_chunks(env: SimEnv, chunks: ChunkManager) -> Self {
        Self {
            objects: ObjectManager::new(env.configs.object_manager),
            env,
            chunks,
            camera_target: None,
        }
    }

    /// One tick: chunks around the camera, then objects.
    pub fn update(&mut self) {
        if let Some(target) = self.camera_target {
            match self.objects.position_of(target) {
                Some(position) => self.env.camera = position,
                None => {
                    log::debug!("camera target {:?} is gone", target);
                    self.camera_target = None;
                }
            }
        }

        self.chunks.update(&mut self.objects, &self.env);
        self.objects.update(&mut self.env);
        self.env.time += DT as f64;
    }

    /// Keep the camera on an object, following it through star ports.
    pub fn follow(&mut self, target: ObjId) {
        self.camera_target = Some(target);
        if let Some(position) = self.objects.position_of(target) {
            self.env.camera = position;
        }
    }

    pub fn set_camera(&mut self, position: Point2<f32>) {
        self.camera_target = None;
        self.env.camera = position;
    }

    pub fn camera_target(&self) -> Option<ObjId> {
        self.camera_target
    }

    pub fn spawn_ship(
        &mut self,
        hull: &str,
        position: Point2<f32>,
        faction: Faction,
    ) -> anyhow::Result<ObjId> {
        let hull = self
            .env
            .data
            .hull(hull)
            .with_context(|| format!("spawning ship at {}", position))?;
        let builder = ShipBuilder::new(hull, position, faction);
        Ok(self
            .objects
            .spawn(|id, physics| Box::new(builder.build(physics, id))))
    }

    pub fn spawn_asteroid(&mut self, position: Point2<f32>, size: f32) -> ObjId {
        let builder = AsteroidBuilder::new(position, size);
        self.objects
            .spawn(|id, physics| Box::new(builder.build(physics, id)))
    }

    /// Two ports sending ships to each other.
    pub fn spawn_star_port_pair(&mut self, a: Point2<f32>, b: Point2<f32>) -> (ObjId, ObjId) {
        let first = StarPortBuilder::new(a, b);
        let second = StarPortBuilder::new(b, a);
        (
            self.objects
                .spawn(|id, physics| Box::new(first.build(physics, id))),
            self.objects
                .spawn(|id, physics| Box::new(second.build(physics, id))),
        )
    }

    /// Fire a projectile from the front of a near ship.
    pub fn fire(&mut self, shooter: ObjId, projectile: &str) -> anyhow::Result<ObjId> {
        let config = self.env.data.projectile(projectile)?;
        let ship = self
            .objects
            .get(shooter)
            .ok_or_else(|| anyhow::anyhow!("shooter {:?} is not near", shooter))?;

        let angle = ship.angle();
        let muzzle = ship.radius() + config.size;
        let position = ship.position() + Vector2::new(angle.cos(), angle.sin()) * muzzle;
        let builder = ProjectileBuilder::new(config, position, angle)
            .with_base_velocity(ship.velocity().unwrap_or_else(Vector2::zeros))
            .with_owner(shooter, ship.faction());

        Ok(self
            .objects
            .spawn(|id, physics| Box::new(builder.build(physics, id))))
    }

    pub fn ship_mut(&mut self, id: ObjId) -> Option<&mut Ship> {
        self.objects.get_mut(id)?.as_ship_mut()
    }

    /// Apply queued spawns and removals without stepping.
    pub fn flush(&mut self) {
        self.objects.flush(&mut self.env);
    }
}
