//! Fills the world around the camera with far objects, one square chunk at a time.

use super::*;

pub type ChunkCoord = [i32; 2];

pub fn chunk_of(position: Point2<f32>, chunk_size: f32) -> ChunkCoord {
    [
        (position.x / chunk_size).floor() as i32,
        (position.y / chunk_size).floor() as i32,
    ]
}

/// A chunk is far once it is `dist` chunks or more away on either axis.
pub fn is_chunk_far(chunk: ChunkCoord, center: ChunkCoord, dist: i32) -> bool {
    (chunk[0] - center[0]).abs() >= dist || (chunk[1] - center[1]).abs() >= dist
}

/// Populates a chunk the first time it comes in range.
pub trait ChunkFiller {
    fn fill(
        &mut self,
        chunk: ChunkCoord,
        chunk_size: f32,
        remover: &Rc<dyn RemoveController>,
        objects: &mut ObjectManager,
    );
}

/// Removes what chunks spawned once its chunk is no longer kept.
#[derive(Debug, Clone, Copy)]
pub struct ChunkRemover {
    chunk_size: f32,
    max_dist: i32,
}
impl ChunkRemover {
    pub fn new(chunk_size: f32, max_dist: i32) -> Self {
        Self {
            chunk_size,
            max_dist,
        }
    }
}
impl RemoveController for ChunkRemover {
    fn should_remove(&self, position: Point2<f32>, env: &SimEnv) -> bool {
        is_chunk_far(
            chunk_of(position, self.chunk_size),
            chunk_of(env.camera, self.chunk_size),
            self.max_dist,
        )
    }
}

pub struct ChunkManager {
    configs: ChunkConfigs,
    camera_chunk: Option<ChunkCoord>,
    filled: AHashSet<ChunkCoord>,
    remover: Rc<dyn RemoveController>,
    filler: Box<dyn ChunkFiller>,
}
impl ChunkManager {
    pub fn new(configs: ChunkConfigs, filler: Box<dyn ChunkFiller>) -> Self {
        Self {
            remover: Rc::new(ChunkRemover::new(configs.chunk_size, configs.fill_dist + 1)),
            configs,
            camera_chunk: None,
            filled: Default::default(),
            filler,
        }
    }

    /// Fill the chunks that came in range since the camera last changed chunk.
    pub fn update(&mut self, objects: &mut ObjectManager, env: &SimEnv) {
        let center = chunk_of(env.camera, self.configs.chunk_size);
        if self.camera_chunk == Some(center) {
            return;
        }
        self.camera_chunk = Some(center);

        let keep_dist = self.configs.fill_dist + 1;
        self.filled
            .retain(|&chunk| !is_chunk_far(chunk, center, keep_dist));

        let fill_dist = self.configs.fill_dist;
        for x in center[0] - fill_dist + 1..center[0] + fill_dist {
            for y in center[1] - fill_dist + 1..center[1] + fill_dist {
                let chunk = [x, y];
                if self.filled.insert(chunk) {
                    log::trace!("filling chunk {:?}", chunk);
                    self.filler
                        .fill(chunk, self.configs.chunk_size, &self.remover, objects);
                }
            }
        }
    }

    pub fn is_filled(&self, chunk: ChunkCoord) -> bool {
        self.filled.contains(&chunk)
    }

    pub fn num_filled(&self) -> usize {
        self.filled.len()
    }

    pub fn remover(&self) -> &Rc<dyn RemoveController> {
        &self.remover
    }
}

/// Scatters far asteroids. The same seed and chunk always give the same asteroids.
pub struct AsteroidFieldFiller {
    seed: u64,
    asteroids_per_chunk: u32,
}
impl AsteroidFieldFiller {
    pub fn new(seed: u64, asteroids_per_chunk: u32) -> Self {
        Self {
            seed,
            asteroids_per_chunk,
        }
    }

    fn chunk_rng(&self, chunk: ChunkCoord) -> StdRng {
        let coords = (chunk[0] as u32 as u64) << 32 | chunk[1] as u32 as u64;
        StdRng::seed_from_u64(self.seed ^ coords.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }
}
impl ChunkFiller for AsteroidFieldFiller {
    fn fill(
        &mut self,
        chunk: ChunkCoord,
        chunk_size: f32,
        remover: &Rc<dyn RemoveController>,
        objects: &mut ObjectManager,
    ) {
        let mut rng = self.chunk_rng(chunk);
        let origin = Point2::new(chunk[0] as f32, chunk[1] as f32) * chunk_size;

        for _ in 0..self.asteroids_per_chunk {
            let position = origin
                + Vector2::new(
                    rng.gen_range(0.0..chunk_size),
                    rng.gen_range(0.0..chunk_size),
                );
            let size = rng.gen_range(0.3..1.2);
            let velocity = Vector2::new(rng.gen_range(-0.2..0.2), rng.gen_range(-0.2..0.2));

            let far = AsteroidBuilder::new(position, size)
                .with_angle(rng.gen_range(0.0..std::f32::consts::TAU))
                .with_velocity(velocity, rng.gen_range(-0.5..0.5))
                .with_remover(Some(remover.clone()))
                .build_far();
            objects.add_far_now(Box::new(far));
        }
    }
}

#[test]
fn test_chunk_of() {
    assert_eq!(chunk_of(Point2::new(0.0, 0.0), 20.0), [0, 0]);
    assert_eq!(chunk_of(Point2::new(19.9, -0.1), 20.0), [0, -1]);
    assert_eq!(chunk_of(Point2::new(-20.0, 40.0), 20.0), [-1, 2]);
}

#[test]
fn test_is_chunk_far() {
    assert!(!is_chunk_far([1, 1], [0, 0], 2));
    assert!(is_chunk_far([2, 0], [0, 0], 2));
    assert!(is_chunk_far([0, -2], [0, 0], 2));
}

#[test]
fn test_filler_is_deterministic() {
    let remover: Rc<dyn RemoveController> = Rc::new(ChunkRemover::new(20.0, 3));

    let positions = |seed: u64| {
        let mut objects = ObjectManager::new(Default::default());
        AsteroidFieldFiller::new(seed, 4).fill([3, -2], 20.0, &remover, &mut objects);
        objects
            .far_objects()
            .iter()
            .map(|data| data.far.position())
            .collect::<Vec<_>>()
    };

    let a = positions(1);
    assert_eq!(a.len(), 4);
    assert_eq!(a, positions(1));
    assert_ne!(a, positions(2));
    for p in a {
        assert_eq!(chunk_of(p, 20.0), [3, -2]);
    }
}

#[test]
fn test_paging_follows_camera() {
    let mut env = SimEnv::new(SimConfigs::default(), Rc::new(GameData::builtin().unwrap()));
    let mut objects = ObjectManager::new(Default::default());
    let mut chunks = ChunkManager::new(ChunkConfigs::default(), Box::new(AsteroidFieldFiller::new(1, 2)));

    chunks.update(&mut objects, &env);
    assert_eq!(chunks.num_filled(), 9);
    assert!(chunks.is_filled([1, -1]));
    assert!(!chunks.is_filled([2, 0]));
    assert_eq!(objects.far_objects().len(), 18);

    // Same chunk, nothing new.
    env.camera = Point2::new(5.0, 5.0);
    chunks.update(&mut objects, &env);
    assert_eq!(objects.far_objects().len(), 18);

    let remover = chunks.remover();
    assert!(!remover.should_remove(Point2::new(50.0, 0.0), &env));
    assert!(remover.should_remove(Point2::new(70.0, 0.0), &env));

    env.camera = Point2::new(60.0, 0.0);
    chunks.update(&mut objects, &env);
    assert!(!chunks.is_filled([0, 0]));
    assert!(chunks.is_filled([1, 0]));
    assert!(chunks.is_filled([4, 1]));
    assert_eq!(chunks.num_filled(), 12);
}
