use super::*;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SimConfigs {
    pub object_manager: ObjectManagerConfigs,
    pub chunks: ChunkConfigs,
    pub logger: LoggerConfigs,
    pub runner: RunnerConfigs,
}
impl SimConfigs {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading configs {}", path.display()))?;
        let configs = Self::from_json(&text).with_context(|| format!("in {}", path.display()))?;
        Ok(configs)
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let configs: Self = serde_json::from_str(text).context("parsing configs")?;
        configs.verify()?;
        Ok(configs)
    }

    pub fn verify(&self) -> anyhow::Result<()> {
        let om = &self.object_manager;
        if om.far_begin_dist <= 0.0 || om.far_begin_dist >= om.far_end_dist {
            anyhow::bail!(
                "far_begin_dist ({}) must be positive and smaller than far_end_dist ({})",
                om.far_begin_dist,
                om.far_end_dist
            );
        }
        if om.max_move_speed <= 0.0 {
            anyhow::bail!("max_move_speed must be positive, got {}", om.max_move_speed);
        }
        if self.chunks.chunk_size <= 0.0 {
            anyhow::bail!("chunk_size must be positive, got {}", self.chunks.chunk_size);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectManagerConfigs {
    /// Near objects further than this (minus their radius) from the camera are demoted.
    pub far_end_dist: f32,
    /// Far objects closer than this (minus their radius) are promoted.
    /// Smaller than `far_end_dist` so objects do not flicker between forms.
    pub far_begin_dist: f32,
    /// Upper bound of anything's speed. Used to delay far object range checks.
    pub max_move_speed: f32,
    /// How many times the deferred queues are drained per tick
    /// while removals keep queuing new work.
    pub max_drain_passes: u32,
}
impl Default for ObjectManagerConfigs {
    fn default() -> Self {
        Self {
            far_end_dist: 20.0,
            far_begin_dist: 15.0,
            max_move_speed: 8.0,
            max_drain_passes: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkConfigs {
    pub chunk_size: f32,
    /// Chunks at this chebyshev distance from the camera chunk are not filled.
    pub fill_dist: i32,
    pub asteroids_per_chunk: u32,
    pub seed: u64,
}
impl Default for ChunkConfigs {
    fn default() -> Self {
        Self {
            chunk_size: 20.0,
            fill_dist: 2,
            asteroids_per_chunk: 3,
            seed: 0x5017,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfigs {
    pub level: log::LevelFilter,
}
impl Default for LoggerConfigs {
    fn default() -> Self {
        Self {
            level: log::LevelFilter::Info,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfigs {
    pub tick_ms: u64,
    pub max_behind_ms: u64,
    /// 0 runs forever.
    pub ticks: u64,
}
impl Default for RunnerConfigs {
    fn default() -> Self {
        Self {
            tick_ms: DT_MS,
            max_behind_ms: DT_MS * 4,
            ticks: 600,
        }
    }
}

#[test]
fn test_partial_json_uses_defaults() {
    let configs = SimConfigs::from_json(r#"{ "chunks": { "fill_dist": 3 } }"#).unwrap();
    assert_eq!(configs.chunks.fill_dist, 3);
    assert_eq!(configs.chunks.chunk_size, ChunkConfigs::default().chunk_size);
    assert_eq!(
        configs.object_manager.far_end_dist,
        ObjectManagerConfigs::default().far_end_dist
    );
}

#[test]
fn test_reject_inverted_far_dist() {
    let err = SimConfigs::from_json(
        r#"{ "object_manager": { "far_begin_dist": 30.0, "far_end_dist": 10.0 } }"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("far_begin_dist"));
}

#[test]
fn test_runner_paces_at_physics_step() {
    let runner = RunnerConfigs::default();
    approx::assert_relative_eq!(runner.tick_ms as f32 / 1000.0, DT);
    assert_eq!(runner.tick_ms, DT_MS);
}
