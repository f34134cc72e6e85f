pub mod chunk;
pub mod configs;
pub mod data;
pub mod dmg;
pub mod faction;
pub mod game;
pub mod interval;
pub mod logger;
pub mod object;
pub mod physics;
pub mod sinks;
pub mod vec_pool;

pub use ahash::{AHashMap, AHashSet, RandomState};
pub use anyhow::Context;
pub use indexmap::{IndexMap, IndexSet};
pub use rand::prelude::*;
pub use rapier2d::na::{self, Point2, Vector2};
pub use rapier2d::prelude::*;
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};
pub use std::rc::Rc;

pub use chunk::*;
pub use configs::*;
pub use data::*;
pub use dmg::*;
pub use faction::*;
pub use game::*;
pub use object::*;
pub use physics::*;
pub use sinks::*;
pub use vec_pool::*;

/// Fixed simulation step in milliseconds. The runner paces ticks with it.
pub const DT_MS: u64 = 20;
/// Fixed simulation step in seconds.
pub const DT: f32 = DT_MS as f32 / 1000.0;
