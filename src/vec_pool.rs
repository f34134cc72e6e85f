use super::*;
use std::cell::Cell;
use std::ops::{Deref, DerefMut};

/// Scratch vectors with leak detection.
///
/// Every vector taken with [`VecPool::obtain`] is given back when its guard drops.
/// At checkpoints (end of an object update, end of a tick) the number of
/// outstanding vectors must be zero. A guard that escapes its scope
/// (leaked, stored, forgotten) shows up as an imbalance attributed to the tag
/// given to the checkpoint.
///
/// Simulation thread only.
#[derive(Debug, Default)]
pub struct VecPool {
    outstanding: Cell<u32>,
    high_water: Cell<u32>,
}
impl VecPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn obtain(&self) -> PooledVec<'_> {
        self.obtain_with(Vector2::zeros())
    }

    pub fn obtain_with(&self, v: Vector2<f32>) -> PooledVec<'_> {
        let outstanding = self.outstanding.get() + 1;
        self.outstanding.set(outstanding);
        if outstanding > self.high_water.get() {
            self.high_water.set(outstanding);
        }
        PooledVec { pool: self, v }
    }

    /// Same as dropping the guard.
    pub fn free(&self, v: PooledVec<'_>) {
        debug_assert!(std::ptr::eq(self, v.pool), "vector freed into another pool");
        drop(v);
    }

    pub fn outstanding(&self) -> u32 {
        self.outstanding.get()
    }

    /// Most vectors ever outstanding at once.
    pub fn high_water(&self) -> u32 {
        self.high_water.get()
    }

    /// Error if any vector is still outstanding.
    pub fn checkpoint(&self, tag: &str) -> anyhow::Result<()> {
        let outstanding = self.outstanding.get();
        if outstanding != 0 {
            anyhow::bail!("{} pooled vectors not freed by {}", outstanding, tag);
        }
        Ok(())
    }

    /// Fatal in debug builds. Logged and reset in release builds
    /// so one leak is not reported again at every following checkpoint.
    pub fn assert_balanced(&self, tag: &str) {
        if let Err(err) = self.checkpoint(tag) {
            log::error!("{}", err);
            debug_assert!(false, "{}", err);
            self.outstanding.set(0);
        }
    }

    fn release(&self) {
        let outstanding = self.outstanding.get();
        debug_assert!(outstanding > 0, "pooled vector freed twice");
        self.outstanding.set(outstanding.saturating_sub(1));
    }
}

pub struct PooledVec<'a> {
    pool: &'a VecPool,
    v: Vector2<f32>,
}
impl Deref for PooledVec<'_> {
    type Target = Vector2<f32>;

    fn deref(&self) -> &Self::Target {
        &self.v
    }
}
impl DerefMut for PooledVec<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.v
    }
}
impl Drop for PooledVec<'_> {
    fn drop(&mut self) {
        self.pool.release();
    }
}

/// Scratch vector of length `len` pointing toward `angle`.
pub fn from_angle_len(pool: &VecPool, angle: f32, len: f32) -> PooledVec<'_> {
    pool.obtain_with(Vector2::new(angle.cos() * len, angle.sin() * len))
}

#[test]
fn test_balanced_sequence() {
    let pool = VecPool::new();
    {
        let a = pool.obtain();
        let mut b = pool.obtain_with(Vector2::new(1.0, 2.0));
        *b += *a;
        assert_eq!(pool.outstanding(), 2);
        pool.free(a);
        assert_eq!(pool.outstanding(), 1);
    }
    assert_eq!(pool.outstanding(), 0);
    assert_eq!(pool.high_water(), 2);
    pool.checkpoint("test").unwrap();
}

#[test]
fn test_leak_is_reported_with_tag() {
    let pool = VecPool::new();
    let v = pool.obtain();
    std::mem::forget(v);

    let err = pool.checkpoint("Asteroid").unwrap_err();
    assert!(err.to_string().contains("Asteroid"));
    assert!(err.to_string().contains('1'));
}

#[test]
fn test_from_angle_len() {
    let pool = VecPool::new();
    let v = from_angle_len(&pool, std::f32::consts::FRAC_PI_2, 2.0);
    assert!(v.x.abs() < 1e-5);
    assert!((v.y - 2.0).abs() < 1e-5);
}
