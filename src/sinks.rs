//! Push-only outputs of the simulation.
//!
//! Rendering and audio are not simulated here. Objects describe what they look
//! like with [`Drawable`]s and request sounds; the sinks receive them.
//! Sinks never call back into simulation state.

use super::*;
use std::cell::RefCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DrawLevel {
    Bodies,
    Loot,
    Projectiles,
    Effects,
}

/// A sprite attached to an object.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    pub texture: String,
    pub size: f32,
    /// Relative to the object's position, in the object's frame.
    pub rel_pos: Vector2<f32>,
    pub rel_angle: f32,
    pub level: DrawLevel,
}
impl Drawable {
    pub fn centered(texture: impl Into<String>, size: f32, level: DrawLevel) -> Self {
        Self {
            texture: texture.into(),
            size,
            rel_pos: Vector2::zeros(),
            rel_angle: 0.0,
            level,
        }
    }
}

/// Ordered. Usually only one or two per object.
pub type Drawables = SmallVec<[Drawable; 2]>;

pub trait DrawableSink {
    fn add_object(&mut self, id: ObjId, drawables: &[Drawable]);
    fn remove_object(&mut self, id: ObjId);
}

pub trait SoundSink {
    fn play(&mut self, sound: &str, position: Point2<f32>, source: Option<ObjId>);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;
impl DrawableSink for NullSink {
    fn add_object(&mut self, _id: ObjId, _drawables: &[Drawable]) {}
    fn remove_object(&mut self, _id: ObjId) {}
}
impl SoundSink for NullSink {
    fn play(&mut self, _sound: &str, _position: Point2<f32>, _source: Option<ObjId>) {}
}

/// Keeps the drawables of every live object.
#[derive(Debug, Default)]
pub struct DrawableRegistry {
    pub objects: AHashMap<ObjId, Drawables>,
}
impl DrawableSink for DrawableRegistry {
    fn add_object(&mut self, id: ObjId, drawables: &[Drawable]) {
        self.objects.insert(id, drawables.iter().cloned().collect());
    }

    fn remove_object(&mut self, id: ObjId) {
        self.objects.remove(&id);
    }
}

/// Keeps every sound played.
#[derive(Debug, Default)]
pub struct SoundLog {
    pub played: Vec<(String, Point2<f32>, Option<ObjId>)>,
}
impl SoundLog {
    pub fn count(&self, sound: &str) -> usize {
        self.played.iter().filter(|(name, _, _)| name == sound).count()
    }
}
impl SoundSink for SoundLog {
    fn play(&mut self, sound: &str, position: Point2<f32>, source: Option<ObjId>) {
        self.played.push((sound.to_string(), position, source));
    }
}

impl<T: DrawableSink> DrawableSink for Rc<RefCell<T>> {
    fn add_object(&mut self, id: ObjId, drawables: &[Drawable]) {
        self.borrow_mut().add_object(id, drawables)
    }

    fn remove_object(&mut self, id: ObjId) {
        self.borrow_mut().remove_object(id)
    }
}

impl<T: SoundSink> SoundSink for Rc<RefCell<T>> {
    fn play(&mut self, sound: &str, position: Point2<f32>, source: Option<ObjId>) {
        self.borrow_mut().play(sound, position, source)
    }
}

/// Forwards to a [`SoundSink`], dropping looped sounds that are still playing.
///
/// A looped sound played again for the same source before its loop time has
/// elapsed is a no-op.
pub struct SoundPlayer {
    sink: Box<dyn SoundSink>,
    /// Simulation time at which (source, sound) may play again.
    loop_timers: AHashMap<(ObjId, String), f64>,
}
impl SoundPlayer {
    pub fn new(sink: Box<dyn SoundSink>) -> Self {
        Self {
            sink,
            loop_timers: Default::default(),
        }
    }

    pub fn play(&mut self, time: f64, sound: &SoundRef, position: Point2<f32>, source: Option<ObjId>) {
        if let (Some(loop_time), Some(source)) = (sound.loop_time, source) {
            let key = (source, sound.name.clone());
            if let Some(&next) = self.loop_timers.get(&key) {
                if time < next {
                    return;
                }
            }
            self.loop_timers.insert(key, time + loop_time as f64);
        }

        self.sink.play(&sound.name, position, source);
    }

    /// One-shot sound.
    pub fn play_name(&mut self, sound: &str, position: Point2<f32>, source: Option<ObjId>) {
        self.sink.play(sound, position, source);
    }

    /// Drop loop timers of a removed object.
    pub fn forget_source(&mut self, source: ObjId) {
        self.loop_timers.retain(|(id, _), _| *id != source);
    }
}
impl Default for SoundPlayer {
    fn default() -> Self {
        Self::new(Box::new(NullSink))
    }
}

#[test]
fn test_looped_sound_dedup() {
    let log = Rc::new(RefCell::new(SoundLog::default()));
    let mut player = SoundPlayer::new(Box::new(log.clone()));
    let engine = SoundRef::looped("engine", 1.0);
    let a = ObjId(1);
    let b = ObjId(2);

    player.play(0.0, &engine, Point2::origin(), Some(a));
    player.play(0.5, &engine, Point2::origin(), Some(a));
    // Other source is independent.
    player.play(0.5, &engine, Point2::origin(), Some(b));
    assert_eq!(log.borrow().count("engine"), 2);

    player.play(1.0, &engine, Point2::origin(), Some(a));
    assert_eq!(log.borrow().count("engine"), 3);
}

#[test]
fn test_one_shot_always_plays() {
    let log = Rc::new(RefCell::new(SoundLog::default()));
    let mut player = SoundPlayer::new(Box::new(log.clone()));
    let hit = SoundRef::new("hit");

    player.play(0.0, &hit, Point2::origin(), Some(ObjId(1)));
    player.play(0.0, &hit, Point2::origin(), Some(ObjId(1)));
    assert_eq!(log.borrow().count("hit"), 2);
}

#[test]
fn test_forget_source_resets_loop() {
    let log = Rc::new(RefCell::new(SoundLog::default()));
    let mut player = SoundPlayer::new(Box::new(log.clone()));
    let engine = SoundRef::looped("engine", 10.0);

    player.play(0.0, &engine, Point2::origin(), Some(ObjId(1)));
    player.forget_source(ObjId(1));
    player.play(0.1, &engine, Point2::origin(), Some(ObjId(1)));
    assert_eq!(log.borrow().count("engine"), 2);
}
