use sol_sim::*;
use std::cell::{Cell, RefCell};

fn env() -> SimEnv {
    SimEnv::new(SimConfigs::default(), Rc::new(GameData::builtin().unwrap()))
}

/// Bodyless object recording what it sees and doing one thing on its first update.
#[derive(Default)]
struct Recorder {
    seen: Option<Rc<RefCell<Vec<Vec<ObjId>>>>>,
    spawn_child: bool,
    remove: Option<ObjId>,
    removed_count: Option<Rc<Cell<u32>>>,
}
impl SolObject for Recorder {
    fn kind(&self) -> ObjKind {
        ObjKind::Other
    }

    fn update(&mut self, ctx: &mut UpdateCtx) {
        if let Some(seen) = &self.seen {
            seen.borrow_mut()
                .push(ctx.others.iter().map(|info| info.id).collect());
        }
        if std::mem::take(&mut self.spawn_child) {
            ctx.spawn(|_, _| Box::new(Recorder::default()));
        }
        if let Some(target) = self.remove.take() {
            ctx.commands.remove_delayed(target);
        }
    }

    fn should_be_removed(&self, _env: &SimEnv) -> bool {
        false
    }

    fn on_remove(&mut self, _ctx: &mut UpdateCtx) {
        if let Some(count) = &self.removed_count {
            count.set(count.get() + 1);
        }
    }

    fn receive_dmg(&mut self, _dmg: DmgEvent, _env: &mut SimEnv) {}

    fn to_far(self: Box<Self>) -> Option<Box<dyn FarObject>> {
        None
    }

    fn position(&self) -> Point2<f32> {
        Point2::origin()
    }

    fn velocity(&self) -> Option<Vector2<f32>> {
        None
    }

    fn angle(&self) -> f32 {
        0.0
    }

    fn radius(&self) -> f32 {
        0.0
    }

    fn drawables(&self) -> Drawables {
        Drawables::new()
    }
}

#[test]
fn test_duplicate_add_keeps_one() {
    let mut env = env();
    let mut objects = ObjectManager::new(env.configs.object_manager);

    let id = objects.commands_mut().reserve_id();
    for size in [1.0, 2.0] {
        let asteroid = AsteroidBuilder::new(Point2::new(1.0, 1.0), size).build(objects.physics_mut(), id);
        objects.commands_mut().add_delayed(id, Box::new(asteroid));
    }
    objects.flush(&mut env);

    assert_eq!(objects.num_near(), 1);
    // The displaced asteroid's body is gone too.
    assert_eq!(objects.physics().num_bodies(), 1);
    approx::assert_relative_eq!(objects.get(id).unwrap().radius(), 1.0);
}

#[test]
fn test_mutation_during_update_applies_after_pass() {
    let mut env = env();
    let mut objects = ObjectManager::new(env.configs.object_manager);

    let target = objects.spawn(|id, physics| {
        Box::new(AsteroidBuilder::new(Point2::new(3.0, 0.0), 0.5).build(physics, id))
    });
    let seen = Rc::new(RefCell::new(Vec::new()));
    let recorder_seen = seen.clone();
    let recorder = objects.spawn(move |_, _| {
        Box::new(Recorder {
            seen: Some(recorder_seen),
            spawn_child: true,
            remove: Some(target),
            ..Default::default()
        })
    });
    objects.flush(&mut env);
    assert_eq!(objects.num_near(), 2);

    objects.update(&mut env);
    {
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains(&target));
        assert!(seen[0].contains(&recorder));
        assert_eq!(seen[0].len(), 2);
    }
    assert!(!objects.contains(target));
    assert_eq!(objects.num_near(), 2);

    objects.update(&mut env);
    let seen = seen.borrow();
    assert_eq!(seen[1].len(), 2);
    assert!(!seen[1].contains(&target));
    assert!(seen[1].contains(&recorder));
}

#[test]
fn test_removal_is_idempotent() {
    let mut env = env();
    let mut objects = ObjectManager::new(env.configs.object_manager);

    let count = Rc::new(Cell::new(0));
    let recorder_count = count.clone();
    let id = objects.spawn(move |_, _| {
        Box::new(Recorder {
            removed_count: Some(recorder_count),
            ..Default::default()
        })
    });
    objects.flush(&mut env);

    objects.remove_delayed(id);
    objects.remove_delayed(id);
    objects.remove_delayed(ObjId(999));
    objects.update(&mut env);
    assert!(!objects.contains(id));
    assert_eq!(count.get(), 1);

    objects.remove_delayed(id);
    objects.update(&mut env);
    assert_eq!(count.get(), 1);
}

#[test]
fn test_add_then_remove_same_tick() {
    let mut env = env();
    let mut objects = ObjectManager::new(env.configs.object_manager);

    let count = Rc::new(Cell::new(0));
    let recorder_count = count.clone();
    let id = objects.spawn(move |_, _| {
        Box::new(Recorder {
            removed_count: Some(recorder_count),
            ..Default::default()
        })
    });
    objects.remove_delayed(id);
    objects.flush(&mut env);

    assert!(!objects.contains(id));
    assert_eq!(count.get(), 1);
}

#[test]
fn test_damage_clamp_and_removal() {
    let mut env = env();
    let mut objects = ObjectManager::new(env.configs.object_manager);

    // Size 2.5 has 50 life.
    let id = objects.spawn(|id, physics| {
        Box::new(AsteroidBuilder::new(Point2::new(2.0, 0.0), 2.5).build(physics, id))
    });
    objects.flush(&mut env);
    let life = |objects: &ObjectManager| objects.get(id).unwrap().health().unwrap().current;
    approx::assert_relative_eq!(life(&objects), 50.0);

    objects
        .commands_mut()
        .damage(id, DmgEvent::new(-30.0, DmgType::Bullet));
    objects.flush(&mut env);
    approx::assert_relative_eq!(life(&objects), 50.0);

    objects
        .commands_mut()
        .damage(id, DmgEvent::new(30.0, DmgType::Bullet));
    objects.flush(&mut env);
    approx::assert_relative_eq!(life(&objects), 20.0);

    objects
        .commands_mut()
        .damage(id, DmgEvent::new(60.0, DmgType::Energy));
    objects.flush(&mut env);
    approx::assert_relative_eq!(life(&objects), 0.0);
    assert!(objects.contains(id));

    objects.update(&mut env);
    assert!(!objects.contains(id));
}

#[test]
fn test_demote_and_promote_keep_id() {
    let mut env = env();
    let mut objects = ObjectManager::new(env.configs.object_manager);

    let id = objects.spawn(|id, physics| {
        Box::new(AsteroidBuilder::new(Point2::new(0.0, 0.0), 1.0).build(physics, id))
    });
    objects.flush(&mut env);

    env.camera = Point2::new(100.0, 0.0);
    objects.update(&mut env);
    assert!(!objects.contains(id));
    assert!(objects.far(id).is_some());
    assert_eq!(objects.physics().num_bodies(), 0);

    // Still waiting on the delay computed while the camera was far.
    env.camera = Point2::origin();
    objects.update(&mut env);
    assert!(!objects.contains(id));

    // Delays are zeroed when the queues drain, the check happens on the next tick.
    objects.reset_delays();
    objects.flush(&mut env);
    assert_eq!(objects.tick(), 2);
    objects.update(&mut env);
    assert_eq!(objects.tick(), 3);
    assert!(objects.contains(id));
    assert!(objects.far(id).is_none());
    assert_eq!(objects.physics().num_bodies(), 1);
}

#[test]
fn test_far_delay() {
    let mut env = env();
    let configs = env.configs.object_manager;
    let mut objects = ObjectManager::new(configs);

    let far = AsteroidBuilder::new(Point2::new(50.0, 0.0), 1.0).build_far();
    let id = objects.add_far_now(Box::new(far));
    objects.update(&mut env);

    let data = objects.far(id).unwrap();
    let dist = 50.0 - 0.5;
    approx::assert_relative_eq!(
        data.delay,
        (dist - configs.far_begin_dist) / (2.0 * configs.max_move_speed),
        epsilon = 1e-4
    );
}

#[test]
fn test_position_of_follows_far_objects() {
    let mut env = env();
    let mut objects = ObjectManager::new(env.configs.object_manager);

    let far = AsteroidBuilder::new(Point2::new(50.0, 5.0), 1.0).build_far();
    let id = objects.add_far_now(Box::new(far));
    assert_eq!(objects.position_of(id), Some(Point2::new(50.0, 5.0)));
    assert_eq!(objects.position_of(ObjId(12345)), None);

    objects.update(&mut env);
    assert_eq!(objects.num_far(), 1);
}
