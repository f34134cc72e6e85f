use sol_sim::object::asteroid::{loot_value, SPLIT_COVERAGE};
use sol_sim::*;
use std::cell::RefCell;

#[test]
fn test_destroyed_asteroid_splits_and_drops_loot() {
    let drawables = Rc::new(RefCell::new(DrawableRegistry::default()));
    let sounds = Rc::new(RefCell::new(SoundLog::default()));
    let mut env = SimEnv::new(SimConfigs::default(), Rc::new(GameData::builtin().unwrap()))
        .with_sinks(Box::new(sounds.clone()), Box::new(drawables.clone()));
    let mut objects = ObjectManager::new(env.configs.object_manager);

    let size = 1.23;
    let id = objects.spawn(|id, physics| {
        Box::new(AsteroidBuilder::new(Point2::new(1.0, 1.0), size).build(physics, id))
    });
    objects.flush(&mut env);
    assert_eq!(drawables.borrow().objects.len(), 1);

    objects
        .commands_mut()
        .damage(id, DmgEvent::new(1000.0, DmgType::Explosion));
    objects.flush(&mut env);
    objects.update(&mut env);

    assert!(!objects.contains(id));
    assert_eq!(sounds.borrow().count("asteroidCrack"), 1);

    let drawables = drawables.borrow();
    assert!(!drawables.objects.contains_key(&id));

    let mut covered = 0.0;
    let mut money = 0.0;
    for drawable in drawables.objects.values().flatten() {
        match drawable.texture.as_str() {
            "asteroid" => covered += drawable.size * drawable.size,
            "money100" => money += 100.0,
            "money10" => money += 10.0,
            "money1" => money += 1.0,
            other => panic!("unexpected drawable {}", other),
        }
    }
    assert!(covered >= size * size * SPLIT_COVERAGE);
    assert_eq!(money, loot_value(size));
    assert_eq!(drawables.objects.len(), objects.num_near());
}

#[test]
fn test_small_asteroid_only_drops_loot() {
    let mut env = SimEnv::new(SimConfigs::default(), Rc::new(GameData::builtin().unwrap()));
    let mut objects = ObjectManager::new(env.configs.object_manager);

    let id = objects.spawn(|id, physics| {
        Box::new(AsteroidBuilder::new(Point2::origin(), 0.125).build(physics, id))
    });
    objects.flush(&mut env);
    objects
        .commands_mut()
        .damage(id, DmgEvent::new(100.0, DmgType::Bullet));
    objects.flush(&mut env);
    objects.update(&mut env);

    assert!(!objects.contains(id));
    assert!(objects
        .near_ids()
        .all(|id| objects.get(id).unwrap().kind() == ObjKind::Loot));
    // Worth exactly one 100 item.
    assert_eq!(objects.num_near(), 1);
}

#[test]
fn test_fragments_do_not_crack_each_other() {
    let sounds = Rc::new(RefCell::new(SoundLog::default()));
    let mut env = SimEnv::new(SimConfigs::default(), Rc::new(GameData::builtin().unwrap()))
        .with_sinks(Box::new(sounds.clone()), Box::new(DrawableRegistry::default()));
    let mut objects = ObjectManager::new(env.configs.object_manager);

    let size = 2.0;
    let id = objects.spawn(|id, physics| {
        Box::new(AsteroidBuilder::new(Point2::origin(), size).build(physics, id))
    });
    objects.flush(&mut env);
    objects
        .commands_mut()
        .damage(id, DmgEvent::new(1000.0, DmgType::Explosion));
    objects.flush(&mut env);
    objects.update(&mut env);

    let fragments = |objects: &ObjectManager| -> Vec<(ObjId, f32)> {
        objects
            .near_ids()
            .filter_map(|id| {
                let obj = objects.get(id)?;
                if obj.kind() != ObjKind::Asteroid {
                    return None;
                }
                Some((id, obj.health()?.current))
            })
            .collect()
    };
    let loot = |objects: &ObjectManager| {
        objects
            .near_ids()
            .filter(|&id| objects.get(id).map_or(false, |obj| obj.kind() == ObjKind::Loot))
            .count()
    };
    let after_split = fragments(&objects);
    let loot_items = loot(&objects);
    assert!(after_split.len() >= 3);
    assert!(loot_items > 0);

    for _ in 0..120 {
        objects.update(&mut env);
    }

    assert_eq!(sounds.borrow().count("asteroidCrack"), 1);
    assert_eq!(fragments(&objects), after_split);
    assert_eq!(loot(&objects), loot_items);
}
