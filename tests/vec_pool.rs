use sol_sim::*;

/// Forgets a pooled vector on every update.
struct Leaky;
impl SolObject for Leaky {
    fn kind(&self) -> ObjKind {
        ObjKind::Other
    }

    fn update(&mut self, ctx: &mut UpdateCtx) {
        std::mem::forget(ctx.vecs.obtain());
    }

    fn should_be_removed(&self, _env: &SimEnv) -> bool {
        false
    }

    fn on_remove(&mut self, _ctx: &mut UpdateCtx) {}

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

fn setup() -> (SimEnv, ObjectManager) {
    let env = SimEnv::new(SimConfigs::default(), Rc::new(GameData::builtin().unwrap()));
    let objects = ObjectManager::new(env.configs.object_manager);
    (env, objects)
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "pooled vectors not freed by Other")]
fn test_leak_names_object_kind() {
    let (mut env, mut objects) = setup();
    objects.spawn(|_, _| Box::new(Leaky));
    objects.flush(&mut env);
    objects.update(&mut env);
}

#[test]
fn test_busy_tick_is_balanced() {
    let (mut env, mut objects) = setup();
    let hull = env.data.hull("imperialSmall").unwrap();
    let ship = objects.spawn(|id, physics| {
        Box::new(ShipBuilder::new(hull, Point2::origin(), Faction::Laani).build(physics, id))
    });
    objects.spawn(|id, physics| {
        Box::new(StarPortBuilder::new(Point2::new(2.0, 0.0), Point2::new(50.0, 0.0)).build(physics, id))
    });
    let asteroid = objects.spawn(|id, physics| {
        Box::new(AsteroidBuilder::new(Point2::new(-3.0, 0.0), 1.0).build(physics, id))
    });
    objects.flush(&mut env);

    if let Some(ship) = objects.get_mut(ship).and_then(|obj| obj.as_ship_mut()) {
        ship.wish_linvel = WishLinVel::Thrust;
        ship.wish_angvel = WishAngVel::Aim(Point2::new(0.0, 5.0));
    }
    objects
        .commands_mut()
        .damage(asteroid, DmgEvent::new(100.0, DmgType::Energy));

    for _ in 0..30 {
        objects.update(&mut env);
        assert_eq!(objects.vec_pool().outstanding(), 0);
    }
    assert!(objects.vec_pool().high_water() > 0);
}
