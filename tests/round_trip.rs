use sol_sim::*;

fn setup() -> (SimEnv, ObjectManager) {
    let env = SimEnv::new(SimConfigs::default(), Rc::new(GameData::builtin().unwrap()));
    let objects = ObjectManager::new(env.configs.object_manager);
    (env, objects)
}

/// Camera away then back. The object must come back near under the same id.
fn demote_and_promote(env: &mut SimEnv, objects: &mut ObjectManager, id: ObjId) {
    env.camera = Point2::new(500.0, 0.0);
    objects.update(env);
    assert!(!objects.contains(id));
    assert!(objects.far(id).is_some());
    assert_eq!(objects.physics().num_bodies(), 0);

    env.camera = Point2::origin();
    objects.reset_delays();
    objects.flush(env);
    objects.update(env);
    assert!(objects.contains(id));
    assert!(objects.far(id).is_none());
    assert!(objects.get(id).unwrap().has_body());
}

/// Checks the kinematics after a round trip.
/// The object moved for the one physics step taken while it was near.
fn assert_moving(obj: &dyn SolObject, start: Point2<f32>, velocity: Vector2<f32>, angvel: f32) {
    approx::assert_relative_eq!(obj.position(), start + velocity * DT, epsilon = 1e-3);
    approx::assert_relative_eq!(obj.velocity().unwrap(), velocity, epsilon = 1e-3);
    approx::assert_relative_eq!(obj.near_body().unwrap().angvel, angvel, epsilon = 1e-2);
}

#[test]
fn test_asteroid_near_far_near() {
    let (mut env, mut objects) = setup();
    let position = Point2::new(2.0, 3.0);
    let id = objects.spawn(|id, physics| {
        Box::new(
            AsteroidBuilder::new(position, 1.5)
                .with_angle(0.7)
                .with_velocity(Vector2::new(0.4, -0.3), 0.5)
                .with_life(12.0)
                .build(physics, id),
        )
    });
    objects.flush(&mut env);

    demote_and_promote(&mut env, &mut objects, id);

    let asteroid = objects.get(id).unwrap();
    assert_eq!(asteroid.kind(), ObjKind::Asteroid);
    assert_moving(asteroid, position, Vector2::new(0.4, -0.3), 0.5);
    approx::assert_relative_eq!(asteroid.radius(), 0.75);
    approx::assert_relative_eq!(asteroid.angle(), 0.7 + 0.5 * DT, epsilon = 1e-3);
    let health = asteroid.health().unwrap();
    approx::assert_relative_eq!(health.current, 12.0);
    approx::assert_relative_eq!(health.max, 30.0);
}

#[test]
fn test_ship_near_far_near() {
    let (mut env, mut objects) = setup();
    let hull = env.data.hull("pirateSmall").unwrap();
    let position = Point2::new(-1.0, 1.0);
    let builder = ShipBuilder::new(hull, position, Faction::Ehar)
        .with_velocity(Vector2::new(-0.5, 0.25), -0.3)
        .with_money(123.0)
        .with_life(30.0);
    let id = objects.spawn(|id, physics| Box::new(builder.build(physics, id)));
    objects.flush(&mut env);

    demote_and_promote(&mut env, &mut objects, id);

    let ship = objects.get_mut(id).unwrap();
    assert_eq!(ship.faction(), Some(Faction::Ehar));
    assert_moving(&*ship, position, Vector2::new(-0.5, 0.25), -0.3);
    approx::assert_relative_eq!(ship.health().unwrap().current, 30.0);
    let ship = ship.as_ship_mut().unwrap();
    assert_eq!(ship.hull().name, "pirateSmall");
    approx::assert_relative_eq!(ship.money(), 123.0);
}

#[test]
fn test_loot_near_far_near() {
    let (mut env, mut objects) = setup();
    let position = Point2::new(0.5, 0.5);
    let id = objects.spawn(|id, physics| {
        Box::new(
            LootBuilder::new(position, 10.0)
                .with_velocity(Vector2::new(0.0, 0.6), 1.0)
                .build(physics, id),
        )
    });
    objects.flush(&mut env);
    let radius = objects.get(id).unwrap().radius();

    demote_and_promote(&mut env, &mut objects, id);

    let loot = objects.get(id).unwrap();
    assert_eq!(loot.kind(), ObjKind::Loot);
    assert_moving(loot, position, Vector2::new(0.0, 0.6), 1.0);
    approx::assert_relative_eq!(loot.radius(), radius);
}

#[test]
fn test_star_port_near_far_near() {
    let (mut env, mut objects) = setup();
    let position = Point2::new(4.0, 0.0);
    let id = objects.spawn(|id, physics| {
        Box::new(StarPortBuilder::new(position, Point2::new(80.0, 0.0)).build(physics, id))
    });
    objects.flush(&mut env);

    demote_and_promote(&mut env, &mut objects, id);

    let port = objects.get(id).unwrap();
    assert_eq!(port.kind(), ObjKind::StarPort);
    assert_eq!(port.position(), position);
    assert!(port.velocity().is_none());
}

#[test]
fn test_far_near_far() {
    let (mut env, mut objects) = setup();
    let position = Point2::new(3.0, -2.0);
    let far = AsteroidBuilder::new(position, 0.8).with_life(5.0).build_far();
    approx::assert_relative_eq!(far.size(), 0.8);
    let id = objects.add_far_now(Box::new(far));

    objects.update(&mut env);
    assert!(objects.contains(id));
    assert_eq!(objects.physics().num_bodies(), 1);

    env.camera = Point2::new(500.0, 0.0);
    objects.update(&mut env);
    assert!(!objects.contains(id));
    assert_eq!(objects.physics().num_bodies(), 0);

    let data = objects.far(id).unwrap();
    assert_eq!(data.far.kind(), ObjKind::Asteroid);
    approx::assert_relative_eq!(data.far.position(), position, epsilon = 1e-3);
    approx::assert_relative_eq!(data.far.radius(), 0.4);
}

#[test]
fn test_projectile_dropped_when_out_of_range() {
    let (mut env, mut objects) = setup();
    let config = env.data.projectile("rocket").unwrap();
    let id = objects.spawn(|id, physics| {
        Box::new(ProjectileBuilder::new(config, Point2::origin(), 0.0).build(physics, id))
    });
    objects.flush(&mut env);

    env.camera = Point2::new(500.0, 0.0);
    objects.update(&mut env);
    assert!(!objects.contains(id));
    assert!(objects.far(id).is_none());
    assert_eq!(objects.physics().num_bodies(), 0);
}
