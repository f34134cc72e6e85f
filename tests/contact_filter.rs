use sol_sim::*;

fn game() -> SolGame {
    let env = SimEnv::new(SimConfigs::default(), Rc::new(GameData::builtin().unwrap()));
    let chunks = ChunkManager::new(env.configs.chunks, Box::new(AsteroidFieldFiller::new(3, 0)));
    SolGame::with_chunks(env, chunks)
}

fn life(game: &SolGame, id: ObjId) -> f32 {
    game.objects.get(id).unwrap().health().unwrap().current
}

#[test]
fn test_user_data_rules() {
    let ship = |id, faction| UserData::new(ObjId(id), ObjKind::Ship).with_faction(Some(faction));
    let projectile = |id, owner, faction| {
        UserData::new(ObjId(id), ObjKind::Projectile)
            .with_owner(Some(ObjId(owner)))
            .with_faction(Some(faction))
    };

    let bullet = projectile(10, 1, Faction::Laani);
    let rocket = projectile(11, 2, Faction::Ehar).with_flags(true, false);
    let loot = UserData::new(ObjId(20), ObjKind::Loot);
    let asteroid = UserData::new(ObjId(21), ObjKind::Asteroid);

    assert!(!ContactFilter::should_collide(bullet, ship(1, Faction::Laani)));
    assert!(!ContactFilter::should_collide(ship(5, Faction::Laani), bullet));
    assert!(ContactFilter::should_collide(ship(6, Faction::Ehar), bullet));
    assert!(!ContactFilter::should_collide(bullet, loot));
    assert!(ContactFilter::should_collide(bullet, asteroid));
    assert!(ContactFilter::should_collide(bullet, rocket));
    assert!(!ContactFilter::should_collide(bullet, projectile(12, 3, Faction::Ehar)));
    assert!(ContactFilter::should_collide(loot, asteroid));
}

fn fire_through_ally(projectile: &str) -> (SolGame, ObjId, ObjId, ObjId) {
    let mut game = game();
    let shooter = game
        .spawn_ship("imperialSmall", Point2::origin(), Faction::Laani)
        .unwrap();
    let ally = game
        .spawn_ship("imperialSmall", Point2::new(1.5, 0.0), Faction::Laani)
        .unwrap();
    let enemy = game
        .spawn_ship("pirateSmall", Point2::new(3.0, 0.0), Faction::Ehar)
        .unwrap();
    game.flush();
    game.set_camera(Point2::origin());
    game.update();

    game.fire(shooter, projectile).unwrap();
    for _ in 0..90 {
        game.update();
    }
    (game, shooter, ally, enemy)
}

#[test]
fn test_bullet_hits_enemy_only() {
    let (game, shooter, ally, enemy) = fire_through_ally("bullet");

    approx::assert_relative_eq!(life(&game, enemy), 45.0 - 6.0);
    approx::assert_relative_eq!(life(&game, ally), 60.0);
    approx::assert_relative_eq!(life(&game, shooter), 60.0);
    assert!(game
        .objects
        .near_ids()
        .all(|id| game.objects.get(id).unwrap().kind() != ObjKind::Projectile));
}

#[test]
fn test_rocket_hits_enemy_only() {
    let (game, shooter, ally, enemy) = fire_through_ally("rocket");

    assert!(life(&game, enemy) <= 45.0 - 40.0);
    approx::assert_relative_eq!(life(&game, ally), 60.0);
    approx::assert_relative_eq!(life(&game, shooter), 60.0);
    assert!(game
        .objects
        .near_ids()
        .all(|id| game.objects.get(id).unwrap().kind() != ObjKind::Projectile));
}

#[test]
fn test_fire_needs_near_shooter() {
    let mut game = game();
    let err = game.fire(ObjId(42), "bullet").unwrap_err();
    assert!(err.to_string().contains("not near"));

    let shooter = game
        .spawn_ship("imperialSmall", Point2::origin(), Faction::Laani)
        .unwrap();
    game.flush();
    let err = game.fire(shooter, "railgun").unwrap_err();
    assert!(err.to_string().contains("railgun"));
}
