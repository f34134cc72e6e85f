use sol_sim::object::star_port::PULL_RADIUS;
use sol_sim::*;

fn game() -> SolGame {
    let env = SimEnv::new(SimConfigs::default(), Rc::new(GameData::builtin().unwrap()));
    let chunks = ChunkManager::new(env.configs.chunks, Box::new(AsteroidFieldFiller::new(1, 0)));
    SolGame::with_chunks(env, chunks)
}

#[test]
fn test_ship_travels_while_followed() {
    let mut game = game();
    let destination = Point2::new(60.0, 0.0);
    game.spawn_star_port_pair(Point2::origin(), destination);
    let ship = game
        .spawn_ship("imperialSmall", Point2::new(1.5, 0.0), Faction::Laani)
        .unwrap();
    game.flush();
    game.follow(ship);

    let mut left = false;
    for _ in 0..600 {
        game.update();
        if !game.objects.contains(ship) {
            left = true;
            // Carried, the camera keeps following.
            assert_eq!(game.camera_target(), Some(ship));
            assert!(game.objects.position_of(ship).is_some());
        } else if left {
            break;
        }
    }

    assert!(left);
    let position = game.objects.get(ship).unwrap().position();
    assert!((position - destination).norm() > PULL_RADIUS);
    assert!(position.x > destination.x);
    assert!(game
        .objects
        .near_ids()
        .all(|id| game.objects.get(id).unwrap().kind() != ObjKind::Transcendent));
}

#[test]
fn test_ship_travels_while_far() {
    let mut game = game();
    let destination = Point2::new(60.0, 0.0);
    game.spawn_star_port_pair(Point2::origin(), destination);
    let ship = game
        .spawn_ship("imperialSmall", Point2::new(1.5, 0.0), Faction::Laani)
        .unwrap();
    game.flush();
    game.set_camera(Point2::origin());

    for _ in 0..600 {
        game.update();
    }

    assert!(!game.objects.contains(ship));
    let data = game.objects.far(ship).unwrap();
    assert_eq!(data.far.kind(), ObjKind::Ship);
    approx::assert_relative_eq!(
        data.far.position(),
        Point2::new(60.0 + PULL_RADIUS + 1.0, 0.0),
        epsilon = 1e-3
    );
    assert!(game
        .objects
        .far_objects()
        .iter()
        .all(|data| data.far.kind() != ObjKind::Transcendent));
}

#[test]
fn test_other_kinds_are_not_pulled() {
    let mut game = game();
    game.spawn_star_port_pair(Point2::origin(), Point2::new(60.0, 0.0));
    let asteroid = game.spawn_asteroid(Point2::new(1.5, 0.0), 0.5);
    game.flush();
    game.set_camera(Point2::origin());

    for _ in 0..60 {
        game.update();
    }

    let position = game.objects.get(asteroid).unwrap().position();
    approx::assert_relative_eq!(position, Point2::new(1.5, 0.0), epsilon = 1e-3);
}
