use sol_sim::interval::Interval;
use sol_sim::logger::Logger;
use sol_sim::*;

/// Headless session: a ship flying between two star ports through asteroid fields.
fn main() -> anyhow::Result<()> {
    let configs = match std::env::args().nth(1) {
        Some(path) => SimConfigs::load(&path)?,
        None => SimConfigs::default(),
    };

    if let Err(err) = Logger::init(configs.logger.level) {
        eprintln!("{}", err);
    }

    let data = Rc::new(GameData::builtin()?);
    let runner = configs.runner;
    let mut game = SolGame::new(SimEnv::new(configs, data));

    let player = game.spawn_ship("imperialSmall", Point2::new(0.0, 0.0), Faction::Laani)?;
    game.spawn_ship("pirateSmall", Point2::new(6.0, 2.0), Faction::Ehar)?;
    game.spawn_star_port_pair(Point2::new(10.0, 0.0), Point2::new(120.0, 40.0));
    game.flush();
    game.follow(player);

    if let Some(ship) = game.ship_mut(player) {
        ship.wish_linvel = WishLinVel::Thrust;
        ship.wish_angvel = WishAngVel::Aim(Point2::new(10.0, 0.0));
    }

    log::info!("Starting, {} ticks of {}ms", runner.ticks, runner.tick_ms);

    let mut interval = Interval::new(runner.tick_ms, runner.max_behind_ms);
    let mut tick = 0u64;
    loop {
        interval.step();
        game.update();
        tick += 1;

        if tick % 60 == 0 {
            log::info!(
                "t={:.1}s near={} far={} chunks={} camera={}",
                game.env.time,
                game.objects.num_near(),
                game.objects.num_far(),
                game.chunks.num_filled(),
                game.env.camera
            );
        }

        if tick % 30 == 0 && game.objects.contains(player) {
            if let Err(err) = game.fire(player, "bullet") {
                log::warn!("{:#}", err);
            }
        }

        if runner.ticks != 0 && tick >= runner.ticks {
            break;
        }
    }

    log::info!("Done after {} ticks", tick);
    Ok(())
}
