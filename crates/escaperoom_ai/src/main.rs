//! Headless прогон encounter'а
//!
//! `escaperoom_ai [encounter.toml]` — без аргумента берётся встроенный ростер
//! (по одному врагу каждого вида, цель идёт через комнату).

use escaperoom_ai::config::{EnemySpawn, TargetSpawn};
use escaperoom_ai::{
    create_headless_app, log_error, log_info, run_fixed_ticks, set_log_level, spawn_encounter,
    EncounterConfig, EncounterLog, EncounterLogPlugin, EnemyConfig, EnemyController, EnemyKind,
    Health, LogLevel,
};

fn default_encounter() -> EncounterConfig {
    let enemy = |kind, position: [f32; 3], patrol: Vec<[f32; 3]>| EnemySpawn {
        kind,
        position,
        yaw_degrees: 0.0,
        patrol,
        config: EnemyConfig::default(),
    };

    EncounterConfig {
        target: TargetSpawn {
            position: [0.0, 0.0, -12.0],
            path: vec![[0.0, 0.0, -4.0], [6.0, 0.0, -4.0], [6.0, 0.0, 4.0]],
            ..Default::default()
        },
        enemies: vec![
            enemy(
                EnemyKind::Humanoid,
                [-4.0, 0.0, 0.0],
                vec![[-4.0, 0.0, -6.0], [-4.0, 0.0, 2.0]],
            ),
            enemy(
                EnemyKind::Robot,
                [0.0, 0.0, 0.0],
                vec![[3.0, 0.0, 0.0], [-3.0, 0.0, 0.0]],
            ),
            enemy(EnemyKind::Spider, [6.0, 0.0, 2.0], Vec::new()),
        ],
        ..Default::default()
    }
}

fn main() {
    let encounter = match std::env::args().nth(1) {
        Some(path) => match EncounterConfig::load(&path) {
            Ok(encounter) => encounter,
            Err(err) => {
                // logger ещё не поднят
                eprintln!("{}", err);
                std::process::exit(1);
            }
        },
        None => default_encounter(),
    };

    let mut app = create_headless_app(encounter.seed);
    app.add_plugins(EncounterLogPlugin);
    set_log_level(LogLevel::Info);

    log_info(&format!(
        "Starting EscapeRoom headless encounter (seed: {}, ticks: {})",
        encounter.seed, encounter.ticks
    ));

    let entities = spawn_encounter(app.world_mut(), &encounter);
    run_fixed_ticks(&mut app, encounter.ticks);

    let world = app.world_mut();
    for enemy in &entities.enemies {
        match world.get::<EnemyController>(*enemy) {
            Some(controller) => log_info(&format!(
                "{:?} {:?}: final state {:?}",
                enemy,
                controller.kind(),
                controller.state()
            )),
            None => log_error(&format!("{:?}: controller missing after run", enemy)),
        }
    }

    let log = world.resource::<EncounterLog>();
    let health = world
        .get::<Health>(entities.target)
        .map(|health| health.current)
        .unwrap_or(0);
    log_info(&format!(
        "Encounter complete: {} transitions, {} effects, {} damage dealt, target health {}",
        log.transitions.len(),
        log.effects.len(),
        log.total_damage(),
        health
    ));
}
