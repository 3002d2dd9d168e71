//! EnemyStrike → DamageDealt (для UI, звуков, логов)

use bevy::prelude::*;

use crate::ai::events::{DamageDealt, EnemyStrike};
use crate::components::{Dead, Health};

/// Система: отчёт о нанесённом уроне
///
/// Урон к этому моменту уже применён в tick_enemy_controllers
/// (через DamageReceiver цели). Удары без урона не репортим.
/// Первый удар, после которого Health == 0, помечает цель `Dead`.
pub fn apply_enemy_strikes(
    mut commands: Commands,
    mut strikes: EventReader<EnemyStrike>,
    mut damage_dealt_events: EventWriter<DamageDealt>,
    targets: Query<(&Health, Has<Dead>)>,
) {
    let mut died_now: Vec<Entity> = Vec::new();

    for strike in strikes.read() {
        if strike.damage == 0 {
            continue;
        }

        let Ok((health, already_dead)) = targets.get(strike.target) else {
            crate::log_warning(&format!(
                "AI: strike {:?} → {:?}: target has no Health",
                strike.attacker, strike.target
            ));
            continue;
        };

        let target_died =
            !health.is_alive() && !already_dead && !died_now.contains(&strike.target);
        damage_dealt_events.write(DamageDealt {
            attacker: strike.attacker,
            target: strike.target,
            damage: strike.damage,
            target_died,
        });

        if target_died {
            died_now.push(strike.target);
            commands.entity(strike.target).insert(Dead);
            crate::log_info(&format!(
                "AI: {:?} killed by {:?}",
                strike.target, strike.attacker
            ));
        }
    }
}
