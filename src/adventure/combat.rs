//! Turn-based combat between the player and a single enemy.
//!
//! One `attack` is one exchange: the player strikes, and if the enemy is still
//! standing it strikes back. Victory transfers the enemy's drops; defeat only
//! ends the fight.

use log::{debug, info};

use crate::adventure::errors::AdventureError;
use crate::adventure::events::EventContext;
use crate::adventure::parser::{ActionDescriptor, Verb};
use crate::adventure::types::{Messages, PlayerState, Stats};

/// Outcome of one combat exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatOutcome {
    /// Both sides are still standing.
    Continue,
    Victory,
    Defeat,
    /// The action was not an attack or there was nothing to fight.
    Refused,
}

/// Damage dealt by the player: at least one point per hit.
pub fn player_damage(player: &Stats, enemy: &Stats) -> i32 {
    (player.attack - enemy.defense).max(1)
}

/// Damage dealt by the enemy: armour can absorb a hit completely.
pub fn enemy_damage(enemy: &Stats, player: &Stats) -> i32 {
    (enemy.attack - player.defense).max(0)
}

/// Look up `enemy_id`, snapshot it into the player state and announce it.
pub fn start_combat(
    enemy_id: &str,
    state: &mut PlayerState,
    ctx: &mut EventContext<'_>,
) -> Result<(), AdventureError> {
    let enemy = ctx.content.enemy(enemy_id)?;
    info!("Combat started against {}", enemy.id);
    let art = enemy.ascii.clone();
    let lines = [
        format!("Ein {} erscheint!", enemy.name),
        format!("Beschreibung: {}", enemy.description),
        format!("HP: {}", enemy.stats.hp),
    ];
    state.begin_combat(enemy);

    if let Some(art) = art {
        ctx.render_art(art.file())?;
    }
    ctx.output.extend(lines);
    ctx.persist(state)
}

/// Resolve one action while a fight may be running.
pub fn handle_combat_action(
    action: &ActionDescriptor,
    state: &mut PlayerState,
    messages: &Messages,
    ctx: &mut EventContext<'_>,
) -> Result<CombatOutcome, AdventureError> {
    if action.verb != Verb::Attack {
        ctx.say(messages.combat_in_progress.clone());
        return Ok(CombatOutcome::Refused);
    }
    let player_stats = state.stats;
    let Some(enemy) = state.enemy.as_mut() else {
        ctx.say(messages.combat_refusal.clone());
        return Ok(CombatOutcome::Refused);
    };

    let dealt = player_damage(&player_stats, &enemy.stats);
    enemy.stats.hp -= dealt;
    ctx.say(format!(
        "Du triffst {} für {} Schaden. ({} HP übrig)",
        enemy.name,
        dealt,
        enemy.stats.hp.max(0)
    ));

    if enemy.stats.hp <= 0 {
        let name = enemy.name.clone();
        let drops = enemy.drops.clone();
        ctx.say(format!("{} wurde besiegt!", name));
        for drop in drops {
            if state.add_item(&drop) {
                ctx.say(format!("Du erhältst {}.", drop));
            }
        }
        state.end_combat();
        ctx.persist(state)?;
        info!("Combat won against {}", name);
        return Ok(CombatOutcome::Victory);
    }

    let taken = enemy_damage(&enemy.stats, &player_stats);
    let enemy_name = enemy.name.clone();
    state.stats.hp -= taken;
    ctx.say(format!(
        "{} greift an und verursacht {} Schaden. ({} HP übrig)",
        enemy_name,
        taken,
        state.stats.hp.max(0)
    ));

    let outcome = if state.stats.hp <= 0 {
        ctx.say("Du wurdest besiegt. Der Kampf endet.");
        state.end_combat();
        info!("Combat lost against {}", enemy_name);
        CombatOutcome::Defeat
    } else {
        debug!(
            "Combat continues: player {} HP, {} {} HP",
            state.stats.hp,
            enemy_name,
            state.enemy.as_ref().map(|e| e.stats.hp).unwrap_or(0)
        );
        CombatOutcome::Continue
    };
    ctx.persist(state)?;
    Ok(outcome)
}
