//! Action dispatcher.
//!
//! Two top-level states: exploring and in combat. Combat is entered only via
//! the `trigger_fight` effect and left when either side drops to zero HP.
//! While a fight runs every action goes to the combat resolver.

use log::debug;

use crate::adventure::combat;
use crate::adventure::errors::AdventureError;
use crate::adventure::events::{self, EventContext};
use crate::adventure::parser::{ActionDescriptor, Verb};
use crate::adventure::resolver::{normalize_phrase, resolve};
use crate::adventure::types::{PlayerState, World};

/// Static command summary shown by `hilfe` / `help`.
pub const HELP_LINES: &[&str] = &[
    "Adventure-Befehle:",
    "- start | continue | reset | exit",
    "- Bewegung: geh nord/ost/sued/west oder n/s/o/w",
    "- nimm <item>, untersuche <objekt>",
    "- benutze <objekt|item>",
    "- kombiniere <item> mit <anderes>",
    "- angriff (im Kampf)",
    "- inventar, hilfe",
];

/// Which top-level state the player is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Exploring,
    InCombat,
}

impl DispatchState {
    pub fn of(state: &PlayerState) -> Self {
        if state.in_combat {
            DispatchState::InCombat
        } else {
            DispatchState::Exploring
        }
    }
}

/// Render the current room and run its enter script.
///
/// `first_time` selects `on_first_enter` over `on_enter`.
pub fn show_room(
    state: &mut PlayerState,
    ctx: &mut EventContext<'_>,
    first_time: bool,
) -> Result<(), AdventureError> {
    let room = ctx.content.room(&state.location)?;
    if state.mark_visited(&room.id) {
        ctx.persist(state)?;
    }

    if let Some(art) = &room.ascii {
        ctx.render_art(art.file())?;
    }

    ctx.say(room.title.clone());
    ctx.say(room.description.clone());
    let items: Vec<String> = state
        .visible_items(&room)
        .map(|id| format!("\"{}\"", id))
        .collect();
    if !items.is_empty() {
        ctx.say(format!("Hier siehst du: {}", items.join(", ")));
    }
    if !room.objects.is_empty() {
        ctx.say(format!("Objekte: {}", room.objects.join(", ")));
    }
    if !room.exits.is_empty() {
        let exits: Vec<&str> = room.exits.keys().map(String::as_str).collect();
        ctx.say(format!("Ausgänge: {}", exits.join(", ")));
    }

    let script = if first_time {
        &room.on_first_enter
    } else {
        &room.on_enter
    };
    events::run(script, state, ctx)
}

/// Route one parsed action.
pub fn dispatch(
    action: &ActionDescriptor,
    state: &mut PlayerState,
    world: &World,
    ctx: &mut EventContext<'_>,
) -> Result<(), AdventureError> {
    debug!(
        "dispatch: state={:?} verb={} object={:?} target={:?} direction={:?}",
        DispatchState::of(state),
        action.verb,
        action.object,
        action.target,
        action.direction
    );

    if DispatchState::of(state) == DispatchState::InCombat {
        combat::handle_combat_action(action, state, &world.messages, ctx)?;
        return Ok(());
    }

    match &action.verb {
        Verb::Go => perform_move(action, state, world, ctx),
        Verb::Take => perform_take(action, state, world, ctx),
        Verb::Inspect | Verb::Look => perform_inspect(action, state, world, ctx),
        Verb::Use | Verb::Open | Verb::Close | Verb::Push | Verb::Pull => {
            perform_use(action, state, world, ctx)
        }
        Verb::Combine => perform_combine(action, state, world, ctx),
        Verb::Inventory => {
            describe_inventory(state, world, ctx);
            Ok(())
        }
        Verb::Help => {
            ctx.output.extend(HELP_LINES.iter().map(|line| line.to_string()));
            Ok(())
        }
        Verb::Attack => {
            combat::handle_combat_action(action, state, &world.messages, ctx)?;
            Ok(())
        }
        Verb::Other(_) => {
            ctx.say(world.messages.unknown_command.clone());
            Ok(())
        }
    }
}

fn perform_move(
    action: &ActionDescriptor,
    state: &mut PlayerState,
    world: &World,
    ctx: &mut EventContext<'_>,
) -> Result<(), AdventureError> {
    let room = ctx.content.room(&state.location)?;
    let direction = action
        .direction
        .map(|d| d.as_str().to_string())
        .or_else(|| action.object.clone())
        .unwrap_or_default();

    let Some(destination) = room.exits.get(&direction) else {
        ctx.say(world.messages.cannot_go.clone());
        return Ok(());
    };
    if state.is_exit_locked(&room.id, &direction) {
        ctx.say(world.messages.path_blocked.clone());
        return Ok(());
    }

    state.location = destination.clone();
    ctx.persist(state)?;
    let first_time = !state.has_visited(destination);
    show_room(state, ctx, first_time)
}

fn perform_take(
    action: &ActionDescriptor,
    state: &mut PlayerState,
    world: &World,
    ctx: &mut EventContext<'_>,
) -> Result<(), AdventureError> {
    let Some(phrase) = action.object.as_deref() else {
        ctx.say(world.messages.unknown_command.clone());
        return Ok(());
    };
    let room = ctx.content.room(&state.location)?;
    let visible: Vec<&String> = state.visible_items(&room).collect();
    let Some(item_id) = resolve(phrase, visible).map(str::to_string) else {
        ctx.say(world.messages.cannot_take.clone());
        return Ok(());
    };

    let item = ctx.content.item(&item_id)?;
    if !item.pickup {
        ctx.say(world.messages.not_pickable.clone());
        return Ok(());
    }

    state.taken_items.insert(item_id.clone());
    state.add_item(&item.id);
    ctx.say(format!("Du nimmst {}.", item.name));
    ctx.persist(state)
}

fn perform_inspect(
    action: &ActionDescriptor,
    state: &mut PlayerState,
    world: &World,
    ctx: &mut EventContext<'_>,
) -> Result<(), AdventureError> {
    let Some(phrase) = action.object.as_deref() else {
        return show_room(state, ctx, false);
    };
    let room = ctx.content.room(&state.location)?;

    if let Some(object_id) = resolve(phrase, &room.objects) {
        let object = ctx.content.object(object_id)?;
        ctx.say(format!("{}: {}", object.name, object.description));
        return events::run(&object.inspect, state, ctx);
    }

    let mut items: Vec<&String> = state.visible_items(&room).collect();
    items.extend(state.inventory.iter());
    let Some(item_id) = resolve(phrase, items).map(str::to_string) else {
        ctx.say(world.messages.nothing_special.clone());
        return Ok(());
    };
    let item = ctx.content.item(&item_id)?;
    ctx.say(format!("{}: {}", item.name, item.description));
    Ok(())
}

fn perform_use(
    action: &ActionDescriptor,
    state: &mut PlayerState,
    world: &World,
    ctx: &mut EventContext<'_>,
) -> Result<(), AdventureError> {
    let Some(phrase) = action.object.as_deref() else {
        ctx.say(world.messages.unknown_command.clone());
        return Ok(());
    };
    let room = ctx.content.room(&state.location)?;

    if let Some(object_id) = resolve(phrase, &room.objects) {
        let object = ctx.content.object(object_id)?;
        let script = if object.locked {
            &object.on_locked_use
        } else {
            &object.use_script
        };
        return events::run(script, state, ctx);
    }

    if let Some(item_id) = resolve(phrase, &state.inventory).map(str::to_string) {
        let item = ctx.content.item(&item_id)?;
        return events::run(&item.on_use, state, ctx);
    }

    ctx.say(world.messages.unknown_command.clone());
    Ok(())
}

fn perform_combine(
    action: &ActionDescriptor,
    state: &mut PlayerState,
    world: &World,
    ctx: &mut EventContext<'_>,
) -> Result<(), AdventureError> {
    let phrase = action.object.as_deref().unwrap_or_default();
    let Some(item_id) = resolve(phrase, &state.inventory).map(str::to_string) else {
        ctx.say(world.messages.missing_item.clone());
        return Ok(());
    };
    let item = ctx.content.item(&item_id)?;
    let target = normalize_phrase(action.target.as_deref().unwrap_or_default());
    match item.combine.get(&target) {
        Some(script) => events::run(script, state, ctx),
        None => {
            ctx.say(world.messages.cannot_combine.clone());
            Ok(())
        }
    }
}

fn describe_inventory(state: &PlayerState, world: &World, ctx: &mut EventContext<'_>) {
    if state.inventory.is_empty() {
        ctx.say(world.messages.inventory_empty.clone());
        return;
    }
    ctx.say("Inventar:");
    for id in &state.inventory {
        ctx.say(format!("- {}", id));
    }
}
