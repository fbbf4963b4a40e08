//! Effect-script interpreter.
//!
//! Scripts run strictly in order: every effect, including the room render or
//! combat start it may trigger, finishes before the next one begins. Unknown
//! effect kinds are reported to the player and skipped.

use log::{debug, warn};

use crate::adventure::combat;
use crate::adventure::content::ContentRepository;
use crate::adventure::dispatcher;
use crate::adventure::errors::AdventureError;
use crate::adventure::storage::PlayerStateStore;
use crate::adventure::types::{Effect, PlayerState, Step};

/// Maximum nesting of `flag_if` blocks and transitions within one action.
pub const MAX_NESTED_DEPTH: usize = 32;

/// What a running script may touch besides the player state.
pub struct EventContext<'a> {
    pub content: &'a mut ContentRepository,
    pub store: &'a PlayerStateStore,
    pub output: &'a mut Vec<String>,
    depth: usize,
}

impl<'a> EventContext<'a> {
    pub fn new(
        content: &'a mut ContentRepository,
        store: &'a PlayerStateStore,
        output: &'a mut Vec<String>,
    ) -> Self {
        Self {
            content,
            store,
            output,
            depth: 0,
        }
    }

    /// Narrate one line.
    pub fn say(&mut self, line: impl Into<String>) {
        self.output.push(line.into());
    }

    pub fn persist(&self, state: &PlayerState) -> Result<(), AdventureError> {
        self.store.save(state)
    }

    /// Fetch an art asset and narrate it line by line.
    pub fn render_art(&mut self, file: &str) -> Result<(), AdventureError> {
        let art = self.content.art(file)?;
        self.output.extend(art.lines().map(str::to_string));
        Ok(())
    }

    fn enter(&mut self) -> bool {
        if self.depth >= MAX_NESTED_DEPTH {
            return false;
        }
        self.depth += 1;
        true
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

/// Execute `script` against `state`.
pub fn run(
    script: &[Step],
    state: &mut PlayerState,
    ctx: &mut EventContext<'_>,
) -> Result<(), AdventureError> {
    if script.is_empty() {
        return Ok(());
    }
    if !ctx.enter() {
        warn!("Effect script nesting exceeds {} levels", MAX_NESTED_DEPTH);
        ctx.say("Die Ereigniskette ist zu tief verschachtelt.");
        return Ok(());
    }
    let result = script
        .iter()
        .try_for_each(|step| run_step(step, state, ctx));
    ctx.leave();
    result
}

fn run_step(
    step: &Step,
    state: &mut PlayerState,
    ctx: &mut EventContext<'_>,
) -> Result<(), AdventureError> {
    let effect = match step {
        Step::Effect(effect) => effect,
        Step::Unrecognized(_) => {
            let kind = step.unrecognized_kind().unwrap_or("unbenannt");
            debug!("Skipping unknown effect kind {}", kind);
            ctx.say(format!("Unbekanntes Event: {}", kind));
            return Ok(());
        }
    };

    match effect {
        Effect::Message { text } => ctx.say(text.clone()),

        Effect::RenderArt { file, .. } => ctx.render_art(file)?,

        Effect::SetFlag { key, value } => {
            state.flags.insert(key.clone(), value.clone());
            ctx.persist(state)?;
        }

        Effect::BranchOnFlag {
            key,
            equals,
            then,
            otherwise,
        } => {
            let matches = state.flags.get(key) == Some(equals);
            debug!("flag_if {} == {} -> {}", key, equals, matches);
            let branch = if matches { then } else { otherwise };
            run(branch, state, ctx)?;
        }

        Effect::AddItem { id } => {
            if state.add_item(id) {
                ctx.say(format!("{} erhalten.", id));
            }
            ctx.persist(state)?;
        }

        Effect::RemoveItem { id } => {
            if state.remove_item(id) {
                ctx.say(format!("{} entfernt.", id));
            }
            ctx.persist(state)?;
        }

        Effect::UnlockExit { room, direction } => {
            state.set_exit_locked(room, direction, false);
            ctx.say(format!("Ausgang {} ist nun offen.", direction));
            ctx.persist(state)?;
        }

        Effect::LockExit { room, direction } => {
            state.set_exit_locked(room, direction, true);
            ctx.say(format!("Ausgang {} ist nun versperrt.", direction));
            ctx.persist(state)?;
        }

        Effect::Transition { to } => {
            state.location = to.clone();
            ctx.persist(state)?;
            if !ctx.enter() {
                warn!("Transition chain exceeds {} levels at {}", MAX_NESTED_DEPTH, to);
                ctx.say("Die Ereigniskette ist zu tief verschachtelt.");
                return Ok(());
            }
            let result = dispatcher::show_room(state, ctx, true);
            ctx.leave();
            result?;
        }

        Effect::StartCombat { enemy } => combat::start_combat(enemy, state, ctx)?,
    }
    Ok(())
}
