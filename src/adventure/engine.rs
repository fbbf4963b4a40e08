//! Adventure session: owns the content cache, the player state and its store.
//!
//! Every public operation returns the narration lines it produced, in order.

use log::{debug, info};
use uuid::Uuid;

use crate::adventure::content::{AdventureManifest, ContentRepository};
use crate::adventure::dispatcher::{self, HELP_LINES};
use crate::adventure::errors::AdventureError;
use crate::adventure::events::EventContext;
use crate::adventure::parser;
use crate::adventure::storage::{KeyValueStore, PlayerStateStore};
use crate::adventure::types::{PlayerState, Stats, World};
use crate::logutil::escape_log;

/// One adventure, played by one identity.
pub struct Adventure {
    id: String,
    title: String,
    session_id: Uuid,
    content: ContentRepository,
    store: PlayerStateStore,
    state: PlayerState,
    default_stats: Stats,
    active: bool,
}

impl Adventure {
    pub fn new(
        id: &str,
        title: &str,
        content: ContentRepository,
        store: PlayerStateStore,
        default_stats: Stats,
    ) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            session_id: Uuid::new_v4(),
            content,
            store,
            state: PlayerState::default(),
            default_stats,
            active: false,
        }
    }

    /// Build a session for an adventure folder described by `manifest`.
    pub fn from_manifest(
        manifest: &AdventureManifest,
        backend: impl KeyValueStore + 'static,
        save_prefix: &str,
        identity: Option<&str>,
        default_stats: Stats,
    ) -> Self {
        let store = PlayerStateStore::new(backend, save_prefix, &manifest.id, identity);
        Self::new(
            &manifest.id,
            &manifest.title,
            manifest.repository(),
            store,
            default_stats,
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Random id tagging this session's log lines.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    /// The content cache of this session.
    pub fn content(&mut self) -> &mut ContentRepository {
        &mut self.content
    }

    fn fresh_state(&self, world: &World) -> PlayerState {
        PlayerState::new(
            &world.start_room,
            world.global_flags.clone(),
            self.default_stats,
        )
    }

    /// Run `f` with an event context over this session's content and store.
    fn with_context<F>(&mut self, output: &mut Vec<String>, f: F) -> Result<(), AdventureError>
    where
        F: FnOnce(&mut PlayerState, &mut EventContext<'_>) -> Result<(), AdventureError>,
    {
        let mut ctx = EventContext::new(&mut self.content, &self.store, output);
        f(&mut self.state, &mut ctx)
    }

    /// Begin a new run from the world's start room.
    pub fn start(&mut self) -> Result<Vec<String>, AdventureError> {
        let world = self.content.world()?;
        self.active = true;
        self.state = self.fresh_state(&world);
        self.store.save(&self.state)?;
        info!(
            "[{}] Adventure '{}' started ({})",
            self.session_id,
            self.id,
            self.store.key()
        );

        let mut output = vec!["Starte Adventure...".to_string()];
        self.with_context(&mut output, |state, ctx| {
            dispatcher::show_room(state, ctx, true)
        })?;
        Ok(output)
    }

    /// Resume from the saved record, or start over when there is none.
    pub fn continue_game(&mut self) -> Result<Vec<String>, AdventureError> {
        let world = self.content.world()?;
        self.active = true;
        if self.state.location.is_empty() {
            self.state = self.fresh_state(&world);
        }
        if !self.store.load(&mut self.state)? {
            info!("[{}] No save for {}; starting fresh", self.session_id, self.store.key());
            let mut output = vec!["Kein Spielstand gefunden. Starte neu.".to_string()];
            output.extend(self.start()?);
            return Ok(output);
        }
        info!(
            "[{}] Adventure '{}' resumed at {}",
            self.session_id, self.id, self.state.location
        );

        let mut output = vec!["Lade letzten Spielstand...".to_string()];
        let first_time = !self.state.has_visited(&self.state.location);
        self.with_context(&mut output, |state, ctx| {
            dispatcher::show_room(state, ctx, first_time)
        })?;
        Ok(output)
    }

    /// Delete the save and start over.
    pub fn reset(&mut self) -> Result<Vec<String>, AdventureError> {
        self.store.clear()?;
        info!("[{}] Save {} cleared", self.session_id, self.store.key());
        self.start()
    }

    /// Parse and execute one line of gameplay input.
    pub fn handle_input(&mut self, text: &str) -> Result<Vec<String>, AdventureError> {
        if !self.active {
            return Err(AdventureError::NoSession);
        }
        let world = self.content.world()?;
        let action = parser::parse(text);
        debug!(
            "[{}] input '{}' -> {:?}",
            self.session_id,
            escape_log(text),
            action.verb
        );

        let mut output = Vec::new();
        self.with_context(&mut output, |state, ctx| {
            dispatcher::dispatch(&action, state, &world, ctx)
        })?;
        Ok(output)
    }

    /// Leave the adventure. The save stays where it is.
    pub fn exit(&mut self) -> Vec<String> {
        self.active = false;
        info!("[{}] Adventure '{}' left", self.session_id, self.id);
        vec![
            "Du verlässt das Adventure und kehrst ins Darknetz-Terminal zurück.".to_string(),
            String::new(),
        ]
    }

    pub fn help() -> Vec<String> {
        HELP_LINES.iter().map(|line| line.to_string()).collect()
    }
}
