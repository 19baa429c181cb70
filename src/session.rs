//! Screen flow, character creation and the fixed-step frame driver
//!
//! A [`Session`] owns the current run (if any) and everything around it:
//! which screen is up, the character-creation form, held keys and the
//! timestep accumulator. The shell forwards DOM events here and calls
//! [`Session::frame`] once per animation frame.

use std::collections::HashMap;

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::error::{Result, RpgError};
use crate::settings::Settings;
use crate::sim::{
    Archetype, GameEvent, GameState, Gender, InputTracker, RenderSnapshot, TickInput, tick,
};
use crate::ui::{Screen, UiSurface};

/// Key that closes the application
pub const EXIT_KEY: &str = "Escape";

/// Requests the session makes of its host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Close the application window
    Exit,
}

/// Character-creation form: one highlighted gender per class card
#[derive(Debug, Clone, Default)]
pub struct CreationForm {
    genders: HashMap<Archetype, Gender>,
}

impl CreationForm {
    /// Highlight `gender` on the card for `archetype`, replacing its sibling
    pub fn select_gender(&mut self, archetype: Archetype, gender: Gender) {
        self.genders.insert(archetype, gender);
    }

    pub fn selected_gender(&self, archetype: Archetype) -> Option<Gender> {
        self.genders.get(&archetype).copied()
    }

    /// Validate the card for `archetype`
    pub fn submit(&self, archetype: Archetype) -> Result<(Archetype, Gender)> {
        let gender = self
            .selected_gender(archetype)
            .ok_or(RpgError::MissingSelection)?;
        Ok((archetype, gender))
    }

    pub fn reset(&mut self) {
        self.genders.clear();
    }
}

/// Application-level state around the simulation
#[derive(Debug)]
pub struct Session {
    pub settings: Settings,
    screen: Screen,
    form: CreationForm,
    keys: InputTracker,
    game: Option<GameState>,
    accumulator: f32,
}

impl Session {
    /// Fails with `InvalidConfig` if the tuning could not host a run
    pub fn new(settings: Settings) -> Result<Self> {
        settings.sim.validate()?;
        Ok(Self {
            settings,
            screen: Screen::Title,
            form: CreationForm::default(),
            keys: InputTracker::new(),
            game: None,
            accumulator: 0.0,
        })
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn game(&self) -> Option<&GameState> {
        self.game.as_ref()
    }

    pub fn form(&self) -> &CreationForm {
        &self.form
    }

    pub fn keys(&self) -> &InputTracker {
        &self.keys
    }

    fn show(&mut self, screen: Screen, ui: &mut dyn UiSurface) {
        self.screen = screen;
        ui.show_screen(screen);
    }

    /// Title screen (initial, back buttons, after game over)
    pub fn show_title(&mut self, ui: &mut dyn UiSurface) {
        self.show(Screen::Title, ui);
    }

    /// "New Game" button
    pub fn new_game(&mut self, ui: &mut dyn UiSurface) {
        self.form.reset();
        self.show(Screen::CharacterCreation, ui);
    }

    pub fn open_options(&mut self, ui: &mut dyn UiSurface) {
        self.show(Screen::Options, ui);
    }

    /// Saved runs are not supported
    pub fn load_game(&mut self, ui: &mut dyn UiSurface) {
        log::info!("Load Game clicked - not available");
        ui.prompt("Laden-Funktion noch nicht implementiert.");
    }

    pub fn select_gender(&mut self, archetype: Archetype, gender: Gender) {
        self.form.select_gender(archetype, gender);
    }

    /// "Choose" button on a class card
    ///
    /// An unknown class name fails with `InvalidArchetype`. A card without a
    /// gender re-prompts the user and leaves the form open.
    pub fn choose_class(&mut self, class: &str, seed: u64, ui: &mut dyn UiSurface) -> Result<()> {
        let archetype: Archetype = class.parse()?;
        let (archetype, gender) = match self.form.submit(archetype) {
            Ok(choice) => choice,
            Err(e) => {
                ui.prompt("Bitte wählen Sie ein Geschlecht.");
                return Err(e);
            }
        };
        self.start_run(archetype, gender, seed, ui)
    }

    /// Create the character and enter the game screen
    pub fn start_run(
        &mut self,
        archetype: Archetype,
        gender: Gender,
        seed: u64,
        ui: &mut dyn UiSurface,
    ) -> Result<()> {
        let state = GameState::new(seed, self.settings.sim.clone(), archetype, gender)?;
        log::info!("Character created: {} {} (seed {})", gender, archetype, seed);
        ui.publish_stats(&state.stats());
        self.game = Some(state);
        self.keys.clear();
        self.accumulator = 0.0;
        self.show(Screen::Game, ui);
        Ok(())
    }

    pub fn key_down(&mut self, key: &str) -> Option<SessionCommand> {
        self.keys.set_key(key, true);
        (key == EXIT_KEY).then_some(SessionCommand::Exit)
    }

    pub fn key_up(&mut self, key: &str) {
        self.keys.set_key(key, false);
    }

    /// Release all keys (focus lost)
    pub fn release_keys(&mut self) {
        self.keys.clear();
    }

    /// Canvas size changed
    ///
    /// An empty or non-finite size is rejected and nothing changes.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<()> {
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            return Err(RpgError::InvalidConfig(format!(
                "canvas must be non-empty, got {width}x{height}"
            )));
        }
        if let Some(game) = self.game.as_mut() {
            game.resize(width, height)?;
        }
        self.settings.sim.canvas_width = width;
        self.settings.sim.canvas_height = height;
        Ok(())
    }

    /// Advance by wall-clock `dt` seconds in fixed `SIM_DT` steps
    ///
    /// Returns the number of ticks run.
    pub fn frame(&mut self, dt: f32, ui: &mut dyn UiSurface) -> u32 {
        if self.screen != Screen::Game {
            return 0;
        }
        let Some(game) = self.game.as_mut() else {
            return 0;
        };
        if game.is_game_over() {
            return 0;
        }

        self.accumulator += dt.clamp(0.0, 0.1);
        let input = TickInput::from_keys(&self.keys);

        let mut substeps = 0;
        let mut summary = None;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(game, &input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
            ui.publish_stats(&game.stats());

            for event in game.drain_events() {
                ui.game_event(&event);
                if let GameEvent::GameOver(s) = event {
                    summary = Some(s);
                }
            }
            if summary.is_some() {
                break;
            }
        }

        if let Some(summary) = summary {
            self.accumulator = 0.0;
            ui.game_over(&summary);
            self.show(Screen::Title, ui);
        }
        substeps
    }

    /// Current entities for the render adapter
    pub fn snapshot(&self) -> Option<RenderSnapshot> {
        self.game.as_ref().map(GameState::snapshot)
    }
}
