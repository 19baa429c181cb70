//! Narrow interface between the game and whatever displays it
//!
//! The web shell implements [`UiSurface`] over the DOM; [`LogSurface`] backs
//! the headless runner and tests.

use serde::{Deserialize, Serialize};

use crate::sim::{GameEvent, PlayerStats, RunSummary};

/// Top-level screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    Title,
    Options,
    CharacterCreation,
    Game,
}

impl Screen {
    /// DOM id of the screen container
    pub fn element_id(&self) -> &'static str {
        match self {
            Screen::Title => "title-screen",
            Screen::Options => "options-screen",
            Screen::CharacterCreation => "character-creation-screen",
            Screen::Game => "game-screen",
        }
    }

    /// CSS display value used when the screen is visible
    pub fn display(&self) -> &'static str {
        match self {
            Screen::Game => "block",
            _ => "flex",
        }
    }

    pub const ALL: [Screen; 4] = [
        Screen::Title,
        Screen::Options,
        Screen::CharacterCreation,
        Screen::Game,
    ];
}

/// Everything the game pushes out to the display layer
pub trait UiSurface {
    fn show_screen(&mut self, screen: Screen);
    /// Called after every collision pass
    fn publish_stats(&mut self, stats: &PlayerStats);
    fn game_over(&mut self, summary: &RunSummary);
    /// Every event a tick produced, in order, before any `game_over` call
    fn game_event(&mut self, _event: &GameEvent) {}
    /// Blocking notice for the user (missing selection, unavailable feature)
    fn prompt(&mut self, message: &str);
}

/// HUD lines: level, experience, health
pub fn hud_lines(stats: &PlayerStats) -> [String; 3] {
    [
        format!("Level: {}", stats.level),
        format!("Erfahrung: {}/{}", stats.experience, stats.experience_to_next),
        format!("Leben: {}/{}", stats.health, stats.max_health),
    ]
}

/// Surface that logs and remembers what it was told
#[derive(Debug, Default)]
pub struct LogSurface {
    pub screen: Option<Screen>,
    pub last_stats: Option<PlayerStats>,
    pub summaries: Vec<RunSummary>,
    pub prompts: Vec<String>,
    pub events: Vec<GameEvent>,
}

impl UiSurface for LogSurface {
    fn show_screen(&mut self, screen: Screen) {
        log::info!("Screen: {:?}", screen);
        self.screen = Some(screen);
    }

    fn publish_stats(&mut self, stats: &PlayerStats) {
        self.last_stats = Some(*stats);
    }

    fn game_over(&mut self, summary: &RunSummary) {
        match serde_json::to_string(summary) {
            Ok(json) => log::info!("Game Over! {}", json),
            Err(_) => log::info!("Game Over!"),
        }
        self.summaries.push(summary.clone());
    }

    fn game_event(&mut self, event: &GameEvent) {
        if let GameEvent::LevelUp { level } = event {
            log::info!("Level {}!", level);
        }
        self.events.push(event.clone());
    }

    fn prompt(&mut self, message: &str) {
        log::warn!("{}", message);
        self.prompts.push(message.to_string());
    }
}
