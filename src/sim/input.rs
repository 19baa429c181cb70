//! Held-key tracking
//!
//! Keys are identified by the DOM `KeyboardEvent.key` string.

use std::collections::HashMap;

/// Key bindings for each movement direction
pub const LEFT_KEYS: &[&str] = &["ArrowLeft", "a"];
pub const RIGHT_KEYS: &[&str] = &["ArrowRight", "d"];
pub const UP_KEYS: &[&str] = &["ArrowUp", "w"];
pub const DOWN_KEYS: &[&str] = &["ArrowDown", "s"];

/// Currently held keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputTracker {
    held: HashMap<String, bool>,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key-down (`true`) or key-up (`false`)
    pub fn set_key(&mut self, key: &str, held: bool) {
        if let Some(state) = self.held.get_mut(key) {
            *state = held;
        } else {
            self.held.insert(key.to_string(), held);
        }
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.held.get(key).copied().unwrap_or(false)
    }

    /// True if any of `keys` is held
    pub fn is_any_held(&self, keys: &[&str]) -> bool {
        keys.iter().any(|k| self.is_held(k))
    }

    /// Release everything (new run, window blur)
    pub fn clear(&mut self) {
        self.held.clear();
    }
}
