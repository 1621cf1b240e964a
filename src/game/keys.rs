//! Keyboard and mouse input handling for the game.
//!
//! This module defines the [`GameKey`] enum for abstracting game actions from physical keys,
//! and provides [`KeyState`] for tracking which actions are currently held. The per-frame
//! interpretation of held keys (movement, turning, menu navigation) lives with the screen
//! logic; this module only answers "is this action down right now".

use std::collections::HashSet;
use winit::keyboard;

/// Enum representing all possible in-game actions that can be triggered by keyboard or mouse input.
///
/// This abstraction allows the game logic to be decoupled from specific physical keys or buttons.
/// The same action can mean different things per screen: the turn keys adjust values on the
/// settings screen, and the menu keys are ignored during play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKey {
    /// Left mouse button.
    MouseButtonLeft,
    /// Move forward (W).
    MoveForward,
    /// Move backward (S).
    MoveBackward,
    /// Strafe left (A).
    StrafeLeft,
    /// Strafe right (D).
    StrafeRight,
    /// Turn the view left (Left Arrow); decrease on the settings screen.
    TurnLeft,
    /// Turn the view right (Right Arrow); increase on the settings screen.
    TurnRight,
    /// Sprint (Shift).
    Sprint,
    /// Menu selection up (Up Arrow).
    MenuUp,
    /// Menu selection down (Down Arrow).
    MenuDown,
    /// Activate the selected menu item (Enter).
    Confirm,
    /// Escape key (pause, back out of a screen).
    Escape,
    /// Restart the current run (R).
    Restart,
    /// Toggle the minimap overlay (M).
    ToggleMinimap,
}

/// Tracks the set of currently pressed game keys.
///
/// Use [`KeyState::press_key`] and [`KeyState::release_key`] to update the state, and
/// [`KeyState::is_pressed`] to query. Screen transitions call [`KeyState::clear`] so a key
/// held across the transition does not keep acting on the new screen.
#[derive(Debug, Default)]
pub struct KeyState {
    /// Set of currently pressed keys.
    pub pressed_keys: HashSet<GameKey>,
}

impl KeyState {
    /// Creates a new, empty [`KeyState`]
    pub fn new() -> Self {
        Self {
            pressed_keys: HashSet::new(),
        }
    }

    /// Marks a key as pressed.
    pub fn press_key(&mut self, key: GameKey) {
        self.pressed_keys.insert(key);
    }

    /// Marks a key as released.
    pub fn release_key(&mut self, key: GameKey) {
        self.pressed_keys.remove(&key);
    }

    /// Checks if a key is currently pressed.
    pub fn is_pressed(&self, key: GameKey) -> bool {
        self.pressed_keys.contains(&key)
    }

    /// Releases everything, used when the active screen changes.
    pub fn clear(&mut self) {
        self.pressed_keys.clear();
    }
}

macro_rules! match_char_key {
    ($c:expr, {
        $($key:literal => $variant:expr),* $(,)?
    }) => {{
        match $c.to_ascii_lowercase().as_str() {
            $($key => Some($variant),)*
            _ => None,
        }
    }};
}

macro_rules! match_named_key {
    ($k:expr, {
        $($key:ident => $variant:expr),* $(,)?
    }) => {{
        match $k {
            $(winit::keyboard::NamedKey::$key => Some($variant),)*
            _ => None,
        }
    }};
}

/// Converts a winit [`keyboard::Key`] to a [`GameKey`] if it matches a mapped action.
///
/// Supports both named keys (arrows, shift, enter, escape) and character keys
/// (WASD, R, M), matching characters case-insensitively.
///
/// # Arguments
/// * `key` - The winit key event to convert.
///
/// # Returns
/// * `Some(GameKey)` if the key maps to a game action.
/// * `None` otherwise.
pub fn winit_key_to_game_key(key: &keyboard::Key) -> Option<GameKey> {
    match key {
        keyboard::Key::Named(named) => match_named_key!(named, {
            ArrowUp => GameKey::MenuUp,
            ArrowDown => GameKey::MenuDown,
            ArrowLeft => GameKey::TurnLeft,
            ArrowRight => GameKey::TurnRight,
            Shift => GameKey::Sprint,
            Enter => GameKey::Confirm,
            Escape => GameKey::Escape,
        }),

        keyboard::Key::Character(c) => match_char_key!(c, {
            "w" => GameKey::MoveForward,
            "s" => GameKey::MoveBackward,
            "a" => GameKey::StrafeLeft,
            "d" => GameKey::StrafeRight,
            "r" => GameKey::Restart,
            "m" => GameKey::ToggleMinimap,
        }),

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::{Key, NamedKey, SmolStr};

    /// Character keys map regardless of case; unmapped characters do not.
    #[test]
    fn character_mapping_is_case_insensitive() {
        let lower = Key::Character(SmolStr::new("w"));
        let upper = Key::Character(SmolStr::new("W"));
        assert_eq!(winit_key_to_game_key(&lower), Some(GameKey::MoveForward));
        assert_eq!(winit_key_to_game_key(&upper), Some(GameKey::MoveForward));

        let unmapped = Key::Character(SmolStr::new("z"));
        assert_eq!(winit_key_to_game_key(&unmapped), None);
    }

    /// Named keys cover menus, turning, and the pause/confirm pair.
    #[test]
    fn named_key_mapping() {
        assert_eq!(
            winit_key_to_game_key(&Key::Named(NamedKey::ArrowLeft)),
            Some(GameKey::TurnLeft)
        );
        assert_eq!(
            winit_key_to_game_key(&Key::Named(NamedKey::ArrowUp)),
            Some(GameKey::MenuUp)
        );
        assert_eq!(
            winit_key_to_game_key(&Key::Named(NamedKey::Enter)),
            Some(GameKey::Confirm)
        );
        assert_eq!(
            winit_key_to_game_key(&Key::Named(NamedKey::Escape)),
            Some(GameKey::Escape)
        );
        assert_eq!(winit_key_to_game_key(&Key::Named(NamedKey::Tab)), None);
    }

    /// Press, release, and clear drive the pressed set.
    #[test]
    fn key_state_tracks_held_keys() {
        let mut keys = KeyState::new();
        assert!(!keys.is_pressed(GameKey::Sprint));

        keys.press_key(GameKey::Sprint);
        keys.press_key(GameKey::MoveForward);
        assert!(keys.is_pressed(GameKey::Sprint));
        assert!(keys.is_pressed(GameKey::MoveForward));

        keys.release_key(GameKey::Sprint);
        assert!(!keys.is_pressed(GameKey::Sprint));
        assert!(keys.is_pressed(GameKey::MoveForward));

        keys.clear();
        assert!(!keys.is_pressed(GameKey::MoveForward));
    }
}
