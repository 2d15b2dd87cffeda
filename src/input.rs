//! Keyboard mapping for the ship.
//!
//! Keys arrive either as winit key codes (native, canvas focus on the web) or
//! as DOM `keyCode`s; both collapse onto [`Key`]. The controller turns key
//! transitions into [`Command`]s which the session applies.

use winit::keyboard::KeyCode;

use crate::config::{MovementConfig, MovementMode};

pub const KEY_SPACE: u32 = 32;
pub const KEY_LEFT: u32 = 37;
pub const KEY_RIGHT: u32 = 39;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Space,
    Other(u32),
}

impl Key {
    pub fn from_code(code: u32) -> Self {
        match code {
            KEY_LEFT => Key::Left,
            KEY_RIGHT => Key::Right,
            KEY_SPACE => Key::Space,
            other => Key::Other(other),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            Key::Left => KEY_LEFT,
            Key::Right => KEY_RIGHT,
            Key::Space => KEY_SPACE,
            Key::Other(code) => code,
        }
    }
}

impl From<KeyCode> for Key {
    fn from(code: KeyCode) -> Self {
        match code {
            KeyCode::ArrowLeft => Key::Left,
            KeyCode::ArrowRight => Key::Right,
            KeyCode::Space => Key::Space,
            // Unhandled physical keys carry no DOM code.
            _ => Key::Other(0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Move along X right away.
    Nudge { dx: f32 },
    /// Roll to `roll` while sliding by `dx`, both starting together.
    Bank { roll: f32, dx: f32 },
    /// Roll back to level.
    Level,
    ToggleWings,
}

#[derive(Debug, Clone, Copy)]
pub struct InputController {
    mode: MovementMode,
    step: f32,
    bank_angle: f32,
}

impl InputController {
    pub fn new(config: &MovementConfig) -> Self {
        Self {
            mode: config.mode,
            step: config.step,
            bank_angle: config.bank_angle,
        }
    }

    pub fn key_down(&self, key: Key) -> Option<Command> {
        let direction = match key {
            Key::Left => -1.0,
            Key::Right => 1.0,
            Key::Space => return Some(Command::ToggleWings),
            Key::Other(_) => return None,
        };
        Some(match self.mode {
            MovementMode::Step => Command::Nudge {
                dx: direction * self.step,
            },
            MovementMode::Bank => Command::Bank {
                roll: direction * self.bank_angle,
                dx: direction * self.step,
            },
        })
    }

    pub fn key_up(&self, key: Key) -> Option<Command> {
        match (self.mode, key) {
            (MovementMode::Bank, Key::Left | Key::Right) => Some(Command::Level),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_dom_and_winit_codes_to_same_keys() {
        assert_eq!(Key::from_code(37), Key::from(KeyCode::ArrowLeft));
        assert_eq!(Key::from_code(39), Key::from(KeyCode::ArrowRight));
        assert_eq!(Key::from_code(32), Key::from(KeyCode::Space));
        assert_eq!(Key::from_code(65), Key::Other(65));
        assert_eq!(Key::Left.code(), 37);
    }
}
