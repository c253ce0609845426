//! # Input Protocol
//!
//! This module defines the input state that the host application must pass to the Editor every frame.
//! It includes pointer position, button edges, keyboard modifiers, keys and a monotonic clock.
//!
//! Hosts that only know raw "is the button down" levels can feed them through a
//! [`PointerTracker`], which derives the press/hold/release edges and double-clicks.

use std::collections::HashMap;
use std::time::Duration;

use glam::{IVec2, UVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::interaction::EditorCommand;
use crate::model::ShapeKind;

/// State of keyboard modifiers (Shift, Ctrl, Alt, Meta).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifiersState {
    /// Shift key is pressed.
    pub shift: bool,
    /// Ctrl key is pressed.
    pub ctrl: bool,
    /// Alt / Option key is pressed.
    pub alt: bool,
    /// Meta / Command / Windows key is pressed.
    pub meta: bool,
}

/// Edges of one mouse button for the current tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonState {
    /// The button is down.
    pub down: bool,
    /// The button went down this tick.
    pub pressed: bool,
    /// The button is down and was already down last tick.
    pub held: bool,
    /// The button went up this tick.
    pub released: bool,
    /// This press followed the previous one within the double-click interval.
    pub double_clicked: bool,
}

impl ButtonState {
    pub const UP: Self = Self::edges(false, false);
    pub const PRESSED: Self = Self::edges(true, false);
    pub const HELD: Self = Self::edges(true, true);
    pub const RELEASED: Self = Self::edges(false, true);

    /// Derives the edges from this tick's and last tick's levels.
    pub const fn edges(down: bool, was_down: bool) -> Self {
        Self {
            down,
            pressed: down && !was_down,
            held: down && was_down,
            released: !down && was_down,
            double_clicked: false,
        }
    }
}

/// State of mouse buttons.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseButtons {
    pub left: ButtonState,
    pub middle: ButtonState,
    pub right: ButtonState,
}

/// Keyboard keys that the Editor cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Num1,
    Num2,
    X,
    Delete,
    Q,
    Escape,
}

/// The input state for a single frame.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputState {
    /// Pointer position in whole screen pixels.
    pub pointer: IVec2,
    /// State of mouse buttons.
    pub buttons: MouseButtons,
    /// State of keyboard modifiers.
    pub modifiers: ModifiersState,
    /// Keys pressed *this frame*.
    pub pressed_keys: Vec<Key>,
    /// Monotonic time since the host started.
    pub time: Duration,
    /// Size of the canvas in pixels. The id buffer follows it.
    pub screen_size: UVec2,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            pointer: IVec2::ZERO,
            buttons: MouseButtons::default(),
            modifiers: ModifiersState::default(),
            pressed_keys: Vec::new(),
            time: Duration::ZERO,
            screen_size: UVec2::new(1080, 720),
        }
    }
}

impl InputState {
    /// Pointer position as a point for geometry.
    pub fn pointer_pos(&self) -> Vec2 {
        self.pointer.as_vec2()
    }
}

/// Turns raw button levels into per-tick edges.
///
/// A press counts as a double-click when it comes less than the interval after the
/// last tick the left button was seen down.
#[derive(Clone, Debug)]
pub struct PointerTracker {
    double_click_interval: Duration,
    was_down: [bool; 3],
    last_left_down: Option<Duration>,
}

impl PointerTracker {
    pub fn new(double_click_interval: Duration) -> Self {
        Self {
            double_click_interval,
            was_down: [false; 3],
            last_left_down: None,
        }
    }

    /// Samples the raw levels for the tick at `now`.
    pub fn track(&mut self, left: bool, middle: bool, right: bool, now: Duration) -> MouseButtons {
        let [was_left, was_middle, was_right] = self.was_down;
        let mut buttons = MouseButtons {
            left: ButtonState::edges(left, was_left),
            middle: ButtonState::edges(middle, was_middle),
            right: ButtonState::edges(right, was_right),
        };

        if buttons.left.pressed {
            buttons.left.double_clicked = self
                .last_left_down
                .is_some_and(|last| now.saturating_sub(last) < self.double_click_interval);
        }
        if left {
            self.last_left_down = Some(now);
        }

        self.was_down = [left, middle, right];
        buttons
    }
}

/// Maps keys to editor commands.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Keymap {
    pub bindings: HashMap<Key, EditorCommand>,
}

impl Default for Keymap {
    fn default() -> Self {
        let bindings = HashMap::from([
            (Key::Num1, EditorCommand::Place(ShapeKind::Circle)),
            (Key::Num2, EditorCommand::Place(ShapeKind::Rectangle)),
            (Key::X, EditorCommand::DeleteActive),
            (Key::Delete, EditorCommand::DeleteActive),
            (Key::Q, EditorCommand::Quit),
            (Key::Escape, EditorCommand::Quit),
        ]);
        Self { bindings }
    }
}

impl Keymap {
    /// Commands bound to this frame's keys, in key order.
    pub fn commands(&self, input: &InputState) -> Vec<EditorCommand> {
        input
            .pressed_keys
            .iter()
            .filter_map(|key| self.bindings.get(key).copied())
            .collect()
    }
}
