use glam::IVec2;
use std::collections::BTreeSet;
use std::str::FromStr;

/// Buttons and keys the camera reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Button {
    RightMouse,
    MiddleMouse,
    LeftShift,
    W,
    A,
    S,
    D,
}

impl Button {
    pub const ALL: [Button; 7] = [
        Button::RightMouse,
        Button::MiddleMouse,
        Button::LeftShift,
        Button::W,
        Button::A,
        Button::S,
        Button::D,
    ];
}

#[derive(Debug, thiserror::Error)]
#[error("unknown button {0:?} (expected one of rmb, mmb, shift, w, a, s, d)")]
pub struct ParseButtonError(String);

impl FromStr for Button {
    type Err = ParseButtonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rmb" | "right" => Ok(Button::RightMouse),
            "mmb" | "middle" => Ok(Button::MiddleMouse),
            "shift" | "lshift" => Ok(Button::LeftShift),
            "w" => Ok(Button::W),
            "a" => Ok(Button::A),
            "s" => Ok(Button::S),
            "d" => Ok(Button::D),
            _ => Err(ParseButtonError(s.to_string())),
        }
    }
}

/// Anything that can answer the per-frame input queries.
pub trait InputSource {
    /// Current pointer position in screen pixels.
    fn pointer_position(&self) -> IVec2;

    /// Whether `button` is held right now.
    fn is_held(&self, button: Button) -> bool;
}

/// Snapshot of pointer and held buttons, filled from window events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    pointer: IVec2,
    held: BTreeSet<Button>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pointer(&mut self, pointer: IVec2) {
        self.pointer = pointer;
    }

    pub fn press(&mut self, button: Button) {
        self.held.insert(button);
    }

    pub fn release(&mut self, button: Button) {
        self.held.remove(&button);
    }

    /// Press or release depending on `pressed`.
    pub fn set_held(&mut self, button: Button, pressed: bool) {
        if pressed {
            self.press(button);
        } else {
            self.release(button);
        }
    }

    /// Release everything, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    pub fn held(&self) -> impl Iterator<Item = Button> + '_ {
        self.held.iter().copied()
    }
}

impl InputSource for InputState {
    fn pointer_position(&self) -> IVec2 {
        self.pointer
    }

    fn is_held(&self, button: Button) -> bool {
        self.held.contains(&button)
    }
}
