//! Input collaborator: pointer position and held buttons, polled once per update.
//!
//! # Invariants
//! - The camera only sees `InputSource`, never raw window events.
//! - Pointer coordinates are whole screen pixels.

pub mod state;

pub use state::{Button, InputSource, InputState, ParseButtonError};
