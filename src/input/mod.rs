//! Input handling module
//!
//! Raw input state fed by winit events, plus an accumulated mouse-look
//! direction for camera control.

mod state;

pub use state::Input;
