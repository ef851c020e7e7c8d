//! Application-level orchestration.
//!
//! The controller owns the screen state machine, the ephemeral results list,
//! and the saved-logo store; presentation layers send commands in and mirror
//! state from the events the controller emits.

mod controller;

pub use controller::{run_controller, AppCommand, AppController, AppEvent};
