// src/simulation/core/events.rs
use bevy::prelude::Event;
// Import the pure data struct from the core library
use cockpit_core::messages::ControlNotice;

/// A logical-state change of a control, published once per change.
#[derive(Event, Debug, Clone)]
pub struct ControlNoticeEvent {
    pub control_name: String,
    pub notice: ControlNotice,
}
