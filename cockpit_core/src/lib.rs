// cockpit_core/src/lib.rs

// Public modules of the cockpit controls engine.
pub mod animation;
pub mod controls;
pub mod error;
pub mod messages;
pub mod overlap;
pub mod panel;
pub mod prelude;
pub mod tracking;
pub mod types;
