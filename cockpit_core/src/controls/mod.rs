// cockpit_core/src/controls/mod.rs

//! Physically-actuated controls and the capability interface the panel
//! dispatches overlap events through.

use crate::animation::{Pole, PoleState};
use crate::error::ControlError;
use crate::messages::Contact;
use crate::types::VolumeHandle;
use std::fmt::Debug;

pub mod cover;
pub mod setup;
pub mod swipe;

pub use cover::{CoverFsmState, CoverSwitchConfig, LatchingCoverSwitch};
pub use setup::{AssetResolver, PanelAssets};
pub use swipe::{SwipeFsmState, SwipeInput, SwipeSwitch, SwipeSwitchConfig, SwipeZone};

// =========================================================================
// == Logical States ==
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverState {
    Closed,
    Open,
}

impl PoleState for CoverState {
    fn pole(self) -> Pole {
        match self {
            CoverState::Closed => Pole::Rest,
            CoverState::Open => Pole::Active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchState {
    Down,
    Up,
}

impl PoleState for SwitchState {
    fn pole(self) -> Pole {
        match self {
            SwitchState::Down => Pole::Rest,
            SwitchState::Up => Pole::Active,
        }
    }
}

/// A change of a control's externally meaningful state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalChange {
    Cover(CoverState),
    Switch(SwitchState),
}

/// A point-in-time view of a control, for hosts and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSnapshot {
    CoverSwitch {
        cover: CoverState,
        switch: SwitchState,
        fsm: CoverFsmState,
    },
    Swipe {
        switch: SwitchState,
        fsm: SwipeFsmState,
    },
}

// =========================================================================
// == Capability Interface ==
// =========================================================================

/// Which part of a control a collider volume belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColliderPart {
    Cover,
    Switch,
    SwipeUp,
    SwipeDown,
}

/// The contract every control variant implements. The panel owns the
/// controls and calls into them in declaration order.
pub trait ControlSurface: Debug + Send + Sync {
    fn name(&self) -> &str;

    /// The collider volumes this control listens on, with the part each drives.
    fn colliders(&self) -> Vec<(VolumeHandle, ColliderPart)>;

    /// A hand proxy started overlapping one of this control's colliders.
    fn on_overlap_enter(&mut self, part: ColliderPart, contact: &Contact)
        -> Result<(), ControlError>;

    /// A hand proxy stopped overlapping one of this control's colliders.
    fn on_overlap_exit(&mut self, part: ColliderPart, contact: &Contact)
        -> Result<(), ControlError>;

    /// Per-frame update. Advances animations and feeds completions to the FSMs.
    fn tick(&mut self, dt: f32);

    fn snapshot(&self) -> ControlSnapshot;

    /// Moves the logical-state changes recorded since the last call into `out`.
    fn drain_changes(&mut self, out: &mut Vec<LogicalChange>);

    /// Setup problems that disabled parts of this control.
    fn config_issues(&self) -> &[ControlError];
}

pub(crate) fn unsupported_part(control: &str, part: ColliderPart) -> ControlError {
    ControlError::InvalidRole {
        control: control.to_string(),
        detail: format!("input from a {:?} collider", part),
    }
}
