// cockpit_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::animation::{AnimationDriver, PoleState};
pub use crate::controls::{AssetResolver, ControlSurface};
pub use crate::tracking::RoleResolver;

// --- Core Data Structures ---
pub use crate::messages::{ControlNotice, Contact, DevicePose, OverlapEvent, TrackerEvent};
pub use crate::types::{
    ControlId, HandRole, Rgba, SceneAnchor, SlotIndex, VolumeHandle, MAX_TRACKED_DEVICES,
};
pub use crate::error::{ConfigItem, ControlError};

// --- Runtime ---
pub use crate::animation::{AnimationSync, ClipPlayer};
pub use crate::overlap::{OverlapWorld, VolumeShape};
pub use crate::panel::Panel;
pub use crate::tracking::{DeviceTracker, HandProxy, HandStyle, Subscription};

// --- Concrete Controls ---
pub use crate::controls::{
    ControlSnapshot, CoverState, CoverSwitchConfig, LatchingCoverSwitch, LogicalChange,
    PanelAssets, SwipeSwitch, SwipeSwitchConfig, SwitchState,
};
