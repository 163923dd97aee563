// cockpit_core/src/controls/swipe.rs

//! A toggle switch flipped by swiping through two stacked collider zones.
//!
//! Entering the up-zone and then the down-zone flips the switch down; the
//! reverse sequence flips it up. Backing out of the starting zone before
//! reaching the other one cancels the swipe.

use crate::animation::AnimationSync;
use crate::controls::setup::{
    clip_or_warn, collider_or_warn, default_playback_speed, playback_speed_or_warn,
};
use crate::controls::{
    unsupported_part, AssetResolver, ColliderPart, ControlSnapshot, ControlSurface,
    LogicalChange, SwitchState,
};
use crate::error::ControlError;
use crate::messages::Contact;
use crate::types::VolumeHandle;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SwipeSwitchConfig {
    pub name: String,
    #[serde(default)]
    pub animation: String,
    /// Zone above the switch centre.
    #[serde(default)]
    pub up_collider: String,
    /// Zone below the switch centre.
    #[serde(default)]
    pub down_collider: String,
    #[serde(default = "default_playback_speed")]
    pub playback_speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwipeZone {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeInput {
    Enter(SwipeZone),
    Exit(SwipeZone),
    AnimationSegmentFinished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwipeFsmState {
    IsUp,
    IsWaitingForDown,
    #[default]
    IsDown,
    IsWaitingForUp,
}

impl SwipeFsmState {
    /// The transition table. Returns the next state and the switch state to
    /// play towards, if the transition completes a swipe.
    pub fn next(self, input: SwipeInput) -> (Self, Option<SwitchState>) {
        use SwipeFsmState::*;
        use SwipeInput::{Enter, Exit};
        match (self, input) {
            (IsUp, Enter(SwipeZone::Up)) => (IsWaitingForDown, None),
            (IsWaitingForDown, Exit(SwipeZone::Up)) => (IsUp, None),
            (IsWaitingForDown, Enter(SwipeZone::Down)) => (IsDown, Some(SwitchState::Down)),
            (IsDown, Enter(SwipeZone::Down)) => (IsWaitingForUp, None),
            (IsWaitingForUp, Exit(SwipeZone::Down)) => (IsDown, None),
            (IsWaitingForUp, Enter(SwipeZone::Up)) => (IsUp, Some(SwitchState::Up)),
            (state, _) => (state, None),
        }
    }
}

#[derive(Debug)]
struct SwipeParts {
    up_collider: VolumeHandle,
    down_collider: VolumeHandle,
    sync: AnimationSync<SwitchState>,
}

#[derive(Debug)]
pub struct SwipeSwitch {
    name: String,
    parts: Option<SwipeParts>,
    fsm: SwipeFsmState,
    changes: Vec<LogicalChange>,
    issues: Vec<ControlError>,
}

impl SwipeSwitch {
    /// The gesture needs the clip and both zones; if any is missing the switch
    /// is disabled and stays down.
    pub fn from_config(config: &SwipeSwitchConfig, resolver: &dyn AssetResolver) -> Self {
        let mut issues = Vec::new();
        let name = config.name.as_str();

        let clip = clip_or_warn(resolver, name, &config.animation, &mut issues);
        let up = collider_or_warn(resolver, name, &config.up_collider, &mut issues);
        let down = collider_or_warn(resolver, name, &config.down_collider, &mut issues);
        let speed = playback_speed_or_warn(name, config.playback_speed, &mut issues);

        let parts = match (clip, up, down) {
            (Some(clip), Some(up_collider), Some(down_collider)) => Some(SwipeParts {
                up_collider,
                down_collider,
                sync: AnimationSync::new(clip, SwitchState::Down, speed),
            }),
            _ => None,
        };

        Self {
            name: config.name.clone(),
            parts,
            fsm: SwipeFsmState::IsDown,
            changes: Vec::new(),
            issues,
        }
    }

    pub fn switch_state(&self) -> SwitchState {
        self.parts
            .as_ref()
            .map_or(SwitchState::Down, |parts| parts.sync.state())
    }

    pub fn fsm_state(&self) -> SwipeFsmState {
        self.fsm
    }

    pub fn is_enabled(&self) -> bool {
        self.parts.is_some()
    }

    fn feed(&mut self, input: SwipeInput) {
        let Some(parts) = self.parts.as_mut() else {
            return;
        };
        let (next, motion) = self.fsm.next(input);
        if next != self.fsm {
            debug!("'{}' swipe {:?} -> {:?}", self.name, self.fsm, next);
        }
        self.fsm = next;
        if let Some(target) = motion {
            parts.sync.play_to(target);
            self.changes.push(LogicalChange::Switch(target));
        }
    }

    fn zone(&self, part: ColliderPart) -> Result<SwipeZone, ControlError> {
        match part {
            ColliderPart::SwipeUp => Ok(SwipeZone::Up),
            ColliderPart::SwipeDown => Ok(SwipeZone::Down),
            other => Err(unsupported_part(&self.name, other)),
        }
    }
}

impl ControlSurface for SwipeSwitch {
    fn name(&self) -> &str {
        &self.name
    }

    fn colliders(&self) -> Vec<(VolumeHandle, ColliderPart)> {
        match &self.parts {
            Some(parts) => vec![
                (parts.up_collider, ColliderPart::SwipeUp),
                (parts.down_collider, ColliderPart::SwipeDown),
            ],
            None => Vec::new(),
        }
    }

    fn on_overlap_enter(
        &mut self,
        part: ColliderPart,
        _contact: &Contact,
    ) -> Result<(), ControlError> {
        let zone = self.zone(part)?;
        self.feed(SwipeInput::Enter(zone));
        Ok(())
    }

    fn on_overlap_exit(
        &mut self,
        part: ColliderPart,
        _contact: &Contact,
    ) -> Result<(), ControlError> {
        let zone = self.zone(part)?;
        self.feed(SwipeInput::Exit(zone));
        Ok(())
    }

    fn tick(&mut self, dt: f32) {
        let finished = self
            .parts
            .as_mut()
            .is_some_and(|parts| parts.sync.tick(dt));
        if finished {
            self.feed(SwipeInput::AnimationSegmentFinished);
        }
    }

    fn snapshot(&self) -> ControlSnapshot {
        ControlSnapshot::Swipe {
            switch: self.switch_state(),
            fsm: self.fsm,
        }
    }

    fn drain_changes(&mut self, out: &mut Vec<LogicalChange>) {
        out.append(&mut self.changes);
    }

    fn config_issues(&self) -> &[ControlError] {
        &self.issues
    }
}
