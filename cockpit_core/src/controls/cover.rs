// cockpit_core/src/controls/cover.rs

//! A guarded toggle: a hinged cover that has to be lifted before the switch
//! underneath can be thrown, and that is pushed back down to close it.

use crate::animation::AnimationSync;
use crate::controls::setup::{
    clip_or_warn, collider_or_warn, default_playback_speed, playback_speed_or_warn,
};
use crate::controls::{
    unsupported_part, AssetResolver, ColliderPart, ControlSnapshot, ControlSurface, CoverState,
    LogicalChange, SwitchState,
};
use crate::error::ControlError;
use crate::messages::{ApproachSide, Contact, GestureEvent};
use crate::types::VolumeHandle;
use serde::Deserialize;
use tracing::debug;

/// Names of the clips and collider transforms a cover/switch is built from.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoverSwitchConfig {
    pub name: String,
    #[serde(default)]
    pub cover_animation: String,
    #[serde(default)]
    pub cover_collider: String,
    #[serde(default)]
    pub switch_animation: String,
    #[serde(default)]
    pub switch_collider: String,
    /// Speed multiplier applied to both clips.
    #[serde(default = "default_playback_speed")]
    pub playback_speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoverFsmState {
    #[default]
    IsClosed,
    IsOpening,
    IsOpen,
    IsClosing,
}

impl CoverFsmState {
    /// The transition table. Returns the next state and, when the transition
    /// starts a motion, the cover state to play towards. Every pair not in the
    /// table leaves the state unchanged.
    pub fn next(self, event: &GestureEvent, cover: CoverState) -> (Self, Option<CoverState>) {
        use CoverFsmState::*;
        match (self, event) {
            (IsClosed, GestureEvent::EnterFromSide(side)) if qualifies(side, cover) => {
                (IsOpening, Some(CoverState::Open))
            }
            (IsOpening, GestureEvent::AnimationSegmentFinished) => (IsOpen, None),
            (IsOpen, GestureEvent::EnterFromSide(side)) if qualifies(side, cover) => {
                (IsClosing, Some(CoverState::Closed))
            }
            (IsClosing, GestureEvent::AnimationSegmentFinished) => (IsClosed, None),
            (state, _) => (state, None),
        }
    }
}

/// A closed cover only lifts from its underside; an open one only closes
/// when pushed from the top of its collider.
fn qualifies(side: &ApproachSide, cover: CoverState) -> bool {
    match cover {
        CoverState::Closed => side.depth() > 0.0,
        CoverState::Open => side.height() > 0.0,
    }
}

#[derive(Debug)]
struct CoverPart {
    collider: VolumeHandle,
    sync: AnimationSync<CoverState>,
    fsm: CoverFsmState,
}

#[derive(Debug)]
struct SwitchPart {
    collider: VolumeHandle,
    sync: AnimationSync<SwitchState>,
}

/// The cover FSM plus the switch sub-control beneath it.
///
/// The switch only responds while the cover is logically open. Closing the
/// cover leaves the switch where it is: a switch thrown up stays up under a
/// closed cover.
#[derive(Debug)]
pub struct LatchingCoverSwitch {
    name: String,
    cover: Option<CoverPart>,
    switch: Option<SwitchPart>,
    changes: Vec<LogicalChange>,
    issues: Vec<ControlError>,
}

impl LatchingCoverSwitch {
    /// Resolves the configured names. Anything missing is logged and disables
    /// only the sub-control that needed it.
    pub fn from_config(config: &CoverSwitchConfig, resolver: &dyn AssetResolver) -> Self {
        let mut issues = Vec::new();
        let name = config.name.as_str();

        let cover_clip = clip_or_warn(resolver, name, &config.cover_animation, &mut issues);
        let cover_collider = collider_or_warn(resolver, name, &config.cover_collider, &mut issues);
        let switch_clip = clip_or_warn(resolver, name, &config.switch_animation, &mut issues);
        let switch_collider =
            collider_or_warn(resolver, name, &config.switch_collider, &mut issues);
        let speed = playback_speed_or_warn(name, config.playback_speed, &mut issues);

        let cover = match (cover_clip, cover_collider) {
            (Some(clip), Some(collider)) => Some(CoverPart {
                collider,
                sync: AnimationSync::new(clip, CoverState::Closed, speed),
                fsm: CoverFsmState::IsClosed,
            }),
            _ => None,
        };
        let switch = match (switch_clip, switch_collider) {
            (Some(clip), Some(collider)) => Some(SwitchPart {
                collider,
                sync: AnimationSync::new(clip, SwitchState::Down, speed),
            }),
            _ => None,
        };

        Self {
            name: config.name.clone(),
            cover,
            switch,
            changes: Vec::new(),
            issues,
        }
    }

    pub fn cover_state(&self) -> CoverState {
        self.cover
            .as_ref()
            .map_or(CoverState::Closed, |cover| cover.sync.state())
    }

    pub fn switch_state(&self) -> SwitchState {
        self.switch
            .as_ref()
            .map_or(SwitchState::Down, |switch| switch.sync.state())
    }

    pub fn fsm_state(&self) -> CoverFsmState {
        self.cover
            .as_ref()
            .map_or(CoverFsmState::IsClosed, |cover| cover.fsm)
    }

    pub fn cover_enabled(&self) -> bool {
        self.cover.is_some()
    }

    pub fn switch_enabled(&self) -> bool {
        self.switch.is_some()
    }

    fn feed_cover(&mut self, event: GestureEvent) {
        let Some(cover) = self.cover.as_mut() else {
            return;
        };
        let (next, motion) = cover.fsm.next(&event, cover.sync.state());
        if next != cover.fsm {
            debug!("'{}' cover {:?} -> {:?}", self.name, cover.fsm, next);
        }
        cover.fsm = next;
        if let Some(target) = motion {
            cover.sync.play_to(target);
            self.changes.push(LogicalChange::Cover(target));
        }
    }

    fn drive_switch(&mut self, target: SwitchState) {
        if self.cover_state() != CoverState::Open {
            return;
        }
        let Some(switch) = self.switch.as_mut() else {
            return;
        };
        let previous = switch.sync.state();
        switch.sync.play_to(target);
        if previous != target {
            self.changes.push(LogicalChange::Switch(target));
        }
    }
}

impl ControlSurface for LatchingCoverSwitch {
    fn name(&self) -> &str {
        &self.name
    }

    fn colliders(&self) -> Vec<(VolumeHandle, ColliderPart)> {
        let mut colliders = Vec::with_capacity(2);
        if let Some(cover) = &self.cover {
            colliders.push((cover.collider, ColliderPart::Cover));
        }
        if let Some(switch) = &self.switch {
            colliders.push((switch.collider, ColliderPart::Switch));
        }
        colliders
    }

    fn on_overlap_enter(
        &mut self,
        part: ColliderPart,
        contact: &Contact,
    ) -> Result<(), ControlError> {
        let side = ApproachSide::from_contact(contact);
        match part {
            ColliderPart::Cover => self.feed_cover(GestureEvent::EnterFromSide(side)),
            // Only a press coming down onto the top of the switch throws it.
            ColliderPart::Switch if side.depth() > 0.0 => self.drive_switch(SwitchState::Up),
            ColliderPart::Switch => {}
            other => return Err(unsupported_part(&self.name, other)),
        }
        Ok(())
    }

    fn on_overlap_exit(
        &mut self,
        part: ColliderPart,
        _contact: &Contact,
    ) -> Result<(), ControlError> {
        match part {
            ColliderPart::Cover => self.feed_cover(GestureEvent::Exit),
            ColliderPart::Switch => self.drive_switch(SwitchState::Down),
            other => return Err(unsupported_part(&self.name, other)),
        }
        Ok(())
    }

    fn tick(&mut self, dt: f32) {
        let cover_finished = self
            .cover
            .as_mut()
            .is_some_and(|cover| cover.sync.tick(dt));
        if cover_finished {
            self.feed_cover(GestureEvent::AnimationSegmentFinished);
        }
        if let Some(switch) = self.switch.as_mut() {
            switch.sync.tick(dt);
        }
    }

    fn snapshot(&self) -> ControlSnapshot {
        ControlSnapshot::CoverSwitch {
            cover: self.cover_state(),
            switch: self.switch_state(),
            fsm: self.fsm_state(),
        }
    }

    fn drain_changes(&mut self, out: &mut Vec<LogicalChange>) {
        out.append(&mut self.changes);
    }

    fn config_issues(&self) -> &[ControlError] {
        &self.issues
    }
}
