// cockpit_core/src/animation/mod.rs

//! Playback of a control's animation clip and its synchronisation with the
//! control's logical state.

use std::fmt::Debug;

mod clip;
mod sync;

pub use clip::ClipPlayer;
pub use sync::AnimationSync;

// --- ANIMATION DRIVER TRAIT ---
/// A played clip, seen through its normalized time cursor and playback speed.
///
/// The host engine usually owns the clip and advances it on its own, in which
/// case `advance` stays a no-op. `ClipPlayer` is the in-crate implementation
/// that advances itself.
///
/// A clip that runs past either end stops playing and its cursor wraps to `0.0`.
pub trait AnimationDriver: Debug + Send + Sync {
    /// Identifier of the clip this driver plays.
    fn clip_id(&self) -> &str;

    fn play(&mut self);

    fn stop(&mut self);

    fn is_playing(&self) -> bool;

    /// The cursor in `[0, 1]`.
    fn normalized_time(&self) -> f32;

    fn set_normalized_time(&mut self, time: f32);

    /// Signed playback speed. Zero holds the current frame.
    fn speed(&self) -> f32;

    fn set_speed(&mut self, speed: f32);

    /// Moves the cursor forward by `dt` seconds of wall time.
    fn advance(&mut self, dt: f32) {
        let _ = dt;
    }
}

/// The two ends of a control's clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pole {
    /// Rest / closed / down. The start of the clip.
    Rest,
    /// Active / open / up. The end of the clip.
    Active,
}

impl Pole {
    pub fn normalized_time(self) -> f32 {
        match self {
            Pole::Rest => 0.0,
            Pole::Active => 1.0,
        }
    }
}

/// A two-valued logical state that maps onto the ends of a clip.
pub trait PoleState: Copy + PartialEq + Debug + Send + Sync {
    fn pole(self) -> Pole;
}

/// Direction the cursor is driven in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedSign {
    Reverse,
    /// No motion. Used to snap a clip in place.
    Hold,
    Forward,
}

impl SpeedSign {
    /// `sign(target - current)`, with an exact match yielding `Hold`.
    pub fn between(current: f32, target: f32) -> Self {
        let delta = target - current;
        if delta > 0.0 {
            SpeedSign::Forward
        } else if delta < 0.0 {
            SpeedSign::Reverse
        } else {
            SpeedSign::Hold
        }
    }

    pub fn value(self) -> f32 {
        match self {
            SpeedSign::Reverse => -1.0,
            SpeedSign::Hold => 0.0,
            SpeedSign::Forward => 1.0,
        }
    }
}

/// What an FSM asked the driver to do. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationPlaybackCommand {
    pub target_normalized_time: f32,
    pub speed_sign: SpeedSign,
}
