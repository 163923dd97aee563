// cockpit_core/src/animation/sync.rs

use crate::animation::{AnimationDriver, AnimationPlaybackCommand, Pole, PoleState, SpeedSign};

/// Keeps a control's logical state and its clip's cursor in step.
///
/// The logical state is set the moment a transition is commanded; the clip
/// catches up afterwards and `tick` reports when it got there. A new command
/// issued mid-flight replaces the old one.
#[derive(Debug)]
pub struct AnimationSync<S: PoleState> {
    driver: Box<dyn AnimationDriver>,
    state: S,
    /// Magnitude of the playback speed; the sign comes from each command.
    speed: f32,
    target: f32,
    direction: SpeedSign,
    in_flight: bool,
    /// A command that found the cursor already at its target. Reported as
    /// finished on the next tick without touching the clip.
    settled: bool,
}

impl<S: PoleState> AnimationSync<S> {
    /// Takes ownership of the driver and snaps it to `initial`.
    pub fn new(driver: Box<dyn AnimationDriver>, initial: S, speed: f32) -> Self {
        let mut sync = Self {
            driver,
            state: initial,
            speed: speed.abs(),
            target: initial.pole().normalized_time(),
            direction: SpeedSign::Hold,
            in_flight: false,
            settled: false,
        };
        sync.snap_to(initial);
        sync
    }

    /// The commanded logical state.
    pub fn state(&self) -> S {
        self.state
    }

    pub fn driver(&self) -> &dyn AnimationDriver {
        self.driver.as_ref()
    }

    /// `true` between a motion command and the tick that observes its completion.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Places the clip at `state` instantly. Only used to initialise a control.
    pub fn snap_to(&mut self, state: S) {
        self.target = state.pole().normalized_time();
        self.direction = SpeedSign::Hold;
        self.driver.set_normalized_time(self.target);
        self.driver.set_speed(0.0);
        self.driver.play();
        self.state = state;
        self.in_flight = false;
        self.settled = false;
    }

    /// Drives the clip towards `state` and commits the logical state right away.
    pub fn play_to(&mut self, state: S) -> AnimationPlaybackCommand {
        let target = state.pole().normalized_time();

        // A clip that finished at its end has already wrapped back to 0.0, even
        // though the active pole sits at 1.0. Put the cursor back where the
        // control really is before choosing a direction.
        if self.state.pole() == Pole::Active
            && self.driver.normalized_time() == 0.0
            && !self.driver.is_playing()
        {
            self.driver.set_normalized_time(1.0);
        }

        let direction = SpeedSign::between(self.driver.normalized_time(), target);
        self.target = target;
        self.direction = direction;

        match direction {
            SpeedSign::Hold => {
                // Already there; freeze the clip rather than restarting it.
                self.driver.set_speed(0.0);
                self.in_flight = false;
                self.settled = true;
            }
            SpeedSign::Forward | SpeedSign::Reverse => {
                self.driver.set_speed(direction.value() * self.speed);
                self.driver.play();
                self.in_flight = true;
                self.settled = false;
            }
        }

        self.state = state;

        AnimationPlaybackCommand {
            target_normalized_time: target,
            speed_sign: direction,
        }
    }

    /// Advances the clip and returns `true` on the tick its segment completes.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.driver.advance(dt);

        if self.settled {
            self.settled = false;
            return true;
        }
        if !self.in_flight {
            return false;
        }

        if self.driver.is_playing() {
            let cursor = self.driver.normalized_time();
            let reached = match self.direction {
                SpeedSign::Forward => cursor >= self.target,
                SpeedSign::Reverse => cursor <= self.target,
                SpeedSign::Hold => true,
            };
            if !reached {
                return false;
            }
            self.driver.stop();
        }

        // Either we stopped it at the target or the clip ran off its end.
        self.in_flight = false;
        true
    }
}
