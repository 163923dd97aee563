// cockpit_core/src/animation/clip.rs

use crate::animation::AnimationDriver;

/// A self-advancing clip with play-once semantics: running off either end
/// stops playback and rewinds the cursor to `0.0`.
#[derive(Debug, Clone)]
pub struct ClipPlayer {
    clip_id: String,
    length_secs: f32,
    normalized_time: f32,
    speed: f32,
    playing: bool,
}

impl ClipPlayer {
    pub fn new(clip_id: impl Into<String>, length_secs: f32) -> Self {
        Self {
            clip_id: clip_id.into(),
            length_secs,
            normalized_time: 0.0,
            speed: 0.0,
            playing: false,
        }
    }

    pub fn length_secs(&self) -> f32 {
        self.length_secs
    }

    fn finish(&mut self) {
        self.normalized_time = 0.0;
        self.playing = false;
    }
}

impl AnimationDriver for ClipPlayer {
    fn clip_id(&self) -> &str {
        &self.clip_id
    }

    fn play(&mut self) {
        self.playing = true;
    }

    fn stop(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn normalized_time(&self) -> f32 {
        self.normalized_time
    }

    fn set_normalized_time(&mut self, time: f32) {
        self.normalized_time = time.clamp(0.0, 1.0);
    }

    fn speed(&self) -> f32 {
        self.speed
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    fn advance(&mut self, dt: f32) {
        if !self.playing || self.speed == 0.0 || dt <= 0.0 {
            return;
        }
        if self.length_secs <= f32::EPSILON {
            self.finish();
            return;
        }

        self.normalized_time += self.speed * dt / self.length_secs;
        if (self.speed > 0.0 && self.normalized_time >= 1.0)
            || (self.speed < 0.0 && self.normalized_time <= 0.0)
        {
            self.finish();
        }
    }
}
