// src/simulation/core/prng.rs

use bevy::prelude::Resource;
use rand_chacha::ChaCha8Rng;

/// The deterministic pseudo-random number generator behind the pose jitter.
#[derive(Resource)]
pub struct SimulationRng(pub ChaCha8Rng);
