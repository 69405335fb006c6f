//! Simulation clock
//!
//! Converts raw frame deltas into the discrete fixed-length steps that drive
//! per-character updates.

use serde::{Deserialize, Serialize};

/// Configuration for the simulation clock
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// How many simulated seconds pass per real second
    pub time_scale: f32,
    /// Length of one simulation step (in seconds)
    pub fixed_timestep: f32,
    /// Maximum delta time to prevent spiral of death
    pub max_delta_time: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            fixed_timestep: 1.0 / 30.0,
            max_delta_time: 0.25,
        }
    }
}

/// Errors raised when building a clock
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClockError {
    #[error("fixed timestep must be positive and finite, got {0}")]
    InvalidTimestep(f32),

    #[error("time scale must be positive and finite, got {0}")]
    InvalidTimeScale(f32),

    #[error("max delta time must be positive and finite, got {0}")]
    InvalidMaxDelta(f32),
}

/// Fixed-step simulation time tracking
#[derive(Debug, Clone)]
pub struct SimClock {
    config: ClockConfig,
    /// Simulated time since start in seconds
    pub total_time: f64,
    /// Number of completed steps
    pub step_count: u64,
    /// Whether the simulation is paused
    pub paused: bool,
    accumulator: f32,
}

impl SimClock {
    /// Create a new clock, validating the config
    pub fn new(config: ClockConfig) -> Result<Self, ClockError> {
        if !(config.fixed_timestep.is_finite() && config.fixed_timestep > 0.0) {
            return Err(ClockError::InvalidTimestep(config.fixed_timestep));
        }
        if !(config.time_scale.is_finite() && config.time_scale > 0.0) {
            return Err(ClockError::InvalidTimeScale(config.time_scale));
        }
        if !(config.max_delta_time.is_finite() && config.max_delta_time > 0.0) {
            return Err(ClockError::InvalidMaxDelta(config.max_delta_time));
        }
        Ok(Self {
            config,
            total_time: 0.0,
            step_count: 0,
            paused: false,
            accumulator: 0.0,
        })
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    /// Length of one step in seconds
    pub fn step_delta(&self) -> f32 {
        self.config.fixed_timestep
    }

    /// Feed the raw delta from the previous frame
    pub fn advance(&mut self, raw_delta: f32) {
        if self.paused {
            return;
        }
        let delta = raw_delta.clamp(0.0, self.config.max_delta_time) * self.config.time_scale;
        self.accumulator += delta;
    }

    /// Drain the number of whole steps accumulated so far
    pub fn drain_steps(&mut self) -> u32 {
        let mut steps = 0;
        while self.accumulator >= self.config.fixed_timestep {
            self.accumulator -= self.config.fixed_timestep;
            self.total_time += self.config.fixed_timestep as f64;
            self.step_count += 1;
            steps += 1;
        }
        steps
    }

    /// Interpolation factor between the last step and the next one
    pub fn interpolation(&self) -> f32 {
        self.accumulator / self.config.fixed_timestep
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }
}
