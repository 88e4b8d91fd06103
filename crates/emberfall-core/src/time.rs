//! Fixed-step simulation clock
//!
//! Combat state only ever advances in whole fixed steps; the clock turns
//! variable frame deltas into a number of steps to run.

use serde::{Deserialize, Serialize};

/// Configuration for simulation time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// How many simulated seconds pass per real second
    pub time_scale: f32,
    /// Length of one simulation step in seconds
    pub fixed_timestep: f32,
    /// Maximum frame delta accepted, to avoid a spiral of death after a stall
    pub max_delta_time: f32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            fixed_timestep: 1.0 / 60.0,
            max_delta_time: 0.25,
        }
    }
}

/// Accumulates frame time and hands out fixed simulation steps
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    pub config: TimeConfig,
    /// Simulated seconds covered by the steps handed out so far
    pub elapsed: f64,
    /// Number of steps handed out so far
    pub step_count: u64,
    accumulator: f32,
}

impl SimClock {
    pub fn new(config: TimeConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Feed a raw frame delta. Returns how many fixed steps to simulate.
    pub fn advance(&mut self, raw_delta: f32) -> u32 {
        if self.config.fixed_timestep <= 0.0 {
            return 0;
        }
        let delta = raw_delta.clamp(0.0, self.config.max_delta_time) * self.config.time_scale;
        self.accumulator += delta;

        let mut steps = 0;
        while self.accumulator >= self.config.fixed_timestep {
            self.accumulator -= self.config.fixed_timestep;
            steps += 1;
        }
        self.step_count += u64::from(steps);
        self.elapsed += f64::from(steps) * f64::from(self.config.fixed_timestep);
        steps
    }

    /// The delta each simulation step should use
    pub fn step_delta(&self) -> f32 {
        self.config.fixed_timestep
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> SimClock {
        SimClock::new(TimeConfig {
            time_scale: 1.0,
            fixed_timestep: 0.1,
            max_delta_time: 0.25,
        })
    }

    #[test]
    fn test_advance_accumulates_steps() {
        let mut clock = clock();
        assert_eq!(clock.advance(0.05), 0);
        assert_eq!(clock.advance(0.05), 1);
        assert_eq!(clock.advance(0.2), 2);
        assert_eq!(clock.step_count, 3);
        assert!((clock.elapsed - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_large_delta_is_clamped() {
        let mut clock = clock();
        assert_eq!(clock.advance(10.0), 2);
    }

    #[test]
    fn test_negative_delta_ignored() {
        let mut clock = clock();
        assert_eq!(clock.advance(-1.0), 0);
        assert_eq!(clock.step_count, 0);
    }
}
