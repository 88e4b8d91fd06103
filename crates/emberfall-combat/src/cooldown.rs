//! Countdown timer used to gate skills and world timers

use emberfall_core::{BinaryReader, BinaryWriter, CodecError, Versioned};

/// A countdown from `total_time` to zero.
///
/// `time_left` may briefly exceed `total_time` when the total is lowered
/// while running; the total never rescales the time already on the clock.
#[derive(Debug, Clone, PartialEq)]
pub struct Cooldown {
    total_time: f32,
    time_left: f32,
}

impl Cooldown {
    /// Create a ready cooldown with the given total duration in seconds
    pub fn new(total_time: f32) -> Self {
        Self {
            total_time: total_time.max(0.0),
            time_left: 0.0,
        }
    }

    /// Restore a cooldown mid-countdown
    pub fn from_parts(total_time: f32, time_left: f32) -> Self {
        Self {
            total_time: total_time.max(0.0),
            time_left: time_left.max(0.0),
        }
    }

    /// Begin counting down from the full duration
    pub fn start(&mut self) {
        self.time_left = self.total_time;
    }

    /// Make the cooldown ready immediately
    pub fn reset(&mut self) {
        self.time_left = 0.0;
    }

    /// Advance the timer. Returns `true` if it became ready during this tick.
    pub fn tick(&mut self, delta: f32) -> bool {
        if self.time_left <= 0.0 {
            return false;
        }
        self.time_left = (self.time_left - delta.max(0.0)).max(0.0);
        self.time_left <= 0.0
    }

    pub fn is_ready(&self) -> bool {
        self.time_left <= 0.0
    }

    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Change the full duration without touching the running countdown
    pub fn set_total_time(&mut self, total_time: f32) {
        self.total_time = total_time.max(0.0);
    }

    pub fn time_left(&self) -> f32 {
        self.time_left
    }

    /// Progress as a 0.0-1.0 fraction (1.0 = ready)
    pub fn fraction_ready(&self) -> f32 {
        if self.total_time <= 0.0 {
            return 1.0;
        }
        1.0 - (self.time_left / self.total_time).clamp(0.0, 1.0)
    }
}

impl Versioned for Cooldown {
    const TYPE_NAME: &'static str = "Cooldown";
    const VERSION: u32 = 1;
    const MIN_VERSION: u32 = 1;

    fn write_fields(&self, writer: &mut BinaryWriter) {
        writer.write_f32(self.total_time);
        writer.write_f32(self.time_left);
    }

    fn read_fields(reader: &mut BinaryReader<'_>, _version: u32) -> Result<Self, CodecError> {
        let total_time = reader.read_f32()?;
        let time_left = reader.read_f32()?;
        Ok(Self::from_parts(total_time, time_left))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_new_cooldown_is_ready() {
        let cd = Cooldown::new(3.0);
        assert!(cd.is_ready());
        assert_eq!(cd.fraction_ready(), 1.0);
    }

    #[test]
    fn test_start_and_tick() {
        let mut cd = Cooldown::new(2.0);
        cd.start();
        assert!(!cd.is_ready());
        assert!(!cd.tick(1.5));
        assert!((cd.time_left() - 0.5).abs() < 1e-6);
        assert!(cd.tick(1.0));
        assert_eq!(cd.time_left(), 0.0);
        // Already ready: further ticks report nothing new
        assert!(!cd.tick(1.0));
    }

    #[test]
    fn test_negative_delta_is_ignored() {
        let mut cd = Cooldown::new(1.0);
        cd.start();
        cd.tick(-5.0);
        assert_eq!(cd.time_left(), 1.0);
    }

    #[test]
    fn test_set_total_does_not_rescale() {
        let mut cd = Cooldown::new(4.0);
        cd.start();
        cd.tick(1.0);
        cd.set_total_time(2.0);
        assert_eq!(cd.total_time(), 2.0);
        assert_eq!(cd.time_left(), 3.0);
        assert_eq!(cd.fraction_ready(), 0.0);
    }

    #[test]
    fn test_ready_exactly_once_for_random_ticks() {
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..200 {
            let total = rng.gen_range(0.1..5.0);
            let mut cd = Cooldown::new(total);
            cd.start();
            let mut elapsed = 0.0;
            let mut became_ready = 0;
            while elapsed < total * 2.0 {
                let dt = rng.gen_range(0.0..0.5);
                elapsed += dt;
                if cd.tick(dt) {
                    became_ready += 1;
                }
                if became_ready > 0 {
                    assert!(cd.is_ready());
                }
            }
            assert_eq!(became_ready, 1);
        }
    }

    #[test]
    fn test_codec_round_trip_random_values() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let mut cd = Cooldown::new(rng.gen_range(0.0..30.0));
            cd.start();
            cd.tick(rng.gen_range(0.0..30.0));
            let loaded = Cooldown::from_bytes(&cd.to_bytes()).unwrap();
            assert_eq!(loaded, cd);
        }
    }
}
