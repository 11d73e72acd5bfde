//! Frame clock with fixed-timestep accumulator

/// Tracks elapsed time and hands out fixed-size steps.
///
/// The clock is advanced explicitly (`advance`) so that offline tools and
/// tests drive it deterministically; a windowed host feeds it wall-clock deltas.
pub struct FrameClock {
    /// Total elapsed time in milliseconds
    pub total_ms: f64,
    /// Time passed to the last `advance` call, in milliseconds
    pub delta_ms: f64,
    /// Fixed timestep interval in milliseconds (default: 1000/60)
    pub fixed_step_ms: f64,
    /// Largest delta accepted per advance
    pub max_delta_ms: f64,
    /// Accumulated time for fixed-step consumption
    accumulator: f64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            total_ms: 0.0,
            delta_ms: 0.0,
            fixed_step_ms: 1000.0 / 60.0,
            max_delta_ms: 250.0,
            accumulator: 0.0,
        }
    }
}

impl FrameClock {
    /// Create a new frame clock with default 60Hz fixed timestep
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a frame clock with a custom fixed rate.
    ///
    /// The delta clamp never drops below one step, so a single frame can
    /// always fill a step at low rates.
    pub fn with_rate(hz: f64) -> Self {
        let fixed_step_ms = 1000.0 / hz;
        Self {
            fixed_step_ms,
            max_delta_ms: fixed_step_ms.max(Self::default().max_delta_ms),
            ..Self::default()
        }
    }

    /// Advance the clock by `elapsed_ms`.
    pub fn advance(&mut self, elapsed_ms: f64) {
        // Clamp to avoid spiral of death
        self.delta_ms = elapsed_ms.clamp(0.0, self.max_delta_ms);
        self.total_ms += self.delta_ms;
        self.accumulator += self.delta_ms;
    }

    /// Returns true if there's enough accumulated time for a fixed step
    pub fn should_step(&self) -> bool {
        self.accumulator >= self.fixed_step_ms
    }

    /// Consume one fixed step from the accumulator and return its length
    pub fn consume_step(&mut self) -> f64 {
        self.accumulator -= self.fixed_step_ms;
        self.fixed_step_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_defaults() {
        let clock = FrameClock::new();
        assert!((clock.fixed_step_ms - 1000.0 / 60.0).abs() < 1e-10);
        assert_eq!(clock.total_ms, 0.0);
        assert_eq!(clock.delta_ms, 0.0);
    }

    #[test]
    fn test_custom_rate() {
        let clock = FrameClock::with_rate(30.0);
        assert!((clock.fixed_step_ms - 1000.0 / 30.0).abs() < 1e-10);
    }

    #[test]
    fn test_accumulator_logic() {
        let mut clock = FrameClock::with_rate(50.0);
        clock.advance(40.0); // two 20ms steps worth

        assert!(clock.should_step());
        assert_eq!(clock.consume_step(), 20.0);
        assert!(clock.should_step());
        clock.consume_step();
        assert!(!clock.should_step());
        assert_eq!(clock.total_ms, 40.0);
    }

    #[test]
    fn test_large_delta_is_clamped() {
        let mut clock = FrameClock::new();
        clock.advance(10_000.0);
        assert_eq!(clock.delta_ms, 250.0);
        clock.advance(-5.0);
        assert_eq!(clock.delta_ms, 0.0);
    }

    #[test]
    fn test_low_rate_steps_once_per_frame() {
        let mut clock = FrameClock::with_rate(2.0);
        let mut steps = 0;
        for _ in 0..10 {
            clock.advance(clock.fixed_step_ms);
            while clock.should_step() {
                clock.consume_step();
                steps += 1;
            }
        }
        assert_eq!(steps, 10);
        assert_eq!(clock.total_ms, 5000.0);
    }
}
