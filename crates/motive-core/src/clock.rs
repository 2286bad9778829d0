//! Simulation clock.
//!
//! The clock owns two pieces of temporal state: a monotonically increasing
//! tick counter and the simulation time in seconds. Every tick advances the
//! time by a fixed delta. The tick counter uses checked arithmetic; the time
//! is derived by accumulation and is what brains and resources see.

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// The seconds-per-tick delta is zero, negative, or not finite.
    #[error("invalid tick delta: {delta} (must be finite and positive)")]
    InvalidDelta {
        /// The rejected delta.
        delta: f64,
    },
}

/// Fixed-step simulation clock.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationClock {
    /// Ticks completed so far.
    tick: u64,

    /// Seconds of simulation time elapsed.
    time: f64,

    /// Seconds added per tick.
    delta: f64,
}

impl SimulationClock {
    /// Create a clock at tick 0, time 0.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidDelta`] if `delta` is not a positive,
    /// finite number of seconds.
    pub const fn new(delta: f64) -> Result<Self, ClockError> {
        if !delta.is_finite() || delta <= 0.0 {
            return Err(ClockError::InvalidDelta { delta });
        }
        Ok(Self {
            tick: 0,
            time: 0.0,
            delta,
        })
    }

    /// Advance one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        self.time += self.delta;
        Ok(self.tick)
    }

    /// Ticks completed so far.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulation time in seconds.
    pub const fn time(&self) -> f64 {
        self.time
    }

    /// Seconds per tick.
    pub const fn delta(&self) -> f64 {
        self.delta
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_delta() {
        assert!(SimulationClock::new(0.0).is_err());
        assert!(SimulationClock::new(-1.0).is_err());
        assert!(SimulationClock::new(f64::NAN).is_err());
    }

    #[test]
    fn advance_moves_tick_and_time() {
        let mut clock = SimulationClock::new(0.5).unwrap();
        assert_eq!(clock.advance().unwrap(), 1);
        assert_eq!(clock.advance().unwrap(), 2);
        assert_eq!(clock.tick(), 2);
        assert!((clock.time() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn overflow_is_an_error() {
        let mut clock = SimulationClock {
            tick: u64::MAX,
            time: 0.0,
            delta: 1.0,
        };
        assert_eq!(clock.advance(), Err(ClockError::TickOverflow));
        assert_eq!(clock.tick(), u64::MAX);
    }
}
