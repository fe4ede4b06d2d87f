//! # Duty/Period Calculator
//!
//! Pure arithmetic over a [`Sample`] taken by the capture engine. A cycle is
//! measured from one rising edge to the next; the high time runs from a
//! rising edge to the falling edge that follows it:
//!
//! ```text
//!            ┌──────────┐               ┌──────────┐
//!   signal   │          │               │          │
//!          ──┘          └───────────────┘          └───
//!            ^          ^               ^          ^
//!         previous   falling         rising       now
//!          rising
//!            |<- duty ->|
//!            |<---------- period ------>|
//!                                       |<- age ->|
//! ```
//!
//! When the falling edge of the current cycle has not arrived yet, the last
//! falling edge belongs to the previous cycle and the duty is measured from
//! the previous rising edge instead.

use crate::config::Timing;
use crate::edges::EdgeSnapshot;

/// State sampled in one critical section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sample {
    /// Extended live counter position
    pub now: u64,
    /// Edge timestamps
    pub edges: EdgeSnapshot,
}

impl Sample {
    /// Ticks elapsed since the last rising edge
    #[inline]
    pub fn age(&self) -> u64 {
        self.now.saturating_sub(self.edges.rising)
    }

    /// Check if the last rising edge is older than the window
    #[inline]
    pub fn is_stale(&self, window_ticks: u64) -> bool {
        self.age() > window_ticks
    }
}

/// Duty and period of the captured signal
///
/// All four fields are zero when there is no valid measurement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DutyPeriod {
    /// High time in ticks
    pub duty_ticks: u64,
    /// High time in seconds
    pub duty: f64,
    /// Period in ticks
    pub period_ticks: u64,
    /// Period in seconds
    pub period: f64,
}

impl DutyPeriod {
    /// No valid measurement
    pub const NONE: DutyPeriod = DutyPeriod {
        duty_ticks: 0,
        duty: 0.0,
        period_ticks: 0,
        period: 0.0,
    };

    /// Build from tick counts
    pub fn from_ticks(duty_ticks: u64, period_ticks: u64, timing: &Timing) -> Self {
        Self {
            duty_ticks,
            duty: timing.seconds(duty_ticks),
            period_ticks,
            period: timing.seconds(period_ticks),
        }
    }

    /// Check if this is a valid measurement
    #[inline]
    pub fn has_signal(&self) -> bool {
        self.period_ticks != 0
    }

    /// High time as a fraction of the period, 0 without a signal
    pub fn duty_cycle(&self) -> f64 {
        if self.period_ticks == 0 {
            return 0.0;
        }
        self.duty_ticks as f64 / self.period_ticks as f64
    }

    /// Signal frequency in Hz, 0 without a signal
    pub fn frequency(&self) -> f64 {
        if self.period == 0.0 {
            return 0.0;
        }
        1.0 / self.period
    }
}

/// Duty and period in ticks, or `None` when the last rising edge is stale
pub fn ticks(sample: &Sample, window_ticks: u64) -> Option<(u64, u64)> {
    if sample.is_stale(window_ticks) {
        return None;
    }

    let edges = &sample.edges;
    let duty = if edges.falling >= edges.rising {
        edges.falling - edges.rising
    } else {
        edges.falling.saturating_sub(edges.previous_rising)
    };
    let period = edges.rising.saturating_sub(edges.previous_rising);

    Some((duty, period))
}

/// Duty and period of a sample
pub fn duty_and_period(sample: &Sample, timing: &Timing) -> DutyPeriod {
    match ticks(sample, timing.window_ticks) {
        Some((duty, period)) => DutyPeriod::from_ticks(duty, period, timing),
        None => DutyPeriod::NONE,
    }
}

#[cfg(test)]
mod tests {
    use edgestamp_hal::Prescaler;

    use super::*;

    const TIMING: Timing = Timing {
        prescaler: Prescaler::Div8,
        tick_time: 0.5e-6,
        window_ticks: 200_000,
    };

    fn sample(now: u64, previous_rising: u64, rising: u64, falling: u64) -> Sample {
        Sample {
            now,
            edges: EdgeSnapshot {
                rising,
                previous_rising,
                falling,
            },
        }
    }

    #[test]
    fn test_falling_after_rising() {
        // rising 1000, falling 1300, next rising 2000, then falling 2300
        let result = duty_and_period(&sample(2400, 1000, 2000, 2300), &TIMING);
        assert_eq!(result.duty_ticks, 300);
        assert_eq!(result.period_ticks, 1000);
        assert_eq!(result.duty, 300.0 * 0.5e-6);
        assert_eq!(result.period, 1000.0 * 0.5e-6);
    }

    #[test]
    fn test_falling_before_rising() {
        let result = duty_and_period(&sample(2100, 1000, 2000, 1300), &TIMING);
        assert_eq!(result.duty_ticks, 300);
        assert_eq!(result.period_ticks, 1000);

        let result = duty_and_period(&sample(2100, 500, 2000, 1800), &TIMING);
        assert_eq!(result.duty_ticks, 1300);
        assert_eq!(result.period_ticks, 1500);
    }

    #[test]
    fn test_stale_signal_is_all_zero() {
        let edges = (1000, 2000, 1300);
        let fresh = sample(2000 + 200_000, edges.0, edges.1, edges.2);
        assert!(duty_and_period(&fresh, &TIMING).has_signal());

        let stale = sample(2000 + 200_001, edges.0, edges.1, edges.2);
        assert_eq!(duty_and_period(&stale, &TIMING), DutyPeriod::NONE);
    }

    #[test]
    fn test_zero_ticks_are_exactly_zero() {
        // Only one rising edge seen, nothing has fallen yet
        let result = duty_and_period(&sample(10, 0, 0, 0), &TIMING);
        assert_eq!(result, DutyPeriod::NONE);
        assert!(!result.has_signal());
        assert_eq!(result.duty_cycle(), 0.0);
        assert_eq!(result.frequency(), 0.0);
    }

    #[test]
    fn test_now_behind_rising_is_fresh() {
        let result = duty_and_period(&sample(1990, 1000, 2000, 1300), &TIMING);
        assert_eq!(result.period_ticks, 1000);
    }

    #[test]
    fn test_duty_cycle_and_frequency() {
        let result = DutyPeriod::from_ticks(500, 2000, &TIMING);
        assert_eq!(result.duty_cycle(), 0.25);
        assert!((result.frequency() - 1000.0).abs() < 1e-9);
    }
}
