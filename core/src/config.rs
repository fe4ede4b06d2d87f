//! # Capture Configuration
//!
//! Clock source, prescaler and capture window, and the [`Timing`] derived
//! from them once at start-up.

use edgestamp_hal::{avr, Prescaler};

use crate::error::{CaptureError, CaptureResult};

/// Default input clock of the ATmega328P boards this engine targets
pub const DEFAULT_CLOCK_HZ: u32 = avr::CLOCK_HZ;

/// Default capture window in seconds
pub const DEFAULT_CAPTURE_WINDOW: f64 = 0.1;

/// User-facing capture configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureConfig {
    /// Timer input clock frequency in Hz
    pub clock_hz: u32,
    /// Clock prescaler
    pub prescaler: Prescaler,
    /// Maximum age of the last rising edge, in seconds, for a measurement
    /// to be reported
    pub capture_window: f64,
}

impl CaptureConfig {
    /// Configuration with a prescaler and the default clock and window
    pub const fn new(prescaler: Prescaler) -> Self {
        Self {
            clock_hz: DEFAULT_CLOCK_HZ,
            prescaler,
            capture_window: DEFAULT_CAPTURE_WINDOW,
        }
    }

    /// Set the input clock frequency
    pub const fn with_clock_hz(mut self, clock_hz: u32) -> Self {
        self.clock_hz = clock_hz;
        self
    }

    /// Set the prescaler
    pub const fn with_prescaler(mut self, prescaler: Prescaler) -> Self {
        self.prescaler = prescaler;
        self
    }

    /// Set the capture window in seconds
    pub const fn with_capture_window(mut self, seconds: f64) -> Self {
        self.capture_window = seconds;
        self
    }

    /// Validate and derive tick time and window ticks
    ///
    /// Returns `Ok(None)` when the prescaler selects no clock: there is
    /// nothing to derive and the timer stays disabled.
    pub fn timing(&self) -> CaptureResult<Option<Timing>> {
        if !self.prescaler.is_clocked() {
            return Ok(None);
        }
        if self.clock_hz == 0 {
            return Err(CaptureError::InvalidClock);
        }
        if !self.capture_window.is_finite() || self.capture_window <= 0.0 {
            return Err(CaptureError::InvalidCaptureWindow);
        }

        let tick_time = self.prescaler.tick_time(self.clock_hz);
        let window_ticks = (self.capture_window / tick_time) as u64;
        if window_ticks == 0 {
            return Err(CaptureError::WindowTooShort);
        }

        Ok(Some(Timing {
            prescaler: self.prescaler,
            tick_time,
            window_ticks,
        }))
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self::new(Prescaler::Div8)
    }
}

/// Tick geometry derived from a [`CaptureConfig`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    /// Selected prescaler
    pub prescaler: Prescaler,
    /// Seconds per counter tick
    pub tick_time: f64,
    /// Capture window in ticks
    pub window_ticks: u64,
}

impl Timing {
    /// Timing before any clock was selected
    pub const DISABLED: Timing = Timing {
        prescaler: Prescaler::NoClock,
        tick_time: 0.0,
        window_ticks: 0,
    };

    /// Convert ticks to seconds, with zero ticks reported as exactly zero
    #[inline]
    pub fn seconds(&self, ticks: u64) -> f64 {
        if ticks == 0 {
            0.0
        } else {
            ticks as f64 * self.tick_time
        }
    }

    /// Capture window converted back to seconds
    #[inline]
    pub fn capture_window(&self) -> f64 {
        self.seconds(self.window_ticks)
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::DISABLED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= b.abs() * 1e-9
    }

    #[test]
    fn test_default_config() {
        let config = CaptureConfig::default();
        assert_eq!(config.clock_hz, 16_000_000);
        assert_eq!(config.prescaler, Prescaler::Div8);
        assert_eq!(config.capture_window, 0.1);
    }

    #[test]
    fn test_default_timing() {
        let timing = CaptureConfig::default().timing().unwrap().unwrap();
        assert_eq!(timing.tick_time, 0.5e-6);
        assert!(timing.window_ticks.abs_diff(200_000) <= 1);
        assert!(close(timing.capture_window(), 0.1));
    }

    #[test]
    fn test_no_clock_derives_nothing() {
        let config = CaptureConfig::new(Prescaler::NoClock);
        assert_eq!(config.timing(), Ok(None));
        // Window validation is skipped too
        assert_eq!(config.with_capture_window(-1.0).timing(), Ok(None));
    }

    #[test]
    fn test_invalid_configs() {
        let config = CaptureConfig::default();
        assert_eq!(
            config.with_clock_hz(0).timing(),
            Err(CaptureError::InvalidClock)
        );
        assert_eq!(
            config.with_capture_window(0.0).timing(),
            Err(CaptureError::InvalidCaptureWindow)
        );
        assert_eq!(
            config.with_capture_window(f64::NAN).timing(),
            Err(CaptureError::InvalidCaptureWindow)
        );
        assert_eq!(
            config.with_capture_window(1e-9).timing(),
            Err(CaptureError::WindowTooShort)
        );
    }

    #[test]
    fn test_prescaler_scales_window() {
        let timing = CaptureConfig::default()
            .with_prescaler(Prescaler::Div1024)
            .with_capture_window(1.0)
            .timing()
            .unwrap()
            .unwrap();
        assert_eq!(timing.tick_time, 64e-6);
        assert!(timing.window_ticks.abs_diff(15_625) <= 1);
    }

    #[test]
    fn test_zero_ticks_are_zero_seconds() {
        let timing = Timing {
            prescaler: Prescaler::Div8,
            tick_time: 0.5e-6,
            window_ticks: 10,
        };
        assert_eq!(timing.seconds(0), 0.0);
        assert_eq!(timing.seconds(300), 300.0 * 0.5e-6);
        assert_eq!(Timing::DISABLED.capture_window(), 0.0);
    }
}
