//! # Capture Timer Interface
//!
//! The register protocol the capture engine relies on, independent of any
//! particular MCU. A capture timer is a free-running counter that wraps at a
//! fixed modulus, latches its value into a capture register when the selected
//! input edge arrives, and raises two interrupts: overflow and input capture.
//!
//! ## Capture Handler Ordering
//!
//! Edge sensing must be flipped as early as possible after the capture
//! register is read, and the capture flag cleared right after, or the next
//! edge may be missed. Implementations therefore keep each method down to a
//! single register access so the engine controls the exact order.

// =============================================================================
// Edge
// =============================================================================

/// Signal transition selected for capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Low to high transition
    Rising,
    /// High to low transition
    Falling,
}

impl Edge {
    /// The opposite transition
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Edge::Rising => Edge::Falling,
            Edge::Falling => Edge::Rising,
        }
    }

    /// Check if this is a rising edge
    #[inline]
    pub const fn is_rising(self) -> bool {
        matches!(self, Edge::Rising)
    }
}

// =============================================================================
// Prescaler
// =============================================================================

/// Timer clock prescaler selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Prescaler {
    /// No clock source (timer stopped)
    NoClock = 0,
    /// System clock
    Div1 = 1,
    /// System clock / 8
    Div8 = 2,
    /// System clock / 64
    Div64 = 3,
    /// System clock / 256
    Div256 = 4,
    /// System clock / 1024
    Div1024 = 5,
}

impl Prescaler {
    /// Every selection, in register encoding order
    pub const ALL: [Prescaler; 6] = [
        Prescaler::NoClock,
        Prescaler::Div1,
        Prescaler::Div8,
        Prescaler::Div64,
        Prescaler::Div256,
        Prescaler::Div1024,
    ];

    /// Clock divisor (0 for no clock)
    #[inline]
    pub const fn divisor(self) -> u16 {
        match self {
            Prescaler::NoClock => 0,
            Prescaler::Div1 => 1,
            Prescaler::Div8 => 8,
            Prescaler::Div64 => 64,
            Prescaler::Div256 => 256,
            Prescaler::Div1024 => 1024,
        }
    }

    /// Whether this selection actually clocks the counter
    #[inline]
    pub const fn is_clocked(self) -> bool {
        !matches!(self, Prescaler::NoClock)
    }

    /// Duration of one counter tick in seconds for a given input clock
    ///
    /// Returns 0 for [`Prescaler::NoClock`] or a zero clock.
    #[inline]
    pub fn tick_time(self, clock_hz: u32) -> f64 {
        if !self.is_clocked() || clock_hz == 0 {
            return 0.0;
        }
        f64::from(self.divisor()) / f64::from(clock_hz)
    }
}

impl core::fmt::Display for Prescaler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Prescaler::NoClock => write!(f, "no clock"),
            other => write!(f, "clk/{}", other.divisor()),
        }
    }
}

// =============================================================================
// Interrupt Sources
// =============================================================================

/// Timer interrupt sources, highest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrqSource {
    /// Input capture event latched
    Capture,
    /// Counter wrapped to zero
    Overflow,
}

// =============================================================================
// Capture Timer
// =============================================================================

/// Register-level protocol of a wrapping capture timer
///
/// All methods take `&self`: the registers are shared between the interrupt
/// handlers and foreground code, and each call is one volatile access.
pub trait CaptureTimer {
    /// Counter modulus: the tick count at which the counter wraps to zero
    const MODULUS: u16;

    /// Half the modulus, the tie-break for captures racing a wrap
    const HALF_MODULUS: u16 = Self::MODULUS / 2;

    /// Whether a pending capture interrupt is always serviced before a
    /// pending overflow interrupt
    ///
    /// The wrap correction for captures relies on this; a timer that
    /// reports `false` cannot drive the capture engine.
    fn capture_outranks_overflow(&self) -> bool;

    /// Read the live counter value
    fn counter(&self) -> u16;

    /// Read the counter value latched by the last capture event
    fn capture_value(&self) -> u16;

    /// Edge the capture unit is currently armed for
    ///
    /// Inside the capture handler, before toggling, this is the edge that
    /// was just captured.
    fn capture_edge(&self) -> Edge;

    /// Arm the capture unit for the opposite edge
    fn toggle_capture_edge(&self);

    /// Clear the capture pending flag
    fn clear_capture_flag(&self);

    /// Check if an overflow is pending (counter wrapped, handler not yet run)
    ///
    /// The flag is acknowledged when the overflow vector is entered, which
    /// on every supported part happens in hardware.
    fn overflow_pending(&self) -> bool;

    /// Program the counter mode, select the prescaler, arm for a rising edge
    /// and enable both interrupt sources
    ///
    /// Callers never pass [`Prescaler::NoClock`].
    fn start(&self, prescaler: Prescaler);

    /// Disable both interrupt sources and remove the clock source
    fn stop(&self);
}

impl<T: CaptureTimer + ?Sized> CaptureTimer for &T {
    const MODULUS: u16 = T::MODULUS;
    const HALF_MODULUS: u16 = T::HALF_MODULUS;

    #[inline]
    fn capture_outranks_overflow(&self) -> bool {
        (**self).capture_outranks_overflow()
    }

    #[inline]
    fn counter(&self) -> u16 {
        (**self).counter()
    }

    #[inline]
    fn capture_value(&self) -> u16 {
        (**self).capture_value()
    }

    #[inline]
    fn capture_edge(&self) -> Edge {
        (**self).capture_edge()
    }

    #[inline]
    fn toggle_capture_edge(&self) {
        (**self).toggle_capture_edge()
    }

    #[inline]
    fn clear_capture_flag(&self) {
        (**self).clear_capture_flag()
    }

    #[inline]
    fn overflow_pending(&self) -> bool {
        (**self).overflow_pending()
    }

    #[inline]
    fn start(&self, prescaler: Prescaler) {
        (**self).start(prescaler)
    }

    #[inline]
    fn stop(&self) {
        (**self).stop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_opposite() {
        assert_eq!(Edge::Rising.opposite(), Edge::Falling);
        assert_eq!(Edge::Falling.opposite(), Edge::Rising);
        assert!(Edge::Rising.is_rising());
        assert!(!Edge::Falling.is_rising());
    }

    #[test]
    fn test_prescaler_divisors() {
        let divisors: [u16; 6] = [0, 1, 8, 64, 256, 1024];
        for (prescaler, divisor) in Prescaler::ALL.iter().zip(divisors) {
            assert_eq!(prescaler.divisor(), divisor);
        }
        assert!(!Prescaler::NoClock.is_clocked());
        assert!(Prescaler::Div1024.is_clocked());
    }

    #[test]
    fn test_prescaler_tick_time() {
        assert_eq!(Prescaler::Div8.tick_time(16_000_000), 0.5e-6);
        assert_eq!(Prescaler::Div1.tick_time(16_000_000), 62.5e-9);
        assert_eq!(Prescaler::NoClock.tick_time(16_000_000), 0.0);
        assert_eq!(Prescaler::Div64.tick_time(0), 0.0);
    }

    #[test]
    fn test_prescaler_display() {
        assert_eq!(format!("{}", Prescaler::NoClock), "no clock");
        assert_eq!(format!("{}", Prescaler::Div256), "clk/256");
    }
}
