//! # Timer/Counter1
//!
//! [`CaptureTimer`] implementation over the ATmega328P Timer/Counter1
//! registers. There is one Timer/Counter1 per device; [`Timer1::take`] hands
//! out the only handle and the handle gives it back when dropped.

use portable_atomic::{AtomicBool, Ordering};

use super::registers::{self, Tccr1a, Tccr1b, Tifr1, Timsk1};
use crate::timer::{CaptureTimer, Edge, Prescaler};

/// Top value in fast PWM 10-bit mode
pub const TOP: u16 = 0x03FF;

/// Set while a [`Timer1`] handle is live
static TIMER1_TAKEN: AtomicBool = AtomicBool::new(false);

/// Exclusive handle to Timer/Counter1
#[derive(Debug)]
pub struct Timer1 {
    _private: (),
}

impl Timer1 {
    /// Claim Timer/Counter1
    ///
    /// Returns `None` while another handle is live.
    pub fn take() -> Option<Self> {
        if TIMER1_TAKEN.swap(true, Ordering::AcqRel) {
            log::warn!("Timer1: Already claimed");
            return None;
        }
        Some(Self { _private: () })
    }

    /// Check if a handle is currently live
    pub fn is_taken() -> bool {
        TIMER1_TAKEN.load(Ordering::Acquire)
    }

    #[inline(always)]
    fn tccr1b(&self) -> Tccr1b {
        Tccr1b::from_bits_retain(unsafe { registers::read8(registers::TCCR1B) })
    }

    #[inline(always)]
    fn tifr1(&self) -> Tifr1 {
        Tifr1::from_bits_retain(unsafe { registers::read8(registers::TIFR1) })
    }
}

impl Drop for Timer1 {
    fn drop(&mut self) {
        TIMER1_TAKEN.store(false, Ordering::Release);
    }
}

impl CaptureTimer for Timer1 {
    const MODULUS: u16 = TOP + 1;

    fn capture_outranks_overflow(&self) -> bool {
        super::TIMER1_CAPT_VECTOR < super::TIMER1_OVF_VECTOR
    }

    #[inline(always)]
    fn counter(&self) -> u16 {
        unsafe { registers::read16(registers::TCNT1L) }
    }

    #[inline(always)]
    fn capture_value(&self) -> u16 {
        unsafe { registers::read16(registers::ICR1L) }
    }

    #[inline(always)]
    fn capture_edge(&self) -> Edge {
        if self.tccr1b().contains(Tccr1b::ICES1) {
            Edge::Rising
        } else {
            Edge::Falling
        }
    }

    #[inline(always)]
    fn toggle_capture_edge(&self) {
        let value = self.tccr1b() ^ Tccr1b::ICES1;
        unsafe { registers::write8(registers::TCCR1B, value.bits()) }
    }

    #[inline(always)]
    fn clear_capture_flag(&self) {
        // Writing only ICF1 leaves a pending TOV1 untouched.
        unsafe { registers::write8(registers::TIFR1, Tifr1::ICF1.bits()) }
    }

    #[inline(always)]
    fn overflow_pending(&self) -> bool {
        self.tifr1().contains(Tifr1::TOV1)
    }

    fn start(&self, prescaler: Prescaler) {
        let tccr1a = Tccr1a::WGM11 | Tccr1a::WGM10;
        let tccr1b = Tccr1b::WGM12
            | Tccr1b::ICNC1
            | Tccr1b::ICES1
            | Tccr1b::clock_select(prescaler);

        unsafe {
            registers::write8(registers::TIMSK1, Timsk1::empty().bits());
            registers::write8(registers::TCCR1B, Tccr1b::empty().bits());
            registers::write8(registers::TCCR1A, tccr1a.bits());
            registers::write16(registers::TCNT1L, 0);
            registers::write8(registers::TIFR1, (Tifr1::ICF1 | Tifr1::TOV1).bits());
            registers::write8(registers::TCCR1B, tccr1b.bits());
            registers::write8(registers::TIMSK1, (Timsk1::ICIE1 | Timsk1::TOIE1).bits());
        }

        log::debug!("Timer1: Started fast PWM 10-bit at {}", prescaler);
    }

    fn stop(&self) {
        unsafe {
            let mask = Timsk1::from_bits_retain(registers::read8(registers::TIMSK1));
            registers::write8(registers::TIMSK1, (mask - (Timsk1::ICIE1 | Timsk1::TOIE1)).bits());
            let control = self.tccr1b() - Tccr1b::CS_MASK;
            registers::write8(registers::TCCR1B, control.bits());
        }

        log::debug!("Timer1: Stopped");
    }
}

// =============================================================================
// Compile-time Assertions
// =============================================================================

static_assertions::const_assert!((TOP as u32 + 1).is_power_of_two());
static_assertions::const_assert_eq!(<Timer1 as CaptureTimer>::MODULUS, 1024);
static_assertions::const_assert_eq!(<Timer1 as CaptureTimer>::HALF_MODULUS, 512);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_is_exclusive() {
        let first = Timer1::take().expect("timer should be free");
        assert!(Timer1::is_taken());
        assert!(Timer1::take().is_none());
        drop(first);
        assert!(!Timer1::is_taken());
        let again = Timer1::take();
        assert!(again.is_some());
    }

    #[test]
    fn test_capture_priority() {
        let timer = Timer1 { _private: () };
        assert!(timer.capture_outranks_overflow());
        core::mem::forget(timer);
    }
}
