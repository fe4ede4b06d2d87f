//! # Timer/Counter1 Registers
//!
//! Data-space addresses and bit layouts of the Timer/Counter1 registers.
//!
//! ## 16-bit Access
//!
//! TCNT1 and ICR1 share one TEMP byte for their high halves. Reads go low
//! byte first (latching the high byte into TEMP), writes go high byte first.
//! An interrupt handler touching another 16-bit register between the two
//! halves corrupts TEMP, so foreground 16-bit accesses happen with
//! interrupts disabled.

use core::ptr::{read_volatile, write_volatile};

use crate::timer::Prescaler;

// =============================================================================
// Register Addresses
// =============================================================================

/// Timer/Counter1 interrupt flag register
pub const TIFR1: usize = 0x36;
/// Status register
pub const SREG: usize = 0x5F;
/// Timer/Counter1 interrupt mask register
pub const TIMSK1: usize = 0x6F;
/// Timer/Counter1 control register A
pub const TCCR1A: usize = 0x80;
/// Timer/Counter1 control register B
pub const TCCR1B: usize = 0x81;
/// Timer/Counter1 counter, low byte
pub const TCNT1L: usize = 0x84;
/// Timer/Counter1 counter, high byte
pub const TCNT1H: usize = 0x85;
/// Input capture register, low byte
pub const ICR1L: usize = 0x86;
/// Input capture register, high byte
pub const ICR1H: usize = 0x87;

// =============================================================================
// Register Layouts
// =============================================================================

bitflags::bitflags! {
    /// TCCR1A - Timer/Counter1 Control Register A
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Tccr1a: u8 {
        /// Waveform generation mode bit 0
        const WGM10 = 1 << 0;
        /// Waveform generation mode bit 1
        const WGM11 = 1 << 1;
        /// Compare output mode B bit 0
        const COM1B0 = 1 << 4;
        /// Compare output mode B bit 1
        const COM1B1 = 1 << 5;
        /// Compare output mode A bit 0
        const COM1A0 = 1 << 6;
        /// Compare output mode A bit 1
        const COM1A1 = 1 << 7;
    }
}

bitflags::bitflags! {
    /// TCCR1B - Timer/Counter1 Control Register B
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Tccr1b: u8 {
        /// Clock select bit 0
        const CS10 = 1 << 0;
        /// Clock select bit 1
        const CS11 = 1 << 1;
        /// Clock select bit 2
        const CS12 = 1 << 2;
        /// Waveform generation mode bit 2
        const WGM12 = 1 << 3;
        /// Waveform generation mode bit 3
        const WGM13 = 1 << 4;
        /// Input capture edge select (1 = rising)
        const ICES1 = 1 << 6;
        /// Input capture noise canceler
        const ICNC1 = 1 << 7;

        /// All clock select bits
        const CS_MASK = Self::CS10.bits() | Self::CS11.bits() | Self::CS12.bits();
    }
}

bitflags::bitflags! {
    /// TIMSK1 - Timer/Counter1 Interrupt Mask Register
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Timsk1: u8 {
        /// Overflow interrupt enable
        const TOIE1 = 1 << 0;
        /// Output compare A match interrupt enable
        const OCIE1A = 1 << 1;
        /// Output compare B match interrupt enable
        const OCIE1B = 1 << 2;
        /// Input capture interrupt enable
        const ICIE1 = 1 << 5;
    }
}

bitflags::bitflags! {
    /// TIFR1 - Timer/Counter1 Interrupt Flag Register
    ///
    /// Flags are cleared by writing a one to them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Tifr1: u8 {
        /// Overflow flag
        const TOV1 = 1 << 0;
        /// Output compare A match flag
        const OCF1A = 1 << 1;
        /// Output compare B match flag
        const OCF1B = 1 << 2;
        /// Input capture flag
        const ICF1 = 1 << 5;
    }
}

bitflags::bitflags! {
    /// SREG - AVR Status Register
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SregFlags: u8 {
        /// Carry
        const C = 1 << 0;
        /// Zero
        const Z = 1 << 1;
        /// Negative
        const N = 1 << 2;
        /// Two's complement overflow
        const V = 1 << 3;
        /// Sign
        const S = 1 << 4;
        /// Half carry
        const H = 1 << 5;
        /// Bit copy storage
        const T = 1 << 6;
        /// Global interrupt enable
        const I = 1 << 7;
    }
}

impl Tccr1b {
    /// Clock select bits for a prescaler
    pub const fn clock_select(prescaler: Prescaler) -> Self {
        match prescaler {
            Prescaler::NoClock => Self::empty(),
            Prescaler::Div1 => Self::CS10,
            Prescaler::Div8 => Self::CS11,
            Prescaler::Div64 => Self::CS11.union(Self::CS10),
            Prescaler::Div256 => Self::CS12,
            Prescaler::Div1024 => Self::CS12.union(Self::CS10),
        }
    }
}

// =============================================================================
// Register Access
// =============================================================================

/// Read an 8-bit register
///
/// # Safety
///
/// `addr` must be a readable data-space register.
#[inline(always)]
pub unsafe fn read8(addr: usize) -> u8 {
    unsafe { read_volatile(addr as *const u8) }
}

/// Write an 8-bit register
///
/// # Safety
///
/// `addr` must be a writable data-space register.
#[inline(always)]
pub unsafe fn write8(addr: usize, value: u8) {
    unsafe { write_volatile(addr as *mut u8, value) }
}

/// Read a 16-bit register pair through TEMP
///
/// # Safety
///
/// `low` must be the low byte of a 16-bit register pair, and no other
/// 16-bit access may interleave.
#[inline(always)]
pub unsafe fn read16(low: usize) -> u16 {
    unsafe {
        let lo = read8(low);
        let hi = read8(low + 1);
        u16::from_le_bytes([lo, hi])
    }
}

/// Write a 16-bit register pair through TEMP
///
/// # Safety
///
/// Same as [`read16`].
#[inline(always)]
pub unsafe fn write16(low: usize, value: u16) {
    let [lo, hi] = value.to_le_bytes();
    unsafe {
        write8(low + 1, hi);
        write8(low, lo);
    }
}

// =============================================================================
// Compile-time Assertions
// =============================================================================

static_assertions::const_assert_eq!(TCNT1H, TCNT1L + 1);
static_assertions::const_assert_eq!(ICR1H, ICR1L + 1);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_select_table() {
        let expected: [u8; 6] = [0b000, 0b001, 0b010, 0b011, 0b100, 0b101];
        for (prescaler, bits) in Prescaler::ALL.iter().zip(expected) {
            assert_eq!(Tccr1b::clock_select(*prescaler).bits(), bits);
        }
    }

    #[test]
    fn test_clock_select_within_mask() {
        for prescaler in Prescaler::ALL {
            assert!(Tccr1b::CS_MASK.contains(Tccr1b::clock_select(prescaler)));
        }
    }

    #[test]
    fn test_fast_pwm_10bit_mode_bits() {
        // WGM13:0 = 0b0111
        let a = Tccr1a::WGM11 | Tccr1a::WGM10;
        let b = Tccr1b::WGM12;
        assert_eq!(a.bits() & 0b11, 0b11);
        assert_eq!((b.bits() >> 3) & 0b11, 0b01);
    }

    #[test]
    fn test_flag_positions() {
        assert_eq!(Tifr1::ICF1.bits(), 0x20);
        assert_eq!(Timsk1::ICIE1.bits(), 0x20);
        assert_eq!(Tifr1::TOV1.bits(), Timsk1::TOIE1.bits());
        assert_eq!(SregFlags::I.bits(), 0x80);
    }
}
