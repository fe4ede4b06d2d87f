//! # Global Interrupt Control
//!
//! The AVR global interrupt enable is the I bit of SREG. `cli` clears it,
//! `sei` sets it; the instruction after `sei` always executes before any
//! pending interrupt is serviced.

use crate::interrupts::InterruptControl;

use super::registers::{self, SregFlags};

/// Global interrupt enable bit of the AVR status register
#[derive(Debug, Clone, Copy, Default)]
pub struct Sreg;

impl Sreg {
    /// Read the status register
    #[inline(always)]
    pub fn read() -> SregFlags {
        SregFlags::from_bits_retain(unsafe { registers::read8(registers::SREG) })
    }
}

#[cfg(target_arch = "avr")]
#[inline(always)]
fn cli() {
    // No `nomem`: the asm block doubles as a compiler barrier.
    unsafe { core::arch::asm!("cli", options(nostack)) }
}

#[cfg(target_arch = "avr")]
#[inline(always)]
fn sei() {
    unsafe { core::arch::asm!("sei", options(nostack)) }
}

/// Placeholder for non-AVR targets.
#[cfg(not(target_arch = "avr"))]
#[inline(always)]
fn cli() {
    core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
}

/// Placeholder for non-AVR targets.
#[cfg(not(target_arch = "avr"))]
#[inline(always)]
fn sei() {
    core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
}

impl InterruptControl for Sreg {
    #[inline(always)]
    fn disable(&self) -> bool {
        let was_enabled = Self::read().contains(SregFlags::I);
        cli();
        was_enabled
    }

    #[inline(always)]
    fn restore(&self, was_enabled: bool) {
        if was_enabled {
            sei();
        }
    }

    #[inline(always)]
    fn are_enabled(&self) -> bool {
        Self::read().contains(SregFlags::I)
    }
}
