//! # ATmega328P Support
//!
//! Timer/Counter1 input capture and global interrupt control for the
//! ATmega328P (Arduino Uno class boards).
//!
//! ## Timer/Counter1 Configuration
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  mode          fast PWM, 10-bit (WGM13:0 = 0b0111)           │
//! │  TOP           0x03FF, overflow every 1024 ticks             │
//! │  input         ICP1, noise canceller on (4 clock delay)      │
//! │  first edge    rising (ICES1 = 1), toggled on every capture  │
//! │  interrupts    TIMER1_CAPT (vector 10), TIMER1_OVF (vec 13)  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lower vector numbers win when several interrupts are pending, so a
//! pending capture is always serviced before a pending overflow.

pub mod interrupts;
pub mod registers;
pub mod timer1;

pub use interrupts::Sreg;
pub use timer1::Timer1;

/// Board system clock (Arduino Uno crystal)
pub const CLOCK_HZ: u32 = 16_000_000;

/// TIMER1_CAPT interrupt vector number
pub const TIMER1_CAPT_VECTOR: u8 = 10;

/// TIMER1_OVF interrupt vector number
pub const TIMER1_OVF_VECTOR: u8 = 13;

// =============================================================================
// Compile-time Assertions
// =============================================================================

static_assertions::const_assert!(TIMER1_CAPT_VECTOR < TIMER1_OVF_VECTOR);
