//! # Edgestamp Hardware Abstraction Layer
//!
//! The HAL is the only place that knows about registers. It exposes the
//! handful of timer operations the capture engine needs and the interrupt
//! masking primitive used around foreground snapshots.
//!
//! ## Components
//!
//! - **Interrupts**: [`InterruptControl`] and the RAII [`InterruptGuard`]
//! - **Timer**: the [`CaptureTimer`] register protocol, [`Edge`], [`Prescaler`]
//! - **AVR**: ATmega328P Timer/Counter1 implementation of both traits
//! - **Mock**: simulated hardware for host-side testing (feature `mock`)
//!
//! ## Interrupt Model
//!
//! ```text
//!   priority   source                  writes
//!   ────────   ─────────────────────   ─────────────────────────────
//!   highest    input capture (CAPT)    edge timestamps
//!              overflow (OVF)          overflow accumulator
//!   lowest     foreground              nothing shared (reads only,
//!                                      inside an InterruptGuard)
//! ```

#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_arch = "avr", feature(asm_experimental_arch))]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

pub mod avr;
pub mod interrupts;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod timer;

pub use interrupts::{without_interrupts, InterruptControl, InterruptGuard};
pub use timer::{CaptureTimer, Edge, IrqSource, Prescaler};
