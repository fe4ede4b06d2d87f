//! # Timestamp Extension
//!
//! Turns the 16-bit counter of a wrapping timer into a monotonic 64-bit tick
//! count. The overflow handler adds one modulus to an accumulator on every
//! wrap; a raw counter value is extended by adding it to the accumulator.
//!
//! ## Wrap Race
//!
//! A raw value read while the overflow interrupt is still pending may have
//! been taken before or after the wrap:
//!
//! ```text
//!   counter   ... 1021 1022 1023 |  0    1    2  ...
//!                                ^ wrap: overflow flag set,
//!                                  accumulator not yet advanced
//!
//!   raw >= modulus/2  ->  taken before the wrap, accumulator is right
//!   raw <  modulus/2  ->  taken after the wrap, one modulus is missing
//! ```
//!
//! The tie-break is only sound when the read happens less than half a counter
//! period after the wrap, which holds when capture outranks overflow and the
//! overflow handler runs within half a period.

use portable_atomic::{AtomicU64, Ordering};

/// Whether a raw value read with the overflow pending was taken after the wrap
#[inline]
pub const fn is_post_wrap(raw: u16, overflow_pending: bool, half_modulus: u16) -> bool {
    overflow_pending && raw < half_modulus
}

/// Extend a raw counter value against an accumulator
///
/// Pure form of [`TimestampExtender::extend`] for values sampled together.
#[inline]
pub const fn extend(accumulator: u64, raw: u16, overflow_pending: bool, modulus: u16) -> u64 {
    let base = accumulator + raw as u64;
    if is_post_wrap(raw, overflow_pending, modulus / 2) {
        base + modulus as u64
    } else {
        base
    }
}

/// Overflow accumulator of a wrapping counter
///
/// Only the overflow handler advances the accumulator. Everyone else reads.
#[derive(Debug)]
pub struct TimestampExtender {
    accumulator: AtomicU64,
    modulus: u16,
}

impl TimestampExtender {
    /// Create an extender for a counter wrapping at `modulus`
    pub const fn new(modulus: u16) -> Self {
        Self {
            accumulator: AtomicU64::new(0),
            modulus,
        }
    }

    /// Counter modulus
    #[inline]
    pub const fn modulus(&self) -> u16 {
        self.modulus
    }

    /// Ticks accounted for by completed wraps
    #[inline]
    pub fn accumulator(&self) -> u64 {
        self.accumulator.load(Ordering::Relaxed)
    }

    /// Account for one counter wrap
    #[inline]
    pub fn on_overflow(&self) {
        self.accumulator
            .fetch_add(u64::from(self.modulus), Ordering::Relaxed);
    }

    /// Extend a raw counter value
    #[inline]
    pub fn extend(&self, raw: u16, overflow_pending: bool) -> u64 {
        extend(self.accumulator(), raw, overflow_pending, self.modulus)
    }

    /// Forget all wraps
    ///
    /// Only call while the timer interrupts cannot run.
    pub fn reset(&self) {
        self.accumulator.store(0, Ordering::Relaxed);
    }
}
