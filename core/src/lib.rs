//! # Edgestamp Capture Engine
//!
//! Extended 64-bit timestamps from a wrapping hardware counter, and the duty
//! cycle and period of an external signal measured from its edges.
//!
//! ## Components
//!
//! - **Extension**: overflow accumulator and the wrap race correction
//! - **Edges**: last two rising edges and last falling edge
//! - **Measure**: duty/period arithmetic with the staleness window
//! - **Config**: prescaler, clock and capture window
//! - **Callback**: handlers invoked from interrupt context
//! - **Capture**: the [`InputCapture`] resource tying it all together
//!
//! ## Usage
//!
//! ```rust,ignore
//! let timer = Timer1::take().ok_or(...)?;
//! let capture = InputCapture::new(timer, Sreg)?;
//! capture.start(&CaptureConfig::default())?;
//!
//! let reading = capture.duty_and_period();
//! if reading.has_signal() {
//!     log::info!("duty {:.3} at {} Hz", reading.duty_cycle(), reading.frequency());
//! }
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod callback;
pub mod capture;
pub mod config;
pub mod edges;
pub mod error;
pub mod extension;
pub mod measure;

pub use callback::Callback;
pub use capture::InputCapture;
pub use config::{CaptureConfig, Timing};
pub use edges::EdgeSnapshot;
pub use error::{CaptureError, CaptureResult};
pub use measure::DutyPeriod;

static_assertions::const_assert_eq!(
    <edgestamp_hal::avr::Timer1 as edgestamp_hal::CaptureTimer>::HALF_MODULUS as u32 * 2,
    <edgestamp_hal::avr::Timer1 as edgestamp_hal::CaptureTimer>::MODULUS as u32
);
