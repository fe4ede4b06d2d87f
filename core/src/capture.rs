//! # Input Capture Engine
//!
//! [`InputCapture`] owns the capture timer and the interrupt control and
//! holds all shared state: the overflow accumulator, the edge timestamps,
//! the derived timing and the two callbacks.
//!
//! ## Contexts
//!
//! ```text
//!   CAPT vector ──► on_capture()  ──► edges      ──┐
//!   OVF vector  ──► on_overflow() ──► accumulator ─┤
//!                                                  ▼
//!   foreground  ──► duty_and_period() : [guard] sample ──► arithmetic
//! ```
//!
//! The interrupt handlers never mask interrupts; the foreground masks them
//! only while it samples the accumulator, the edges and the live counter.
//!
//! ## Platform Shim
//!
//! The engine is meant to live in a `static` and be driven by the vector
//! table:
//!
//! ```rust,ignore
//! static CAPTURE: spin::Once<InputCapture<Timer1, Sreg>> = spin::Once::new();
//!
//! // Installed at TIMER1_CAPT by the platform
//! fn timer1_capt() {
//!     if let Some(capture) = CAPTURE.get() {
//!         capture.dispatch(IrqSource::Capture);
//!     }
//! }
//! ```

use edgestamp_hal::{without_interrupts, CaptureTimer, InterruptControl, InterruptGuard, IrqSource};
use spin::RwLock;

use crate::callback::{Callback, CallbackSlot};
use crate::config::{CaptureConfig, Timing};
use crate::edges::{EdgeSnapshot, EdgeTimestamps};
use crate::error::{CaptureError, CaptureResult};
use crate::extension::{self, TimestampExtender};
use crate::measure::{self, DutyPeriod, Sample};

/// Input capture resource
#[derive(Debug)]
pub struct InputCapture<T, I> {
    timer: T,
    irq: I,
    extender: TimestampExtender,
    edges: EdgeTimestamps,
    timing: RwLock<Timing>,
    overflow_callback: CallbackSlot,
    capture_callback: CallbackSlot,
}

impl<T: CaptureTimer, I: InterruptControl> InputCapture<T, I> {
    /// Take ownership of a capture timer
    ///
    /// Fails if the timer services overflow before input capture, since
    /// captures racing a wrap would then be counted twice.
    pub fn new(timer: T, irq: I) -> CaptureResult<Self> {
        if !timer.capture_outranks_overflow() {
            log::error!("InputCapture: Overflow interrupt outranks input capture");
            return Err(CaptureError::PriorityInversion);
        }

        Ok(Self {
            timer,
            irq,
            extender: TimestampExtender::new(T::MODULUS),
            edges: EdgeTimestamps::new(),
            timing: RwLock::new(Timing::DISABLED),
            overflow_callback: CallbackSlot::new(),
            capture_callback: CallbackSlot::new(),
        })
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Derive timing, reset all timestamps and start the timer
    ///
    /// Selecting no clock is not an error: the timer is left untouched and
    /// queries keep returning what they returned before.
    pub fn start(&self, config: &CaptureConfig) -> CaptureResult<()> {
        let Some(timing) = config.timing()? else {
            log::warn!("InputCapture: No clock selected, timer left disabled");
            return Ok(());
        };

        // Handlers read the timing; write it only while masked.
        without_interrupts(&self.irq, || {
            *self.timing.write() = timing;
            self.extender.reset();
            self.edges.reset();
            self.timer.start(timing.prescaler);
        });

        log::info!(
            "InputCapture: Started at {} ({} ns/tick, window {} ticks)",
            timing.prescaler,
            (timing.tick_time * 1e9) as u64,
            timing.window_ticks
        );
        Ok(())
    }

    /// Disable the timer interrupts and remove the clock
    ///
    /// Timestamps and timing are kept.
    pub fn stop(&self) {
        self.timer.stop();
        log::info!("InputCapture: Stopped");
    }

    /// Stop the timer and give back the hardware
    pub fn release(self) -> (T, I) {
        self.stop();
        let Self { timer, irq, .. } = self;
        (timer, irq)
    }

    // =========================================================================
    // Interrupt Handlers
    // =========================================================================

    /// Overflow interrupt handler
    #[inline]
    pub fn on_overflow(&self) {
        self.extender.on_overflow();
        self.overflow_callback.invoke();
    }

    /// Input capture interrupt handler
    #[inline]
    pub fn on_capture(&self) {
        let edge = self.timer.capture_edge();
        let raw = self.timer.capture_value();
        self.timer.toggle_capture_edge();
        self.timer.clear_capture_flag();

        let timestamp = self.extender.extend(raw, self.timer.overflow_pending());
        self.edges.record(edge, timestamp);

        self.capture_callback.invoke();
    }

    /// Route an interrupt to its handler
    #[inline]
    pub fn dispatch(&self, source: IrqSource) {
        match source {
            IrqSource::Capture => self.on_capture(),
            IrqSource::Overflow => self.on_overflow(),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    fn sample(&self) -> Sample {
        let (accumulator, edges, counter, overflow_pending) = {
            let _guard = InterruptGuard::new(&self.irq);
            (
                self.extender.accumulator(),
                self.edges.snapshot(),
                self.timer.counter(),
                self.timer.overflow_pending(),
            )
        };

        Sample {
            now: extension::extend(accumulator, counter, overflow_pending, T::MODULUS),
            edges,
        }
    }

    /// Duty and period of the captured signal
    ///
    /// All zero when the last rising edge is older than the capture window.
    pub fn duty_and_period(&self) -> DutyPeriod {
        let sample = self.sample();
        let timing = *self.timing.read();
        measure::duty_and_period(&sample, &timing)
    }

    /// Current extended timestamp
    pub fn now(&self) -> u64 {
        self.sample().now
    }

    /// Last captured edge timestamps
    pub fn edges(&self) -> EdgeSnapshot {
        without_interrupts(&self.irq, || self.edges.snapshot())
    }

    /// Ticks accounted for by completed wraps
    pub fn accumulator(&self) -> u64 {
        self.extender.accumulator()
    }

    /// Timing derived by the last successful [`InputCapture::start`]
    pub fn timing(&self) -> Timing {
        *self.timing.read()
    }

    /// Seconds per counter tick, 0 before start
    pub fn tick_time(&self) -> f64 {
        self.timing.read().tick_time
    }

    /// Capture window in seconds, as rounded down to whole ticks
    pub fn capture_window(&self) -> f64 {
        self.timing.read().capture_window()
    }

    // =========================================================================
    // Callbacks
    // =========================================================================

    /// Install the handler run at the end of every overflow interrupt
    pub fn set_overflow_callback(&self, handler: Callback) {
        without_interrupts(&self.irq, || self.overflow_callback.set(handler));
        log::debug!("InputCapture: Overflow callback installed");
    }

    /// Remove the overflow handler
    pub fn clear_overflow_callback(&self) {
        without_interrupts(&self.irq, || self.overflow_callback.clear());
        log::debug!("InputCapture: Overflow callback removed");
    }

    /// Install the handler run at the end of every capture interrupt
    ///
    /// The handler sees the edge that was just recorded.
    pub fn set_input_capture_callback(&self, handler: Callback) {
        without_interrupts(&self.irq, || self.capture_callback.set(handler));
        log::debug!("InputCapture: Capture callback installed");
    }

    /// Remove the capture handler
    pub fn clear_input_capture_callback(&self) {
        without_interrupts(&self.irq, || self.capture_callback.clear());
        log::debug!("InputCapture: Capture callback removed");
    }
}
