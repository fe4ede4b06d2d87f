//! # Simulated Capture Hardware
//!
//! [`MockMcu`] stands in for both the capture timer and the global interrupt
//! enable, so host tests can drive counter wraps and input edges by hand and
//! check the order in which the engine touches registers.
//!
//! The model follows Timer/Counter1 semantics:
//!
//! - the counter wraps at [`MockMcu::MODULUS`] and sets the overflow flag
//! - a transition on the input latches the counter only if it matches the
//!   armed edge, and sets the capture flag
//! - a pending capture outranks a pending overflow, unless the mock was built
//!   with [`MockMcu::with_overflow_priority`]

use portable_atomic::{AtomicBool, AtomicU16, AtomicU32, AtomicU8, Ordering};
use spin::Mutex;

use crate::interrupts::InterruptControl;
use crate::timer::{CaptureTimer, Edge, IrqSource, Prescaler};

/// Maximum number of operations kept in the trace
pub const TRACE_CAPACITY: usize = 64;

// =============================================================================
// Register Trace
// =============================================================================

/// One register-level operation performed on the mock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOp {
    /// Live counter read
    ReadCounter,
    /// Capture register read
    ReadCapture,
    /// Armed edge read
    ReadEdge,
    /// Armed edge toggled
    ToggleEdge,
    /// Capture flag cleared
    ClearCaptureFlag,
    /// Overflow flag read
    ReadOverflowFlag,
    /// Timer started
    Start(Prescaler),
    /// Timer stopped
    Stop,
    /// Global interrupts disabled
    DisableInterrupts,
    /// Global interrupt state restored
    RestoreInterrupts,
}

/// Fixed-size record of register operations
#[derive(Debug, Clone, Copy)]
pub struct Trace {
    ops: [Option<RegisterOp>; TRACE_CAPACITY],
    len: usize,
    dropped: usize,
}

impl Trace {
    const fn new() -> Self {
        Self {
            ops: [None; TRACE_CAPACITY],
            len: 0,
            dropped: 0,
        }
    }

    fn push(&mut self, op: RegisterOp) {
        if self.len < TRACE_CAPACITY {
            self.ops[self.len] = Some(op);
            self.len += 1;
        } else {
            self.dropped += 1;
        }
    }

    /// Number of recorded operations
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Operations that did not fit
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Recorded operations in order
    pub fn iter(&self) -> impl Iterator<Item = RegisterOp> + '_ {
        self.ops[..self.len].iter().flatten().copied()
    }

    /// Index of the first occurrence of an operation
    pub fn position(&self, op: RegisterOp) -> Option<usize> {
        self.iter().position(|recorded| recorded == op)
    }

    /// Number of occurrences of an operation
    pub fn count(&self, op: RegisterOp) -> usize {
        self.iter().filter(|recorded| *recorded == op).count()
    }
}

// =============================================================================
// Mock MCU
// =============================================================================

/// Simulated Timer/Counter1 plus global interrupt enable
#[derive(Debug)]
pub struct MockMcu {
    counter: AtomicU16,
    capture: AtomicU16,
    armed_rising: AtomicBool,
    capture_flag: AtomicBool,
    overflow_flag: AtomicBool,
    clock_select: AtomicU8,
    timer_irqs_enabled: AtomicBool,
    global_irqs_enabled: AtomicBool,
    critical_sections: AtomicU32,
    capture_outranks_overflow: bool,
    trace: Mutex<Trace>,
}

impl MockMcu {
    /// Counter modulus, matching Timer/Counter1 in fast PWM 10-bit mode
    pub const MODULUS: u16 = 1024;

    /// Create a stopped timer with global interrupts enabled
    pub const fn new() -> Self {
        Self::build(true)
    }

    /// Create a timer whose overflow interrupt outranks input capture
    pub const fn with_overflow_priority() -> Self {
        Self::build(false)
    }

    const fn build(capture_outranks_overflow: bool) -> Self {
        Self {
            counter: AtomicU16::new(0),
            capture: AtomicU16::new(0),
            armed_rising: AtomicBool::new(false),
            capture_flag: AtomicBool::new(false),
            overflow_flag: AtomicBool::new(false),
            clock_select: AtomicU8::new(Prescaler::NoClock as u8),
            timer_irqs_enabled: AtomicBool::new(false),
            global_irqs_enabled: AtomicBool::new(true),
            critical_sections: AtomicU32::new(0),
            capture_outranks_overflow,
            trace: Mutex::new(Trace::new()),
        }
    }

    fn record(&self, op: RegisterOp) {
        self.trace.lock().push(op);
    }

    // -------------------------------------------------------------------------
    // Stimulus
    // -------------------------------------------------------------------------

    /// Set the live counter without raising any flag
    pub fn set_counter(&self, value: u16) {
        self.counter.store(value % Self::MODULUS, Ordering::Relaxed);
    }

    /// Advance the counter, setting the overflow flag on every wrap
    ///
    /// Returns the number of wraps.
    pub fn advance(&self, ticks: u32) -> u32 {
        let total = u32::from(self.counter.load(Ordering::Relaxed)) + ticks;
        let modulus = u32::from(Self::MODULUS);
        let wraps = total / modulus;
        self.counter.store((total % modulus) as u16, Ordering::Relaxed);
        if wraps > 0 {
            self.overflow_flag.store(true, Ordering::Relaxed);
        }
        wraps
    }

    /// Apply an input transition at the current counter value
    ///
    /// Latches the counter only when the transition matches the armed edge.
    /// Returns whether a capture was latched.
    pub fn input(&self, edge: Edge) -> bool {
        if self.armed_edge() != edge {
            return false;
        }
        self.latch(self.counter.load(Ordering::Relaxed));
        true
    }

    /// Latch a capture value directly and raise the capture flag
    pub fn latch(&self, value: u16) {
        self.capture.store(value % Self::MODULUS, Ordering::Relaxed);
        self.capture_flag.store(true, Ordering::Relaxed);
    }

    /// Arm the capture unit for a specific edge
    pub fn arm(&self, edge: Edge) {
        self.armed_rising.store(edge.is_rising(), Ordering::Relaxed);
    }

    /// Clear the flag of an interrupt whose vector is being entered
    ///
    /// Timer/Counter1 does this in hardware when it jumps to the vector.
    pub fn acknowledge(&self, source: IrqSource) {
        match source {
            IrqSource::Capture => self.capture_flag.store(false, Ordering::Relaxed),
            IrqSource::Overflow => self.overflow_flag.store(false, Ordering::Relaxed),
        }
    }

    /// Force the overflow flag
    pub fn set_overflow_pending(&self, pending: bool) {
        self.overflow_flag.store(pending, Ordering::Relaxed);
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    /// Edge the capture unit is armed for, without tracing
    pub fn armed_edge(&self) -> Edge {
        if self.armed_rising.load(Ordering::Relaxed) {
            Edge::Rising
        } else {
            Edge::Falling
        }
    }

    /// Check the capture flag
    pub fn capture_pending(&self) -> bool {
        self.capture_flag.load(Ordering::Relaxed)
    }

    /// Check the overflow flag, without tracing
    pub fn overflow_flag(&self) -> bool {
        self.overflow_flag.load(Ordering::Relaxed)
    }

    /// Current clock selection
    pub fn prescaler(&self) -> Prescaler {
        let raw = self.clock_select.load(Ordering::Relaxed);
        Prescaler::ALL
            .get(raw as usize)
            .copied()
            .unwrap_or(Prescaler::NoClock)
    }

    /// Check if the counter is clocked
    pub fn is_running(&self) -> bool {
        self.prescaler().is_clocked()
    }

    /// Check if the timer interrupt sources are enabled
    pub fn timer_interrupts_enabled(&self) -> bool {
        self.timer_irqs_enabled.load(Ordering::Relaxed)
    }

    /// Number of times global interrupts were disabled
    pub fn critical_sections(&self) -> u32 {
        self.critical_sections.load(Ordering::Relaxed)
    }

    /// Highest priority interrupt that would be serviced now
    pub fn next_pending(&self) -> Option<IrqSource> {
        if !self.global_irqs_enabled.load(Ordering::Relaxed) || !self.timer_interrupts_enabled() {
            return None;
        }
        let capture = self.capture_pending().then_some(IrqSource::Capture);
        let overflow = self.overflow_flag().then_some(IrqSource::Overflow);
        if self.capture_outranks_overflow {
            capture.or(overflow)
        } else {
            overflow.or(capture)
        }
    }

    /// Copy of the register trace
    pub fn trace(&self) -> Trace {
        *self.trace.lock()
    }

    /// Forget recorded operations
    pub fn clear_trace(&self) {
        *self.trace.lock() = Trace::new();
    }
}

impl Default for MockMcu {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureTimer for MockMcu {
    const MODULUS: u16 = MockMcu::MODULUS;

    fn capture_outranks_overflow(&self) -> bool {
        self.capture_outranks_overflow
    }

    fn counter(&self) -> u16 {
        self.record(RegisterOp::ReadCounter);
        self.counter.load(Ordering::Relaxed)
    }

    fn capture_value(&self) -> u16 {
        self.record(RegisterOp::ReadCapture);
        self.capture.load(Ordering::Relaxed)
    }

    fn capture_edge(&self) -> Edge {
        self.record(RegisterOp::ReadEdge);
        self.armed_edge()
    }

    fn toggle_capture_edge(&self) {
        self.record(RegisterOp::ToggleEdge);
        self.armed_rising.fetch_xor(true, Ordering::Relaxed);
    }

    fn clear_capture_flag(&self) {
        self.record(RegisterOp::ClearCaptureFlag);
        self.capture_flag.store(false, Ordering::Relaxed);
    }

    fn overflow_pending(&self) -> bool {
        self.record(RegisterOp::ReadOverflowFlag);
        self.overflow_flag()
    }

    fn start(&self, prescaler: Prescaler) {
        self.record(RegisterOp::Start(prescaler));
        self.counter.store(0, Ordering::Relaxed);
        self.capture_flag.store(false, Ordering::Relaxed);
        self.overflow_flag.store(false, Ordering::Relaxed);
        self.armed_rising.store(true, Ordering::Relaxed);
        self.clock_select.store(prescaler as u8, Ordering::Relaxed);
        self.timer_irqs_enabled.store(true, Ordering::Relaxed);
    }

    fn stop(&self) {
        self.record(RegisterOp::Stop);
        self.timer_irqs_enabled.store(false, Ordering::Relaxed);
        self.clock_select.store(Prescaler::NoClock as u8, Ordering::Relaxed);
    }
}

impl InterruptControl for MockMcu {
    fn disable(&self) -> bool {
        self.record(RegisterOp::DisableInterrupts);
        self.critical_sections.fetch_add(1, Ordering::Relaxed);
        self.global_irqs_enabled.swap(false, Ordering::Relaxed)
    }

    fn restore(&self, was_enabled: bool) {
        self.record(RegisterOp::RestoreInterrupts);
        if was_enabled {
            self.global_irqs_enabled.store(true, Ordering::Relaxed);
        }
    }

    fn are_enabled(&self) -> bool {
        self.global_irqs_enabled.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interrupts::InterruptGuard;

    #[test]
    fn test_advance_sets_overflow_flag() {
        let mcu = MockMcu::new();
        assert_eq!(mcu.advance(1000), 0);
        assert!(!mcu.overflow_flag());
        assert_eq!(mcu.advance(30), 1);
        assert!(mcu.overflow_flag());
        assert_eq!(mcu.counter(), 6);
    }

    #[test]
    fn test_input_respects_armed_edge() {
        let mcu = MockMcu::new();
        mcu.start(Prescaler::Div8);
        mcu.set_counter(300);
        assert!(!mcu.input(Edge::Falling));
        assert!(mcu.input(Edge::Rising));
        assert!(mcu.capture_pending());
        assert_eq!(mcu.capture_value(), 300);
    }

    #[test]
    fn test_arm_selects_latching_edge() {
        let mcu = MockMcu::new();
        mcu.set_counter(42);
        mcu.arm(Edge::Falling);
        assert!(!mcu.input(Edge::Rising));
        assert!(!mcu.capture_pending());
        assert!(mcu.input(Edge::Falling));
        assert_eq!(mcu.capture_value(), 42);

        mcu.arm(Edge::Rising);
        assert_eq!(mcu.armed_edge(), Edge::Rising);
    }

    #[test]
    fn test_next_pending_priority() {
        let mcu = MockMcu::new();
        mcu.start(Prescaler::Div1);
        mcu.latch(10);
        mcu.set_overflow_pending(true);
        assert_eq!(mcu.next_pending(), Some(IrqSource::Capture));

        let inverted = MockMcu::with_overflow_priority();
        inverted.start(Prescaler::Div1);
        inverted.latch(10);
        inverted.set_overflow_pending(true);
        assert_eq!(inverted.next_pending(), Some(IrqSource::Overflow));
    }

    #[test]
    fn test_nothing_pending_while_masked() {
        let mcu = MockMcu::new();
        mcu.start(Prescaler::Div1);
        mcu.latch(10);
        let guard = InterruptGuard::new(&mcu);
        assert_eq!(mcu.next_pending(), None);
        drop(guard);
        assert_eq!(mcu.next_pending(), Some(IrqSource::Capture));
    }

    #[test]
    fn test_acknowledge_clears_only_its_flag() {
        let mcu = MockMcu::new();
        mcu.latch(7);
        mcu.set_overflow_pending(true);
        mcu.acknowledge(IrqSource::Overflow);
        assert!(!mcu.overflow_flag());
        assert!(mcu.capture_pending());
        mcu.acknowledge(IrqSource::Capture);
        assert!(!mcu.capture_pending());
    }

    #[test]
    fn test_stop_removes_clock() {
        let mcu = MockMcu::new();
        mcu.start(Prescaler::Div64);
        assert_eq!(mcu.prescaler(), Prescaler::Div64);
        mcu.stop();
        assert!(!mcu.is_running());
        assert!(!mcu.timer_interrupts_enabled());
    }

    #[test]
    fn test_trace_order_and_capacity() {
        let mcu = MockMcu::new();
        mcu.capture_edge();
        mcu.toggle_capture_edge();
        let trace = mcu.trace();
        assert_eq!(trace.position(RegisterOp::ReadEdge), Some(0));
        assert_eq!(trace.position(RegisterOp::ToggleEdge), Some(1));

        mcu.clear_trace();
        for _ in 0..TRACE_CAPACITY + 3 {
            mcu.counter();
        }
        let trace = mcu.trace();
        assert_eq!(trace.len(), TRACE_CAPACITY);
        assert_eq!(trace.dropped(), 3);
    }
}
