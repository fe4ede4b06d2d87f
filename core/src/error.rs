//! # Capture Errors

/// Errors reported by the capture engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureError {
    /// The timer services overflow before input capture, so captures that
    /// race a wrap cannot be corrected
    PriorityInversion,
    /// Capture window is not a positive finite number of seconds
    InvalidCaptureWindow,
    /// Input clock frequency is zero
    InvalidClock,
    /// Capture window is shorter than one counter tick
    WindowTooShort,
}

impl core::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CaptureError::PriorityInversion => {
                write!(f, "overflow interrupt outranks input capture")
            },
            CaptureError::InvalidCaptureWindow => write!(f, "capture window must be positive"),
            CaptureError::InvalidClock => write!(f, "input clock frequency is zero"),
            CaptureError::WindowTooShort => write!(f, "capture window is shorter than one tick"),
        }
    }
}

/// Result type for capture operations
pub type CaptureResult<T> = Result<T, CaptureError>;
