//! # Interrupt Callbacks
//!
//! A [`CallbackSlot`] holds at most one handler that is invoked from
//! interrupt context. Handlers are `'static` references so invoking one
//! never allocates or drops anything.

use spin::RwLock;

/// Handler invoked from interrupt context
pub type Callback = &'static (dyn Fn() + Sync);

/// Single handler slot shared with an interrupt handler
pub struct CallbackSlot {
    handler: RwLock<Option<Callback>>,
}

impl CallbackSlot {
    /// Create an empty slot
    pub const fn new() -> Self {
        Self {
            handler: RwLock::new(None),
        }
    }

    /// Install a handler, replacing any previous one
    ///
    /// Must not run while the owning interrupt can fire, or that interrupt
    /// skips the handler once.
    pub fn set(&self, handler: Callback) {
        *self.handler.write() = Some(handler);
    }

    /// Remove the handler
    pub fn clear(&self) {
        *self.handler.write() = None;
    }

    /// Check if a handler is installed
    pub fn is_set(&self) -> bool {
        self.handler.read().is_some()
    }

    /// Invoke the handler, if any
    ///
    /// Never spins: if the slot is being written, the call is skipped.
    /// Returns whether a handler ran.
    #[inline]
    pub fn invoke(&self) -> bool {
        let handler = match self.handler.try_read() {
            Some(guard) => *guard,
            None => return false,
        };
        match handler {
            Some(handler) => {
                handler();
                true
            },
            None => false,
        }
    }
}

impl Default for CallbackSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for CallbackSlot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = match self.handler.try_read() {
            Some(guard) if guard.is_some() => "set",
            Some(_) => "empty",
            None => "locked",
        };
        f.debug_struct("CallbackSlot").field("handler", &state).finish()
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[test]
    fn test_empty_slot_does_nothing() {
        let slot = CallbackSlot::new();
        assert!(!slot.is_set());
        assert!(!slot.invoke());
    }

    #[test]
    fn test_invoke_runs_handler() {
        static HITS: AtomicU32 = AtomicU32::new(0);
        fn bump() {
            HITS.fetch_add(1, Ordering::Relaxed);
        }

        let slot = CallbackSlot::new();
        slot.set(&bump);
        assert!(slot.is_set());
        assert!(slot.invoke());
        assert!(slot.invoke());
        assert_eq!(HITS.load(Ordering::Relaxed), 2);

        slot.clear();
        assert!(!slot.invoke());
        assert_eq!(HITS.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_invoke_skips_while_writing() {
        static HITS: AtomicU32 = AtomicU32::new(0);
        fn bump() {
            HITS.fetch_add(1, Ordering::Relaxed);
        }

        let slot = CallbackSlot::new();
        slot.set(&bump);
        let writer = slot.handler.write();
        assert!(!slot.invoke());
        drop(writer);
        assert!(slot.invoke());
        assert_eq!(HITS.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_set_replaces_handler() {
        static FIRST: AtomicU32 = AtomicU32::new(0);
        static SECOND: AtomicU32 = AtomicU32::new(0);
        fn first() {
            FIRST.fetch_add(1, Ordering::Relaxed);
        }
        fn second() {
            SECOND.fetch_add(1, Ordering::Relaxed);
        }

        let slot = CallbackSlot::new();
        slot.set(&first);
        slot.set(&second);
        slot.invoke();
        assert_eq!(FIRST.load(Ordering::Relaxed), 0);
        assert_eq!(SECOND.load(Ordering::Relaxed), 1);
    }
}
