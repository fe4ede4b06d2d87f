//! # Interrupt Masking
//!
//! Foreground code occasionally needs several fields that interrupt handlers
//! write to be read as one consistent set. The only tool for that is to defer
//! interrupt delivery for the duration of the reads.
//!
//! [`InterruptGuard`] disables delivery when created and restores the
//! previous state when dropped, so every exit path (early return, `?`,
//! panic unwinding on hosted targets) re-enables interrupts exactly once.
//! Guards nest: an inner guard sees interrupts already disabled and leaves
//! them disabled on drop.

// =============================================================================
// Interrupt Control
// =============================================================================

/// Platform control over global interrupt delivery
///
/// Implementors mask and unmask every interrupt source the capture engine
/// cares about. Interrupt handlers never call these; only foreground code
/// does, through [`InterruptGuard`].
pub trait InterruptControl {
    /// Disable interrupt delivery
    ///
    /// Returns the previous state (`true` if interrupts were enabled).
    fn disable(&self) -> bool;

    /// Restore the state returned by a matching [`disable`](Self::disable)
    fn restore(&self, was_enabled: bool);

    /// Check if interrupts are currently enabled
    fn are_enabled(&self) -> bool;
}

impl<I: InterruptControl + ?Sized> InterruptControl for &I {
    #[inline]
    fn disable(&self) -> bool {
        (**self).disable()
    }

    #[inline]
    fn restore(&self, was_enabled: bool) {
        (**self).restore(was_enabled)
    }

    #[inline]
    fn are_enabled(&self) -> bool {
        (**self).are_enabled()
    }
}

// =============================================================================
// Interrupt State Guard
// =============================================================================

/// RAII guard for interrupt state
///
/// Disables interrupts when created, restores previous state when dropped.
#[must_use = "interrupts are re-enabled as soon as the guard is dropped"]
pub struct InterruptGuard<'a, I: InterruptControl + ?Sized> {
    /// Controller the guard acts on
    control: &'a I,
    /// Whether interrupts were enabled before this guard was created
    was_enabled: bool,
}

impl<'a, I: InterruptControl + ?Sized> InterruptGuard<'a, I> {
    /// Create a new interrupt guard, disabling interrupts
    #[inline]
    pub fn new(control: &'a I) -> Self {
        Self {
            was_enabled: control.disable(),
            control,
        }
    }

    /// Whether interrupts were enabled when the guard was taken
    #[inline]
    pub fn was_enabled(&self) -> bool {
        self.was_enabled
    }
}

impl<I: InterruptControl + ?Sized> Drop for InterruptGuard<'_, I> {
    #[inline]
    fn drop(&mut self) {
        self.control.restore(self.was_enabled);
    }
}

impl<I: InterruptControl + ?Sized> core::fmt::Debug for InterruptGuard<'_, I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InterruptGuard")
            .field("was_enabled", &self.was_enabled)
            .finish()
    }
}

/// Execute a closure with interrupts disabled
///
/// Restores the previous interrupt state after the closure returns.
#[inline]
pub fn without_interrupts<I, F, R>(control: &I, f: F) -> R
where
    I: InterruptControl + ?Sized,
    F: FnOnce() -> R,
{
    let _guard = InterruptGuard::new(control);
    f()
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;

    /// Single-context controller that counts transitions
    struct Flag {
        enabled: Cell<bool>,
        disables: Cell<u32>,
    }

    impl Flag {
        fn new(enabled: bool) -> Self {
            Self {
                enabled: Cell::new(enabled),
                disables: Cell::new(0),
            }
        }
    }

    impl InterruptControl for Flag {
        fn disable(&self) -> bool {
            self.disables.set(self.disables.get() + 1);
            self.enabled.replace(false)
        }

        fn restore(&self, was_enabled: bool) {
            if was_enabled {
                self.enabled.set(true);
            }
        }

        fn are_enabled(&self) -> bool {
            self.enabled.get()
        }
    }

    #[test]
    fn test_guard_restores_on_drop() {
        let flag = Flag::new(true);
        {
            let guard = InterruptGuard::new(&flag);
            assert!(guard.was_enabled());
            assert!(!flag.are_enabled());
        }
        assert!(flag.are_enabled());
        assert_eq!(flag.disables.get(), 1);
    }

    #[test]
    fn test_nested_guards_keep_outer_state() {
        let flag = Flag::new(true);
        let outer = InterruptGuard::new(&flag);
        {
            let inner = InterruptGuard::new(&flag);
            assert!(!inner.was_enabled());
        }
        assert!(!flag.are_enabled());
        drop(outer);
        assert!(flag.are_enabled());
    }

    #[test]
    fn test_guard_does_not_enable_when_previously_disabled() {
        let flag = Flag::new(false);
        drop(InterruptGuard::new(&flag));
        assert!(!flag.are_enabled());
    }

    #[test]
    fn test_without_interrupts_early_return() {
        let flag = Flag::new(true);
        let lookup = |key: u8| -> Option<u8> {
            without_interrupts(&flag, || {
                assert!(!flag.are_enabled());
                if key == 0 {
                    return None;
                }
                Some(key * 2)
            })
        };
        assert_eq!(lookup(0), None);
        assert!(flag.are_enabled());
        assert_eq!(lookup(4), Some(8));
        assert!(flag.are_enabled());
        assert_eq!(flag.disables.get(), 2);
    }
}
