use std::cell::Cell;

/// Flag that marks a programmatic state update in progress.
///
/// While engaged, user-trigger dispatch for the owning button is a no-op, so
/// syncing the checked state from machine status never echoes back as the
/// command that state reflects.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    engaged: Cell<bool>,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged.get()
    }

    /// Engages the guard until the returned scope is dropped
    pub fn engage(&self) -> GuardScope<'_> {
        let previous = self.engaged.replace(true);
        GuardScope {
            guard: self,
            previous,
        }
    }

    /// Runs `f` with the guard engaged
    pub fn with_guard<R>(&self, f: impl FnOnce() -> R) -> R {
        let _scope = self.engage();
        f()
    }
}

/// Releases the guard on drop, restoring the value it had when engaged
#[must_use = "the guard is released as soon as the scope is dropped"]
#[derive(Debug)]
pub struct GuardScope<'a> {
    guard: &'a ReentrancyGuard,
    previous: bool,
}

impl Drop for GuardScope<'_> {
    fn drop(&mut self) {
        self.guard.engaged.set(self.previous);
    }
}
