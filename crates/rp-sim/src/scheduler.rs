//! Cancellable repeating-tick scheduler.
//!
//! The host frame loop holds a [`TickHandle`] and passes it back with every
//! frame.  Cancelling bumps the generation, so a handle issued before a
//! pause, reset or route switch is stale and its frames are ignored even if
//! the host delivers one more before noticing.

/// Ticket for one scheduled run of the repeating tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TickHandle {
    generation: u64,
}

impl TickHandle {
    pub fn generation(self) -> u64 {
        self.generation
    }
}

#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    generation: u64,
    active:     bool,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new run, cancelling any current one.
    pub fn schedule(&mut self) -> TickHandle {
        self.generation += 1;
        self.active = true;
        TickHandle { generation: self.generation }
    }

    /// Cancel the current run.  Idempotent.
    pub fn cancel(&mut self) {
        if self.active {
            self.generation += 1;
            self.active = false;
        }
    }

    pub fn is_current(&self, handle: TickHandle) -> bool {
        self.active && handle.generation == self.generation
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Handle of the current run, if any.
    pub fn current(&self) -> Option<TickHandle> {
        self.active.then_some(TickHandle { generation: self.generation })
    }
}
