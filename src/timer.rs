//! Deadline timers, driven by the caller's clock
use crate::prelude::{Duration, Epoch};

/// [Timer] expires at a deadline expressed as an [Epoch].
/// It never reads the system clock: the current [Epoch] is always
/// provided by the caller, which keeps replays deterministic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Timer {
    periodic: bool,
    interval: Duration,
    deadline: Option<Epoch>,
}

impl Timer {
    /// Builds a stopped [Timer] that re-arms itself on every expiration
    pub fn periodic() -> Self {
        Self {
            periodic: true,
            interval: Duration::ZERO,
            deadline: None,
        }
    }

    /// Builds a stopped [Timer] that expires only once
    pub fn single_shot() -> Self {
        Self {
            periodic: false,
            interval: Duration::ZERO,
            deadline: None,
        }
    }

    /// (Re)starts this [Timer]: first expiration at `now` + `interval`.
    /// Periodic timers are not armed with a null interval.
    pub fn start(&mut self, now: Epoch, interval: Duration) {
        self.interval = interval;
        if self.periodic && interval <= Duration::ZERO {
            self.deadline = None;
        } else {
            self.deadline = Some(now + interval);
        }
    }

    pub fn stop(&mut self) {
        self.deadline = None;
    }

    pub fn is_active(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Epoch> {
        self.deadline
    }

    /// Returns the deadline that expired at `now`, if any.
    /// Periodic timers are re-armed one interval after the expired deadline,
    /// single shot timers are stopped.
    pub fn expire(&mut self, now: Epoch) -> Option<Epoch> {
        let deadline = self.deadline?;
        if deadline > now {
            return None;
        }
        self.deadline = if self.periodic {
            Some(deadline + self.interval)
        } else {
            None
        };
        Some(deadline)
    }
}
