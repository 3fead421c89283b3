//! Recurring timer abstraction
//!
//! The controller never sleeps. It asks the host for an interval timer and
//! the host calls [`crate::PlaybackController::handle_timer`] on each tick.

use std::time::Duration;

use crate::types::TimerId;

/// Host timer service
pub trait Scheduler: Send {
    /// Start a timer that fires every `period` until cancelled
    fn start_interval(&mut self, period: Duration) -> TimerId;

    /// Stop a timer; unknown or already cancelled ids are ignored
    fn cancel(&mut self, id: TimerId);
}
