/// Milliseconds on the caller's clock. The engine never reads wall time.
pub type Millis = u64;

/// A single cancellable deferred task, driven by an external clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduledTask {
    due_at: Option<Millis>,
}

impl ScheduledTask {
    /// Arms (or re-arms) the task to fire `delay` after `now`.
    pub fn schedule(&mut self, now: Millis, delay: Millis) {
        self.due_at = Some(now.saturating_add(delay));
    }

    pub fn cancel(&mut self) {
        self.due_at = None;
    }

    pub fn is_pending(&self) -> bool {
        self.due_at.is_some()
    }

    pub fn due_at(&self) -> Option<Millis> {
        self.due_at
    }

    /// Disarms and returns `true` once `now` has reached the deadline.
    pub fn take_due(&mut self, now: Millis) -> bool {
        match self.due_at {
            Some(due) if now >= due => {
                self.due_at = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_at_deadline() {
        let mut task = ScheduledTask::default();
        task.schedule(100, 700);
        assert!(task.is_pending());
        assert!(!task.take_due(799));
        assert!(task.take_due(800));
        assert!(!task.take_due(900));
        assert!(!task.is_pending());
    }

    #[test]
    fn cancel_and_reschedule() {
        let mut task = ScheduledTask::default();
        task.schedule(0, 700);
        task.cancel();
        assert!(!task.take_due(10_000));

        task.schedule(0, 700);
        task.schedule(500, 1400);
        assert_eq!(task.due_at(), Some(1900));
        assert!(!task.take_due(1000));
    }
}
