use std::time::{Duration, Instant};

/// Single-slot deferred task. Scheduling replaces whatever is pending, so a burst of
/// schedules collapses into one delivery of the latest payload after `quiet` has passed.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    pub fn schedule(&mut self, now: Instant, payload: T) {
        self.pending = Some((now + self.quiet, payload));
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, payload)| payload)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Hands out the payload once its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        let due = matches!(&self.pending, Some((deadline, _)) if now >= *deadline);
        if due { self.cancel() } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_collapses_to_latest() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_secs(1));
        for i in 0..5u32 {
            debouncer.schedule(start + Duration::from_millis(100 * u64::from(i)), i);
        }
        assert_eq!(debouncer.take_due(start + Duration::from_millis(1000)), None);
        assert_eq!(debouncer.take_due(start + Duration::from_millis(1400)), Some(4));
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.take_due(start + Duration::from_secs(10)), None);
    }

    #[test]
    fn cancel_drops_pending() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        debouncer.schedule(start, "a");
        assert_eq!(debouncer.cancel(), Some("a"));
        assert_eq!(debouncer.take_due(start + Duration::from_secs(1)), None);
    }
}
