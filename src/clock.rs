use std::time::{Duration, Instant};

pub const ROUND_SECONDS: u32 = 60;

const TICK: Duration = Duration::from_secs(1);

/// Bout countdown. Running is modelled as a single pending tick deadline, so there is never
/// more than one tick source: starting overwrites the slot, pausing empties it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    remaining: u32,
    next_tick: Option<Instant>,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    pub fn new() -> Self {
        Self {
            remaining: ROUND_SECONDS,
            next_tick: None,
        }
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    /// No-op when already running, or when the countdown has expired and needs a reset.
    pub fn start(&mut self, now: Instant) {
        if self.is_running() || self.remaining == 0 {
            return;
        }
        self.next_tick = Some(now + TICK);
    }

    pub fn pause(&mut self) {
        self.next_tick = None;
    }

    pub fn toggle(&mut self, now: Instant) {
        if self.is_running() {
            self.pause();
        } else {
            self.start(now);
        }
    }

    pub fn reset(&mut self) {
        self.next_tick = None;
        self.remaining = ROUND_SECONDS;
    }

    /// Fires every tick that is due by `now` and returns how many fired.
    pub fn advance(&mut self, now: Instant) -> u32 {
        let mut fired = 0;
        while let Some(due) = self.next_tick {
            if now < due {
                break;
            }
            self.tick();
            fired += 1;
            if self.is_running() {
                self.next_tick = Some(due + TICK);
            }
        }
        fired
    }

    /// One elapsed second. Reaching zero stops the clock.
    pub fn tick(&mut self) {
        if !self.is_running() {
            return;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.pause();
        }
    }

    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_second_stops_the_clock() {
        let now = Instant::now();
        let mut clock = Clock::new();
        clock.start(now);
        clock.advance(now + Duration::from_secs(59));
        assert_eq!(clock.remaining_seconds(), 1);
        assert!(clock.is_running());

        clock.tick();
        assert_eq!(clock.remaining_seconds(), 0);
        assert!(!clock.is_running());
    }

    #[test]
    fn expired_clock_needs_reset() {
        let now = Instant::now();
        let mut clock = Clock::new();
        clock.start(now);
        clock.advance(now + Duration::from_secs(120));
        assert_eq!(clock.remaining_seconds(), 0);

        clock.start(now);
        assert!(!clock.is_running());
        clock.reset();
        clock.start(now);
        assert!(clock.is_running());
        assert_eq!(clock.remaining_seconds(), ROUND_SECONDS);
    }

    #[test]
    fn restart_does_not_double_tick() {
        let now = Instant::now();
        let mut clock = Clock::new();
        clock.start(now);
        clock.start(now + Duration::from_millis(500));
        assert_eq!(clock.advance(now + Duration::from_millis(1500)), 1);
        assert_eq!(clock.remaining_seconds(), 59);
    }

    #[test]
    fn paused_clock_ignores_time() {
        let now = Instant::now();
        let mut clock = Clock::new();
        clock.toggle(now);
        clock.advance(now + Duration::from_secs(3));
        clock.toggle(now + Duration::from_secs(3));
        assert_eq!(clock.advance(now + Duration::from_secs(30)), 0);
        assert_eq!(clock.remaining_seconds(), 57);
        assert_eq!(clock.display(), "00:57");
    }
}
