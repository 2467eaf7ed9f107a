//! Debounce and throttle over explicit instants.

use std::time::{Duration, Instant};

/// Fires once after `wait` has passed without a new trigger.
#[derive(Debug, Clone)]
pub struct Debouncer {
    wait: Duration,
    last_trigger: Option<Instant>,
}

impl Debouncer {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            last_trigger: None,
        }
    }

    pub fn trigger(&mut self, now: Instant) {
        self.last_trigger = Some(now);
    }

    pub fn pending(&self) -> bool {
        self.last_trigger.is_some()
    }

    /// When `ready` will next return `true`, if a burst is pending.
    pub fn next_due(&self) -> Option<Instant> {
        self.last_trigger.map(|at| at + self.wait)
    }

    /// Returns `true` exactly once per burst, when the quiet period is over.
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last_trigger {
            Some(at) if now.saturating_duration_since(at) >= self.wait => {
                self.last_trigger = None;
                true
            }
            _ => false,
        }
    }
}

/// Lets a call through at most once per `interval`. Calls dropped inside the
/// interval leave a trailing call that `take_trailing` releases once the
/// interval has elapsed, so the last state is never lost.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_fire: Option<Instant>,
    trailing: bool,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fire: None,
            trailing: false,
        }
    }

    fn open(&self, now: Instant) -> bool {
        self.last_fire
            .is_none_or(|at| now.saturating_duration_since(at) >= self.interval)
    }

    pub fn hit(&mut self, now: Instant) -> bool {
        if self.open(now) {
            self.last_fire = Some(now);
            self.trailing = false;
            true
        } else {
            self.trailing = true;
            false
        }
    }

    /// When a held-back call can be released by `take_trailing`.
    pub fn next_due(&self) -> Option<Instant> {
        if !self.trailing {
            return None;
        }
        self.last_fire.map(|at| at + self.interval)
    }

    pub fn take_trailing(&mut self, now: Instant) -> bool {
        if self.trailing && self.open(now) {
            self.trailing = false;
            self.last_fire = Some(now);
            true
        } else {
            false
        }
    }
}
