use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Scheduled<T> {
    due: Instant,
    seq: u64,
    task: T,
}

/// Fire-and-forget deferred tasks on a caller-supplied clock.
///
/// Tasks are plain data; whoever drains them decides what running one means
/// and is responsible for checking that the state the task was scheduled
/// against still holds.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    queue: Vec<Scheduled<T>>,
    next_seq: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            next_seq: 0,
        }
    }

    pub fn schedule(&mut self, now: Instant, delay: Duration, task: T) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.queue.push(Scheduled {
            due: now + delay,
            seq,
            task,
        });
    }

    /// Remove and return every task due at `now`, earliest first. Tasks with
    /// the same due time come out in scheduling order.
    pub fn take_due(&mut self, now: Instant) -> Vec<T> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.queue.drain(..).partition(|s| s.due <= now);
        self.queue = pending;
        due.sort_by(|a, b| a.due.cmp(&b.due).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|s| s.task).collect()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.queue.iter().map(|s| s.due).min()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_fire_only_once_due() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.schedule(t0, Duration::from_millis(100), "focus");
        assert!(s.take_due(t0 + Duration::from_millis(99)).is_empty());
        assert_eq!(s.take_due(t0 + Duration::from_millis(100)), vec!["focus"]);
        assert!(s.is_empty());
        assert!(s.take_due(t0 + Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn due_tasks_come_out_in_order() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.schedule(t0, Duration::from_millis(30), 3);
        s.schedule(t0, Duration::from_millis(10), 1);
        s.schedule(t0, Duration::from_millis(10), 2);
        assert_eq!(s.next_due(), Some(t0 + Duration::from_millis(10)));
        assert_eq!(s.take_due(t0 + Duration::from_millis(50)), vec![1, 2, 3]);
    }
}
