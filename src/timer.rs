use std::collections::BTreeMap;
use std::time::Duration;

/// Handle to a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Virtual-clock timer queue.
///
/// Nothing fires on its own: the host moves the clock forward and collects due
/// payloads with [`Timers::pop_due`]. Timers due at the same instant fire in
/// scheduling order.
#[derive(Clone, Debug)]
pub struct Timers<T> {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, TimerId), T>,
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Timers<T> {
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            queue: BTreeMap::new(),
        }
    }

    /// Current virtual time.
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Schedules `payload` to fire `delay` from now.
    pub fn schedule(&mut self, delay: Duration, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.queue.insert((self.now + delay, id), payload);
        id
    }

    /// Cancels a pending timer; returns its payload if it had not fired.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let key = self.queue.keys().find(|(_, tid)| *tid == id).copied()?;
        self.queue.remove(&key)
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.queue.keys().any(|(_, tid)| *tid == id)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pops the earliest timer due at or before `deadline`, moving the clock to
    /// its due time.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<(TimerId, T)> {
        let entry = self.queue.first_entry()?;
        let (due, id) = *entry.key();
        if due > deadline {
            return None;
        }
        let payload = entry.remove();
        self.now = self.now.max(due);
        Some((id, payload))
    }

    /// Moves the clock to `deadline` without firing anything.
    pub fn set_now(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(timers: &mut Timers<&'static str>, by: Duration) -> Vec<&'static str> {
        let deadline = timers.now() + by;
        let mut fired = Vec::new();
        while let Some((_, payload)) = timers.pop_due(deadline) {
            fired.push(payload);
        }
        timers.set_now(deadline);
        fired
    }

    #[test]
    fn fires_in_due_then_schedule_order() {
        let mut timers = Timers::new();
        timers.schedule(Duration::from_millis(20), "late");
        timers.schedule(Duration::from_millis(10), "first");
        timers.schedule(Duration::from_millis(10), "second");

        assert_eq!(drain(&mut timers, Duration::from_millis(9)), Vec::<&str>::new());
        assert_eq!(drain(&mut timers, Duration::from_millis(1)), vec!["first", "second"]);
        assert_eq!(drain(&mut timers, Duration::from_millis(10)), vec!["late"]);
        assert!(timers.is_empty());
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timers = Timers::new();
        let id = timers.schedule(Duration::from_millis(5), "x");
        assert!(timers.is_pending(id));
        assert_eq!(timers.cancel(id), Some("x"));
        assert_eq!(timers.cancel(id), None);
        assert!(drain(&mut timers, Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn delays_are_relative_to_current_time() {
        let mut timers = Timers::new();
        drain(&mut timers, Duration::from_millis(100));
        timers.schedule(Duration::from_millis(50), "x");
        assert!(drain(&mut timers, Duration::from_millis(49)).is_empty());
        assert_eq!(drain(&mut timers, Duration::from_millis(1)), vec!["x"]);
        assert_eq!(timers.now(), Duration::from_millis(150));
    }
}
