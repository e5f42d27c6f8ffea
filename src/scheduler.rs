use std::collections::BTreeMap;
use std::time::Duration;

/// Handle to a scheduled callback. Cancelling it guarantees it never fires again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Entry<T> {
    due_ms: u64,
    period_ms: Option<u64>,
    payload: T,
}

/// A timer that came due while the clock was advanced.
#[derive(Debug, Clone, PartialEq)]
pub struct Fired<T> {
    pub id: TimerId,
    pub at_ms: u64,
    pub payload: T,
}

/// Virtual-time periodic driver.
///
/// Nothing runs on its own: the owner moves the clock forward and pulls due
/// timers one at a time with [`Scheduler::pop_due`]. Because each timer is
/// pulled individually, a callback that cancels another timer due in the same
/// step prevents it from firing.
#[derive(Debug)]
pub struct Scheduler<T> {
    now_ms: u64,
    next_id: u64,
    entries: BTreeMap<TimerId, Entry<T>>,
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 0,
            entries: BTreeMap::new(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Fire `payload` every `period`, first after one full period.
    pub fn every(&mut self, period: Duration, payload: T) -> TimerId {
        let period_ms = to_ms(period);
        self.insert(period_ms, Some(period_ms), payload)
    }

    /// Fire `payload` once after `delay`.
    pub fn after(&mut self, delay: Duration, payload: T) -> TimerId {
        self.insert(to_ms(delay), None, payload)
    }

    fn insert(&mut self, delay_ms: u64, period_ms: Option<u64>, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.insert(
            id,
            Entry {
                due_ms: self.now_ms + delay_ms,
                period_ms,
                payload,
            },
        );
        id
    }

    /// Returns true if the timer was still live.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub fn is_live(&self, id: TimerId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn live_count(&self) -> usize {
        self.entries.len()
    }

    /// Pull the earliest timer due at or before `until_ms`, moving the clock to
    /// its due time. Periodic timers are re-armed before being returned; one-shot
    /// timers are gone once returned. Ties fire in scheduling order.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Fired<T>> {
        let (id, due_ms) = self
            .entries
            .iter()
            .filter(|(_, e)| e.due_ms <= until_ms)
            .min_by_key(|(id, e)| (e.due_ms, **id))
            .map(|(id, e)| (*id, e.due_ms))?;

        self.now_ms = self.now_ms.max(due_ms);

        let period = self.entries.get(&id).and_then(|e| e.period_ms);
        let payload = match period {
            Some(period) => {
                let entry = self.entries.get_mut(&id)?;
                entry.due_ms += period;
                entry.payload.clone()
            }
            None => self.entries.remove(&id)?.payload,
        };

        Some(Fired {
            id,
            at_ms: due_ms,
            payload,
        })
    }

    /// Move the clock to `until_ms` after all due timers were pulled.
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}

impl<T: Clone> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn to_ms(d: Duration) -> u64 {
    (d.as_millis() as u64).max(1)
}
