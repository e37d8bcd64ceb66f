use std::sync::{Arc, Mutex};

/// Canonical unit of time across every producer and consumer: non-negative
/// seconds since the start of the active session.
pub type TimeValue = f64;

/// Identifies which producer wrote the canonical time. The tag is what breaks
/// the media/chart feedback loop: each consumer decides from the origin
/// whether a write concerns it, so a write can never be routed back to the
/// producer it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOrigin {
    /// A native time-advance or seeking event from the media element.
    Media,
    /// A pointer interaction on one of the charts.
    Chart,
}

/// A component notified synchronously whenever the canonical time changes.
pub trait TimeConsumer {
    fn time_changed(&mut self, time: TimeValue, origin: TimeOrigin);
}

type SharedConsumer = Arc<Mutex<dyn TimeConsumer>>;

/// Owner of the single canonical synchronized time value.
///
/// The authority performs no bounds checking against the media duration; that
/// is the caller's responsibility. It is an explicit handle wired into the
/// components that need it, never an ambient global. One live instance per
/// active session lifecycle.
#[derive(Default)]
pub struct TimeAuthority {
    current: TimeValue,
    consumers: Vec<SharedConsumer>,
}

impl TimeAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the canonical time.
    pub fn current(&self) -> TimeValue {
        self.current
    }

    /// Registers a consumer notified on every write, in registration order.
    pub fn subscribe(&mut self, consumer: SharedConsumer) {
        self.consumers.push(consumer);
    }

    /// Sets the canonical time and synchronously notifies every registered
    /// consumer. Negative values are clamped to zero. Consumers whose lock is
    /// poisoned are skipped; a poisoned consumer must not stall the others.
    pub fn set_time(&mut self, value: TimeValue, origin: TimeOrigin) {
        self.current = value.max(0.0);
        for consumer in &self.consumers {
            if let Ok(mut consumer) = consumer.lock() {
                consumer.time_changed(self.current, origin);
            }
        }
    }

    /// Rewinds the canonical time to zero without notifying consumers. Used
    /// when a new session starts and the view is rebuilt from scratch anyway.
    pub fn reset(&mut self) {
        self.current = 0.0;
    }
}

impl std::fmt::Debug for TimeAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeAuthority")
            .field("current", &self.current)
            .field("consumers", &self.consumers.len())
            .finish()
    }
}
