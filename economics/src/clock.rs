//! Injectable time sources and simulated backend latency

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Round-trip delay applied before a backend-style operation resolves.
/// It models cost only: waiting never fails.
pub trait Latency: Send + Sync {
    fn wait(&self) -> impl Future<Output = ()> + Send;
}

/// Fixed delay on the tokio timer
#[derive(Debug, Clone, Copy)]
pub struct FixedLatency(pub std::time::Duration);

impl FixedLatency {
    pub fn from_millis(millis: u64) -> Self {
        Self(std::time::Duration::from_millis(millis))
    }
}

impl Latency for FixedLatency {
    fn wait(&self) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(self.0)
    }
}

/// Resolves immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLatency;

impl Latency for NoLatency {
    fn wait(&self) -> impl Future<Output = ()> + Send {
        std::future::ready(())
    }
}
