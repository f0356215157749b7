use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

// Mocking out time so that it is possible to run tests that depend on time.
pub trait ISys: Send + Sync {
    /// The current timestamp in millis
    fn get_timestamp_millis(&self) -> i64;
}

/// System that gets the real time and is used when not testing
pub struct RealSys {}
impl ISys for RealSys {
    fn get_timestamp_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Wall clock that advances together with the tokio clock.
///
/// With a paused tokio runtime the timers of the `JobScheduler` and the
/// timestamps it compares them against stay in agreement, which lets tests
/// jump months ahead instantly.
pub struct TokioClockSys {
    origin_millis: i64,
    origin: tokio::time::Instant,
}

impl TokioClockSys {
    pub fn new(origin_millis: i64) -> Self {
        Self {
            origin_millis,
            origin: tokio::time::Instant::now(),
        }
    }
}

impl ISys for TokioClockSys {
    fn get_timestamp_millis(&self) -> i64 {
        self.origin_millis + self.origin.elapsed().as_millis() as i64
    }
}

/// Clock that only moves when told to
pub struct StaticTimeSys {
    now: AtomicI64,
}

impl StaticTimeSys {
    pub fn new(now_millis: i64) -> Self {
        Self {
            now: AtomicI64::new(now_millis),
        }
    }

    pub fn set(&self, now_millis: i64) {
        self.now.store(now_millis, Ordering::SeqCst);
    }
}

impl ISys for StaticTimeSys {
    fn get_timestamp_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
