//! Time abstraction for rate-limit bookkeeping. Injecting a clock keeps request timing
//! deterministic in tests.

use crate::time::get_system_time_millis;
use std::time::Duration;
use async_trait::async_trait;

#[async_trait]
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// The current unix timestamp in milliseconds.
    fn now_millis(&self) -> u64;

    /// Suspends the calling task for `duration`. Cooperative suspension, never a busy-wait.
    async fn sleep(&self, duration: Duration);
}

/// The wall clock.
#[derive(Debug, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        get_system_time_millis()
    }

    async fn sleep(&self, duration: Duration) {
        async_std::task::sleep(duration).await;
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::sync::Mutex;

    /// A clock which advances instantly on sleep and records each requested delay.
    #[derive(Debug, Default)]
    pub struct FakeClock {
        now: Mutex<u64>,
        pub sleeps: Mutex<Vec<u64>>,
    }

    impl FakeClock {
        pub fn at(now: u64) -> Self {
            Self {
                now: Mutex::new(now),
                sleeps: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Clock for FakeClock {
        fn now_millis(&self) -> u64 {
            *self.now.lock().unwrap()
        }

        async fn sleep(&self, duration: Duration) {
            let millis = duration.as_millis() as u64;

            *self.now.lock().unwrap() += millis;
            self.sleeps.lock().unwrap().push(millis);
        }
    }
}
