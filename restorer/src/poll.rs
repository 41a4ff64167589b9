//! Bounded polling shared by service start-up and artifact downloads

use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Attempt cap and fixed sleep between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Longest time the policy can spend sleeping
    pub fn worst_case_wait(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Ready { value: T, attempts: u32 },
    Exhausted { attempts: u32 },
}

impl<T> PollOutcome<T> {
    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Ready { attempts, .. } | PollOutcome::Exhausted { attempts } => *attempts,
        }
    }
}

/// Runs `attempt` until it yields a value or `max_attempts` is reached.
///
/// The closure receives the 1-based attempt number. The interval is slept
/// between attempts only, never after the last one.
pub async fn poll_until<T, F, Fut>(policy: RetryPolicy, mut attempt: F) -> PollOutcome<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for n in 1..=policy.max_attempts {
        if let Some(value) = attempt(n).await {
            return PollOutcome::Ready { value, attempts: n };
        }

        debug!("Attempt {}/{} not ready", n, policy.max_attempts);

        if n < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    PollOutcome::Exhausted {
        attempts: policy.max_attempts,
    }
}
