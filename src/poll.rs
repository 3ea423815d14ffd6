//! Polling for asynchronous platform operations.
//!
//! Service instance provisioning, bindings, deployments, and deletes all
//! complete asynchronously on the platform side: the API hands back a
//! reference whose `state` field must be re-fetched until it goes terminal.
//! [`poll_until_terminal`] is the one primitive for that wait, parameterized
//! by a [`PollPolicy`] instead of hardcoded intervals at every call site.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use cfapi::{poll_until_terminal, Get, Job, PollPolicy};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example(client: cfapi::CfClient, job_guid: String) -> cfapi::Result<()> {
//! let policy = PollPolicy::with_deadline(Duration::from_secs(5), Duration::from_secs(300));
//! let done = poll_until_terminal(
//!     &job_guid,
//!     || {
//!         let client = client.clone();
//!         let guid = job_guid.clone();
//!         async move { Ok(Job::get(&client, guid).await?.as_operation()) }
//!     },
//!     &policy,
//!     &CancellationToken::new(),
//! )
//! .await?;
//! println!("job finished in state {}", done.state);
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::{CfError, Result};

/// Snapshot of a remote, asynchronously-completing unit of work.
///
/// The poller only ever reads these; the platform owns the state. `Job`
/// resources and `last_operation` blocks both convert into this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    /// GUID used to re-fetch status.
    pub guid: String,
    /// Current state as reported by the platform (e.g. `"in progress"`,
    /// `"succeeded"`, `"COMPLETE"`).
    pub state: String,
    /// Human-readable detail, usually present on failure.
    #[serde(default)]
    pub description: Option<String>,
}

impl Operation {
    /// Create an operation snapshot.
    pub fn new(guid: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            state: state.into(),
            description: None,
        }
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Classification of an observed state against a policy's terminal sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    /// Not terminal; keep polling.
    InProgress,
    /// Terminal, operation succeeded.
    Succeeded,
    /// Terminal, operation failed on the platform side.
    Failed,
}

/// The state values that end polling, split into success and failure sets.
///
/// Comparison is case-insensitive; the default covers both the
/// `last_operation` vocabulary (`succeeded`/`failed`) and the job
/// vocabulary (`COMPLETE`/`FAILED`).
#[derive(Debug, Clone)]
pub struct TerminalStates {
    succeeded: Vec<String>,
    failed: Vec<String>,
}

impl Default for TerminalStates {
    fn default() -> Self {
        Self::new(&["succeeded", "complete"], &["failed"])
    }
}

impl TerminalStates {
    /// Build terminal sets from explicit state values.
    pub fn new(succeeded: &[&str], failed: &[&str]) -> Self {
        Self {
            succeeded: succeeded.iter().map(|s| s.to_lowercase()).collect(),
            failed: failed.iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    /// Classify an observed state value.
    pub fn classify(&self, state: &str) -> StateKind {
        let state = state.to_lowercase();
        if self.succeeded.iter().any(|s| *s == state) {
            StateKind::Succeeded
        } else if self.failed.iter().any(|s| *s == state) {
            StateKind::Failed
        } else {
            StateKind::InProgress
        }
    }
}

/// Delay schedule between poll attempts.
#[derive(Debug, Clone, Copy)]
pub enum Backoff {
    /// Every inter-attempt delay is the policy interval.
    Fixed,
    /// Delay grows by `factor` per attempt, capped at `max`.
    Exponential { factor: f64, max: Duration },
}

impl Backoff {
    /// Delay to apply after `attempts` completed fetches (1-based).
    fn delay(&self, interval: Duration, attempts: u32) -> Duration {
        match self {
            Backoff::Fixed => interval,
            Backoff::Exponential { factor, max } => {
                let exp = attempts.saturating_sub(1).min(32);
                let scaled = interval.as_secs_f64() * factor.powi(exp as i32);
                Duration::from_secs_f64(scaled).min(*max)
            }
        }
    }
}

/// Configuration for one polling call.
///
/// At least one of `max_attempts` and `deadline` must be set; when both
/// are, whichever trips first ends the loop.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Lower bound on spacing between fetches. Slow fetches may stretch the
    /// actual spacing beyond this; that is not an error.
    pub interval: Duration,
    /// Maximum number of fetch calls (failed fetches count).
    pub max_attempts: Option<u32>,
    /// Wall-clock budget for the whole call.
    pub deadline: Option<Duration>,
    /// Delay schedule between attempts.
    pub backoff: Backoff,
    /// States that end polling.
    pub terminal: TerminalStates,
}

impl PollPolicy {
    /// Fixed-interval policy bounded by attempt count.
    pub fn with_max_attempts(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: Some(max_attempts),
            deadline: None,
            backoff: Backoff::Fixed,
            terminal: TerminalStates::default(),
        }
    }

    /// Fixed-interval policy bounded by wall-clock deadline.
    pub fn with_deadline(interval: Duration, deadline: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
            deadline: Some(deadline),
            backoff: Backoff::Fixed,
            terminal: TerminalStates::default(),
        }
    }

    /// Add an attempt bound.
    #[must_use]
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Add a wall-clock bound.
    #[must_use]
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Replace the delay schedule.
    #[must_use]
    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Replace the terminal-state sets.
    #[must_use]
    pub fn terminal(mut self, terminal: TerminalStates) -> Self {
        self.terminal = terminal;
        self
    }

    fn validate(&self, guid: &str) -> Result<()> {
        if guid.is_empty() {
            return Err(CfError::InvalidPollPolicy(
                "operation guid must not be empty".to_string(),
            ));
        }
        if self.interval.is_zero() {
            return Err(CfError::InvalidPollPolicy(
                "interval must be greater than zero".to_string(),
            ));
        }
        match (self.max_attempts, self.deadline) {
            (None, None) => Err(CfError::InvalidPollPolicy(
                "at least one of max_attempts or deadline must be set".to_string(),
            )),
            (Some(0), _) => Err(CfError::InvalidPollPolicy(
                "max_attempts must be greater than zero".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Poll a remote operation until it reaches a terminal state.
///
/// Repeatedly calls `fetch` (which must be idempotent) and classifies the
/// returned state against `policy.terminal`:
///
/// - success terminal state: returns `Ok` with the final [`Operation`];
/// - failure terminal state: returns [`CfError::OperationFailed`] carrying
///   the final operation — a successful poll that discovered the remote
///   operation itself failed, never conflated with a transport error;
/// - attempt/deadline budget exhausted while non-terminal:
///   [`CfError::PollingExhausted`] with the last observed state;
/// - `cancel` triggered: [`CfError::PollingCancelled`]. Cancellation is
///   honored mid-delay; an in-flight fetch is not aborted.
///
/// Retryable fetch errors (see [`CfError::is_retryable`]) consume an
/// attempt and polling continues on the next tick; non-retryable errors
/// abort immediately.
///
/// Fetches within one call are strictly sequential. Concurrent calls are
/// independent; each owns only its own loop state.
#[tracing::instrument(skip(fetch, policy, cancel), fields(interval = ?policy.interval))]
pub async fn poll_until_terminal<F, Fut>(
    guid: &str,
    mut fetch: F,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> Result<Operation>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Operation>>,
{
    policy.validate(guid)?;

    let start = Instant::now();
    let mut attempts: u32 = 0;
    let mut last_state: Option<String> = None;

    loop {
        if cancel.is_cancelled() {
            return Err(CfError::PollingCancelled {
                guid: guid.to_string(),
                attempts,
            });
        }

        attempts += 1;
        match fetch().await {
            Ok(operation) => {
                last_state = Some(operation.state.clone());
                match policy.terminal.classify(&operation.state) {
                    StateKind::Succeeded => {
                        tracing::debug!(attempts, state = %operation.state, "operation succeeded");
                        return Ok(operation);
                    }
                    StateKind::Failed => {
                        tracing::debug!(attempts, state = %operation.state, "operation failed");
                        return Err(CfError::OperationFailed(operation));
                    }
                    StateKind::InProgress => {
                        tracing::trace!(attempts, state = %operation.state, "still in progress");
                    }
                }
            }
            Err(e) if e.is_retryable() => {
                tracing::warn!(attempts, error = %e, "transient fetch failure, will retry");
            }
            Err(e) => return Err(e),
        }

        if let Some(max) = policy.max_attempts {
            if attempts >= max {
                return Err(CfError::PollingExhausted {
                    guid: guid.to_string(),
                    attempts,
                    elapsed: start.elapsed(),
                    last_state,
                });
            }
        }

        let delay = policy.backoff.delay(policy.interval, attempts);
        if let Some(deadline) = policy.deadline {
            // The next attempt could not start before the deadline; stop
            // now rather than sleeping through it.
            if start.elapsed() + delay >= deadline {
                return Err(CfError::PollingExhausted {
                    guid: guid.to_string(),
                    attempts,
                    elapsed: start.elapsed(),
                    last_state,
                });
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                return Err(CfError::PollingCancelled {
                    guid: guid.to_string(),
                    attempts,
                });
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_classification_case_insensitive() {
        let terminal = TerminalStates::default();
        assert_eq!(terminal.classify("succeeded"), StateKind::Succeeded);
        assert_eq!(terminal.classify("COMPLETE"), StateKind::Succeeded);
        assert_eq!(terminal.classify("FAILED"), StateKind::Failed);
        assert_eq!(terminal.classify("failed"), StateKind::Failed);
        assert_eq!(terminal.classify("in progress"), StateKind::InProgress);
        assert_eq!(terminal.classify("PROCESSING"), StateKind::InProgress);
        assert_eq!(terminal.classify("initial"), StateKind::InProgress);
    }

    #[test]
    fn test_custom_terminal_sets() {
        let terminal = TerminalStates::new(&["deployed"], &["degenerate", "canceled"]);
        assert_eq!(terminal.classify("DEPLOYED"), StateKind::Succeeded);
        assert_eq!(terminal.classify("canceled"), StateKind::Failed);
        assert_eq!(terminal.classify("succeeded"), StateKind::InProgress);
    }

    #[test]
    fn test_fixed_backoff_is_constant() {
        let backoff = Backoff::Fixed;
        let interval = Duration::from_secs(5);
        assert_eq!(backoff.delay(interval, 1), interval);
        assert_eq!(backoff.delay(interval, 10), interval);
    }

    #[test]
    fn test_exponential_backoff_grows_and_caps() {
        let backoff = Backoff::Exponential {
            factor: 2.0,
            max: Duration::from_secs(40),
        };
        let interval = Duration::from_secs(5);
        assert_eq!(backoff.delay(interval, 1), Duration::from_secs(5));
        assert_eq!(backoff.delay(interval, 2), Duration::from_secs(10));
        assert_eq!(backoff.delay(interval, 3), Duration::from_secs(20));
        assert_eq!(backoff.delay(interval, 4), Duration::from_secs(40));
        // Capped from here on
        assert_eq!(backoff.delay(interval, 5), Duration::from_secs(40));
        assert_eq!(backoff.delay(interval, 20), Duration::from_secs(40));
    }

    #[tokio::test]
    async fn test_policy_requires_a_bound() {
        let policy = PollPolicy {
            interval: Duration::from_millis(1),
            max_attempts: None,
            deadline: None,
            backoff: Backoff::Fixed,
            terminal: TerminalStates::default(),
        };
        let result = poll_until_terminal(
            "op-1",
            || async { Ok(Operation::new("op-1", "succeeded")) },
            &policy,
            &CancellationToken::new(),
        )
        .await;
        assert!(matches!(result, Err(CfError::InvalidPollPolicy(_))));
    }

    #[tokio::test]
    async fn test_policy_rejects_zero_interval_and_empty_guid() {
        let zero = PollPolicy::with_max_attempts(Duration::ZERO, 3);
        let result = poll_until_terminal(
            "op-1",
            || async { Ok(Operation::new("op-1", "succeeded")) },
            &zero,
            &CancellationToken::new(),
        )
        .await;
        assert!(matches!(result, Err(CfError::InvalidPollPolicy(_))));

        let policy = PollPolicy::with_max_attempts(Duration::from_millis(1), 3);
        let result = poll_until_terminal(
            "",
            || async { Ok(Operation::new("op-1", "succeeded")) },
            &policy,
            &CancellationToken::new(),
        )
        .await;
        assert!(matches!(result, Err(CfError::InvalidPollPolicy(_))));
    }
}
