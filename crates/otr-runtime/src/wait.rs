//! ---
//! otr_section: "04-lifecycle-orchestration"
//! otr_subsection: "module"
//! otr_type: "source"
//! otr_scope: "code"
//! otr_description: "Bundle lifecycle simulation and deploy orchestration."
//! otr_version: "v0.0.0-prealpha"
//! otr_owner: "tbd"
//! ---
//! Bounded polling wait.
//!
//! A [`Hold`] blocks the calling thread while code under test makes progress
//! on its own threads. The condition is polled once, then once after every
//! sleep of one poll interval, until it reports completion or the poll count
//! exceeds `max_time / poll_interval`.

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use otr_common::WaitConfig;
use thiserror::Error;
use tracing::{debug, warn};

type Condition<'a> = Box<dyn FnMut() -> anyhow::Result<bool> + 'a>;

/// How a [`Hold`] ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The condition reported completion after `polls` sleeps.
    Completed { polls: u32 },
    /// The budget ran out and the overrun was only logged.
    TimedOutWarned { polls: u32 },
    /// No condition was given; slept for the whole budget.
    Slept(Duration),
    /// Evaluating the condition failed; the failure was logged.
    Aborted { polls: u32 },
}

impl WaitOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, WaitOutcome::Completed { .. })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WaitError {
    /// The budget ran out under the fail-on-timeout policy.
    #[error("hold timed out after {waited:?} ({polls} polls)")]
    TimedOut { waited: Duration, polls: u32 },
}

/// Builder for one polling wait.
pub struct Hold<'a> {
    condition: Option<Condition<'a>>,
    max_time: Duration,
    poll_interval: Duration,
    fail_on_timeout: bool,
}

impl<'a> Hold<'a> {
    /// Hold with the default 5 second budget and 200 ms polls.
    pub fn new() -> Self {
        Self::from_config(&WaitConfig::default())
    }

    pub fn from_config(config: &WaitConfig) -> Self {
        Self {
            condition: None,
            max_time: config.max_time,
            poll_interval: config.poll_interval,
            fail_on_timeout: config.fail_on_timeout,
        }
    }

    /// Keep waiting while `condition` returns true.
    pub fn whilst<F>(self, mut condition: F) -> Self
    where
        F: FnMut() -> bool + 'a,
    {
        self.try_whilst(move || Ok(condition()))
    }

    /// Keep waiting until `condition` returns true.
    pub fn until<F>(self, mut condition: F) -> Self
    where
        F: FnMut() -> bool + 'a,
    {
        self.try_whilst(move || Ok(!condition()))
    }

    /// Fallible form of [`whilst`](Self::whilst).
    pub fn try_whilst<F>(mut self, condition: F) -> Self
    where
        F: FnMut() -> anyhow::Result<bool> + 'a,
    {
        self.condition = Some(Box::new(condition));
        self
    }

    /// Fallible form of [`until`](Self::until).
    pub fn try_until<F>(self, mut condition: F) -> Self
    where
        F: FnMut() -> anyhow::Result<bool> + 'a,
    {
        self.try_whilst(move || condition().map(|done| !done))
    }

    pub fn max_time(mut self, max_time: Duration) -> Self {
        self.max_time = max_time;
        self
    }

    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn fail_on_timeout(mut self, fail: bool) -> Self {
        self.fail_on_timeout = fail;
        self
    }

    /// Number of sleeps allowed before the hold counts as overrun.
    fn max_polls(&self) -> u128 {
        let poll_ms = self.poll_interval.as_millis().max(1);
        self.max_time.as_millis() / poll_ms
    }

    /// Run the wait on the calling thread.
    pub fn go(self) -> Result<WaitOutcome, WaitError> {
        let max_polls = self.max_polls();
        let poll_interval = self.poll_interval.max(Duration::from_millis(1));
        let Some(mut condition) = self.condition else {
            thread::sleep(self.max_time);
            return Ok(WaitOutcome::Slept(self.max_time));
        };

        let started = Instant::now();
        let mut polls: u32 = 0;
        loop {
            match condition() {
                Ok(true) => {}
                Ok(false) => {
                    debug!(polls, elapsed_ms = started.elapsed().as_millis() as u64, "hold completed");
                    return Ok(WaitOutcome::Completed { polls });
                }
                Err(err) => {
                    warn!(polls, error = %format!("{err:#}"), "hold condition failed, continuing test");
                    return Ok(WaitOutcome::Aborted { polls });
                }
            }
            thread::sleep(poll_interval);
            polls = polls.saturating_add(1);
            if u128::from(polls) > max_polls {
                let waited = started.elapsed();
                if self.fail_on_timeout {
                    return Err(WaitError::TimedOut { waited, polls });
                }
                warn!(polls, waited_ms = waited.as_millis() as u64, "hold exited due to timeout");
                return Ok(WaitOutcome::TimedOutWarned { polls });
            }
        }
    }
}

impl Default for Hold<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Hold<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hold")
            .field("has_condition", &self.condition.is_some())
            .field("max_time", &self.max_time)
            .field("poll_interval", &self.poll_interval)
            .field("fail_on_timeout", &self.fail_on_timeout)
            .finish()
    }
}
