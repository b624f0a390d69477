//! Action runner: top-level operations with skip, retry and reporting.

use super::{backoff_delay, Attempt, Conclusion, Event, Progress, Settings};
use crate::error::DomainAvailError;
use crate::outcome::Outcome;
use crate::Result;
use async_trait::async_trait;

/// A top-level operation run through [`Progress::run_action`].
///
/// Implementors are descriptor structs that carry their own arguments; the
/// metadata methods derive names and messages from those fields.
#[async_trait]
pub trait Action: Send + Sync {
    type Value: Send;

    /// Unique name of the action within a run.
    fn name(&self) -> String;

    fn settings(&self) -> Settings;

    /// Replaces "Starting..." in the start line.
    fn start_message(&self) -> Option<String> {
        None
    }

    /// Replaces "Stopped successfully" when the action succeeds.
    fn stop_message(&self, _value: &Self::Value) -> Option<String> {
        None
    }

    /// When true the action is reported as skipped and never invoked.
    fn need_skip(&self) -> bool {
        false
    }

    /// Whether a warning, error or failure should trigger another attempt.
    fn need_retry(&self, _attempt: Attempt<'_, Outcome<Self::Value>>) -> bool {
        false
    }

    /// Perform one attempt.
    ///
    /// The engine is handed back so the action can run nested steps.
    async fn run(&self, progress: &mut Progress) -> Result<Outcome<Self::Value>>;
}

impl Progress {
    /// Run an action to completion.
    ///
    /// Returns `Ok(Some(value))` on success and `Ok(None)` when the action
    /// was skipped or ended with a warning/error it declined to retry.
    /// Returns `Err` when the action failed and declined to retry, or when
    /// the retry budget ran out.
    pub async fn run_action<A>(&mut self, action: &A) -> Result<Option<A::Value>>
    where
        A: Action + ?Sized,
    {
        let name = action.name();
        let Settings { retry } = action.settings();

        if action.need_skip() {
            self.new_action(&name);
            self.skip_action(&name)?;
            return Ok(None);
        }

        self.start_action(&name, action.start_message());
        for attempt in 0..=retry {
            let error = match action.run(self).await {
                Ok(Outcome::Success(value)) => {
                    let message = action.stop_message(&value);
                    self.stop_action(&name, Conclusion::Success(message))?;
                    return Ok(Some(value));
                }
                Ok(outcome) => {
                    if action.need_retry(Attempt::Returned(&outcome)) {
                        self.retry_action(&name, attempt, retry, outcome.cause())?;
                        continue;
                    }
                    let conclusion = match &outcome {
                        Outcome::Success(_) => Conclusion::Success(None),
                        Outcome::Warning(cause) => Conclusion::Warning(cause.message()),
                        Outcome::Error(cause) => Conclusion::Failure(cause.message()),
                    };
                    self.stop_action(&name, conclusion)?;
                    return Ok(None);
                }
                Err(error) => error,
            };

            if !error.is_fatal() && action.need_retry(Attempt::Failed(&error)) {
                self.retry_action(&name, attempt, retry, Some(&error))?;
                continue;
            }
            self.stop_action(&name, Conclusion::Failure(error.message()))?;
            return Err(error);
        }

        let error = DomainAvailError::retry_exhausted(&name, retry);
        self.stop_action(&name, Conclusion::Failure(error.message()))?;
        Err(error)
    }

    fn start_action(&mut self, name: &str, message: Option<String>) {
        let color = self.new_action(name).color;
        self.reporter.report(&Event::ActionStarted {
            name: name.to_string(),
            color,
            message,
        });
    }

    /// Report a retry and wait out the backoff, unless this was the last
    /// attempt the budget allows.
    fn retry_action(
        &mut self,
        name: &str,
        attempt: u32,
        budget: u32,
        cause: Option<&DomainAvailError>,
    ) -> Result<()> {
        let color = self.action(name)?.color;
        if attempt >= budget {
            return Ok(());
        }

        let backoff = backoff_delay(attempt);
        let cause = cause
            .map(|c| c.message())
            .unwrap_or_else(|| "something went wrong".to_string());
        tracing::debug!(action = name, attempt, budget, %cause, "retrying action");
        self.reporter.report(&Event::ActionRetrying {
            name: name.to_string(),
            color,
            cause,
            attempt,
            budget,
            backoff,
        });
        self.pause(backoff);
        Ok(())
    }

    fn skip_action(&mut self, name: &str) -> Result<()> {
        let record = self.action_mut(name)?;
        let elapsed = record.started_at.elapsed();
        record.elapsed = Some(elapsed);
        let color = record.color;
        self.reporter.report(&Event::ActionSkipped {
            name: name.to_string(),
            color,
            elapsed,
        });
        Ok(())
    }

    fn stop_action(&mut self, name: &str, conclusion: Conclusion) -> Result<()> {
        let record = self.action_mut(name)?;
        let elapsed = record.started_at.elapsed();
        record.elapsed = Some(elapsed);
        let color = record.color;
        tracing::debug!(action = name, ?conclusion, "action stopped");
        self.reporter.report(&Event::ActionStopped {
            name: name.to_string(),
            color,
            conclusion,
            elapsed,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{MemoryReporter, ProgressOptions};
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails `failures` times with an error outcome, then succeeds.
    struct Flaky {
        failures: u32,
        budget: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl Action for Flaky {
        type Value = &'static str;

        fn name(&self) -> String {
            "flaky".to_string()
        }

        fn settings(&self) -> Settings {
            Settings::with_retry(self.budget)
        }

        fn need_retry(&self, _attempt: Attempt<'_, Outcome<Self::Value>>) -> bool {
            true
        }

        async fn run(&self, _progress: &mut Progress) -> Result<Outcome<Self::Value>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Ok(Outcome::Error(DomainAvailError::api("not yet")))
            } else {
                Ok(Outcome::Success("ok"))
            }
        }
    }

    fn quiet(reporter: &MemoryReporter) -> Progress {
        Progress::with_options(
            reporter.clone(),
            ProgressOptions {
                sleep_on_retry: false,
            },
        )
    }

    #[tokio::test]
    async fn test_retry_then_success() {
        let reporter = MemoryReporter::new();
        let mut progress = quiet(&reporter);
        let action = Flaky {
            failures: 2,
            budget: 2,
            calls: AtomicU32::new(0),
        };

        let value = progress.run_action(&action).await.unwrap();

        assert_eq!(value, Some("ok"));
        assert_eq!(action.calls.load(Ordering::SeqCst), 3);
        assert_eq!(reporter.count(Event::is_retry), 2);
        assert_eq!(reporter.count(Event::is_stop), 1);
        assert!(progress.action("flaky").unwrap().elapsed.is_some());
    }

    #[tokio::test]
    async fn test_retry_events_carry_backoff() {
        let reporter = MemoryReporter::new();
        let mut progress = quiet(&reporter);
        let action = Flaky {
            failures: 2,
            budget: 5,
            calls: AtomicU32::new(0),
        };

        progress.run_action(&action).await.unwrap();

        let backoffs: Vec<_> = reporter
            .events()
            .into_iter()
            .filter_map(|e| match e {
                Event::ActionRetrying { backoff, .. } => Some(backoff),
                _ => None,
            })
            .collect();
        assert_eq!(backoffs, vec![backoff_delay(0), backoff_delay(1)]);
    }

    #[tokio::test]
    async fn test_budget_exhausted() {
        let reporter = MemoryReporter::new();
        let mut progress = quiet(&reporter);
        let action = Flaky {
            failures: u32::MAX,
            budget: 3,
            calls: AtomicU32::new(0),
        };

        let err = progress.run_action(&action).await.unwrap_err();

        assert!(matches!(
            err,
            DomainAvailError::RetryExhausted { retries: 3, .. }
        ));
        assert_eq!(action.calls.load(Ordering::SeqCst), 4);
        // The final attempt does not announce a retry
        assert_eq!(reporter.count(Event::is_retry), 3);
    }
}
