//! Step runner: operations nested inside the active action.

use super::{backoff_delay, Attempt, Conclusion, Event, Progress, Settings};
use crate::error::DomainAvailError;
use crate::Result;
use async_trait::async_trait;

/// Answer of a step's retry predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum StepRetry {
    /// Stop here and hand the result (or failure) to the caller
    Accept,
    /// Try again, reporting this error instead of the raw failure
    Retry(Option<DomainAvailError>),
}

/// An operation run through [`Progress::run_step`] while an action is active.
///
/// Unlike actions, a step's result is not an [`Outcome`](crate::Outcome):
/// the step decides in [`need_retry`](Step::need_retry) whether a returned
/// value is good enough, which lets it reject a response that arrived fine
/// but carries a failure status.
#[async_trait]
pub trait Step: Send + Sync {
    type Output: Send;

    fn name(&self) -> String;

    fn settings(&self) -> Settings;

    fn start_message(&self) -> Option<String> {
        None
    }

    fn stop_message(&self, _attempt: Attempt<'_, Self::Output>) -> Option<String> {
        None
    }

    fn need_retry(&self, _attempt: Attempt<'_, Self::Output>) -> StepRetry {
        StepRetry::Accept
    }

    async fn run(&self) -> Result<Self::Output>;
}

impl Progress {
    /// Run a step under the currently active action.
    ///
    /// Fails with [`DomainAvailError::NoActiveAction`] before invoking the
    /// step if no action has been started.
    pub async fn run_step<S>(&mut self, step: &S) -> Result<S::Output>
    where
        S: Step + ?Sized,
    {
        let name = step.name();
        let Settings { retry } = step.settings();

        self.start_step(&name, step.start_message())?;
        for attempt in 0..=retry {
            match step.run().await {
                Ok(result) => match step.need_retry(Attempt::Returned(&result)) {
                    StepRetry::Retry(cause) => {
                        self.retry_step(&name, attempt, retry, cause.as_ref())?;
                    }
                    StepRetry::Accept => {
                        let message = step.stop_message(Attempt::Returned(&result));
                        self.stop_step(&name, Conclusion::Success(message))?;
                        return Ok(result);
                    }
                },
                Err(error) if error.is_fatal() => {
                    self.stop_step(&name, Conclusion::Failure(error.message()))?;
                    return Err(error);
                }
                Err(error) => match step.need_retry(Attempt::Failed(&error)) {
                    StepRetry::Retry(cause) => {
                        let cause = cause.as_ref().unwrap_or(&error);
                        self.retry_step(&name, attempt, retry, Some(cause))?;
                    }
                    StepRetry::Accept => {
                        self.stop_step(&name, Conclusion::Failure(error.message()))?;
                        return Err(error);
                    }
                },
            }
        }

        let error = DomainAvailError::retry_exhausted(&name, retry);
        self.stop_step(&name, Conclusion::Failure(error.message()))?;
        Err(error)
    }

    fn start_step(&mut self, name: &str, message: Option<String>) -> Result<()> {
        let (index, color) = {
            let record = self.new_step(name)?;
            (record.index, record.color)
        };
        self.reporter.report(&Event::StepStarted {
            index,
            name: name.to_string(),
            color,
            message,
        });
        Ok(())
    }

    fn retry_step(
        &mut self,
        name: &str,
        attempt: u32,
        budget: u32,
        cause: Option<&DomainAvailError>,
    ) -> Result<()> {
        let record = self.step(name)?;
        if attempt >= budget {
            return Ok(());
        }

        let (index, color, elapsed) = (record.index, record.color, record.started_at.elapsed());
        let backoff = backoff_delay(attempt);
        let cause = cause.map(|c| c.message());
        tracing::debug!(step = name, attempt, budget, cause = ?cause, "retrying step");
        self.reporter.report(&Event::StepRetrying {
            index,
            name: name.to_string(),
            color,
            cause,
            attempt,
            budget,
            backoff,
            elapsed,
        });
        self.pause(backoff);
        Ok(())
    }

    fn stop_step(&mut self, name: &str, conclusion: Conclusion) -> Result<()> {
        let record = self.step_mut(name)?;
        let elapsed = record.started_at.elapsed();
        record.elapsed = Some(elapsed);
        let (index, color) = (record.index, record.color);
        tracing::debug!(step = name, ?conclusion, "step stopped");
        self.reporter.report(&Event::StepStopped {
            index,
            name: name.to_string(),
            color,
            conclusion,
            elapsed,
        });
        Ok(())
    }
}
