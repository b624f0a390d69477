//! Retrying execution engine with hierarchical progress tracking.
//!
//! A run is a sequence of *actions*. While an action executes it may run
//! nested *steps*. Both levels get a retry loop with backoff and report
//! their lifecycle (start, retry, stop, and skip for actions) to a
//! [`Reporter`].
//!
//! ```text
//! Progress::begin()
//!   run_action(read_input_file)      >>> start ... <<< stop
//!   run_action(fetch_data)           >>> start
//!     run_step(get_availability(0))      |-> start ... <-| stop
//!     run_step(get_availability(1))      |-> start  - retry ... <-| stop
//!                                    <<< stop
//! Progress::end()                    Total run time
//! ```
//!
//! Everything runs on one logical flow of control. Actions never overlap and
//! steps run one after another inside their action, so the registries are
//! plain maps mutated through `&mut self`.

mod action;
mod backoff;
mod event;
mod step;

pub use action::Action;
pub use backoff::backoff_delay;
pub use event::{Conclusion, Event, MemoryReporter, NameColor, Reporter, TracingReporter};
pub use step::{Step, StepRetry};

use crate::error::DomainAvailError;
use crate::Result;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Retry budget and other per-operation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Settings {
    /// Additional attempts allowed after the first one
    pub retry: u32,
}

impl Settings {
    pub fn with_retry(retry: u32) -> Self {
        Self { retry }
    }
}

/// What a retry predicate is asked about: a value the operation returned,
/// or the error it failed with. Exactly one is ever present.
#[derive(Debug)]
pub enum Attempt<'a, T> {
    Returned(&'a T),
    Failed(&'a DomainAvailError),
}

/// Engine-wide switches.
#[derive(Debug, Clone)]
pub struct ProgressOptions {
    /// Block the run for the backoff delay before each retry.
    /// The delay is reported either way.
    pub sleep_on_retry: bool,
}

impl Default for ProgressOptions {
    fn default() -> Self {
        Self {
            sleep_on_retry: true,
        }
    }
}

/// A top-level operation seen during the current run.
#[derive(Debug, Clone)]
pub struct ActionRecord {
    pub name: String,
    /// Steps started while this action was active, in start order
    pub steps: Vec<StepRecord>,
    pub color: NameColor,
    pub started_at: Instant,
    /// Set once, when the action stops or is skipped
    pub elapsed: Option<Duration>,
}

/// A nested operation, owned by the action that was active when it started.
#[derive(Debug, Clone)]
pub struct StepRecord {
    /// Zero-based position within the parent action's steps
    pub index: usize,
    pub name: String,
    pub color: NameColor,
    pub started_at: Instant,
    pub elapsed: Option<Duration>,
}

/// The engine: registries of actions and steps plus the event sink.
///
/// # Example
///
/// ```rust,no_run
/// use domain_avail_lib::{Progress, TracingReporter};
/// # async fn demo(names: Vec<String>) -> domain_avail_lib::Result<()> {
/// use domain_avail_lib::ops::ReadInputParam;
///
/// let mut progress = Progress::new(TracingReporter);
/// progress.begin();
/// let input = progress
///     .run_action(&ReadInputParam::new(names, "in.th"))
///     .await?;
/// progress.end();
/// # let _ = input;
/// # Ok(())
/// # }
/// ```
pub struct Progress {
    options: ProgressOptions,
    reporter: Box<dyn Reporter>,
    started_at: Instant,
    /// Completed-operations log, in start order
    actions: Vec<ActionRecord>,
    /// Action name -> position in `actions`
    action_index: HashMap<String, usize>,
    /// Step name -> (action position, step position)
    step_index: HashMap<String, (usize, usize)>,
    current_action: Option<usize>,
}

impl Progress {
    /// Create an engine that reports to `reporter`.
    pub fn new<R: Reporter + 'static>(reporter: R) -> Self {
        Self::with_options(reporter, ProgressOptions::default())
    }

    pub fn with_options<R: Reporter + 'static>(reporter: R, options: ProgressOptions) -> Self {
        Self {
            options,
            reporter: Box::new(reporter),
            started_at: Instant::now(),
            actions: Vec::new(),
            action_index: HashMap::new(),
            step_index: HashMap::new(),
            current_action: None,
        }
    }

    /// Start a new measurement run, forgetting every action and step.
    pub fn begin(&mut self) {
        self.started_at = Instant::now();
        self.actions.clear();
        self.action_index.clear();
        self.step_index.clear();
        self.current_action = None;
        tracing::debug!("progress run started");
    }

    /// Report the total run time since [`begin`](Self::begin).
    ///
    /// Registries are left untouched.
    pub fn end(&mut self) -> Duration {
        let elapsed = self.started_at.elapsed();
        self.reporter.report(&Event::RunFinished { elapsed });
        elapsed
    }

    /// Every action registered in this run, in start order.
    pub fn actions(&self) -> &[ActionRecord] {
        &self.actions
    }

    pub fn current_action(&self) -> Option<&ActionRecord> {
        self.current_action.map(|i| &self.actions[i])
    }

    /// Look up an action by name.
    pub fn action(&self, name: &str) -> Result<&ActionRecord> {
        self.action_index
            .get(name)
            .map(|&i| &self.actions[i])
            .ok_or_else(|| DomainAvailError::UnregisteredAction {
                name: name.to_string(),
            })
    }

    /// Look up a step by name.
    pub fn step(&self, name: &str) -> Result<&StepRecord> {
        self.step_index
            .get(name)
            .map(|&(a, s)| &self.actions[a].steps[s])
            .ok_or_else(|| DomainAvailError::UnregisteredStep {
                name: name.to_string(),
            })
    }

    fn action_mut(&mut self, name: &str) -> Result<&mut ActionRecord> {
        match self.action_index.get(name) {
            Some(&i) => Ok(&mut self.actions[i]),
            None => Err(DomainAvailError::UnregisteredAction {
                name: name.to_string(),
            }),
        }
    }

    fn step_mut(&mut self, name: &str) -> Result<&mut StepRecord> {
        match self.step_index.get(name) {
            Some(&(a, s)) => Ok(&mut self.actions[a].steps[s]),
            None => Err(DomainAvailError::UnregisteredStep {
                name: name.to_string(),
            }),
        }
    }

    /// Register an action and make it the active one.
    ///
    /// A name seen earlier in the run is re-registered; lookups then resolve
    /// to the newest record while the old one stays in the log.
    fn new_action(&mut self, name: &str) -> &ActionRecord {
        let record = ActionRecord {
            name: name.to_string(),
            steps: Vec::new(),
            color: NameColor::for_name(name),
            started_at: Instant::now(),
            elapsed: None,
        };
        let position = self.actions.len();
        self.actions.push(record);
        self.action_index.insert(name.to_string(), position);
        self.current_action = Some(position);
        tracing::debug!(action = name, "action registered");
        &self.actions[position]
    }

    /// Register a step under the active action.
    fn new_step(&mut self, name: &str) -> Result<&StepRecord> {
        let action_position = self
            .current_action
            .ok_or_else(|| DomainAvailError::NoActiveAction {
                step: name.to_string(),
            })?;
        let steps = &mut self.actions[action_position].steps;
        let record = StepRecord {
            index: steps.len(),
            name: name.to_string(),
            color: NameColor::for_name(name),
            started_at: Instant::now(),
            elapsed: None,
        };
        let step_position = steps.len();
        steps.push(record);
        self.step_index
            .insert(name.to_string(), (action_position, step_position));
        tracing::debug!(step = name, index = step_position, "step registered");
        Ok(&self.actions[action_position].steps[step_position])
    }

    /// Wait out the backoff delay.
    ///
    /// This is a blocking wait: there is a single flow of control, so the
    /// whole run is meant to stall until the next attempt.
    fn pause(&self, backoff: Duration) {
        if self.options.sleep_on_retry && !backoff.is_zero() {
            std::thread::sleep(backoff);
        }
    }
}
