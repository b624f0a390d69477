//! Lifecycle events emitted by the engine and the sinks that receive them.

use std::sync::{Arc, Mutex};
use std::time::Duration;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Display color assigned to an action or step, as an index into the
/// 256-color terminal palette.
///
/// The color is a pure function of the name, so the same operation keeps its
/// color across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NameColor(u8);

impl NameColor {
    /// Derive the color from a name.
    ///
    /// Picks a point in the 6x6x6 color cube with every channel at least 1,
    /// which keeps names readable on dark backgrounds.
    pub fn for_name(name: &str) -> Self {
        let mut state = name
            .bytes()
            .fold(FNV_OFFSET, |hash, byte| {
                (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
            });
        let mut channel = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            1 + (state % 5) as u8
        };
        let (r, g, b) = (channel(), channel(), channel());
        Self(16 + 36 * r + 6 * g + b)
    }

    pub fn ansi256(self) -> u8 {
        self.0
    }
}

/// How an action or step ended.
///
/// Rendering precedence follows the variants: a custom message, then the
/// warning, then the error, and "Stopped successfully" when nothing was said.
#[derive(Debug, Clone, PartialEq)]
pub enum Conclusion {
    Success(Option<String>),
    Warning(String),
    Failure(String),
}

/// Everything the engine reports while a run is in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ActionStarted {
        name: String,
        color: NameColor,
        message: Option<String>,
    },
    ActionRetrying {
        name: String,
        color: NameColor,
        cause: String,
        attempt: u32,
        budget: u32,
        backoff: Duration,
    },
    ActionStopped {
        name: String,
        color: NameColor,
        conclusion: Conclusion,
        elapsed: Duration,
    },
    ActionSkipped {
        name: String,
        color: NameColor,
        elapsed: Duration,
    },
    StepStarted {
        index: usize,
        name: String,
        color: NameColor,
        message: Option<String>,
    },
    StepRetrying {
        index: usize,
        name: String,
        color: NameColor,
        cause: Option<String>,
        attempt: u32,
        budget: u32,
        backoff: Duration,
        elapsed: Duration,
    },
    StepStopped {
        index: usize,
        name: String,
        color: NameColor,
        conclusion: Conclusion,
        elapsed: Duration,
    },
    RunFinished {
        elapsed: Duration,
    },
}

impl Event {
    /// Name of the action or step the event belongs to.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::ActionStarted { name, .. }
            | Self::ActionRetrying { name, .. }
            | Self::ActionStopped { name, .. }
            | Self::ActionSkipped { name, .. }
            | Self::StepStarted { name, .. }
            | Self::StepRetrying { name, .. }
            | Self::StepStopped { name, .. } => Some(name),
            Self::RunFinished { .. } => None,
        }
    }

    pub fn is_retry(&self) -> bool {
        matches!(self, Self::ActionRetrying { .. } | Self::StepRetrying { .. })
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, Self::ActionStopped { .. } | Self::StepStopped { .. })
    }
}

/// Sink for lifecycle events.
///
/// The engine calls `report` once per event, before control returns to the
/// caller of `run_action`/`run_step`.
pub trait Reporter: Send {
    fn report(&mut self, event: &Event);
}

/// Reporter that keeps every event in memory.
///
/// Clones share the same buffer, so a caller can hand one clone to the
/// engine and read the events back through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryReporter {
    events: Arc<Mutex<Vec<Event>>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Number of recorded events matching a predicate.
    pub fn count<F: Fn(&Event) -> bool>(&self, predicate: F) -> usize {
        self.events
            .lock()
            .map(|events| events.iter().filter(|e| predicate(e)).count())
            .unwrap_or(0)
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl Reporter for MemoryReporter {
    fn report(&mut self, event: &Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Reporter that forwards events to `tracing` instead of a terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&mut self, event: &Event) {
        match event {
            Event::ActionStarted { name, message, .. } => {
                tracing::info!(action = %name, message = message.as_deref().unwrap_or("Starting..."), "action started");
            }
            Event::ActionRetrying {
                name,
                cause,
                attempt,
                budget,
                backoff,
                ..
            } => {
                tracing::warn!(action = %name, %cause, attempt, budget, backoff_ms = backoff.as_millis() as u64, "action retrying");
            }
            Event::ActionStopped {
                name,
                conclusion,
                elapsed,
                ..
            } => {
                tracing::info!(action = %name, ?conclusion, elapsed_ms = elapsed.as_millis() as u64, "action stopped");
            }
            Event::ActionSkipped { name, .. } => {
                tracing::info!(action = %name, "action skipped");
            }
            Event::StepStarted {
                index,
                name,
                message,
                ..
            } => {
                tracing::info!(step = %name, index, message = message.as_deref().unwrap_or("Starting..."), "step started");
            }
            Event::StepRetrying {
                name,
                cause,
                attempt,
                budget,
                backoff,
                ..
            } => {
                tracing::warn!(step = %name, cause = cause.as_deref().unwrap_or("something went wrong"), attempt, budget, backoff_ms = backoff.as_millis() as u64, "step retrying");
            }
            Event::StepStopped {
                name,
                conclusion,
                elapsed,
                ..
            } => {
                tracing::info!(step = %name, ?conclusion, elapsed_ms = elapsed.as_millis() as u64, "step stopped");
            }
            Event::RunFinished { elapsed } => {
                tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "run finished");
            }
        }
    }
}
