//! Progress display for the domain-avail CLI.
//!
//! Renders engine events as indented, colored lines on stdout. Uses only the
//! `console` crate for styling, which drops colors when stdout is not a
//! terminal.

use console::{style, Style};
use domain_avail_lib::{Conclusion, Event, NameColor, Reporter};
use std::time::Duration;

const SEPARATOR: &str = "---------------------------------";

/// Writes every event as one line on stdout.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&mut self, event: &Event) {
        for line in render(event) {
            println!("{}", line);
        }
    }
}

// ── Formatting ───────────────────────────────────────────────────────────────

/// Lines printed for one event.
pub fn render(event: &Event) -> Vec<String> {
    match event {
        Event::ActionStarted {
            name,
            color,
            message,
        } => vec![format!(
            ">>> {} | {}",
            paint_name(name, *color),
            message.as_deref().unwrap_or("Starting...")
        )],
        Event::ActionRetrying {
            name,
            color,
            cause,
            attempt,
            budget,
            backoff,
        } => vec![format!(
            " -- {} | {}, retrying in {} ({}/{})",
            paint_name(name, *color),
            cause,
            format_elapsed(*backoff),
            attempt,
            budget
        )],
        Event::ActionStopped {
            name,
            color,
            conclusion,
            elapsed,
        } => vec![format!(
            "<<< {} | {}  {}",
            paint_name(name, *color),
            conclusion_text(conclusion),
            paint_elapsed(*elapsed)
        )],
        Event::ActionSkipped { name, color, .. } => {
            vec![format!("!!! {} | Skipped", paint_name(name, *color))]
        }
        Event::StepStarted {
            name,
            color,
            message,
            ..
        } => vec![format!(
            "    |-> {} | {}",
            paint_name(name, *color),
            message.as_deref().unwrap_or("Starting...")
        )],
        Event::StepRetrying {
            name,
            color,
            cause,
            attempt,
            budget,
            backoff,
            elapsed,
            ..
        } => vec![format!(
            "      - {} | {}, retrying in {} ({}/{})  {}",
            paint_name(name, *color),
            cause.as_deref().unwrap_or("something went wrong"),
            format_elapsed(*backoff),
            attempt,
            budget,
            paint_elapsed(*elapsed)
        )],
        Event::StepStopped {
            name,
            color,
            conclusion,
            elapsed,
            ..
        } => vec![format!(
            "    <-| {} | {}  {}",
            paint_name(name, *color),
            conclusion_text(conclusion),
            paint_elapsed(*elapsed)
        )],
        Event::RunFinished { elapsed } => vec![
            SEPARATOR.to_string(),
            format!("Total run time: {}", paint_elapsed(*elapsed)),
        ],
    }
}

fn paint_name(name: &str, color: NameColor) -> String {
    Style::new()
        .color256(color.ansi256())
        .apply_to(name)
        .to_string()
}

fn conclusion_text(conclusion: &Conclusion) -> String {
    match conclusion {
        Conclusion::Success(Some(message)) => message.clone(),
        Conclusion::Success(None) => "Stopped successfully".to_string(),
        Conclusion::Warning(message) => style(format!("Warn: {}", message)).yellow().to_string(),
        Conclusion::Failure(message) => style(format!("Error: {}", message)).red().to_string(),
    }
}

/// Compact duration: `+0ms`, `+950ms`, `+1.2s`, `+1m 5s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    if millis < 1000 {
        format!("+{}ms", millis)
    } else if millis < 60_000 {
        format!("+{:.1}s", elapsed.as_secs_f64())
    } else {
        let secs = elapsed.as_secs();
        format!("+{}m {}s", secs / 60, secs % 60)
    }
}

/// Style for an elapsed time, stronger as it grows.
fn elapsed_style(elapsed: Duration) -> Style {
    match elapsed.as_millis() {
        ms if ms > 1000 => Style::new().red().bold(),
        ms if ms > 500 => Style::new().yellow().bright().bold(),
        ms if ms > 250 => Style::new().yellow().bold(),
        ms if ms > 100 => Style::new().green(),
        ms if ms > 50 => Style::new().green().bright().bold(),
        ms if ms > 10 => Style::new().green().bright(),
        _ => Style::new().dim(),
    }
}

fn paint_elapsed(elapsed: Duration) -> String {
    elapsed_style(elapsed)
        .apply_to(format_elapsed(elapsed))
        .to_string()
}
