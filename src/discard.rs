use std::io::Write;

use indexmap::IndexMap;
use serde_json::json;

use crate::record::{DiscardReason, Discarded};

/// Receiver for lines the parser could not turn into records
pub trait DiscardSink {
    fn discarded(&mut self, discard: &Discarded);
}

/// Sink that drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoreDiscards;

impl DiscardSink for IgnoreDiscards {
    fn discarded(&mut self, _discard: &Discarded) {}
}

impl<F: FnMut(&Discarded)> DiscardSink for F {
    fn discarded(&mut self, discard: &Discarded) {
        self(discard)
    }
}

/// How discarded lines are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReportStyle {
    /// One warning per discarded line as it happens
    Print,
    /// Counts and a few examples per reason at the end
    Summary,
    /// Count only
    Off,
}

const MAX_EXAMPLES: usize = 3;

#[derive(Debug, Default)]
struct ReasonTally {
    count: u64,
    examples: Vec<String>,
}

/// Discard sink that writes diagnostics to a stream (stderr in the CLI)
pub struct DiscardReporter<W: Write> {
    style: DiscardReportStyle,
    out: W,
    tallies: IndexMap<DiscardReason, ReasonTally>,
}

impl<W: Write> DiscardReporter<W> {
    pub fn new(style: DiscardReportStyle, out: W) -> Self {
        Self {
            style,
            out,
            tallies: IndexMap::new(),
        }
    }

    pub fn total(&self) -> u64 {
        self.tallies.values().map(|t| t.count).sum()
    }

    pub fn count(&self, reason: DiscardReason) -> u64 {
        self.tallies.get(&reason).map_or(0, |t| t.count)
    }

    fn track(&mut self, discard: &Discarded) {
        let tally = self.tallies.entry(discard.reason).or_default();
        tally.count += 1;
        if tally.examples.len() < MAX_EXAMPLES {
            tally.examples.push(describe(discard));
        }
    }

    /// JSON summary keyed by reason, in first-seen order; `None` if nothing was discarded
    pub fn summary(&self) -> Option<String> {
        if self.tallies.is_empty() {
            return None;
        }

        let mut summary = json!({});
        for (reason, tally) in &self.tallies {
            summary[reason.as_str()] = json!({
                "count": tally.count,
                "examples": tally.examples,
            });
        }

        Some(
            serde_json::to_string_pretty(&summary)
                .unwrap_or_else(|_| "Error serializing summary".to_string()),
        )
    }

    /// Write the end-of-run summary when the style asks for one
    pub fn finish(&mut self) -> std::io::Result<()> {
        if self.style != DiscardReportStyle::Summary {
            return Ok(());
        }
        if let Some(summary) = self.summary() {
            writeln!(
                self.out,
                "topids: {} lines discarded\n{}",
                self.total(),
                summary
            )?;
        }
        Ok(())
    }
}

impl<W: Write> DiscardSink for DiscardReporter<W> {
    fn discarded(&mut self, discard: &Discarded) {
        if self.style == DiscardReportStyle::Print {
            // A failing diagnostics stream must not fail the request
            let _ = writeln!(self.out, "topids: warning: {}", describe(discard));
        }
        self.track(discard);
    }
}

fn describe(discard: &Discarded) -> String {
    let position = if discard.trailing {
        format!("line {} (unterminated)", discard.line_number)
    } else {
        format!("line {}", discard.line_number)
    };
    format!("{}: {}: {}", position, discard.reason, discard.line)
}
