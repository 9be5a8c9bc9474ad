use std::time::Duration;

use serde::Serialize;

use crate::record::DiscardReason;

/// Counters collected during one top-K run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub bytes_read: u64,
    pub chunks_read: u64,
    pub lines_read: u64,
    pub blank_lines: u64,
    pub records_valid: u64,
    pub discarded_malformed: u64,
    pub discarded_non_integer: u64,
    pub discarded_decode: u64,
    pub candidates_admitted: u64,
    pub candidates_replaced: u64,
    pub candidates_rejected: u64,
    pub peak_buffer_bytes: usize,
    #[serde(serialize_with = "serialize_millis")]
    pub processing_time: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl RunStats {
    pub fn add_discard(&mut self, reason: DiscardReason) {
        match reason {
            DiscardReason::Malformed => self.discarded_malformed += 1,
            DiscardReason::NonInteger => self.discarded_non_integer += 1,
            DiscardReason::Decode => self.discarded_decode += 1,
        }
    }

    pub fn records_discarded(&self) -> u64 {
        self.discarded_malformed + self.discarded_non_integer + self.discarded_decode
    }

    pub fn format_stats(&self) -> String {
        let mut output = format!(
            "Lines processed: {} total, {} valid, {} discarded, {} blank",
            self.lines_read,
            self.records_valid,
            self.records_discarded(),
            self.blank_lines
        );

        if self.records_discarded() > 0 {
            let mut parts = Vec::new();
            if self.discarded_malformed > 0 {
                parts.push(format!("{} malformed", self.discarded_malformed));
            }
            if self.discarded_non_integer > 0 {
                parts.push(format!("{} non-integer", self.discarded_non_integer));
            }
            if self.discarded_decode > 0 {
                parts.push(format!("{} undecodable", self.discarded_decode));
            }
            output.push_str(&format!(" ({})", parts.join(", ")));
        }

        output.push_str(&format!(
            "; {} bytes in {} chunks",
            self.bytes_read, self.chunks_read
        ));

        let processing_time_ms = self.processing_time.as_millis();
        output.push_str(&format!(" in {}ms", processing_time_ms));

        if processing_time_ms > 0 && self.lines_read > 0 {
            let lines_per_sec = (self.lines_read as f64 * 1000.0) / processing_time_ms as f64;
            output.push_str(&format!(" ({:.0} lines/s)", lines_per_sec));
        }

        output.push_str(&format!(
            "; candidates: {} admitted, {} replaced, {} rejected",
            self.candidates_admitted, self.candidates_replaced, self.candidates_rejected
        ));

        output
    }
}
