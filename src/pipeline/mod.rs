//! Chunked line reassembly and lazy record decoding
//!
//! Bytes arrive in arbitrary chunks. [`LineAssembler`] owns the unconsumed
//! tail between chunks (the cursor state) and hands back only regions that end
//! on a line separator. [`RecordStream`] drives an iterator of chunks through
//! the assembler and a [`RecordParser`], yielding one [`ParseResult`] per
//! non-blank line.

use std::io;
use std::mem;

use crate::parsers::RecordParser;
use crate::record::ParseResult;
use crate::stats::RunStats;

pub const LINE_SEPARATOR: u8 = b'\n';

/// Cursor state carried between chunks
#[derive(Debug, Default)]
pub struct LineAssembler {
    buffer: Vec<u8>,
    peak_len: usize,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every complete line it closes.
    ///
    /// The returned bytes always end with [`LINE_SEPARATOR`] (or are empty);
    /// whatever follows the last separator stays buffered.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<u8> {
        // The buffered tail never contains a separator, so only the new bytes
        // need scanning. This keeps very long lines linear.
        let split = chunk.iter().rposition(|&b| b == LINE_SEPARATOR);

        let complete = match split {
            None => {
                self.buffer.extend_from_slice(chunk);
                Vec::new()
            }
            Some(pos) => {
                self.buffer.extend_from_slice(&chunk[..=pos]);
                mem::replace(&mut self.buffer, chunk[pos + 1..].to_vec())
            }
        };

        self.peak_len = self.peak_len.max(self.buffer.len()).max(complete.len());
        complete
    }

    /// Take the unterminated tail left at end of stream, if any
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(mem::take(&mut self.buffer))
        }
    }

    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// High-water mark of bytes held at once (tail plus the last completed region)
    pub fn peak_len(&self) -> usize {
        self.peak_len
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Reading,
    Done,
}

/// Lazy, single-pass sequence of parse results over a chunk source
///
/// Yields `Err` at most once, when the chunk source fails; the stream is
/// finished afterwards and the buffered tail is not decoded.
pub struct RecordStream<I, P> {
    chunks: I,
    parser: P,
    assembler: LineAssembler,
    pending: Vec<u8>,
    cursor: usize,
    line_number: u64,
    state: StreamState,
    stats: RunStats,
}

impl<I, B, P> RecordStream<I, P>
where
    I: Iterator<Item = io::Result<B>>,
    B: AsRef<[u8]>,
    P: RecordParser,
{
    pub fn new(chunks: I, parser: P) -> Self {
        Self {
            chunks,
            parser,
            assembler: LineAssembler::new(),
            pending: Vec::new(),
            cursor: 0,
            line_number: 0,
            state: StreamState::Reading,
            stats: RunStats::default(),
        }
    }

    /// Counters gathered so far (bytes, chunks, lines, discards)
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn into_stats(self) -> RunStats {
        self.stats
    }

    fn tally(&mut self, result: &ParseResult) {
        match result {
            ParseResult::Valid(_) => self.stats.records_valid += 1,
            ParseResult::Invalid(discarded) => self.stats.add_discard(discarded.reason),
        }
    }

    fn next_pending(&mut self) -> Option<ParseResult> {
        while self.cursor < self.pending.len() {
            let rest = &self.pending[self.cursor..];
            let end = rest
                .iter()
                .position(|&b| b == LINE_SEPARATOR)
                .unwrap_or(rest.len());
            self.cursor += end + 1;
            self.line_number += 1;
            self.stats.lines_read += 1;

            match self.parser.parse_line(&rest[..end], self.line_number, false) {
                Some(result) => return Some(result),
                None => self.stats.blank_lines += 1,
            }
        }
        None
    }

    fn finish_tail(&mut self) -> Option<ParseResult> {
        let tail = self.assembler.finish()?;
        self.line_number += 1;
        self.stats.lines_read += 1;
        let result = self.parser.parse_line(&tail, self.line_number, true);
        if result.is_none() {
            self.stats.blank_lines += 1;
        }
        result
    }
}

impl<I, B, P> Iterator for RecordStream<I, P>
where
    I: Iterator<Item = io::Result<B>>,
    B: AsRef<[u8]>,
    P: RecordParser,
{
    type Item = io::Result<ParseResult>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(result) = self.next_pending() {
                self.tally(&result);
                return Some(Ok(result));
            }

            if self.state == StreamState::Done {
                return None;
            }

            match self.chunks.next() {
                Some(Ok(chunk)) => {
                    let chunk = chunk.as_ref();
                    self.stats.chunks_read += 1;
                    self.stats.bytes_read += chunk.len() as u64;
                    self.pending = self.assembler.push(chunk);
                    self.cursor = 0;
                    self.stats.peak_buffer_bytes = self.assembler.peak_len();
                }
                Some(Err(e)) => {
                    self.state = StreamState::Done;
                    self.pending.clear();
                    self.cursor = 0;
                    return Some(Err(e));
                }
                None => {
                    self.state = StreamState::Done;
                    let result = self.finish_tail()?;
                    self.tally(&result);
                    return Some(Ok(result));
                }
            }
        }
    }
}
