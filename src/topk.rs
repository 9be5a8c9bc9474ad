//! Entry points tying the record stream to the selector.

use std::io::Read;
use std::num::NonZeroUsize;
use std::time::Instant;

use crate::discard::{DiscardSink, IgnoreDiscards};
use crate::error::{Result, TopKError};
use crate::parsers::IdValueParser;
use crate::pipeline::RecordStream;
use crate::readers::ChunkReader;
use crate::record::{ParseResult, Record};
use crate::selector::{Offer, TopKSelector};
use crate::stats::RunStats;

/// Default read size, 1 MiB
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Check that K is a positive integer
pub fn validate_k(k: i64) -> Result<NonZeroUsize> {
    usize::try_from(k)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or(TopKError::InvalidParameter(k))
}

/// Winners of one run plus what it took to find them
#[derive(Debug, Clone)]
pub struct TopK {
    winners: Vec<Record>,
    stats: RunStats,
}

impl TopK {
    /// Winning records in no particular order
    pub fn records(&self) -> &[Record] {
        &self.winners
    }

    /// Winning identifiers in no particular order
    pub fn ids(&self) -> Vec<&str> {
        self.winners.iter().map(|r| r.id.as_str()).collect()
    }

    pub fn into_ids(self) -> Vec<String> {
        self.winners.into_iter().map(|r| r.id).collect()
    }

    pub fn len(&self) -> usize {
        self.winners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.winners.is_empty()
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }
}

/// A configured top-K computation
#[derive(Debug, Clone)]
pub struct TopKRequest {
    k: i64,
    chunk_size: usize,
    parser: IdValueParser,
    sorted: bool,
}

impl TopKRequest {
    pub fn new(k: i64) -> Self {
        Self {
            k,
            chunk_size: DEFAULT_CHUNK_SIZE,
            parser: IdValueParser::new(),
            sorted: false,
        }
    }

    /// Bytes per read; values below 1 are raised to 1
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn field_separator(mut self, separator: char) -> Self {
        self.parser = IdValueParser::with_separator(separator);
        self
    }

    /// Return winners highest value first instead of heap order
    pub fn sorted(mut self, sorted: bool) -> Self {
        self.sorted = sorted;
        self
    }

    /// Read `reader` in fixed-size chunks and select the top K
    pub fn run_reader<R, S>(&self, reader: R, sink: &mut S) -> Result<TopK>
    where
        R: Read,
        S: DiscardSink + ?Sized,
    {
        let k = validate_k(self.k)?;
        self.select(k, ChunkReader::new(reader, self.chunk_size), sink)
    }

    /// Select the top K from an already chunked byte stream
    pub fn run_chunks<I, B, S>(&self, chunks: I, sink: &mut S) -> Result<TopK>
    where
        I: IntoIterator<Item = std::io::Result<B>>,
        B: AsRef<[u8]>,
        S: DiscardSink + ?Sized,
    {
        let k = validate_k(self.k)?;
        self.select(k, chunks, sink)
    }

    fn select<I, B, S>(&self, k: NonZeroUsize, chunks: I, sink: &mut S) -> Result<TopK>
    where
        I: IntoIterator<Item = std::io::Result<B>>,
        B: AsRef<[u8]>,
        S: DiscardSink + ?Sized,
    {
        let started = Instant::now();
        let mut selector = TopKSelector::new(k);
        let (mut admitted, mut replaced, mut rejected) = (0u64, 0u64, 0u64);

        let mut stream = RecordStream::new(chunks.into_iter(), self.parser);
        for result in stream.by_ref() {
            match result? {
                ParseResult::Valid(record) => match selector.offer(record) {
                    Offer::Admitted => admitted += 1,
                    Offer::Replaced(_) => replaced += 1,
                    Offer::Rejected => rejected += 1,
                },
                ParseResult::Invalid(discarded) => sink.discarded(&discarded),
            }
        }

        let mut stats = stream.into_stats();
        stats.candidates_admitted = admitted;
        stats.candidates_replaced = replaced;
        stats.candidates_rejected = rejected;
        stats.processing_time = started.elapsed();

        let winners = if self.sorted {
            selector.into_sorted_records()
        } else {
            selector.into_records()
        };

        Ok(TopK { winners, stats })
    }
}

/// Top K identifiers of a readable byte stream, discarding bad lines silently
pub fn compute_top_k<R: Read>(reader: R, k: i64) -> Result<Vec<String>> {
    TopKRequest::new(k)
        .run_reader(reader, &mut IgnoreDiscards)
        .map(TopK::into_ids)
}

/// Top K identifiers of a sequence of byte chunks
pub fn compute_top_k_chunks<I, B>(chunks: I, k: i64) -> Result<Vec<String>>
where
    I: IntoIterator<Item = std::io::Result<B>>,
    B: AsRef<[u8]>,
{
    TopKRequest::new(k)
        .run_chunks(chunks, &mut IgnoreDiscards)
        .map(TopK::into_ids)
}
