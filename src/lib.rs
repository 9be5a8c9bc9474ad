// Core library for topids: streaming top-K selection over id_value records

pub mod decompression;
pub mod discard;
pub mod error;
pub mod parsers;
pub mod pipeline;
pub mod profile;
pub mod readers;
pub mod record;
pub mod selector;
pub mod stats;
pub mod topk;

pub use discard::{DiscardReportStyle, DiscardReporter, DiscardSink, IgnoreDiscards};
pub use error::TopKError;
pub use record::{DiscardReason, Discarded, ParseResult, Record};
pub use selector::TopKSelector;
pub use stats::RunStats;
pub use topk::{
    compute_top_k, compute_top_k_chunks, validate_k, TopK, TopKRequest, DEFAULT_CHUNK_SIZE,
};
