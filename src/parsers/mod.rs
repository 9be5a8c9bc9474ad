pub mod id_value;

pub use id_value::IdValueParser;

use crate::record::ParseResult;

/// Decode one raw line (without its terminator) into a parse result
///
/// Returns `None` for lines that are blank after trimming; those are skipped
/// silently rather than reported as discards.
pub trait RecordParser {
    fn parse_line(&self, raw: &[u8], line_number: u64, trailing: bool) -> Option<ParseResult>;
}
