use std::fmt;

/// One decoded `(identifier, value)` pair from the input stream
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    pub id: String,
    pub value: i64,
}

impl Record {
    pub fn new(id: impl Into<String>, value: i64) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.id, self.value)
    }
}

/// Why a line did not produce a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscardReason {
    /// Wrong number of fields, or an empty field
    Malformed,
    /// Second field is not a base-10 i64
    NonInteger,
    /// Line bytes are not valid UTF-8
    Decode,
}

impl DiscardReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscardReason::Malformed => "malformed record",
            DiscardReason::NonInteger => "non-integer value",
            DiscardReason::Decode => "decode error",
        }
    }
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line that was skipped, with enough context to report it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discarded {
    pub reason: DiscardReason,
    /// Trimmed line text; lossily decoded for `DiscardReason::Decode`
    pub line: String,
    /// 1-based line number in the stream
    pub line_number: u64,
    /// Set when the line was the unterminated fragment flushed at end of stream
    pub trailing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseResult {
    Valid(Record),
    Invalid(Discarded),
}

impl ParseResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ParseResult::Valid(_))
    }

    pub fn into_record(self) -> Option<Record> {
        match self {
            ParseResult::Valid(record) => Some(record),
            ParseResult::Invalid(_) => None,
        }
    }
}
