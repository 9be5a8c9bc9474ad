use super::RecordParser;
use crate::record::{DiscardReason, Discarded, ParseResult, Record};

pub const DEFAULT_FIELD_SEPARATOR: char = '_';

/// Parser for `<identifier><sep><integer>` lines
#[derive(Debug, Clone, Copy)]
pub struct IdValueParser {
    separator: char,
}

impl IdValueParser {
    pub fn new() -> Self {
        Self::with_separator(DEFAULT_FIELD_SEPARATOR)
    }

    pub fn with_separator(separator: char) -> Self {
        Self { separator }
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    fn parse_text(&self, line: &str) -> Result<Record, DiscardReason> {
        let mut parts = line.split(self.separator);
        let (id, value) = match (parts.next(), parts.next(), parts.next()) {
            (Some(id), Some(value), None) => (id, value),
            _ => return Err(DiscardReason::Malformed),
        };

        if id.is_empty() || value.is_empty() {
            return Err(DiscardReason::Malformed);
        }

        let value = value
            .parse::<i64>()
            .map_err(|_| DiscardReason::NonInteger)?;

        Ok(Record::new(id, value))
    }
}

impl Default for IdValueParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordParser for IdValueParser {
    fn parse_line(&self, raw: &[u8], line_number: u64, trailing: bool) -> Option<ParseResult> {
        let discard = |reason, line: &str| {
            ParseResult::Invalid(Discarded {
                reason,
                line: line.to_string(),
                line_number,
                trailing,
            })
        };

        let text = match std::str::from_utf8(raw) {
            Ok(text) => text,
            Err(_) => {
                let lossy = String::from_utf8_lossy(raw);
                let trimmed = lossy.trim();
                if trimmed.is_empty() {
                    return None;
                }
                return Some(discard(DiscardReason::Decode, trimmed));
            }
        };

        let line = text.trim();
        if line.is_empty() {
            return None;
        }

        Some(match self.parse_text(line) {
            Ok(record) => ParseResult::Valid(record),
            Err(reason) => discard(reason, line),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &[u8]) -> Option<ParseResult> {
        IdValueParser::new().parse_line(raw, 1, false)
    }

    fn reason(raw: &[u8]) -> DiscardReason {
        match parse(raw) {
            Some(ParseResult::Invalid(discarded)) => discarded.reason,
            other => panic!("expected a discard for {:?}, got {:?}", raw, other),
        }
    }

    #[test]
    fn test_valid_record() {
        assert_eq!(
            parse(b"1426828011_9"),
            Some(ParseResult::Valid(Record::new("1426828011", 9)))
        );
    }

    #[test]
    fn test_signed_values() {
        assert_eq!(
            parse(b"a_-17"),
            Some(ParseResult::Valid(Record::new("a", -17)))
        );
        assert_eq!(parse(b"a_+17"), Some(ParseResult::Valid(Record::new("a", 17))));
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        assert_eq!(
            parse(b"  abc_5 \r"),
            Some(ParseResult::Valid(Record::new("abc", 5)))
        );
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        assert_eq!(parse(b""), None);
        assert_eq!(parse(b"   \t\r"), None);
    }

    #[test]
    fn test_wrong_field_count() {
        assert_eq!(reason(b"no-separator"), DiscardReason::Malformed);
        assert_eq!(reason(b"a_b_3"), DiscardReason::Malformed);
    }

    #[test]
    fn test_empty_fields_are_malformed() {
        assert_eq!(reason(b"_5"), DiscardReason::Malformed);
        assert_eq!(reason(b"a_"), DiscardReason::Malformed);
        assert_eq!(reason(b"_"), DiscardReason::Malformed);
    }

    #[test]
    fn test_non_integer_values() {
        assert_eq!(reason(b"a_1.5"), DiscardReason::NonInteger);
        assert_eq!(reason(b"a_ten"), DiscardReason::NonInteger);
        assert_eq!(reason(b"a_ 5"), DiscardReason::NonInteger);
        // Beyond the i64 range
        assert_eq!(reason(b"a_9223372036854775808"), DiscardReason::NonInteger);
    }

    #[test]
    fn test_i64_bounds_are_accepted() {
        assert_eq!(
            parse(b"max_9223372036854775807"),
            Some(ParseResult::Valid(Record::new("max", i64::MAX)))
        );
        assert_eq!(
            parse(b"min_-9223372036854775808"),
            Some(ParseResult::Valid(Record::new("min", i64::MIN)))
        );
    }

    #[test]
    fn test_invalid_utf8_is_a_decode_discard() {
        match parse(b"ab\xffc_5") {
            Some(ParseResult::Invalid(discarded)) => {
                assert_eq!(discarded.reason, DiscardReason::Decode);
                assert_eq!(discarded.line, "ab\u{fffd}c_5");
                assert_eq!(discarded.line_number, 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_custom_separator() {
        let parser = IdValueParser::with_separator(',');
        assert_eq!(
            parser.parse_line(b"snake_case_id,12", 4, false),
            Some(ParseResult::Valid(Record::new("snake_case_id", 12)))
        );
    }

    #[test]
    fn test_discard_carries_context() {
        let parser = IdValueParser::new();
        match parser.parse_line(b"x_y_z", 7, true) {
            Some(ParseResult::Invalid(discarded)) => {
                assert_eq!(discarded.line, "x_y_z");
                assert_eq!(discarded.line_number, 7);
                assert!(discarded.trailing);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
