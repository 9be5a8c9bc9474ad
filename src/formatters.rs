use serde::Serialize;
use topids::Record;

use crate::cli::OutputFormat;

/// Renders the winning records as output lines
pub trait Formatter {
    fn format(&self, winners: &[Record]) -> Vec<String>;
}

/// One identifier per line
pub struct DefaultFormatter;

impl Formatter for DefaultFormatter {
    fn format(&self, winners: &[Record]) -> Vec<String> {
        winners.iter().map(|r| r.id.clone()).collect()
    }
}

/// One `id<sep>value` record per line
pub struct RecordsFormatter {
    separator: char,
}

impl RecordsFormatter {
    pub fn new(separator: char) -> Self {
        Self { separator }
    }
}

impl Formatter for RecordsFormatter {
    fn format(&self, winners: &[Record]) -> Vec<String> {
        winners
            .iter()
            .map(|r| format!("{}{}{}", r.id, self.separator, r.value))
            .collect()
    }
}

#[derive(Serialize)]
struct TopIds<'a> {
    top_ids: Vec<&'a str>,
}

/// A single `{"top_ids": [...]}` document
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, winners: &[Record]) -> Vec<String> {
        let document = TopIds {
            top_ids: winners.iter().map(|r| r.id.as_str()).collect(),
        };
        vec![serde_json::to_string(&document).unwrap_or_else(|_| "{}".to_string())]
    }
}

pub fn create_formatter(format: OutputFormat, separator: char) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Default => Box::new(DefaultFormatter),
        OutputFormat::Records => Box::new(RecordsFormatter::new(separator)),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}
