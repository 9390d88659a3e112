//! Output document for merged paper records.
//!
//! The default document is a block-style YAML list with one mapping per paper,
//! the layout static conference sites load their paper lists from. JSON is
//! available for other consumers.

use crate::error::Result;
use crate::types::PaperRecord;
use serde_json::Value;

/// Serialization format of the records document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    /// Block-style YAML.
    #[default]
    Yaml,
    /// A JSON array.
    Json,
}

impl DocumentFormat {
    /// Conventional file extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Yaml => "yml",
            Self::Json => "json",
        }
    }
}

/// Formatter for the paper records document.
#[derive(Debug, Clone)]
pub struct DocumentFormatter {
    format: DocumentFormat,

    /// Indent nested JSON structures, one field per line. YAML is always block style.
    pretty: bool,
}

impl Default for DocumentFormatter {
    fn default() -> Self {
        Self {
            format: DocumentFormat::Yaml,
            pretty: true,
        }
    }
}

impl DocumentFormatter {
    /// Create a new formatter producing block-style YAML.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the serialization format.
    pub fn with_format(mut self, format: DocumentFormat) -> Self {
        self.format = format;
        self
    }

    /// Set whether JSON output is indented.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Format records into a document string with a trailing newline.
    pub fn format(&self, records: &[PaperRecord]) -> Result<String> {
        let mut document = match self.format {
            DocumentFormat::Yaml => serde_yaml::to_string(records)?,
            DocumentFormat::Json if self.pretty => serde_json::to_string_pretty(records)?,
            DocumentFormat::Json => serde_json::to_string(records)?,
        };
        if !document.ends_with('\n') {
            document.push('\n');
        }
        Ok(document)
    }
}

/// Convert records into plain nested maps and lists.
pub fn to_value(records: &[PaperRecord]) -> Result<Value> {
    Ok(serde_json::to_value(records)?)
}
