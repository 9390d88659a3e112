//! Domain types for submission rows and merged paper records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Timezone attached to every session produced by this pipeline.
pub const SESSION_TIMEZONE: &str = "UTC+0";

/// A column of the submission table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Uid,
    Url,
    Title,
    Abstract,
    Authors,
    PaperType,
    Track,
    DayDate,
    SessionStart,
    SessionEnd,
}

impl Field {
    /// Every column a well-formed table must provide, in header order.
    pub const ALL: [Field; 10] = [
        Field::Uid,
        Field::Url,
        Field::Title,
        Field::Abstract,
        Field::Authors,
        Field::PaperType,
        Field::Track,
        Field::DayDate,
        Field::SessionStart,
        Field::SessionEnd,
    ];

    /// The header name used for this column in the source table.
    pub fn header(self) -> &'static str {
        match self {
            Field::Uid => "UID",
            Field::Url => "URL",
            Field::Title => "title",
            Field::Abstract => "abstract",
            Field::Authors => "authors",
            Field::PaperType => "paper_type",
            Field::Track => "track",
            Field::DayDate => "Day Date",
            Field::SessionStart => "Ses Time",
            Field::SessionEnd => "Ses End Time",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// One row of the submission table: a single paper-session pairing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// Paper identifier; rows sharing it belong to the same paper.
    pub uid: String,
    pub url: String,
    /// Raw title, may contain LaTeX markup.
    pub title: String,
    /// Raw abstract, may contain LaTeX markup.
    pub abstract_text: String,
    /// Authors as one delimited string ("A, B and C").
    pub authors: String,
    pub paper_type: String,
    pub track: String,
    /// Compound weekday and date, e.g. "Mon, Jan 1, 2021".
    pub day_date: String,
    pub session_start: String,
    pub session_end: String,
}

impl RawRow {
    /// Get the raw value of a column.
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Uid => &self.uid,
            Field::Url => &self.url,
            Field::Title => &self.title,
            Field::Abstract => &self.abstract_text,
            Field::Authors => &self.authors,
            Field::PaperType => &self.paper_type,
            Field::Track => &self.track,
            Field::DayDate => &self.day_date,
            Field::SessionStart => &self.session_start,
            Field::SessionEnd => &self.session_end,
        }
    }

    /// Get a mutable reference to a column.
    pub fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Uid => &mut self.uid,
            Field::Url => &mut self.url,
            Field::Title => &mut self.title,
            Field::Abstract => &mut self.abstract_text,
            Field::Authors => &mut self.authors,
            Field::PaperType => &mut self.paper_type,
            Field::Track => &mut self.track,
            Field::DayDate => &mut self.day_date,
            Field::SessionStart => &mut self.session_start,
            Field::SessionEnd => &mut self.session_end,
        }
    }
}

/// A paper with its text cleaned and all its sessions merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub uid: String,

    /// URL with surrounding whitespace removed.
    pub url: String,

    /// Title with LaTeX markup resolved to plain text.
    pub title: String,

    /// Abstract with LaTeX markup resolved to plain text.
    #[serde(rename = "abstract")]
    pub abstract_text: String,

    /// Author names in the order they were listed.
    pub authors: Vec<String>,

    pub paper_type: String,

    /// One entry per input row for this paper, in row order.
    pub sessions: Vec<Session>,
}

/// One scheduled presentation of a paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub track: String,

    /// Weekday token, e.g. "Mon".
    pub day: String,

    /// Date without the weekday and the trailing token, e.g. "Jan 1,".
    pub date: String,

    pub start_time: String,
    pub end_time: String,
    pub timezone: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_headers_are_distinct() {
        let headers: std::collections::HashSet<&str> =
            Field::ALL.iter().map(|f| f.header()).collect();
        assert_eq!(headers.len(), Field::ALL.len());
    }

    #[test]
    fn test_field_display_uses_header() {
        assert_eq!(Field::DayDate.to_string(), "Day Date");
        assert_eq!(Field::SessionEnd.to_string(), "Ses End Time");
    }

    #[test]
    fn test_raw_row_get_and_get_mut() {
        let mut row = RawRow::default();
        for field in Field::ALL {
            *row.get_mut(field) = field.header().to_string();
        }
        for field in Field::ALL {
            assert_eq!(row.get(field), field.header());
        }
    }

    #[test]
    fn test_paper_record_serializes_abstract_key() {
        let record = PaperRecord {
            uid: "1".to_string(),
            url: "http://x".to_string(),
            title: "T".to_string(),
            abstract_text: "A".to_string(),
            authors: vec!["Jane Doe".to_string()],
            paper_type: "long".to_string(),
            sessions: Vec::new(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["abstract"], "A");
        assert!(value.get("abstract_text").is_none());
    }
}
