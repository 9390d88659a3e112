//! Error types for paper record import.

use crate::types::Field;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while importing paper records.
///
/// The pipeline is all-or-nothing: every variant aborts the run.
#[derive(Error, Debug)]
pub enum Error {
    /// A superscript or subscript macro captured a digit with no glyph.
    #[error("Unsupported character {character:?} in \\{command}")]
    UnsupportedCharacter {
        character: char,
        command: &'static str,
    },

    /// A row is missing a field or a compound field cannot be split.
    #[error("Malformed row (UID {uid:?}, field {field}): {reason}")]
    MalformedRow {
        uid: String,
        field: Field,
        reason: String,
    },

    /// The table header does not name a required column.
    #[error("Missing required column: {0}")]
    MissingColumn(Field),

    /// Normalizing one field of a row failed.
    #[error("Invalid {field} for UID {uid:?}")]
    InvalidField {
        uid: String,
        field: Field,
        #[source]
        source: Box<Error>,
    },

    /// Rows sharing a UID disagree on a field that is taken from the first row.
    #[error("Rows for UID {uid:?} disagree on {field}")]
    InconsistentGroup { uid: String, field: Field },

    /// Failed to open or read the input file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The tab-separated table could not be parsed.
    #[error("Table parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// The JSON document could not be produced.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The YAML document could not be produced.
    #[error("YAML serialization error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

impl Error {
    /// Wrap this error with the row and field it came from.
    pub fn in_field(self, uid: impl Into<String>, field: Field) -> Self {
        Error::InvalidField {
            uid: uid.into(),
            field,
            source: Box::new(self),
        }
    }
}
