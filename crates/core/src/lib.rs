//! Core paper record types, LaTeX-to-text normalization, and session
//! aggregation for conference programs.

pub mod aggregate;
pub mod error;
pub mod normalize;
pub mod output;
pub mod table;
pub mod types;

pub use aggregate::{aggregate, split_authors, Aggregator, ConsistencyCheck, GroupOrder};
pub use error::{Error, Result};
pub use normalize::{normalize_abstract, normalize_title};
pub use output::{DocumentFormat, DocumentFormatter};
pub use table::{read_rows, read_rows_from_path};
pub use types::{Field, PaperRecord, RawRow, Session};
