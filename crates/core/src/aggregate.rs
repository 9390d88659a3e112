//! Merging of per-session submission rows into one record per paper.
//!
//! Rows are bucketed by UID in a single pass. Scalar fields of a record come
//! from the first row of its group; sessions come from every row, in row order.

use crate::error::{Error, Result};
use crate::normalize::{normalize_abstract, normalize_title};
use crate::types::{Field, PaperRecord, RawRow, Session, SESSION_TIMEZONE};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Separators between author names.
static AUTHOR_SEPARATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(" and |, ").unwrap());

/// Order in which merged records are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupOrder {
    /// Ascending by UID (byte-wise string comparison).
    #[default]
    SortedByUid,
    /// In order of each UID's first appearance in the input.
    FirstSeen,
}

/// How to treat rows of one paper that disagree on title or abstract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsistencyCheck {
    /// Log a warning and keep the first row's text.
    #[default]
    Warn,
    /// Fail the run.
    Strict,
}

/// Groups submission rows by UID and merges each group into a [`PaperRecord`].
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    order: GroupOrder,
    consistency: ConsistencyCheck,
}

impl Aggregator {
    /// Create an aggregator that sorts by UID and warns on divergent rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the order of the emitted records.
    pub fn with_order(mut self, order: GroupOrder) -> Self {
        self.order = order;
        self
    }

    /// Set how divergent title/abstract text within a group is handled.
    pub fn with_consistency(mut self, consistency: ConsistencyCheck) -> Self {
        self.consistency = consistency;
        self
    }

    /// Merge rows into one record per UID.
    ///
    /// Fails on the first malformed row or unconvertible field; no partial
    /// result is returned.
    pub fn aggregate(&self, rows: &[RawRow]) -> Result<Vec<PaperRecord>> {
        let groups = self.group_rows(rows);

        log::debug!(
            "Grouped {} rows into {} papers ({:?})",
            rows.len(),
            groups.len(),
            self.order
        );

        groups.iter().map(|group| self.merge(group)).collect()
    }

    /// Bucket rows by UID, keeping input order inside each bucket.
    fn group_rows<'a>(&self, rows: &'a [RawRow]) -> Vec<Vec<&'a RawRow>> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<Vec<&RawRow>> = Vec::new();

        for row in rows {
            match index.get(row.uid.as_str()) {
                Some(&slot) => groups[slot].push(row),
                None => {
                    index.insert(row.uid.as_str(), groups.len());
                    groups.push(vec![row]);
                }
            }
        }

        if self.order == GroupOrder::SortedByUid {
            // Each bucket holds a single UID, so rows of a paper keep input order.
            groups.sort_by(|a, b| a[0].uid.cmp(&b[0].uid));
        }

        groups
    }

    /// Build one record from a non-empty group.
    fn merge(&self, group: &[&RawRow]) -> Result<PaperRecord> {
        let first = group[0];
        self.check_consistency(group)?;

        let abstract_text = normalize_abstract(&first.abstract_text)
            .map_err(|e| e.in_field(&first.uid, Field::Abstract))?;

        let sessions = group
            .iter()
            .map(|row| build_session(row))
            .collect::<Result<Vec<_>>>()?;

        Ok(PaperRecord {
            uid: first.uid.clone(),
            url: first.url.trim().to_string(),
            title: normalize_title(&first.title),
            abstract_text,
            authors: split_authors(&first.authors),
            paper_type: first.paper_type.clone(),
            sessions,
        })
    }

    fn check_consistency(&self, group: &[&RawRow]) -> Result<()> {
        let first = group[0];

        for field in [Field::Title, Field::Abstract] {
            let diverges = group[1..]
                .iter()
                .any(|row| row.get(field) != first.get(field));
            if !diverges {
                continue;
            }

            match self.consistency {
                ConsistencyCheck::Warn => log::warn!(
                    "Rows for UID {:?} disagree on {}; using the first row",
                    first.uid,
                    field
                ),
                ConsistencyCheck::Strict => {
                    return Err(Error::InconsistentGroup {
                        uid: first.uid.clone(),
                        field,
                    })
                }
            }
        }

        Ok(())
    }
}

/// Merge rows into one record per UID, sorted by UID.
pub fn aggregate(rows: &[RawRow]) -> Result<Vec<PaperRecord>> {
    Aggregator::new().aggregate(rows)
}

/// Split a delimited author string into trimmed names.
///
/// Names are separated by `" and "` or `", "`. Empty fragments are kept, so
/// the result always has one more entry than there are separators.
pub fn split_authors(authors: &str) -> Vec<String> {
    AUTHOR_SEPARATOR_REGEX
        .split(authors)
        .map(|name| name.trim().to_string())
        .collect()
}

/// Build the session described by one row.
///
/// `Day Date` looks like `"Mon, Jan 1, 2021"`: the day is the text before the
/// first comma, the date is every space-separated token except the first and
/// the last.
pub fn build_session(row: &RawRow) -> Result<Session> {
    let tokens: Vec<&str> = row.day_date.split(' ').collect();
    if tokens.len() < 2 {
        return Err(Error::MalformedRow {
            uid: row.uid.clone(),
            field: Field::DayDate,
            reason: format!("expected a weekday and a date, got {:?}", row.day_date),
        });
    }

    let day = row
        .day_date
        .split_once(',')
        .map_or(row.day_date.as_str(), |(day, _)| day);

    Ok(Session {
        track: row.track.clone(),
        day: day.to_string(),
        date: tokens[1..tokens.len() - 1].join(" "),
        start_time: row.session_start.clone(),
        end_time: row.session_end.clone(),
        timezone: SESSION_TIMEZONE.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(uid: &str, track: &str, day_date: &str) -> RawRow {
        RawRow {
            uid: uid.to_string(),
            url: format!(" https://example.org/{uid} "),
            title: format!("{{Paper}} {uid}"),
            abstract_text: "An abstract.".to_string(),
            authors: "Ada Lovelace, Alan Turing and Grace Hopper".to_string(),
            paper_type: "long".to_string(),
            track: track.to_string(),
            day_date: day_date.to_string(),
            session_start: "10:00".to_string(),
            session_end: "11:00".to_string(),
        }
    }

    #[test]
    fn test_split_authors() {
        assert_eq!(split_authors("A and B, C"), vec!["A", "B", "C"]);
        assert_eq!(
            split_authors("Jane Doe and John Smith"),
            vec!["Jane Doe", "John Smith"]
        );
        assert_eq!(split_authors("Solo Author"), vec!["Solo Author"]);
    }

    #[test]
    fn test_split_authors_is_case_sensitive_and_trims() {
        assert_eq!(split_authors("Sand AND Stone"), vec!["Sand AND Stone"]);
        assert_eq!(split_authors(" A and  B "), vec!["A", "B"]);
    }

    #[test]
    fn test_split_authors_keeps_empty_fragments() {
        assert_eq!(split_authors("A, , B"), vec!["A", "", "B"]);
        assert_eq!(split_authors(""), vec![""]);
        assert_eq!(split_authors("A and "), vec!["A", ""]);
    }

    #[test]
    fn test_build_session() {
        let session = build_session(&row("1", "NLP", "Mon, Jan 1, 2021")).unwrap();

        assert_eq!(session.track, "NLP");
        assert_eq!(session.day, "Mon");
        assert_eq!(session.date, "Jan 1,");
        assert_eq!(session.start_time, "10:00");
        assert_eq!(session.end_time, "11:00");
        assert_eq!(session.timezone, "UTC+0");
    }

    #[test]
    fn test_build_session_two_tokens() {
        let session = build_session(&row("1", "NLP", "Tue, July")).unwrap();
        assert_eq!(session.day, "Tue");
        assert_eq!(session.date, "");
    }

    #[test]
    fn test_build_session_rejects_single_token() {
        for day_date in ["Monday", ""] {
            let err = build_session(&row("7", "NLP", day_date)).unwrap_err();
            match err {
                Error::MalformedRow { uid, field, .. } => {
                    assert_eq!(uid, "7");
                    assert_eq!(field, Field::DayDate);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_aggregate_example_row() {
        let input = RawRow {
            uid: "1".to_string(),
            url: " http://x ".to_string(),
            title: "{A} Study of {B}".to_string(),
            abstract_text: "We show \\textbf{results} \\cite{foo2020}.".to_string(),
            authors: "Jane Doe and John Smith".to_string(),
            paper_type: "long".to_string(),
            track: "NLP".to_string(),
            day_date: "Mon, Jan 1, 2021".to_string(),
            session_start: "10:00".to_string(),
            session_end: "11:00".to_string(),
        };

        let records = aggregate(&[input]).unwrap();

        assert_eq!(
            records,
            vec![PaperRecord {
                uid: "1".to_string(),
                url: "http://x".to_string(),
                title: "A Study of B".to_string(),
                abstract_text: "We show results .".to_string(),
                authors: vec!["Jane Doe".to_string(), "John Smith".to_string()],
                paper_type: "long".to_string(),
                sessions: vec![Session {
                    track: "NLP".to_string(),
                    day: "Mon".to_string(),
                    date: "Jan 1,".to_string(),
                    start_time: "10:00".to_string(),
                    end_time: "11:00".to_string(),
                    timezone: "UTC+0".to_string(),
                }],
            }]
        );
    }

    #[test]
    fn test_aggregate_cardinality() {
        let rows = vec![
            row("b", "T1", "Mon, Jan 1, 2021"),
            row("a", "T1", "Mon, Jan 1, 2021"),
            row("b", "T2", "Tue, Jan 2, 2021"),
            row("c", "T1", "Mon, Jan 1, 2021"),
            row("b", "T3", "Wed, Jan 3, 2021"),
        ];

        let records = aggregate(&rows).unwrap();

        assert_eq!(records.len(), 3);
        let b = records.iter().find(|r| r.uid == "b").unwrap();
        assert_eq!(b.sessions.len(), 3);
        assert_eq!(
            b.sessions.iter().map(|s| s.track.as_str()).collect::<Vec<_>>(),
            vec!["T1", "T2", "T3"]
        );
    }

    #[test]
    fn test_aggregate_sorts_by_uid_by_default() {
        let rows = vec![
            row("10", "T", "Mon, Jan 1, 2021"),
            row("2", "T", "Mon, Jan 1, 2021"),
            row("1", "T", "Mon, Jan 1, 2021"),
        ];

        let uids: Vec<String> = aggregate(&rows).unwrap().into_iter().map(|r| r.uid).collect();
        assert_eq!(uids, vec!["1", "10", "2"]);
    }

    #[test]
    fn test_aggregate_first_seen_order() {
        let rows = vec![
            row("10", "T", "Mon, Jan 1, 2021"),
            row("2", "T", "Mon, Jan 1, 2021"),
            row("10", "U", "Tue, Jan 2, 2021"),
            row("1", "T", "Mon, Jan 1, 2021"),
        ];

        let records = Aggregator::new()
            .with_order(GroupOrder::FirstSeen)
            .aggregate(&rows)
            .unwrap();

        let uids: Vec<&str> = records.iter().map(|r| r.uid.as_str()).collect();
        assert_eq!(uids, vec!["10", "2", "1"]);
        assert_eq!(records[0].sessions[1].track, "U");
    }

    #[test]
    fn test_aggregate_first_row_wins() {
        let mut second = row("1", "T2", "Tue, Jan 2, 2021");
        second.title = "Another title".to_string();
        second.abstract_text = "Another abstract.".to_string();
        second.url = "https://elsewhere".to_string();
        second.paper_type = "short".to_string();

        let records = aggregate(&[row("1", "T1", "Mon, Jan 1, 2021"), second]).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Paper 1");
        assert_eq!(records[0].abstract_text, "An abstract.");
        assert_eq!(records[0].url, "https://example.org/1");
        assert_eq!(records[0].paper_type, "long");
        assert_eq!(records[0].sessions.len(), 2);
    }

    #[test]
    fn test_aggregate_strict_rejects_divergent_rows() {
        let mut second = row("1", "T2", "Tue, Jan 2, 2021");
        second.abstract_text = "Different.".to_string();

        let err = Aggregator::new()
            .with_consistency(ConsistencyCheck::Strict)
            .aggregate(&[row("1", "T1", "Mon, Jan 1, 2021"), second])
            .unwrap_err();

        assert!(matches!(
            err,
            Error::InconsistentGroup { ref uid, field: Field::Abstract } if uid == "1"
        ));
    }

    #[test]
    fn test_aggregate_strict_accepts_identical_rows() {
        let records = Aggregator::new()
            .with_consistency(ConsistencyCheck::Strict)
            .aggregate(&[
                row("1", "T1", "Mon, Jan 1, 2021"),
                row("1", "T2", "Tue, Jan 2, 2021"),
            ])
            .unwrap();
        assert_eq!(records[0].sessions.len(), 2);
    }

    #[test]
    fn test_aggregate_reports_abstract_errors_with_uid() {
        let mut bad = row("42", "T", "Mon, Jan 1, 2021");
        bad.abstract_text = "x\\textsubscript{\u{0663}}".to_string();

        let err = aggregate(&[row("1", "T", "Mon, Jan 1, 2021"), bad]).unwrap_err();

        match err {
            Error::InvalidField { uid, field, source } => {
                assert_eq!(uid, "42");
                assert_eq!(field, Field::Abstract);
                assert!(matches!(*source, Error::UnsupportedCharacter { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_aggregate_fails_whole_run_on_bad_session() {
        let rows = vec![
            row("1", "T", "Mon, Jan 1, 2021"),
            row("1", "T", "Broken"),
        ];
        assert!(matches!(
            aggregate(&rows),
            Err(Error::MalformedRow { field: Field::DayDate, .. })
        ));
    }

    #[test]
    fn test_aggregate_groups_empty_uid_rows() {
        let rows = vec![
            row("", "T1", "Mon, Jan 1, 2021"),
            row("1", "T1", "Mon, Jan 1, 2021"),
            row("", "T2", "Tue, Jan 2, 2021"),
        ];

        let records = aggregate(&rows).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].uid, "");
        assert_eq!(records[0].url, "https://example.org/");
        assert_eq!(
            records[0].sessions.iter().map(|s| s.track.as_str()).collect::<Vec<_>>(),
            vec!["T1", "T2"]
        );
        assert_eq!(records[1].uid, "1");
    }

    #[test]
    fn test_aggregate_empty_input() {
        assert!(aggregate(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_aggregate_does_not_mutate_rows() {
        let rows = vec![row("1", "T", "Mon, Jan 1, 2021")];
        let before = rows.clone();
        aggregate(&rows).unwrap();
        assert_eq!(rows, before);
    }
}
