use crate::note::RecordId;
use std::collections::BTreeSet;
use std::fmt;

/// Predicate prefix understood by the note browser.
pub const ID_PREDICATE: &str = "nid:";
const ID_SEPARATOR: &str = ",";

/// No note ever has id 0, so `nid:0` matches nothing.
const NOTHING_ID: RecordId = 0;

/// Filter published to the browser after every change to the live set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DerivedQuery {
    MatchNothing,
    Ids(BTreeSet<RecordId>),
}

impl DerivedQuery {
    pub fn for_records(records: &BTreeSet<RecordId>) -> Self {
        if records.is_empty() {
            DerivedQuery::MatchNothing
        } else {
            DerivedQuery::Ids(records.clone())
        }
    }

    /// Parse `nid:1,2,3`. Returns `None` for anything else.
    pub fn parse(text: &str) -> Option<Self> {
        let list = text.trim().strip_prefix(ID_PREDICATE)?;
        let mut ids = BTreeSet::new();
        for part in list.split(ID_SEPARATOR) {
            ids.insert(part.trim().parse::<RecordId>().ok()?);
        }
        ids.remove(&NOTHING_ID);
        Some(Self::for_records(&ids))
    }

    pub fn matches(&self, id: RecordId) -> bool {
        match self {
            DerivedQuery::MatchNothing => false,
            DerivedQuery::Ids(ids) => ids.contains(&id),
        }
    }
}

impl fmt::Display for DerivedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DerivedQuery::MatchNothing => write!(f, "{ID_PREDICATE}{NOTHING_ID}"),
            DerivedQuery::Ids(ids) => {
                let list = ids
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(ID_SEPARATOR);
                write!(f, "{ID_PREDICATE}{list}")
            }
        }
    }
}

/// Receiver of the derived query, usually the note browser.
pub trait HostView {
    fn publish_query(&mut self, query: &DerivedQuery);
}

/// Remembers every published query; the last one is the current filter.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    pub published: Vec<String>,
}

impl RecordingView {
    pub fn last(&self) -> Option<&str> {
        self.published.last().map(String::as_str)
    }
}

impl HostView for RecordingView {
    fn publish_query(&mut self, query: &DerivedQuery) {
        self.published.push(query.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set_matches_nothing() {
        let q = DerivedQuery::for_records(&BTreeSet::new());
        assert_eq!(q.to_string(), "nid:0");
        assert!(!q.matches(0));
    }

    #[test]
    fn test_explicit_id_list() {
        let q = DerivedQuery::for_records(&BTreeSet::from([30, 4, 12]));
        assert_eq!(q.to_string(), "nid:4,12,30");
        assert!(q.matches(12));
        assert!(!q.matches(5));
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            DerivedQuery::parse(" nid:3, 1 "),
            Some(DerivedQuery::Ids(BTreeSet::from([1, 3])))
        );
        assert_eq!(DerivedQuery::parse("nid:0"), Some(DerivedQuery::MatchNothing));
        assert_eq!(DerivedQuery::parse("tag:x"), None);
        assert_eq!(DerivedQuery::parse("nid:1,abc"), None);
    }
}
