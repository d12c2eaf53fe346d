use crate::note::{RecordId, RecordStore};
use std::collections::{BTreeMap, BTreeSet};

/// Namespace separator inside hierarchical tags.
pub const TAG_SEPARATOR: &str = "::";

/// Per-tag owning records for one record set. Iterates tags in lexicographic
/// order; a tag is present only while at least one record carries it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagIndex {
    owners: BTreeMap<String, BTreeSet<RecordId>>,
}

impl TagIndex {
    pub fn count(&self, tag: &str) -> usize {
        self.owners.get(tag).map_or(0, BTreeSet::len)
    }

    pub fn records(&self, tag: &str) -> Option<&BTreeSet<RecordId>> {
        self.owners.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.owners.contains_key(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.owners.keys().map(String::as_str)
    }

    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (&str, usize, &BTreeSet<RecordId>)> {
        self.owners.iter().map(|(t, ids)| (t.as_str(), ids.len(), ids))
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

/// Build the tag index for `records`. Ids the store cannot resolve contribute
/// nothing.
pub fn aggregate<S>(records: &BTreeSet<RecordId>, store: &S) -> TagIndex
where
    S: RecordStore + ?Sized,
{
    let mut index = TagIndex::default();
    for &id in records {
        let tags = match store.tags_of(id) {
            Ok(tags) => tags,
            Err(err) => {
                tracing::debug!(record = id, %err, "skipping record during aggregation");
                continue;
            }
        };
        for tag in tags {
            index.owners.entry(tag).or_default().insert(id);
        }
    }
    tracing::debug!(records = records.len(), tags = index.len(), "aggregated tags");
    index
}

/// Collapse the middle of deep tags: `a::b::c::d` becomes `a::(...)::d`.
/// Tags with one or two segments are returned unchanged.
pub fn abbreviate_tag(tag: &str) -> String {
    let parts: Vec<&str> = tag.split(TAG_SEPARATOR).collect();
    if parts.len() <= 2 {
        return tag.to_string();
    }
    format!(
        "{}{sep}(...){sep}{}",
        parts[0],
        parts[parts.len() - 1],
        sep = TAG_SEPARATOR
    )
}

/// Hash a tag for deterministic color selection
pub fn hash_tag(tag: &str) -> u64 {
    let mut h: u64 = 5381;
    for b in tag.bytes() {
        h = (h.wrapping_shl(5)).wrapping_add(h) ^ u64::from(b);
    }
    h
}

/// Get color for a tag based on hash of its top-level namespace, so siblings
/// share a color.
pub fn color_for_tag(tag: &str) -> (u8, u8, u8) {
    const PALETTE: &[(u8, u8, u8)] = &[
        (137, 180, 250),
        (166, 227, 161),
        (249, 226, 175),
        (245, 194, 231),
        (255, 169, 167),
        (148, 226, 213),
        (198, 160, 246),
        (240, 198, 198),
        (183, 189, 248),
        (255, 214, 165),
    ];
    let root = tag.split(TAG_SEPARATOR).next().unwrap_or(tag);
    let h = hash_tag(root);
    PALETTE[(h as usize) % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> BTreeMap<RecordId, Vec<String>> {
        BTreeMap::from([
            (1, vec!["x".to_string(), "y".to_string()]),
            (2, vec!["y".to_string()]),
            (3, vec!["z".to_string()]),
        ])
    }

    #[test]
    fn test_aggregate_counts_and_owners() {
        let index = aggregate(&BTreeSet::from([1, 2, 3]), &store());
        assert_eq!(index.tags().collect::<Vec<_>>(), vec!["x", "y", "z"]);
        assert_eq!(index.count("x"), 1);
        assert_eq!(index.count("y"), 2);
        assert_eq!(index.count("z"), 1);
        assert_eq!(index.records("y"), Some(&BTreeSet::from([1, 2])));
        assert_eq!(index.records("z"), Some(&BTreeSet::from([3])));
    }

    #[test]
    fn test_aggregate_count_matches_carriers() {
        let store = store();
        let records = BTreeSet::from([1, 2, 3]);
        let index = aggregate(&records, &store);
        for (tag, count, owners) in index.iter() {
            let carriers = records
                .iter()
                .filter(|id| store[*id].iter().any(|t| t == tag))
                .count();
            assert_eq!(count, carriers);
            assert_eq!(count, owners.len());
        }
    }

    #[test]
    fn test_aggregate_skips_lookup_miss() {
        let index = aggregate(&BTreeSet::from([2, 99]), &store());
        assert_eq!(index.len(), 1);
        assert_eq!(index.records("y"), Some(&BTreeSet::from([2])));
        assert!(index.iter().all(|(_, _, ids)| !ids.contains(&99)));
    }

    #[test]
    fn test_aggregate_empty_set() {
        let index = aggregate(&BTreeSet::new(), &store());
        assert!(index.is_empty());
        assert_eq!(index.count("x"), 0);
    }

    #[test]
    fn test_abbreviate_tag() {
        assert_eq!(abbreviate_tag("a::b::c::d"), "a::(...)::d");
        assert_eq!(abbreviate_tag("a::b::c"), "a::(...)::c");
        assert_eq!(abbreviate_tag("a::b"), "a::b");
        assert_eq!(abbreviate_tag("a"), "a");
    }

    #[test]
    fn test_color_shared_by_namespace() {
        assert_eq!(color_for_tag("lang::rust"), color_for_tag("lang::go"));
        assert_eq!(hash_tag("todo"), hash_tag("todo"));
        assert_ne!(hash_tag("todo"), hash_tag("work"));
    }
}
