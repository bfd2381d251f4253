//! Comparator algebra: multi-key ordering over records.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::types::Record;
use crate::value::compare_values;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// A single `(field, direction)` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: Direction,
}

/// Ordered list of sort keys.
///
/// Keys are evaluated in sequence and the first non-equal result wins.
/// Records equal on every key tie; ties are left to the sort's stability.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Comparator {
    keys: Vec<SortKey>,
}

impl Comparator {
    /// Ascending on one field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::default().then_asc(field)
    }

    /// Descending on one field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::default().then_desc(field)
    }

    /// Add an ascending tie-breaker.
    pub fn then_asc(self, field: impl Into<String>) -> Self {
        self.then(field, Direction::Asc)
    }

    /// Add a descending tie-breaker.
    pub fn then_desc(self, field: impl Into<String>) -> Self {
        self.then(field, Direction::Desc)
    }

    /// Add a tie-breaker key.
    pub fn then(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.keys.push(SortKey {
            field: field.into(),
            direction,
        });
        self
    }

    /// Append every key of `other` after this comparator's keys.
    pub fn chain(mut self, other: Comparator) -> Self {
        self.keys.extend(other.keys);
        self
    }

    /// Flip every key's direction.
    pub fn reversed(self) -> Self {
        Self {
            keys: self
                .keys
                .into_iter()
                .map(|k| SortKey {
                    field: k.field,
                    direction: match k.direction {
                        Direction::Asc => Direction::Desc,
                        Direction::Desc => Direction::Asc,
                    },
                })
                .collect(),
        }
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Compare two records.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        for key in &self.keys {
            let ordering = compare_values(a.get(&key.field), b.get(&key.field));
            let ordering = match key.direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Stable in-place sort.
    pub fn sort(&self, records: &mut [Record]) {
        records.sort_by(|a, b| self.compare(a, b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn rec(v: serde_json::Value) -> Record {
        Record::from_value(v).unwrap()
    }

    fn ids(records: &[Record]) -> Vec<i64> {
        records
            .iter()
            .map(|r| r.id().and_then(|id| id.as_int()).unwrap())
            .collect()
    }

    #[test]
    fn test_single_key() {
        let mut records = vec![
            rec(json!({"id": 1, "lastName": "Young"})),
            rec(json!({"id": 2, "lastName": "Bonham"})),
        ];
        Comparator::asc("lastName").sort(&mut records);
        assert_eq!(ids(&records), vec![2, 1]);

        Comparator::desc("lastName").sort(&mut records);
        assert_eq!(ids(&records), vec![1, 2]);
    }

    #[test]
    fn test_multi_key() {
        let mut records = vec![
            rec(json!({"id": 1, "band": "AC/DC", "name": "Malcolm"})),
            rec(json!({"id": 2, "band": "Led Zeppelin", "name": "Jimmy"})),
            rec(json!({"id": 3, "band": "AC/DC", "name": "Angus"})),
        ];
        Comparator::asc("band").then_asc("name").sort(&mut records);
        assert_eq!(ids(&records), vec![3, 1, 2]);

        Comparator::desc("band").then_asc("name").sort(&mut records);
        assert_eq!(ids(&records), vec![2, 3, 1]);
    }

    #[test]
    fn test_ties_keep_arrival_order() {
        let mut records = vec![
            rec(json!({"id": 1, "k": 5})),
            rec(json!({"id": 2, "k": 1})),
            rec(json!({"id": 3, "k": 5})),
            rec(json!({"id": 4, "k": 1})),
        ];
        Comparator::asc("k").sort(&mut records);
        assert_eq!(ids(&records), vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_missing_sorts_first() {
        let a = rec(json!({"id": 1}));
        let b = rec(json!({"id": 2, "k": null}));
        assert_eq!(Comparator::asc("k").compare(&a, &b), Ordering::Less);
        assert_eq!(Comparator::asc("k").reversed().compare(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_empty_comparator_ties() {
        let a = rec(json!({"id": 1}));
        let b = rec(json!({"id": 2}));
        assert_eq!(Comparator::default().compare(&a, &b), Ordering::Equal);
    }

    proptest! {
        #[test]
        fn test_sort_is_ordered_and_stable(keys in prop::collection::vec(0i64..4, 0..24)) {
            let mut records: Vec<Record> = keys
                .iter()
                .enumerate()
                .map(|(i, k)| rec(json!({"id": i, "k": k})))
                .collect();
            Comparator::asc("k").sort(&mut records);

            let sorted = ids(&records);
            for (i, pair) in records.windows(2).enumerate() {
                let ordering = compare_values(pair[0].get("k"), pair[1].get("k"));
                prop_assert_ne!(ordering, Ordering::Greater);
                if ordering == Ordering::Equal {
                    prop_assert!(sorted[i] < sorted[i + 1]);
                }
            }
        }
    }
}
