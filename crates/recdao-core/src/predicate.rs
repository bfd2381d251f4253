//! Predicate algebra: boolean tests over records.
//!
//! A predicate is a closed tree of comparison leaves combined with
//! AND/OR/NOT. Evaluation is pure and short-circuits left to right.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

use crate::types::Record;
use crate::value::{compare_values, values_equal};

/// One side of a comparison leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// The value of a named field of the record under test.
    Field(String),
    /// A constant.
    Literal(Value),
}

impl Operand {
    /// Shorthand for a field reference.
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    /// Shorthand for a literal.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    fn resolve<'a>(&'a self, record: &'a Record) -> Option<&'a Value> {
        match self {
            Self::Field(name) => record.get(name),
            Self::Literal(value) => Some(value),
        }
    }
}

/// A boolean test over a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Matches every record.
    True,
    /// Matches no record.
    False,
    /// Both sides present and equal.
    Eq(Operand, Operand),
    /// Sides differ (a missing side differs from any present value).
    Neq(Operand, Operand),
    /// Both sides present, left greater.
    Gt(Operand, Operand),
    /// Both sides present, left greater or equal.
    Gte(Operand, Operand),
    /// Both sides present, left less.
    Lt(Operand, Operand),
    /// Both sides present, left less or equal.
    Lte(Operand, Operand),
    /// Field equals one of the listed values.
    In(String, Vec<Value>),
    /// Field is present and not null.
    Has(String),
    /// String field contains the substring.
    Contains(String, String),
    /// Every sub-predicate matches.
    And(Vec<Predicate>),
    /// At least one sub-predicate matches.
    Or(Vec<Predicate>),
    /// The sub-predicate does not match.
    Not(Box<Predicate>),
}

impl Predicate {
    /// `field == value`
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(Operand::field(field), Operand::literal(value))
    }

    /// `field != value`
    pub fn neq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Neq(Operand::field(field), Operand::literal(value))
    }

    /// `field > value`
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Gt(Operand::field(field), Operand::literal(value))
    }

    /// `field >= value`
    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Gte(Operand::field(field), Operand::literal(value))
    }

    /// `field < value`
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Lt(Operand::field(field), Operand::literal(value))
    }

    /// `field <= value`
    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Lte(Operand::field(field), Operand::literal(value))
    }

    /// `left == right`, both fields of the same record.
    pub fn field_eq(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::Eq(Operand::field(left), Operand::field(right))
    }

    /// `left < right`, both fields of the same record.
    pub fn field_lt(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::Lt(Operand::field(left), Operand::field(right))
    }

    /// `left > right`, both fields of the same record.
    pub fn field_gt(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::Gt(Operand::field(left), Operand::field(right))
    }

    /// Field value is one of `values`.
    pub fn one_of<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::In(field.into(), values.into_iter().map(Into::into).collect())
    }

    /// Field is present and not null.
    pub fn has(field: impl Into<String>) -> Self {
        Self::Has(field.into())
    }

    /// String field contains `needle`.
    pub fn contains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::Contains(field.into(), needle.into())
    }

    /// Conjunction of all predicates.
    pub fn all(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        predicates
            .into_iter()
            .fold(Self::And(Vec::new()), |acc, p| acc.and(p))
    }

    /// Disjunction of all predicates.
    pub fn any(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Self::Or(predicates.into_iter().collect())
    }

    /// AND this predicate with another, flattening nested conjunctions.
    pub fn and(self, other: Predicate) -> Self {
        let mut terms = match self {
            Self::And(terms) => terms,
            single => vec![single],
        };
        match other {
            Self::And(more) => terms.extend(more),
            single => terms.push(single),
        }
        Self::And(terms)
    }

    /// OR this predicate with another.
    pub fn or(self, other: Predicate) -> Self {
        match self {
            Self::Or(mut terms) => {
                terms.push(other);
                Self::Or(terms)
            }
            single => Self::Or(vec![single, other]),
        }
    }

    /// Evaluate against a record.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::True => true,
            Self::False => false,
            Self::Eq(l, r) => match (l.resolve(record), r.resolve(record)) {
                (Some(a), Some(b)) => values_equal(Some(a), Some(b)),
                _ => false,
            },
            Self::Neq(l, r) => !values_equal(l.resolve(record), r.resolve(record)),
            Self::Gt(l, r) => relate(l, r, record, |o| o == Ordering::Greater),
            Self::Gte(l, r) => relate(l, r, record, |o| o != Ordering::Less),
            Self::Lt(l, r) => relate(l, r, record, |o| o == Ordering::Less),
            Self::Lte(l, r) => relate(l, r, record, |o| o != Ordering::Greater),
            Self::In(field, values) => match record.get(field) {
                Some(v) => values.iter().any(|c| values_equal(Some(v), Some(c))),
                None => false,
            },
            Self::Has(field) => record.get(field).is_some_and(|v| !v.is_null()),
            Self::Contains(field, needle) => record
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|s| s.contains(needle.as_str())),
            Self::And(terms) => terms.iter().all(|p| p.matches(record)),
            Self::Or(terms) => terms.iter().any(|p| p.matches(record)),
            Self::Not(inner) => !inner.matches(record),
        }
    }
}

impl std::ops::Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        match self {
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }
}

fn relate(l: &Operand, r: &Operand, record: &Record, test: impl Fn(Ordering) -> bool) -> bool {
    match (l.resolve(record), r.resolve(record)) {
        (Some(a), Some(b)) => test(compare_values(Some(a), Some(b))),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn angus() -> Record {
        Record::from_value(json!({
            "id": 1,
            "firstName": "Angus",
            "lastName": "Young",
            "deceased": false,
            "age": 70,
        }))
        .unwrap()
    }

    fn jon() -> Record {
        Record::from_value(json!({
            "id": 2,
            "firstName": "Jon",
            "lastName": "Bonham",
            "deceased": true,
        }))
        .unwrap()
    }

    #[test]
    fn test_neq_filters_deceased() {
        let p = Predicate::neq("deceased", false);
        assert!(!p.matches(&angus()));
        assert!(p.matches(&jon()));
    }

    #[test]
    fn test_relational_leaves() {
        let r = angus();
        assert!(Predicate::gt("age", 69).matches(&r));
        assert!(Predicate::gte("age", 70).matches(&r));
        assert!(!Predicate::lt("age", 70).matches(&r));
        assert!(Predicate::lte("age", 70.0).matches(&r));
        assert!(Predicate::lt("lastName", "Z").matches(&r));
    }

    #[test]
    fn test_missing_field() {
        let r = jon();
        assert!(!Predicate::eq("age", 70).matches(&r));
        assert!(!Predicate::gt("age", 0).matches(&r));
        assert!(!Predicate::lt("age", 1000).matches(&r));
        assert!(Predicate::neq("age", 70).matches(&r));
        assert!(!Predicate::has("age").matches(&r));
    }

    #[test]
    fn test_field_to_field() {
        let r = Record::from_value(json!({"a": 3, "b": 3, "c": 5})).unwrap();
        assert!(Predicate::field_eq("a", "b").matches(&r));
        assert!(Predicate::field_lt("a", "c").matches(&r));
        assert!(!Predicate::field_gt("a", "c").matches(&r));
    }

    #[test]
    fn test_combinators() {
        let r = angus();
        let young = Predicate::eq("lastName", "Young");
        let dead = Predicate::eq("deceased", true);

        assert!(!young.clone().and(dead.clone()).matches(&r));
        assert!(young.clone().or(dead.clone()).matches(&r));
        assert!((!dead.clone()).matches(&r));
        assert_eq!(!!dead.clone(), dead);
        assert!(Predicate::all(Vec::new()).matches(&r));
        assert!(!Predicate::any(Vec::new()).matches(&r));
    }

    #[test]
    fn test_and_flattens() {
        let p = Predicate::eq("a", 1)
            .and(Predicate::eq("b", 2))
            .and(Predicate::eq("c", 3).and(Predicate::eq("d", 4)));
        match p {
            Predicate::And(terms) => assert_eq!(terms.len(), 4),
            other => panic!("expected And, got {:?}", other),
        }
    }

    #[test]
    fn test_in_has_contains() {
        let r = angus();
        assert!(Predicate::one_of("firstName", ["Jon", "Angus"]).matches(&r));
        assert!(!Predicate::one_of("firstName", ["Jon"]).matches(&r));
        assert!(Predicate::has("age").matches(&r));
        assert!(Predicate::contains("lastName", "oun").matches(&r));
        assert!(!Predicate::contains("age", "7").matches(&r));
    }

    #[test]
    fn test_serde_shape() {
        let p = Predicate::neq("deceased", false);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json, json!({"neq": [{"field": "deceased"}, {"literal": false}]}));
        let back: Predicate = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }
}
