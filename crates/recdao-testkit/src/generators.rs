//! Proptest generators for property-based testing.
//!
//! The central type is [`Op`], one mutation against a store. Sequences of
//! ops are kept to a small id space so repeats, removes of missing ids and
//! remove-then-re-put cycles show up often.

use std::collections::BTreeMap;

use proptest::prelude::*;

use recdao_core::{Comparator, Predicate, Record, RecordId};
use recdao_store::{Result, StoreRef};

use crate::fixtures::person;

/// Largest id generated by [`op`].
pub const MAX_ID: i64 = 8;

/// One mutation against a store.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Put(Record),
    Remove(i64),
}

/// Generate a first name.
pub fn first_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Angus".to_string()),
        Just("Jon".to_string()),
        Just("Bon".to_string()),
        Just("Malcolm".to_string()),
        "[A-Z][a-z]{1,8}".prop_map(String::from),
    ]
}

/// Generate a last name. Kept to a few values so sort ties are common.
pub fn last_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Young".to_string()),
        Just("Bonham".to_string()),
        Just("Scott".to_string()),
    ]
}

/// Generate a person record with an id in `1..=MAX_ID`.
pub fn person_record() -> impl Strategy<Value = Record> {
    (1..=MAX_ID, first_name(), last_name(), any::<bool>())
        .prop_map(|(id, first, last, deceased)| person(id, &first, &last, deceased))
}

/// Generate a single op. Puts are twice as likely as removes.
pub fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => person_record().prop_map(Op::Put),
        1 => (1..=MAX_ID).prop_map(Op::Remove),
    ]
}

/// Generate a sequence of up to `max_len` ops.
pub fn ops(max_len: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op(), 0..=max_len)
}

/// Generate a predicate over the person fields.
pub fn predicate() -> impl Strategy<Value = Predicate> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(|d| Predicate::eq("deceased", d)),
        any::<bool>().prop_map(|d| Predicate::neq("deceased", d)),
        last_name().prop_map(|n| Predicate::eq("lastName", n)),
        (1..=MAX_ID).prop_map(|id| Predicate::gt("id", id)),
        (1..=MAX_ID).prop_map(|id| Predicate::lte("id", id)),
    ];
    leaf.prop_recursive(3, 12, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..3).prop_map(Predicate::all),
            prop::collection::vec(inner.clone(), 1..3).prop_map(Predicate::any),
            inner.prop_map(|p| !p),
        ]
    })
}

/// Generate a comparator of one or two keys over the person fields.
pub fn comparator() -> impl Strategy<Value = Comparator> {
    let field = prop_oneof![
        Just("firstName"),
        Just("lastName"),
        Just("deceased"),
        Just("id"),
    ];
    (field.clone(), any::<bool>(), prop::option::of((field, any::<bool>()))).prop_map(
        |(first, asc, second)| {
            let mut comparator = if asc {
                Comparator::asc(first)
            } else {
                Comparator::desc(first)
            };
            if let Some((field, asc)) = second {
                comparator = if asc {
                    comparator.then_asc(field)
                } else {
                    comparator.then_desc(field)
                };
            }
            comparator
        },
    )
}

/// Apply `ops` to `store` in order. Removing a missing id is not an error.
pub async fn apply(store: &StoreRef, ops: &[Op]) -> Result<()> {
    for op in ops {
        match op {
            Op::Put(record) => {
                store.put(record.clone()).await?;
            }
            Op::Remove(id) => match store.remove(&RecordId::Int(*id)).await {
                Ok(_) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            },
        }
    }
    Ok(())
}

/// The final state `ops` should leave in an initially empty store.
pub fn model(ops: &[Op]) -> BTreeMap<i64, Record> {
    let mut state = BTreeMap::new();
    for op in ops {
        match op {
            Op::Put(record) => {
                if let Some(id) = record.id().and_then(|id| id.as_int()) {
                    state.insert(id, record.clone());
                }
            }
            Op::Remove(id) => {
                state.remove(id);
            }
        }
    }
    state
}

/// Index selected records by integer id, for comparison with [`model`].
pub fn by_id(records: &[Record]) -> BTreeMap<i64, Record> {
    records
        .iter()
        .filter_map(|r| r.id().and_then(|id| id.as_int()).map(|id| (id, r.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn test_model_has_at_most_one_record_per_id(history in ops(40)) {
            let state = model(&history);
            for (id, record) in &state {
                prop_assert_eq!(record.id(), Some(RecordId::Int(*id)));
            }
        }

        #[test]
        fn test_model_last_put_wins(history in ops(40)) {
            let state = model(&history);
            for (id, record) in &state {
                let last = history.iter().rev().find_map(|op| match op {
                    Op::Put(r) if r.id() == Some(RecordId::Int(*id)) => Some(r),
                    _ => None,
                });
                prop_assert_eq!(Some(record), last);
            }
        }

        #[test]
        fn test_predicate_generator_is_evaluable(p in predicate(), r in person_record()) {
            // Negation must always flip the result.
            prop_assert_eq!(p.matches(&r), !(!p.clone()).matches(&r));
        }
    }
}
