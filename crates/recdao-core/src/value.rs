//! Total ordering over JSON field values.
//!
//! Ordering rules:
//! - missing < null < bool < number < string < array < object
//! - For same types, natural ordering
//! - Integers compare exactly; mixed integer/float compare as f64

use serde_json::{Number, Value};
use std::cmp::Ordering;

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    if let (Some(ai), Some(bi)) = (a.as_i64(), b.as_i64()) {
        return ai.cmp(&bi);
    }
    if let (Some(au), Some(bu)) = (a.as_u64(), b.as_u64()) {
        return au.cmp(&bu);
    }
    let af = a.as_f64().unwrap_or(0.0);
    let bf = b.as_f64().unwrap_or(0.0);
    af.partial_cmp(&bf).unwrap_or(Ordering::Equal)
}

/// Compare two JSON values.
pub fn compare_json(a: &Value, b: &Value) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (l, r) in x.iter().zip(y.iter()) {
                let ord = compare_json(l, r);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        // Objects are not ordered against each other
        _ => Ordering::Equal,
    }
}

/// Compare two possibly-missing field values. Missing sorts first.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => compare_json(x, y),
    }
}

/// Equality used by predicate leaves: JSON equality, except that numbers
/// are equal when numerically equal (`1 == 1.0`).
pub fn values_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(Value::Number(x)), Some(Value::Number(y))) => compare_numbers(x, y).is_eq(),
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            (-1e9f64..1e9f64).prop_map(Value::from),
            "[a-z]{0,4}".prop_map(Value::from),
        ]
    }

    proptest! {
        #[test]
        fn test_order_is_antisymmetric(a in scalar(), b in scalar()) {
            prop_assert_eq!(compare_json(&a, &b), compare_json(&b, &a).reverse());
        }

        #[test]
        fn test_order_is_reflexive(a in scalar()) {
            prop_assert_eq!(compare_json(&a, &a), Ordering::Equal);
            prop_assert!(values_equal(Some(&a), Some(&a)));
        }
    }

    #[test]
    fn test_type_ordering() {
        let ordered = [
            json!(null),
            json!(false),
            json!(true),
            json!(-3),
            json!(2.5),
            json!("a"),
            json!([1]),
            json!({"k": 1}),
        ];
        for pair in ordered.windows(2) {
            assert_eq!(compare_json(&pair[0], &pair[1]), Ordering::Less, "{:?}", pair);
        }
        assert_eq!(compare_values(None, Some(&json!(null))), Ordering::Less);
    }

    #[test]
    fn test_numeric_comparison() {
        assert_eq!(compare_json(&json!(10), &json!(9)), Ordering::Greater);
        assert_eq!(compare_json(&json!(1), &json!(1.0)), Ordering::Equal);
        assert_eq!(compare_json(&json!(u64::MAX), &json!(1)), Ordering::Greater);
        assert!(values_equal(Some(&json!(1)), Some(&json!(1.0))));
    }

    #[test]
    fn test_array_comparison() {
        assert_eq!(compare_json(&json!([1, 2]), &json!([1, 3])), Ordering::Less);
        assert_eq!(compare_json(&json!([1, 2]), &json!([1])), Ordering::Greater);
    }

    #[test]
    fn test_missing_equality() {
        assert!(values_equal(None, None));
        assert!(!values_equal(None, Some(&json!(false))));
        assert!(!values_equal(Some(&json!("1")), Some(&json!(1))));
    }
}
