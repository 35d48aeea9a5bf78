//! Tests for shared state helpers.

use rstest::rstest;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::*;

#[derive(Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
struct Holder {
    #[serde(with = "block")]
    inner: Option<Inner>,
}

#[derive(Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
struct Inner {
    name: String,
}

#[rstest]
fn block_serialises_as_zero_or_one_element_list() {
    let empty = Holder::default();
    let full = Holder {
        inner: Some(Inner {
            name: String::from("pool"),
        }),
    };

    assert_eq!(serde_json::to_value(&empty).ok(), Some(json!({"inner": []})));
    assert_eq!(
        serde_json::to_value(&full).ok(),
        Some(json!({"inner": [{"name": "pool"}]}))
    );
}

#[rstest]
#[case(json!({"inner": null}), None)]
#[case(json!({"inner": []}), None)]
#[case(json!({}), None)]
#[case(json!({"inner": [{"name": "a"}]}), Some("a"))]
fn block_reads_first_element(#[case] raw: Value, #[case] expected: Option<&str>) {
    let holder: Holder =
        serde_json::from_value(raw).unwrap_or_else(|err| panic!("decode holder: {err}"));

    assert_eq!(holder.inner.map(|inner| inner.name).as_deref(), expected);
}

#[rstest]
#[case(12.345_678, 2, 12.35)]
#[case(0.123_456_789, 5, 0.123_46)]
#[case(-1.005, 0, -1.0)]
#[case(2.5, 0, 3.0)]
fn rounds_half_away_from_zero(#[case] value: f64, #[case] places: i32, #[case] expected: f64) {
    assert!((round_to(value, places) - expected).abs() < 1e-9);
}

#[rstest]
fn find_unique_returns_single_match() {
    let found = find_unique(vec!["a", "b", "c"], |item| *item == "b", "letters")
        .unwrap_or_else(|err| panic!("lookup: {err}"));

    assert_eq!(found, Some("b"));
}

#[rstest]
fn find_unique_leaves_zero_matches_unset() {
    let found = find_unique(vec!["a"], |item| *item == "z", "letters")
        .unwrap_or_else(|err| panic!("lookup: {err}"));

    assert_eq!(found, None);
}

#[rstest]
fn find_unique_rejects_ambiguous_matches() {
    let err = find_unique(vec!["a", "a", "a"], |item| *item == "a", "ssh keys with name a")
        .expect_err("three matches");

    assert_eq!(
        err.to_string(),
        "too many ssh keys with name a (found 3, expected 1)"
    );
}

#[rstest]
fn prune_nulls_walks_nested_values() {
    let mut value = json!({"a": null, "b": [{"c": null, "d": 1}], "e": "x"});

    prune_nulls(&mut value);

    assert_eq!(value, json!({"b": [{"d": 1}], "e": "x"}));
}

#[rstest]
fn synthetic_id_is_numeric() {
    assert!(synthetic_id().chars().all(|ch| ch.is_ascii_digit()));
}
