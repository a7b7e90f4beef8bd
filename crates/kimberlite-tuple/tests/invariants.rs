//! Crate-level invariants from spec §8: order preservation, round-trip,
//! batch round-trip, prefix independence, `Key`/tuple equivalence, and
//! skip/decode agreement, checked against randomly generated tuples rather
//! than the fixed examples the unit tests colocated with each module cover.

use std::cmp::Ordering;

use bytes::Bytes;
use chrono::{TimeZone, Utc};
use kimberlite_tuple::{pack, unpack, unpacks, Element, Key, Timestamp};
use proptest::prelude::*;
use test_case::test_case;

fn arb_element() -> impl Strategy<Value = Element> {
    prop_oneof![
        Just(Element::Null),
        any::<i64>().prop_map(|v| Element::Int(i128::from(v))),
        any::<bool>().prop_map(Element::Bool),
        (-(1i64 << 50)..(1i64 << 50)).prop_map(|millis| {
            Element::Time(Timestamp::from_utc(Utc.timestamp_millis_opt(millis).single().unwrap()))
        }),
        proptest::collection::vec(any::<u8>(), 0..32).prop_map(|v| Element::Blob(Bytes::from(v))),
        ".{0,32}".prop_map(Element::Text),
        any::<u128>().prop_map(|v| Element::Uuid(uuid::Uuid::from_u128(v))),
    ]
}

fn arb_tuple() -> impl Strategy<Value = Vec<Element>> {
    proptest::collection::vec(arb_element(), 0..6)
}

proptest! {
    /// Packing a tuple and unpacking it must return the exact tuple packed.
    #[test]
    fn pack_unpack_roundtrip(tuple in arb_tuple()) {
        let bytes = pack(b"", &tuple[..]).unwrap();
        let decoded = unpack(b"", &bytes).unwrap().unwrap();
        prop_assert_eq!(decoded, tuple);
    }

    /// A `Key` built from a tuple's elements must decode back to the same
    /// elements, and `Key`-vs-`Key` byte order must agree with `compare_tuple`.
    #[test]
    fn key_roundtrips_and_agrees_with_compare_tuple(tuple in arb_tuple()) {
        let key = Key::from_elements(&tuple).unwrap();
        let decoded: Vec<Element> = key.iter().collect::<kimberlite_tuple::Result<_>>().unwrap();
        prop_assert_eq!(decoded, tuple.clone());
        prop_assert_eq!(key.compare_tuple(&tuple).unwrap(), Ordering::Equal);
    }

    /// Packing and unpacking must be independent of the prefix used, as long
    /// as the same prefix is used on both sides.
    #[test]
    fn prefix_independence(tuple in arb_tuple(), prefix in proptest::collection::vec(any::<u8>(), 0..8)) {
        let bytes = pack(&prefix, &tuple[..]).unwrap();
        prop_assert_eq!(unpack(&prefix, &bytes).unwrap().unwrap(), tuple.clone());

        let mut other_prefix = prefix.clone();
        other_prefix.push(0xaa);
        prop_assert_eq!(unpack(&other_prefix, &bytes).unwrap(), None);
    }

    /// Appending an element to a tuple must always sort after the original
    /// tuple's key, since a strict prefix is logically smaller (spec §3).
    #[test]
    fn extending_a_tuple_sorts_after_it(tuple in arb_tuple(), extra in arb_element()) {
        let short = Key::from_elements(&tuple).unwrap();
        let mut extended_elements = tuple.clone();
        extended_elements.push(extra);
        let long = Key::from_elements(&extended_elements).unwrap();
        prop_assert!(short < long);
    }

    /// `Key::get` must return the same element `iter()` does, at every index.
    #[test]
    fn get_matches_iteration_order(tuple in arb_tuple()) {
        let key = Key::from_elements(&tuple).unwrap();
        for (i, expected) in tuple.iter().enumerate() {
            prop_assert_eq!(&key.get(i as i64).unwrap(), expected);
        }
    }

    /// A batch of tuples must round-trip through `pack`'s list form and
    /// `unpacks`, preserving tuple boundaries exactly.
    ///
    /// A list of exactly one empty tuple is excluded: it packs to the same
    /// zero bytes as an empty list of tuples, so `unpacks` cannot recover
    /// which of the two was packed (this single-item-all-empty case is the
    /// wire format's one non-invertible boundary, not a bug in `unpacks`).
    #[test]
    fn batch_roundtrip(
        tuples in proptest::collection::vec(arb_tuple(), 0..4)
            .prop_filter("single empty tuple is indistinguishable from an empty batch", |t| {
                !(t.len() == 1 && t[0].is_empty())
            })
    ) {
        let refs: Vec<&[Element]> = tuples.iter().map(|t| t.as_slice()).collect();
        let bytes = kimberlite_tuple::pack_batch(b"", &refs).unwrap();
        let decoded = unpacks(b"", &bytes).unwrap().unwrap();
        prop_assert_eq!(decoded, tuples);
    }
}

/// Two elements' relative order, encoded standalone, must match their
/// logical order — the core order-preservation invariant (spec §3) checked
/// across kinds, not just within one kind.
#[test_case(Element::Int(-5), Element::Int(5); "negative before positive int")]
#[test_case(Element::Int(i128::from(i64::MAX)), Element::Bool(false); "any int before any bool")]
#[test_case(Element::Bool(true), Element::Blob(Bytes::from_static(b"")); "any bool before any blob")]
#[test_case(Element::Blob(Bytes::from_static(b"\xff")), Element::Text(String::new()); "any blob before any text")]
#[test_case(Element::Text("\u{10ffff}".to_string()), Element::Uuid(uuid::Uuid::max()); "any text before any uuid")]
#[test_case(Element::Null, Element::Int(i128::from(i64::MIN)); "null before every other kind")]
fn cross_kind_ordering(lower: Element, upper: Element) {
    let lower_key = Key::from_elements(&[lower]).unwrap();
    let upper_key = Key::from_elements(&[upper]).unwrap();
    assert!(lower_key < upper_key);
}

/// `unpack` against a key built by a different prefix must report
/// `NotMatched`, not an error — spec §7's sentinel, used as a filter.
#[test]
fn unpack_is_a_filter_not_an_error_on_prefix_mismatch() {
    let tuple = vec![Element::Int(1), Element::Text("row".into())];
    let bytes = pack(b"users/", &tuple[..]).unwrap();
    assert_eq!(unpack(b"orders/", &bytes).unwrap(), None);
    assert_eq!(unpack(b"users/", &bytes).unwrap().unwrap(), tuple);
}

/// Every element in a tuple must be independently skippable: `Element::skip`
/// consumes exactly as many bytes as `Element::decode` for each element in
/// sequence, not just the first one.
#[test]
fn skip_and_decode_agree_across_an_entire_tuple() {
    let tuple = vec![
        Element::Null,
        Element::Int(-12345),
        Element::Bool(true),
        Element::Text("hello, world".into()),
        Element::Blob(Bytes::from_static(b"\x00\x01\xff")),
        Element::Uuid(uuid::Uuid::nil()),
    ];
    let key = Key::from_elements(&tuple).unwrap();
    assert_eq!(key.len(), tuple.len());
    let decoded: Vec<Element> = key.iter().collect::<kimberlite_tuple::Result<_>>().unwrap();
    assert_eq!(decoded, tuple);
}
