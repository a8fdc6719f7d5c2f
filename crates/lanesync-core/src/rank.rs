//! Dense ranking of records with arbitrary raw sort values.
//!
//! The store's sort attributes are sparse, duplicated, missing, or not numbers
//! at all. [`normalize`] turns any such sequence into ranks `0..n-1`: coerce
//! each value (see [`SortValue::coerce`]), order by `(value, identity)`, and
//! number by position. Used for lanes and for the cards within each lane.

use std::cmp::Ordering;

use lanesync_types::SortValue;
use tracing::warn;

/// A record with its dense rank.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<K, T> {
    pub id: K,
    pub rank: usize,
    pub payload: T,
}

/// Rank `entries` densely by `(coerced sort value, id)`.
///
/// Pure and deterministic: the output does not depend on input order as long
/// as identities are distinct.
pub fn normalize<'a, K, T, I>(entries: I) -> Vec<Ranked<K, T>>
where
    K: Ord + std::fmt::Debug,
    I: IntoIterator<Item = (K, &'a SortValue, T)>,
{
    let mut keyed: Vec<(f64, K, T)> = entries
        .into_iter()
        .map(|(id, sort, payload)| {
            if sort.is_unparseable() {
                warn!("Sort value {:?} for {:?} is not a finite number, ranking as 0", sort, id);
            }
            (sort.coerce(), id, payload)
        })
        .collect();

    // Coerced values are finite, so partial_cmp only returns None for NaN,
    // which coerce() never yields. -0.0 and 0.0 compare equal here.
    keyed.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.cmp(&b.1))
    });

    keyed
        .into_iter()
        .enumerate()
        .map(|(rank, (_, id, payload))| Ranked { id, rank, payload })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use lanesync_types::DecimalKey;
    use proptest::prelude::*;

    fn ids<T>(ranked: &[Ranked<String, T>]) -> Vec<&str> {
        ranked.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_sparse_values_become_dense() {
        let sorts = [SortValue::from(100), SortValue::from(-4), SortValue::from(7.5)];
        let ranked = normalize(
            ["c", "a", "b"].iter().zip(&sorts).map(|(id, s)| (id.to_string(), s, ())),
        );
        assert_eq!(ids(&ranked), vec!["a", "b", "c"]);
        assert_eq!(ranked.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_mixed_representations() {
        let sorts = [
            SortValue::from("2"),
            SortValue::Decimal(DecimalKey::new(15, 1)),
            SortValue::Absent,
            SortValue::from("garbage"),
        ];
        let ranked = normalize(
            ["text", "decimal", "absent", "garbage"]
                .iter()
                .zip(&sorts)
                .map(|(id, s)| (id.to_string(), s, ())),
        );
        // absent and garbage both coerce to 0 and tie-break by identity.
        assert_eq!(ids(&ranked), vec!["absent", "garbage", "decimal", "text"]);
    }

    #[test]
    fn test_ties_break_by_identity() {
        let zero = SortValue::from(0);
        let ranked = normalize(["z", "m", "a"].iter().map(|id| (id.to_string(), &zero, ())));
        assert_eq!(ids(&ranked), vec!["a", "m", "z"]);
    }

    #[test]
    fn test_payload_travels_with_identity() {
        let sorts = [SortValue::from(2), SortValue::from(1)];
        let ranked = normalize(vec![("x".to_string(), &sorts[0], 'x'), ("y".to_string(), &sorts[1], 'y')]);
        assert_eq!(ranked[0].payload, 'y');
        assert_eq!(ranked[1].payload, 'x');
    }

    #[test]
    fn test_empty_input() {
        let ranked: Vec<Ranked<String, ()>> = normalize(std::iter::empty());
        assert!(ranked.is_empty());
    }

    fn sort_value() -> impl Strategy<Value = SortValue> {
        prop_oneof![
            Just(SortValue::Absent),
            (-50i64..50).prop_map(SortValue::from),
            (-50.0f64..50.0).prop_map(SortValue::Number),
            "[0-9]{0,3}(\\.[0-9])?".prop_map(|s| SortValue::Text(s)),
            (-500i64..500, 0u32..3).prop_map(|(m, s)| SortValue::Decimal(DecimalKey::new(m, s))),
        ]
    }

    fn entries() -> impl Strategy<Value = Vec<(String, SortValue)>> {
        prop::collection::btree_map("[a-e]{1,3}", sort_value(), 0..24)
            .prop_map(|m| m.into_iter().collect::<Vec<_>>())
    }

    proptest! {
        #[test]
        fn prop_ranks_are_contiguous(entries in entries()) {
            let ranked = normalize(entries.iter().map(|(id, s)| (id.clone(), s, ())));
            let ranks: Vec<usize> = ranked.iter().map(|r| r.rank).collect();
            prop_assert_eq!(ranks, (0..entries.len()).collect::<Vec<_>>());
        }

        #[test]
        fn prop_renormalizing_is_idempotent(entries in entries()) {
            let first = normalize(entries.iter().map(|(id, s)| (id.clone(), s, ())));
            let as_sorts: Vec<(String, SortValue)> = first
                .iter()
                .map(|r| (r.id.clone(), SortValue::from(r.rank as i64)))
                .collect();
            let second = normalize(as_sorts.iter().map(|(id, s)| (id.clone(), s, ())));
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_input_order_does_not_matter(entries in entries()) {
            let forward = normalize(entries.iter().map(|(id, s)| (id.clone(), s, ())));
            let backward = normalize(entries.iter().rev().map(|(id, s)| (id.clone(), s, ())));
            prop_assert_eq!(forward, backward);
        }
    }
}
