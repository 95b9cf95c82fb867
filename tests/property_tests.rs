//! Property-based tests for the catalog merge, status parsing, report rating,
//! timestamp ordering and paging.

use chrono::{DateTime, Duration, TimeZone, Utc};
use gudang_api::{
    catalog,
    lifecycle::next_updated_at,
    models::{ItemStatus, MaterialCatalogEntry},
    services::{
        inventory::page_slice,
        reports::{approval_label, approval_rate},
    },
    views::parse_statuses,
};
use proptest::prelude::*;
use std::collections::HashSet;

fn entry_strategy() -> impl Strategy<Value = MaterialCatalogEntry> {
    (
        "[0-9]{3}",
        "[A-Z][a-z]{2,8}",
        prop_oneof!["BH", "M", "SET", "U"],
        prop_oneof!["MCB", "Kabel", "Connector", "Fuse"],
    )
        .prop_map(|(code, name, unit, category)| {
            MaterialCatalogEntry::new(code, name, unit, category)
        })
}

fn instant_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (1_600_000_000i64..1_900_000_000, 0u32..1_000_000_000)
        .prop_map(|(secs, nanos)| Utc.timestamp_opt(secs, nanos).single().unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn merged_catalog_has_unique_codes(
        bundled in prop::collection::vec(entry_strategy(), 0..40),
        live in prop::collection::vec(entry_strategy(), 0..20),
    ) {
        let merged = catalog::merge(&bundled, &live);

        let codes: HashSet<&str> = merged.iter().map(|e| e.code.as_str()).collect();
        prop_assert_eq!(codes.len(), merged.len());

        let expected: HashSet<&str> = bundled
            .iter()
            .chain(&live)
            .map(|e| e.code.as_str())
            .collect();
        prop_assert_eq!(codes, expected);
    }

    #[test]
    fn runtime_entries_win_over_bundled(
        bundled in prop::collection::vec(entry_strategy(), 1..30),
        live in prop::collection::vec(entry_strategy(), 1..10),
    ) {
        let merged = catalog::merge(&bundled, &live);
        // the last runtime entry for each code is the one kept
        for code in live.iter().map(|e| &e.code) {
            let winner = live.iter().rev().find(|e| &e.code == code).unwrap();
            let kept = merged.iter().find(|e| &e.code == code).unwrap();
            prop_assert_eq!(kept, winner);
        }
    }

    #[test]
    fn merged_catalog_is_sorted(
        bundled in prop::collection::vec(entry_strategy(), 0..40),
        live in prop::collection::vec(entry_strategy(), 0..20),
    ) {
        let merged = catalog::merge(&bundled, &live);
        for pair in merged.windows(2) {
            let a = (&pair[0].category, &pair[0].name);
            let b = (&pair[1].category, &pair[1].name);
            prop_assert!(a <= b, "{:?} before {:?}", a, b);
        }

        let categories = catalog::categories(&merged);
        let mut sorted = categories.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(categories, sorted);
    }
}

proptest! {
    #[test]
    fn status_lists_parse_in_order(
        statuses in prop::collection::vec(
            prop_oneof![
                Just(ItemStatus::Pending),
                Just(ItemStatus::Approved),
                Just(ItemStatus::Rejected),
            ],
            1..5,
        )
    ) {
        let raw = statuses
            .iter()
            .map(|s| match s {
                ItemStatus::Pending => " pending",
                ItemStatus::Approved => "approved ",
                ItemStatus::Rejected => "rejected",
            })
            .collect::<Vec<_>>()
            .join(",");
        prop_assert_eq!(parse_statuses(&raw).unwrap(), statuses);
    }

    #[test]
    fn unknown_statuses_are_rejected(word in "[a-z]{4,10}") {
        prop_assume!(!["pending", "approved", "rejected"].contains(&word.as_str()));
        prop_assert!(parse_statuses(&word).is_err());
    }

    #[test]
    fn approval_rate_stays_in_percent_range(total in 0usize..10_000, share in 0.0f64..=1.0) {
        let approved = (total as f64 * share).floor() as usize;
        let rate = approval_rate(approved, total);
        prop_assert!(rate <= 100);

        let label = approval_label(rate);
        let expected = if rate >= 80 {
            "Sangat Baik"
        } else if rate >= 50 {
            "Cukup Baik"
        } else {
            "Perlu Perhatian"
        };
        prop_assert_eq!(label, expected);
    }

    #[test]
    fn updated_at_strictly_increases(
        previous in instant_strategy(),
        skew_micros in -5_000_000i64..5_000_000,
    ) {
        let now = previous + Duration::microseconds(skew_micros);
        let next = next_updated_at(previous, now);
        prop_assert!(next > previous);
        prop_assert_eq!(next.timestamp_subsec_nanos() % 1_000, 0);
    }

    #[test]
    fn pages_never_overrun_the_list(
        len in 0usize..60,
        page in prop_oneof![1u64..10, Just(u64::MAX), (u64::MAX / 2)..u64::MAX],
        limit in prop_oneof![1u64..25, Just(u64::MAX)],
    ) {
        let items: Vec<usize> = (0..len).collect();
        let slice = page_slice(items, page, limit);

        let offset = (page - 1).saturating_mul(limit);
        let expected = (len as u64).saturating_sub(offset).min(limit) as usize;
        prop_assert_eq!(slice.len(), expected);
        if let Some(first) = slice.first() {
            prop_assert_eq!(*first as u64, offset);
        }
    }
}
