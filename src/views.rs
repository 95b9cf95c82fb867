/*!
 * Role-scoped item views and secondary filters.
 *
 * The predicates here are the single definition of what each list shows. The
 * inventory service pushes the view into its SQL query and then re-applies
 * these functions to the rows it loaded.
 */

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Offset, Utc};
use serde::Deserialize;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::{Condition, InventoryItem, ItemKind, ItemStatus, UserRole};

/// Calendar boundaries are computed in Western Indonesia Time (UTC+7).
const WIB_OFFSET_SECS: i32 = 7 * 3600;

pub(crate) fn wib() -> FixedOffset {
    FixedOffset::east_opt(WIB_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// View requested by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Mine,
    Pending,
    All,
}

/// A resolved view over the item collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemView {
    /// Items created by the given user, any status.
    Mine(Uuid),
    /// Items awaiting verification.
    Pending,
    All,
}

impl ItemView {
    /// Resolves the requested view for a user, defaulting per role.
    ///
    /// Staff only ever see their own submissions.
    pub fn resolve(
        requested: Option<ViewKind>,
        user_id: Uuid,
        role: UserRole,
    ) -> Result<Self, ServiceError> {
        let kind = requested.unwrap_or(match role {
            UserRole::Staff => ViewKind::Mine,
            UserRole::Verifikator => ViewKind::Pending,
            UserRole::AdminGudang => ViewKind::All,
        });

        match (kind, role) {
            (ViewKind::Mine, _) => Ok(ItemView::Mine(user_id)),
            (_, UserRole::Staff) => Err(ServiceError::Forbidden(
                "staff can only view their own items".into(),
            )),
            (ViewKind::Pending, _) => Ok(ItemView::Pending),
            (ViewKind::All, _) => Ok(ItemView::All),
        }
    }

    pub fn matches(&self, item: &InventoryItem) -> bool {
        match self {
            ItemView::Mine(user_id) => item.created_by == *user_id,
            ItemView::Pending => item.status == ItemStatus::Pending,
            ItemView::All => true,
        }
    }
}

/// Date-range presets offered by the inventory and export screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DateRange {
    Today,
    /// The last seven days
    Week,
    /// Since the first of the current month
    Month,
    /// Since the first of January
    Year,
    #[default]
    All,
}

impl DateRange {
    /// Inclusive lower bound for `created_at`, or `None` for no bound.
    pub fn start(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let today = now.with_timezone(&wib()).date_naive();
        let midnight = |date: NaiveDate| {
            date.and_hms_opt(0, 0, 0)?
                .and_local_timezone(wib())
                .single()
                .map(|d| d.with_timezone(&Utc))
        };

        match self {
            DateRange::Today => midnight(today),
            DateRange::Week => Some(now - Duration::days(7)),
            DateRange::Month => midnight(today.with_day(1)?),
            DateRange::Year => midnight(NaiveDate::from_ymd_opt(today.year(), 1, 1)?),
            DateRange::All => None,
        }
    }

    pub fn contains(&self, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.start(now).map_or(true, |start| at >= start)
    }
}

/// Optional secondary filters; an unset field matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemFilter {
    pub statuses: Vec<ItemStatus>,
    pub kind: Option<ItemKind>,
    pub condition: Option<Condition>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub range: DateRange,
}

impl ItemFilter {
    pub fn matches(&self, item: &InventoryItem, now: DateTime<Utc>) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&item.status) {
            return false;
        }
        if self.kind.is_some_and(|kind| kind != item.kind()) {
            return false;
        }
        if self.condition.is_some_and(|c| c != item.condition) {
            return false;
        }
        if let Some(category) = self.category.as_deref().map(str::trim) {
            if !category.is_empty()
                && !item
                    .details
                    .category()
                    .is_some_and(|c| c.eq_ignore_ascii_case(category))
            {
                return false;
            }
        }
        if let Some(query) = self.search.as_deref().map(str::trim) {
            if !query.is_empty() && !search_matches(item, &query.to_lowercase()) {
                return false;
            }
        }
        self.range.contains(item.created_at, now)
    }
}

fn search_matches(item: &InventoryItem, needle: &str) -> bool {
    [
        item.details.display_name(),
        item.details.searchable_text(),
        item.details.location().to_string(),
        item.created_by_name.clone(),
    ]
    .iter()
    .any(|haystack| haystack.to_lowercase().contains(needle))
}

/// Parses a comma separated status list such as `pending,rejected`.
pub fn parse_statuses(raw: &str) -> Result<Vec<ItemStatus>, ServiceError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ItemStatus::from_str)
        .collect::<Result<Vec<_>, _>>()
        .map_err(ServiceError::BadRequest)
}

/// Keeps the items visible through `view` that pass `filter`, in input order.
pub fn apply(
    items: &[InventoryItem],
    view: &ItemView,
    filter: &ItemFilter,
    now: DateTime<Utc>,
) -> Vec<InventoryItem> {
    items
        .iter()
        .filter(|item| view.matches(item) && filter.matches(item, now))
        .cloned()
        .collect()
}

/// Orders items newest first, the order every list is served in.
pub fn sort_newest_first(items: &mut [InventoryItem]) {
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::item::fixtures;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use rstest::rstest;

    fn status_strategy() -> impl Strategy<Value = ItemStatus> {
        prop_oneof![
            Just(ItemStatus::Pending),
            Just(ItemStatus::Approved),
            Just(ItemStatus::Rejected),
        ]
    }

    fn items_strategy() -> impl Strategy<Value = Vec<InventoryItem>> {
        prop::collection::vec((0u128..4, status_strategy()), 0..40).prop_map(|specs| {
            specs
                .into_iter()
                .map(|(creator, status)| {
                    fixtures::item(
                        Uuid::from_u128(creator),
                        status,
                        fixtures::material("Isolator", Some("Isolator"), 1),
                    )
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn mine_view_only_contains_own_items(items in items_strategy(), me in 0u128..4) {
            let me = Uuid::from_u128(me);
            let view = apply(&items, &ItemView::Mine(me), &ItemFilter::default(), Utc::now());
            prop_assert!(view.iter().all(|item| item.created_by == me));
            prop_assert_eq!(view.len(), items.iter().filter(|i| i.created_by == me).count());
        }

        #[test]
        fn pending_view_only_contains_pending_items(items in items_strategy()) {
            let view = apply(&items, &ItemView::Pending, &ItemFilter::default(), Utc::now());
            prop_assert!(view.iter().all(|item| item.status == ItemStatus::Pending));
        }

        #[test]
        fn apply_preserves_input_order(items in items_strategy(), status in status_strategy()) {
            let filter = ItemFilter { statuses: vec![status], ..Default::default() };
            let view = apply(&items, &ItemView::All, &filter, Utc::now());
            let expected: Vec<Uuid> = items.iter().filter(|i| i.status == status).map(|i| i.id).collect();
            let actual: Vec<Uuid> = view.iter().map(|i| i.id).collect();
            prop_assert_eq!(actual, expected);
        }
    }

    #[rstest]
    #[case(UserRole::Staff, None, Some(ItemView::Mine(Uuid::from_u128(1))))]
    #[case(UserRole::Staff, Some(ViewKind::Pending), None)]
    #[case(UserRole::Staff, Some(ViewKind::All), None)]
    #[case(UserRole::Verifikator, None, Some(ItemView::Pending))]
    #[case(UserRole::Verifikator, Some(ViewKind::All), Some(ItemView::All))]
    #[case(UserRole::Verifikator, Some(ViewKind::Mine), Some(ItemView::Mine(Uuid::from_u128(1))))]
    #[case(UserRole::AdminGudang, None, Some(ItemView::All))]
    #[case(UserRole::AdminGudang, Some(ViewKind::Pending), Some(ItemView::Pending))]
    fn view_resolution_by_role(
        #[case] role: UserRole,
        #[case] requested: Option<ViewKind>,
        #[case] expected: Option<ItemView>,
    ) {
        let resolved = ItemView::resolve(requested, Uuid::from_u128(1), role).ok();
        assert_eq!(resolved, expected);
    }

    #[test]
    fn search_matches_name_code_and_location_case_insensitively() {
        let mut item = fixtures::item(
            Uuid::new_v4(),
            ItemStatus::Approved,
            fixtures::material("MCB 1P 6A", Some("MCB"), 3),
        );
        item.details.set_location("Rak 5".into());
        let now = Utc::now();

        let by = |q: &str| ItemFilter {
            search: Some(q.into()),
            ..Default::default()
        };
        assert!(by("mcb").matches(&item, now));
        assert!(by("rak 5").matches(&item, now));
        assert!(by("  ").matches(&item, now));
        assert!(!by("trafo").matches(&item, now));
    }

    #[test]
    fn category_and_kind_filters() {
        let item = fixtures::item(
            Uuid::new_v4(),
            ItemStatus::Pending,
            fixtures::material("Konektor", Some("Connector"), 10),
        );
        let now = Utc::now();

        let category = ItemFilter {
            category: Some("connector".into()),
            ..Default::default()
        };
        assert!(category.matches(&item, now));

        let kind = ItemFilter {
            kind: Some(ItemKind::Kabel),
            ..Default::default()
        };
        assert!(!kind.matches(&item, now));

        let condition = ItemFilter {
            condition: Some(Condition::Limbah),
            ..Default::default()
        };
        assert!(!condition.matches(&item, now));
    }

    #[test]
    fn date_ranges_use_local_calendar() {
        // 2024-03-15 02:00 WIB
        let now = Utc.with_ymd_and_hms(2024, 3, 14, 19, 0, 0).unwrap();

        assert_eq!(
            DateRange::Today.start(now),
            Some(Utc.with_ymd_and_hms(2024, 3, 14, 17, 0, 0).unwrap())
        );
        assert_eq!(
            DateRange::Month.start(now),
            Some(Utc.with_ymd_and_hms(2024, 2, 29, 17, 0, 0).unwrap())
        );
        assert_eq!(
            DateRange::Year.start(now),
            Some(Utc.with_ymd_and_hms(2023, 12, 31, 17, 0, 0).unwrap())
        );
        assert_eq!(DateRange::Week.start(now), Some(now - Duration::days(7)));
        assert_eq!(DateRange::All.start(now), None);

        assert!(DateRange::Today.contains(now, now));
        assert!(!DateRange::Today.contains(now - Duration::hours(3), now));
    }

    #[test]
    fn status_lists_parse() {
        assert_eq!(
            parse_statuses("pending, rejected").unwrap(),
            vec![ItemStatus::Pending, ItemStatus::Rejected]
        );
        assert!(parse_statuses("").unwrap().is_empty());
        assert!(parse_statuses("archived").is_err());
    }
}
