/*!
 * Material catalog.
 *
 * The bundled list of PLN SAP material codes is merged with entries added at
 * runtime (the `materials` table). Codes are unique in the merged catalog and
 * a runtime entry replaces a bundled one with the same code.
 */

use lazy_static::lazy_static;
use std::collections::{BTreeSet, HashMap};

use crate::models::MaterialCatalogEntry;

pub const DEFAULT_UNIT: &str = "BH";
pub const DEFAULT_CATEGORY: &str = "Material Umum";

const BUNDLED_MATERIALS: &str = include_str!("../data/materials.json");

lazy_static! {
    static ref STATIC_CATALOG: Vec<MaterialCatalogEntry> =
        serde_json::from_str(BUNDLED_MATERIALS).unwrap_or_else(|err| {
            tracing::error!(error = %err, "bundled material catalog is not valid JSON");
            Vec::new()
        });
}

/// The bundled catalog in file order.
pub fn static_entries() -> &'static [MaterialCatalogEntry] {
    &STATIC_CATALOG
}

/// Unions the bundled and runtime entries keyed by code, runtime last.
/// The result is sorted by category, then name.
pub fn merge(
    static_entries: &[MaterialCatalogEntry],
    live_entries: &[MaterialCatalogEntry],
) -> Vec<MaterialCatalogEntry> {
    let mut by_code: HashMap<&str, &MaterialCatalogEntry> =
        HashMap::with_capacity(static_entries.len() + live_entries.len());
    for entry in static_entries.iter().chain(live_entries) {
        by_code.insert(entry.code.as_str(), entry);
    }

    let mut merged: Vec<MaterialCatalogEntry> = by_code.into_values().cloned().collect();
    merged.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.code.cmp(&b.code))
    });
    merged
}

/// Distinct categories in ascending order.
pub fn categories(entries: &[MaterialCatalogEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|e| e.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Case-insensitive match on name and category, substring match on code.
pub fn search<'a>(entries: &'a [MaterialCatalogEntry], query: &str) -> Vec<&'a MaterialCatalogEntry> {
    let query = query.trim();
    if query.is_empty() {
        return entries.iter().collect();
    }
    let lower = query.to_lowercase();
    entries
        .iter()
        .filter(|e| {
            e.name.to_lowercase().contains(&lower)
                || e.code.contains(query)
                || e.category.to_lowercase().contains(&lower)
        })
        .collect()
}

pub fn by_category<'a>(
    entries: &'a [MaterialCatalogEntry],
    category: &str,
) -> Vec<&'a MaterialCatalogEntry> {
    entries.iter().filter(|e| e.category == category).collect()
}

pub fn find_by_name<'a>(
    entries: &'a [MaterialCatalogEntry],
    name: &str,
) -> Option<&'a MaterialCatalogEntry> {
    entries.iter().find(|e| e.name == name)
}

pub fn find_by_code<'a>(
    entries: &'a [MaterialCatalogEntry],
    code: &str,
) -> Option<&'a MaterialCatalogEntry> {
    entries.iter().find(|e| e.code == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: &str, name: &str, category: &str) -> MaterialCatalogEntry {
        MaterialCatalogEntry::new(code, name, "BH", category)
    }

    #[test]
    fn bundled_catalog_loads_with_unique_codes() {
        let entries = static_entries();
        assert_eq!(entries.len(), 205);
        let codes: BTreeSet<_> = entries.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes.len(), entries.len());
    }

    #[test]
    fn live_entry_replaces_static_entry_with_same_code() {
        let statics = vec![entry("001", "Kabel Lama", "Kabel"), entry("002", "MCB", "MCB")];
        let live = vec![entry("001", "Kabel Baru", "Kabel"), entry("003", "Fuse", "Fuse")];

        let merged = merge(&statics, &live);
        assert_eq!(merged.len(), 3);
        let replaced = find_by_code(&merged, "001").unwrap();
        assert_eq!(replaced.name, "Kabel Baru");
        assert!(find_by_name(&merged, "Kabel Lama").is_none());
    }

    #[test]
    fn merged_catalog_is_sorted_by_category_then_name() {
        let merged = merge(
            &[entry("1", "Zeta", "B"), entry("2", "Alpha", "B")],
            &[entry("3", "Omega", "A")],
        );
        let names: Vec<_> = merged.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Omega", "Alpha", "Zeta"]);
        assert_eq!(categories(&merged), vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn search_covers_name_category_and_code() {
        let entries = vec![
            entry("000000003130028", "MCB 1P 6A", "MCB 1 Phase"),
            entry("000000003110025", "Kabel Twisted", "Kabel & Konduktor"),
        ];
        assert_eq!(search(&entries, "mcb").len(), 1);
        assert_eq!(search(&entries, "KONDUKTOR").len(), 1);
        assert_eq!(search(&entries, "3110").len(), 1);
        assert_eq!(search(&entries, "").len(), 2);
        assert!(search(&entries, "trafo").is_empty());
        assert_eq!(by_category(&entries, "MCB 1 Phase").len(), 1);
    }
}
