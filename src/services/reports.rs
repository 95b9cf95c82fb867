/*!
 * Dashboard counters and report exports.
 *
 * Everything here is computed from a snapshot of items by pure functions;
 * [`ReportService`] only loads the snapshot.
 */

use crate::{
    catalog::DEFAULT_CATEGORY,
    errors::{RuleViolation, ServiceError},
    models::{Condition, InventoryItem, ItemDetails, ItemStatus},
    services::{inventory::InventoryService, users::UserService},
    views::{self, DateRange, ItemFilter, ItemView},
};
use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

pub const REPORT_HEADER: [&str; 3] = [
    "PT PLN (PERSERO) - UID SUMATERA BARAT",
    "ULP TABING - GUDANG MATERIAL",
    "Laporan Data Inventaris",
];

pub const EXPORT_COLUMNS: [&str; 11] = [
    "No",
    "Nama Material",
    "Kategori",
    "Jumlah",
    "Satuan",
    "Kondisi",
    "Status",
    "Diinput Oleh",
    "Tanggal Input",
    "Diverifikasi Oleh",
    "Catatan",
];

const MONTHS_ID: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LowStockItem {
    pub id: Uuid,
    pub name: String,
    pub quantity: i64,
    pub unit: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ReportSummary {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub andal: usize,
    pub limbah: usize,
    pub created_today: usize,
    pub active_users: u64,
    /// Percentage of approved items, rounded
    pub approval_rate: u32,
    pub approval_label: String,
    pub low_stock: Vec<LowStockItem>,
    pub categories: Vec<CategoryCount>,
}

/// One row of the export table, in column order
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ExportRow {
    pub no: usize,
    pub nama_material: String,
    pub kategori: String,
    pub jumlah: String,
    pub satuan: String,
    pub kondisi: String,
    pub status: String,
    pub diinput_oleh: String,
    pub tanggal_input: String,
    pub diverifikasi_oleh: String,
    pub catatan: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExportReport {
    pub header: Vec<String>,
    pub columns: Vec<String>,
    pub rows: Vec<ExportRow>,
}

pub fn approval_rate(approved: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((approved as f64 / total as f64) * 100.0).round() as u32
}

pub fn approval_label(rate: u32) -> &'static str {
    match rate {
        80.. => "Sangat Baik",
        50..=79 => "Cukup Baik",
        _ => "Perlu Perhatian",
    }
}

/// Piece count of meters and general materials; other kinds have no stock level.
fn counted_quantity(details: &ItemDetails) -> Option<i64> {
    match details {
        ItemDetails::KwhMeter(d) => Some(d.quantity),
        ItemDetails::MaterialUmum(d) => Some(d.quantity),
        _ => None,
    }
}

pub fn low_stock(items: &[InventoryItem], threshold: i64) -> Vec<LowStockItem> {
    items
        .iter()
        .filter_map(|item| {
            let quantity = counted_quantity(&item.details)?;
            (quantity > 0 && quantity < threshold).then(|| LowStockItem {
                id: item.id,
                name: item.details.display_name(),
                quantity,
                unit: item.details.unit().to_string(),
                location: item.details.location().to_string(),
            })
        })
        .collect()
}

/// General materials per category, busiest first, zero counts omitted.
pub fn category_counts(items: &[InventoryItem]) -> Vec<CategoryCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for item in items {
        if let ItemDetails::MaterialUmum(d) = &item.details {
            let category = d
                .category
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or(DEFAULT_CATEGORY);
            *counts.entry(category.to_string()).or_default() += 1;
        }
    }

    let mut stats: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    stats
}

pub fn summarize(
    items: &[InventoryItem],
    active_users: u64,
    low_stock_threshold: i64,
    now: DateTime<Utc>,
) -> ReportSummary {
    let count = |pred: fn(&InventoryItem) -> bool| items.iter().filter(|i| pred(i)).count();
    let total = items.len();
    let approved = count(|i| i.status == ItemStatus::Approved);
    let rate = approval_rate(approved, total);

    ReportSummary {
        total,
        pending: count(|i| i.status == ItemStatus::Pending),
        approved,
        rejected: count(|i| i.status == ItemStatus::Rejected),
        andal: count(|i| i.condition == Condition::Andal),
        limbah: count(|i| i.condition == Condition::Limbah),
        created_today: items
            .iter()
            .filter(|i| DateRange::Today.contains(i.created_at, now))
            .count(),
        active_users,
        approval_rate: rate,
        approval_label: approval_label(rate).to_string(),
        low_stock: low_stock(items, low_stock_threshold),
        categories: category_counts(items),
    }
}

/// `d MMMM yyyy, HH:mm` in Western Indonesia Time with Indonesian month names.
pub fn format_date_id(at: DateTime<Utc>) -> String {
    let local = at.with_timezone(&views::wib());
    format!(
        "{} {} {}, {:02}:{:02}",
        local.day(),
        MONTHS_ID[local.month0() as usize],
        local.year(),
        local.hour(),
        local.minute()
    )
}

fn format_quantity(quantity: f64) -> String {
    if quantity == 0.0 {
        "-".to_string()
    } else if quantity.fract() == 0.0 {
        format!("{}", quantity as i64)
    } else {
        format!("{}", quantity)
    }
}

fn or_dash(value: Option<&str>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("-")
        .to_string()
}

pub fn export_row(no: usize, item: &InventoryItem) -> ExportRow {
    ExportRow {
        no,
        nama_material: item.details.display_name(),
        kategori: item.details.report_category(),
        jumlah: format_quantity(item.details.quantity()),
        satuan: item.details.unit().to_string(),
        kondisi: item.condition.label().to_string(),
        status: item.status.label().to_string(),
        diinput_oleh: or_dash(Some(&item.created_by_name)),
        tanggal_input: format_date_id(item.created_at),
        diverifikasi_oleh: or_dash(item.verified_by_name.as_deref()),
        catatan: or_dash(item.rejection_note.as_deref()),
    }
}

/// Builds the export table. An empty selection is refused.
pub fn build_export(
    items: &[InventoryItem],
    now: DateTime<Utc>,
) -> Result<ExportReport, RuleViolation> {
    if items.is_empty() {
        return Err(RuleViolation::NothingToExport);
    }

    let mut header: Vec<String> = REPORT_HEADER.iter().map(|s| s.to_string()).collect();
    header.push(format!("Dicetak pada: {}", format_date_id(now)));

    Ok(ExportReport {
        header,
        columns: EXPORT_COLUMNS.iter().map(|s| s.to_string()).collect(),
        rows: items
            .iter()
            .enumerate()
            .map(|(idx, item)| export_row(idx + 1, item))
            .collect(),
    })
}

#[derive(Clone)]
pub struct ReportService {
    inventory: InventoryService,
    users: UserService,
    low_stock_threshold: i64,
}

impl ReportService {
    pub fn new(inventory: InventoryService, users: UserService, low_stock_threshold: i64) -> Self {
        Self {
            inventory,
            users,
            low_stock_threshold,
        }
    }

    async fn selection(&self, filter: &ItemFilter) -> Result<Vec<InventoryItem>, ServiceError> {
        let items = self.inventory.all_items().await?;
        Ok(views::apply(&items, &ItemView::All, filter, Utc::now()))
    }

    #[instrument(skip(self))]
    pub async fn summary(&self, filter: &ItemFilter) -> Result<ReportSummary, ServiceError> {
        let items = self.selection(filter).await?;
        let active_users = self.users.count_active().await?;
        Ok(summarize(
            &items,
            active_users,
            self.low_stock_threshold,
            Utc::now(),
        ))
    }

    #[instrument(skip(self))]
    pub async fn export(&self, filter: &ItemFilter) -> Result<ExportReport, ServiceError> {
        let items = self.selection(filter).await?;
        Ok(build_export(&items, Utc::now())?)
    }
}
