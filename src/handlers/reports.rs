use crate::{
    errors::ServiceError,
    models::{Condition, ItemKind},
    services::reports::{ExportReport, ReportSummary},
    views::{self, DateRange, ItemFilter},
    ApiResponse, ApiResult, AppState,
};
use axum::extract::{Json, Query, State};
use serde::Deserialize;
use utoipa::IntoParams;

/// Selection shared by the summary and the export
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    pub range: Option<DateRange>,
    /// Comma separated statuses
    pub status: Option<String>,
    pub condition: Option<Condition>,
    pub kind: Option<ItemKind>,
    /// Material category
    pub category: Option<String>,
}

impl ReportQuery {
    fn filter(&self) -> Result<ItemFilter, ServiceError> {
        Ok(ItemFilter {
            statuses: match self.status.as_deref() {
                Some(raw) => views::parse_statuses(raw)?,
                None => Vec::new(),
            },
            kind: self.kind,
            condition: self.condition,
            search: None,
            category: self.category.clone(),
            range: self.range.unwrap_or_default(),
        })
    }
}

/// Dashboard counters
#[utoipa::path(
    get,
    path = "/api/v1/reports/summary",
    params(ReportQuery),
    responses(
        (status = 200, description = "Summary", body = ApiResponse<ReportSummary>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn summary(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<ReportSummary> {
    let summary = state.services.reports.summary(&query.filter()?).await?;
    Ok(Json(ApiResponse::success(summary)))
}

/// Inventory report rows for printing or spreadsheet export
#[utoipa::path(
    get,
    path = "/api/v1/reports/export",
    params(ReportQuery),
    responses(
        (status = 200, description = "Export table", body = ApiResponse<ExportReport>),
        (status = 400, description = "Nothing to export", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn export(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<ExportReport> {
    let report = state.services.reports.export(&query.filter()?).await?;
    Ok(Json(ApiResponse::success(report)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemStatus;

    #[test]
    fn report_query_maps_to_filter() {
        let query = ReportQuery {
            range: Some(DateRange::Month),
            status: Some("approved".into()),
            condition: Some(Condition::Limbah),
            kind: None,
            category: Some("MCB".into()),
        };
        let filter = query.filter().unwrap();
        assert_eq!(filter.statuses, vec![ItemStatus::Approved]);
        assert_eq!(filter.range, DateRange::Month);
        assert_eq!(filter.condition, Some(Condition::Limbah));
        assert_eq!(filter.category.as_deref(), Some("MCB"));
    }
}
