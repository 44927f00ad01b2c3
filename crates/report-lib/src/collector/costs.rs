//! Daily cost collection

use crate::cloud::CloudContext;
use crate::error::Result;
use crate::models::{CostLineItem, UsageRequest, DAILY_GRANULARITY};
use crate::observability::ReportLogger;
use crate::window::ReportWindow;

/// Tenancy-wide daily usage request for the window
pub fn usage_request(tenancy_id: &str, window: &ReportWindow) -> UsageRequest {
    UsageRequest {
        tenant_id: tenancy_id.to_string(),
        time_usage_started: window.start_iso(),
        time_usage_ended: window.end_iso(),
        granularity: DAILY_GRANULARITY.to_string(),
    }
}

/// Fetch cost line items in backend order
pub async fn collect_costs(
    ctx: &CloudContext,
    window: &ReportWindow,
    logger: &ReportLogger,
) -> Result<Vec<CostLineItem>> {
    let request = usage_request(&ctx.tenancy_id, window);
    let summary = ctx.usage.request_summarized_usages(&request).await?;
    logger.log_costs_fetched(summary.items.len());
    Ok(summary.items)
}
