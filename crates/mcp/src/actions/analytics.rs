//! Read-only analytics over the contact book. All aggregation happens in
//! memory after one scoped fetch.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use quotahit_core::analytics::{dashboard_metrics, pipeline_summary, DashboardMetrics, PipelineSummary};
use quotahit_core::forecast::{build_forecast, Forecast};
use quotahit_db::ContactRepository;

use super::require_user_id;
use crate::ActionResult;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UserInput {
    /// The owning user's ID
    #[serde(default)]
    pub user_id: String,
}

pub async fn get_pipeline(
    contacts: &dyn ContactRepository,
    input: UserInput,
) -> ActionResult<PipelineSummary> {
    require_user_id(&input.user_id)?;
    let rows = contacts.list_for_user(&input.user_id).await?;
    Ok(pipeline_summary(&rows))
}

/// Dashboard payload. An empty book of business gets a sentinel message
/// instead of a zero-filled metrics block.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AnalyticsResponse {
    Empty { message: &'static str, total: u64 },
    Metrics(Box<DashboardMetrics>),
}

pub async fn get_analytics(
    contacts: &dyn ContactRepository,
    input: UserInput,
) -> ActionResult<AnalyticsResponse> {
    require_user_id(&input.user_id)?;
    let rows = contacts.list_for_user(&input.user_id).await?;
    Ok(match dashboard_metrics(&rows) {
        Some(metrics) => AnalyticsResponse::Metrics(Box::new(metrics)),
        None => AnalyticsResponse::Empty { message: "No contacts yet", total: 0 },
    })
}

pub async fn get_forecast(
    contacts: &dyn ContactRepository,
    input: UserInput,
) -> ActionResult<Forecast> {
    require_user_id(&input.user_id)?;
    let rows = contacts.list_open_deals(&input.user_id).await?;
    Ok(build_forecast(&rows))
}
