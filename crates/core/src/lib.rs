pub mod analytics;
pub mod config;
pub mod domain;
pub mod errors;
pub mod forecast;
pub mod prompts;
pub mod scoring;

pub use analytics::{dashboard_metrics, pipeline_summary, DashboardMetrics, PipelineSummary};
pub use config::{ActivityLogPolicy, AppConfig, ConfigError};
pub use domain::activity::{Activity, ActivityId, NewActivity};
pub use domain::campaign::{Campaign, CampaignId, CampaignStatus, CampaignType, NewCampaign};
pub use domain::contact::{
    Contact, ContactId, ContactPatch, ContactSort, DealStage, EnrichmentStatus, NewContact,
};
pub use domain::sequence::{FollowUpSequence, SequenceId};
pub use errors::DomainError;
pub use forecast::{build_forecast, Forecast, ForecastDeal};
pub use scoring::{score_contact, ScoreBreakdown};
