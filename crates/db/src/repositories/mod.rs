use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use thiserror::Error;

use quotahit_core::domain::activity::{Activity, NewActivity};
use quotahit_core::domain::campaign::{Campaign, CampaignId, NewCampaign};
use quotahit_core::domain::contact::{
    Contact, ContactId, ContactPatch, ContactSort, DealStage, EnrichmentStatus, NewContact,
};
use quotahit_core::domain::sequence::FollowUpSequence;

pub mod activity;
pub mod campaign;
pub mod contact;
pub mod sequence;

pub use activity::SqlActivityRepository;
pub use campaign::SqlCampaignRepository;
pub use contact::SqlContactRepository;
pub use sequence::SqlSequenceRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Filters for a contact listing. The caller is responsible for clamping
/// `limit`; this layer passes it through verbatim.
#[derive(Clone, Debug)]
pub struct ContactListQuery {
    pub user_id: String,
    pub search: Option<String>,
    pub stage: Option<DealStage>,
    pub sort: ContactSort,
    pub limit: u32,
    pub offset: u32,
}

#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn insert(&self, new: NewContact) -> Result<Contact, RepositoryError>;

    async fn find(&self, id: &ContactId, user_id: &str)
        -> Result<Option<Contact>, RepositoryError>;

    async fn list(&self, query: &ContactListQuery) -> Result<Vec<Contact>, RepositoryError>;

    /// Scoped partial update. Returns the updated row, or `None` when no row
    /// matched the id/owner pair.
    async fn apply_patch(
        &self,
        id: &ContactId,
        user_id: &str,
        patch: &ContactPatch,
    ) -> Result<Option<Contact>, RepositoryError>;

    /// Returns the number of rows updated (0 when the contact is missing).
    async fn set_enrichment_status(
        &self,
        id: &ContactId,
        user_id: &str,
        status: EnrichmentStatus,
    ) -> Result<u64, RepositoryError>;

    async fn set_lead_score(
        &self,
        id: &ContactId,
        user_id: &str,
        score: i64,
    ) -> Result<u64, RepositoryError>;

    async fn set_deal_stage(
        &self,
        id: &ContactId,
        user_id: &str,
        stage: DealStage,
    ) -> Result<u64, RepositoryError>;

    /// Every contact owned by the user, newest first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Contact>, RepositoryError>;

    /// Contacts carrying a positive deal value, for forecasting.
    async fn list_open_deals(&self, user_id: &str) -> Result<Vec<Contact>, RepositoryError>;
}

#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn insert(&self, new: NewActivity) -> Result<Activity, RepositoryError>;

    async fn recent_for_contact(
        &self,
        contact_id: &ContactId,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<Activity>, RepositoryError>;

    async fn count_for_contact(
        &self,
        contact_id: &ContactId,
        user_id: &str,
    ) -> Result<u64, RepositoryError>;
}

#[async_trait]
pub trait CampaignRepository: Send + Sync {
    async fn insert(&self, new: NewCampaign) -> Result<Campaign, RepositoryError>;

    async fn list(&self, user_id: &str, limit: u32) -> Result<Vec<Campaign>, RepositoryError>;

    async fn find(
        &self,
        id: &CampaignId,
        user_id: &str,
    ) -> Result<Option<Campaign>, RepositoryError>;

    /// Flip the campaign to active and stamp `started_at`. Returns the
    /// updated row, or `None` when no row matched. Re-activating an already
    /// active campaign is allowed and restamps the start time.
    async fn activate(
        &self,
        id: &CampaignId,
        user_id: &str,
    ) -> Result<Option<Campaign>, RepositoryError>;
}

#[async_trait]
pub trait SequenceRepository: Send + Sync {
    async fn list(&self, user_id: &str) -> Result<Vec<FollowUpSequence>, RepositoryError>;

    async fn insert(&self, sequence: FollowUpSequence) -> Result<(), RepositoryError>;
}

pub(crate) fn get_column<'r, T>(row: &'r SqliteRow, column: &str) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column).map_err(|e| RepositoryError::Decode(format!("{column}: {e}")))
}

pub(crate) fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

pub(crate) fn parse_optional_timestamp(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(&s).ok()).map(|dt| dt.with_timezone(&Utc))
}
