//! Action handlers behind the MCP tools.
//!
//! Each handler is self-contained: validate inputs, run one or two scoped
//! queries, shape the response. No caching, no retries, no cross-action
//! state.

use tracing::warn;

use quotahit_core::config::ActivityLogPolicy;
use quotahit_core::domain::activity::NewActivity;
use quotahit_db::ActivityRepository;

use crate::{ActionError, ActionResult};

pub mod analytics;
pub mod campaigns;
pub mod contacts;
pub mod leads;
pub mod sequences;

pub(crate) fn require_user_id(user_id: &str) -> ActionResult<()> {
    if user_id.trim().is_empty() {
        return Err(ActionError::invalid("user_id is required"));
    }
    Ok(())
}

/// Append an activity entry after a successful mutation.
///
/// The primary mutation has already committed by the time this runs; the
/// policy decides whether a failed log write is swallowed or surfaced.
pub(crate) async fn log_activity(
    activities: &dyn ActivityRepository,
    policy: ActivityLogPolicy,
    entry: NewActivity,
) -> ActionResult<()> {
    match activities.insert(entry).await {
        Ok(_) => Ok(()),
        Err(err) => match policy {
            ActivityLogPolicy::BestEffort => {
                warn!(error = %err, "activity log write failed, continuing");
                Ok(())
            }
            ActivityLogPolicy::Strict => Err(err.into()),
        },
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;

    use quotahit_core::domain::activity::{Activity, NewActivity};
    use quotahit_core::domain::contact::ContactId;
    use quotahit_db::{ActivityRepository, DbPool, RepositoryError};
    use quotahit_db::{
        connect_with_settings, migrations, SqlActivityRepository, SqlCampaignRepository,
        SqlContactRepository, SqlSequenceRepository,
    };

    pub async fn pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    pub fn contacts(pool: &DbPool) -> SqlContactRepository {
        SqlContactRepository::new(pool.clone())
    }

    pub fn activities(pool: &DbPool) -> SqlActivityRepository {
        SqlActivityRepository::new(pool.clone())
    }

    pub fn campaigns(pool: &DbPool) -> SqlCampaignRepository {
        SqlCampaignRepository::new(pool.clone())
    }

    pub fn sequences(pool: &DbPool) -> SqlSequenceRepository {
        SqlSequenceRepository::new(pool.clone())
    }

    /// Activity store that refuses every write, for log-policy tests.
    pub struct BrokenActivityRepository;

    #[async_trait]
    impl ActivityRepository for BrokenActivityRepository {
        async fn insert(&self, _new: NewActivity) -> Result<Activity, RepositoryError> {
            Err(RepositoryError::Decode("activities table unavailable".to_string()))
        }

        async fn recent_for_contact(
            &self,
            _contact_id: &ContactId,
            _user_id: &str,
            _limit: u32,
        ) -> Result<Vec<Activity>, RepositoryError> {
            Err(RepositoryError::Decode("activities table unavailable".to_string()))
        }

        async fn count_for_contact(
            &self,
            _contact_id: &ContactId,
            _user_id: &str,
        ) -> Result<u64, RepositoryError> {
            Err(RepositoryError::Decode("activities table unavailable".to_string()))
        }
    }
}
