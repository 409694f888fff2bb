use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use uuid::Uuid;

use quotahit_core::domain::campaign::{
    Campaign, CampaignId, CampaignStatus, CampaignType, NewCampaign,
};

use super::{
    get_column, parse_optional_timestamp, parse_timestamp, CampaignRepository, RepositoryError,
};
use crate::DbPool;

const CAMPAIGN_COLUMNS: &str = "id, user_id, name, campaign_type, status, description, \
     total_contacts, completed_contacts, started_at, created_at, updated_at";

pub struct SqlCampaignRepository {
    pool: DbPool,
}

impl SqlCampaignRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_campaign(row: &SqliteRow) -> Result<Campaign, RepositoryError> {
    let type_raw: String = get_column(row, "campaign_type")?;
    let status_raw: String = get_column(row, "status")?;
    let started_raw: Option<String> = get_column(row, "started_at")?;
    let created_raw: String = get_column(row, "created_at")?;
    let updated_raw: String = get_column(row, "updated_at")?;

    let campaign_type = type_raw
        .parse::<CampaignType>()
        .map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(Campaign {
        id: CampaignId(get_column(row, "id")?),
        user_id: get_column(row, "user_id")?,
        name: get_column(row, "name")?,
        campaign_type,
        status: CampaignStatus::parse_lenient(&status_raw),
        description: get_column(row, "description")?,
        total_contacts: get_column(row, "total_contacts")?,
        completed_contacts: get_column(row, "completed_contacts")?,
        started_at: parse_optional_timestamp(started_raw),
        created_at: parse_timestamp(&created_raw),
        updated_at: parse_timestamp(&updated_raw),
    })
}

#[async_trait::async_trait]
impl CampaignRepository for SqlCampaignRepository {
    async fn insert(&self, new: NewCampaign) -> Result<Campaign, RepositoryError> {
        let id = CampaignId(Uuid::new_v4().to_string());
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO campaigns (id, user_id, name, campaign_type, description, \
             created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id.0)
        .bind(&new.user_id)
        .bind(&new.name)
        .bind(new.campaign_type.as_str())
        .bind(&new.description)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(Campaign {
            id,
            user_id: new.user_id,
            name: new.name,
            campaign_type: new.campaign_type,
            status: CampaignStatus::Draft,
            description: new.description,
            total_contacts: 0,
            completed_contacts: 0,
            started_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    async fn list(&self, user_id: &str, limit: u32) -> Result<Vec<Campaign>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE user_id = ? \
             ORDER BY created_at DESC LIMIT ?"
        ))
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_campaign).collect()
    }

    async fn find(
        &self,
        id: &CampaignId,
        user_id: &str,
    ) -> Result<Option<Campaign>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = ? AND user_id = ?"
        ))
        .bind(&id.0)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_campaign(r)?)),
            None => Ok(None),
        }
    }

    async fn activate(
        &self,
        id: &CampaignId,
        user_id: &str,
    ) -> Result<Option<Campaign>, RepositoryError> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE campaigns SET status = 'active', started_at = ?, updated_at = ? \
             WHERE id = ? AND user_id = ?",
        )
        .bind(&now)
        .bind(&now)
        .bind(&id.0)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find(id, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use quotahit_core::domain::campaign::{CampaignId, CampaignStatus, CampaignType, NewCampaign};

    use super::SqlCampaignRepository;
    use crate::repositories::CampaignRepository;
    use crate::{connect_with_settings, migrations};

    async fn setup() -> SqlCampaignRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlCampaignRepository::new(pool)
    }

    fn outbound(user_id: &str, name: &str) -> NewCampaign {
        NewCampaign {
            user_id: user_id.to_string(),
            name: name.to_string(),
            campaign_type: CampaignType::Outbound,
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn new_campaigns_start_as_drafts() {
        let repo = setup().await;
        let created = repo.insert(outbound("u1", "Q3 push")).await.expect("insert");
        assert_eq!(created.status, CampaignStatus::Draft);
        assert!(created.started_at.is_none());

        let listed = repo.list("u1", 20).await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Q3 push");
    }

    #[tokio::test]
    async fn list_is_scoped_and_limited() {
        let repo = setup().await;
        repo.insert(outbound("u1", "a")).await.expect("insert");
        repo.insert(outbound("u1", "b")).await.expect("insert");
        repo.insert(outbound("u2", "c")).await.expect("insert");

        assert_eq!(repo.list("u1", 20).await.expect("list").len(), 2);
        assert_eq!(repo.list("u1", 1).await.expect("list").len(), 1);
        assert_eq!(repo.list("u3", 20).await.expect("list").len(), 0);
    }

    #[tokio::test]
    async fn activate_stamps_start_time() {
        let repo = setup().await;
        let created = repo.insert(outbound("u1", "Q3 push")).await.expect("insert");

        let activated = repo
            .activate(&created.id, "u1")
            .await
            .expect("activate")
            .expect("row exists");
        assert_eq!(activated.status, CampaignStatus::Active);
        assert!(activated.started_at.is_some());
    }

    #[tokio::test]
    async fn activate_unknown_campaign_returns_none() {
        let repo = setup().await;
        let missing = repo
            .activate(&CampaignId("nope".to_string()), "u1")
            .await
            .expect("activate");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn reactivating_an_active_campaign_is_allowed() {
        let repo = setup().await;
        let created = repo.insert(outbound("u1", "Q3 push")).await.expect("insert");

        let first = repo.activate(&created.id, "u1").await.expect("activate").expect("row");
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = repo.activate(&created.id, "u1").await.expect("activate").expect("row");

        assert_eq!(second.status, CampaignStatus::Active);
        assert!(second.started_at >= first.started_at);
    }
}
