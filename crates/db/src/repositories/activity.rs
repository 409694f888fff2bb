use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use quotahit_core::domain::activity::{Activity, ActivityId, NewActivity};
use quotahit_core::domain::contact::ContactId;

use super::{get_column, parse_timestamp, ActivityRepository, RepositoryError};
use crate::DbPool;

pub struct SqlActivityRepository {
    pool: DbPool,
}

impl SqlActivityRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_activity(row: &SqliteRow) -> Result<Activity, RepositoryError> {
    let details_raw: Option<String> = get_column(row, "details")?;
    let created_raw: String = get_column(row, "created_at")?;

    Ok(Activity {
        id: ActivityId(get_column(row, "id")?),
        user_id: get_column(row, "user_id")?,
        contact_id: ContactId(get_column(row, "contact_id")?),
        activity_type: get_column(row, "activity_type")?,
        title: get_column(row, "title")?,
        description: get_column(row, "description")?,
        details: details_raw.and_then(|s| serde_json::from_str(&s).ok()),
        created_at: parse_timestamp(&created_raw),
    })
}

#[async_trait::async_trait]
impl ActivityRepository for SqlActivityRepository {
    async fn insert(&self, new: NewActivity) -> Result<Activity, RepositoryError> {
        let id = ActivityId(Uuid::new_v4().to_string());
        let now = Utc::now();
        let details_raw = new.details.as_ref().map(|v| v.to_string());

        sqlx::query(
            "INSERT INTO activities (id, user_id, contact_id, activity_type, title, \
             description, details, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id.0)
        .bind(&new.user_id)
        .bind(&new.contact_id.0)
        .bind(&new.activity_type)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&details_raw)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(Activity {
            id,
            user_id: new.user_id,
            contact_id: new.contact_id,
            activity_type: new.activity_type,
            title: new.title,
            description: new.description,
            details: new.details,
            created_at: now,
        })
    }

    async fn recent_for_contact(
        &self,
        contact_id: &ContactId,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<Activity>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, user_id, contact_id, activity_type, title, description, details, \
             created_at
             FROM activities WHERE contact_id = ? AND user_id = ?
             ORDER BY created_at DESC LIMIT ?",
        )
        .bind(&contact_id.0)
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_activity).collect()
    }

    async fn count_for_contact(
        &self,
        contact_id: &ContactId,
        user_id: &str,
    ) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query(
            "SELECT COUNT(*) AS count FROM activities WHERE contact_id = ? AND user_id = ?",
        )
        .bind(&contact_id.0)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?
        .try_get("count")
        .map_err(|e| RepositoryError::Decode(e.to_string()))?;

        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use quotahit_core::domain::activity::NewActivity;
    use quotahit_core::domain::contact::{ContactId, DealStage, NewContact};

    use super::SqlActivityRepository;
    use crate::repositories::{ActivityRepository, ContactRepository, SqlContactRepository};
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup() -> (DbPool, ContactId) {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");

        let contacts = SqlContactRepository::new(pool.clone());
        let contact = contacts
            .insert(NewContact {
                user_id: "u1".to_string(),
                first_name: "Ada".to_string(),
                last_name: String::new(),
                email: None,
                phone: None,
                company: None,
                title: None,
                source: "mcp".to_string(),
                deal_stage: DealStage::Lead,
                deal_value: 0.0,
                notes: String::new(),
            })
            .await
            .expect("insert contact");
        (pool, contact.id)
    }

    fn log_entry(contact_id: &ContactId, title: &str) -> NewActivity {
        NewActivity {
            user_id: "u1".to_string(),
            contact_id: contact_id.clone(),
            activity_type: "call".to_string(),
            title: title.to_string(),
            description: String::new(),
            details: None,
        }
    }

    #[tokio::test]
    async fn insert_and_count() {
        let (pool, contact_id) = setup().await;
        let repo = SqlActivityRepository::new(pool);

        assert_eq!(repo.count_for_contact(&contact_id, "u1").await.expect("count"), 0);
        repo.insert(log_entry(&contact_id, "first")).await.expect("insert");
        repo.insert(log_entry(&contact_id, "second")).await.expect("insert");
        assert_eq!(repo.count_for_contact(&contact_id, "u1").await.expect("count"), 2);
        assert_eq!(repo.count_for_contact(&contact_id, "other").await.expect("count"), 0);
    }

    #[tokio::test]
    async fn recent_returns_newest_first_and_honors_limit() {
        let (pool, contact_id) = setup().await;
        let repo = SqlActivityRepository::new(pool);

        for i in 0..4 {
            repo.insert(log_entry(&contact_id, &format!("a{i}"))).await.expect("insert");
            // Distinct timestamps keep the ordering assertion meaningful.
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let recent =
            repo.recent_for_contact(&contact_id, "u1", 3).await.expect("recent");
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].title, "a3");
        assert_eq!(recent[2].title, "a1");
    }

    #[tokio::test]
    async fn details_json_round_trips() {
        let (pool, contact_id) = setup().await;
        let repo = SqlActivityRepository::new(pool);

        let mut entry = log_entry(&contact_id, "scored");
        entry.details = Some(serde_json::json!({"score": 42, "source": "mcp"}));
        repo.insert(entry).await.expect("insert");

        let recent =
            repo.recent_for_contact(&contact_id, "u1", 10).await.expect("recent");
        assert_eq!(recent[0].details, Some(serde_json::json!({"score": 42, "source": "mcp"})));
    }
}
