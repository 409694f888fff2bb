use sqlx::sqlite::SqliteRow;

use quotahit_core::domain::sequence::{FollowUpSequence, SequenceId};

use super::{get_column, parse_timestamp, RepositoryError, SequenceRepository};
use crate::DbPool;

pub struct SqlSequenceRepository {
    pool: DbPool,
}

impl SqlSequenceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_sequence(row: &SqliteRow) -> Result<FollowUpSequence, RepositoryError> {
    let steps_raw: String = get_column(row, "steps")?;
    let steps = serde_json::from_str::<serde_json::Value>(&steps_raw)
        .ok()
        .and_then(|v| v.as_array().cloned())
        .unwrap_or_default();
    let created_raw: String = get_column(row, "created_at")?;

    Ok(FollowUpSequence {
        id: SequenceId(get_column(row, "id")?),
        user_id: get_column(row, "user_id")?,
        name: get_column(row, "name")?,
        trigger_event: get_column(row, "trigger_event")?,
        steps,
        is_active: get_column(row, "is_active")?,
        created_at: parse_timestamp(&created_raw),
    })
}

#[async_trait::async_trait]
impl SequenceRepository for SqlSequenceRepository {
    async fn list(&self, user_id: &str) -> Result<Vec<FollowUpSequence>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, user_id, name, trigger_event, steps, is_active, created_at
             FROM follow_up_sequences WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_sequence).collect()
    }

    async fn insert(&self, sequence: FollowUpSequence) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO follow_up_sequences (id, user_id, name, trigger_event, steps, \
             is_active, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&sequence.id.0)
        .bind(&sequence.user_id)
        .bind(&sequence.name)
        .bind(&sequence.trigger_event)
        .bind(serde_json::Value::Array(sequence.steps.clone()).to_string())
        .bind(sequence.is_active)
        .bind(sequence.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use quotahit_core::domain::sequence::{FollowUpSequence, SequenceId};

    use super::SqlSequenceRepository;
    use crate::repositories::SequenceRepository;
    use crate::{connect_with_settings, migrations};

    async fn setup() -> SqlSequenceRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlSequenceRepository::new(pool)
    }

    fn sequence(id: &str, user_id: &str, steps: usize) -> FollowUpSequence {
        FollowUpSequence {
            id: SequenceId(id.to_string()),
            user_id: user_id.to_string(),
            name: format!("seq {id}"),
            trigger_event: "stage_changed".to_string(),
            steps: (0..steps).map(|i| serde_json::json!({"day": i, "channel": "email"})).collect(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn list_round_trips_steps() {
        let repo = setup().await;
        repo.insert(sequence("s1", "u1", 3)).await.expect("insert");
        repo.insert(sequence("s2", "u2", 1)).await.expect("insert");

        let sequences = repo.list("u1").await.expect("list");
        assert_eq!(sequences.len(), 1);
        assert_eq!(sequences[0].step_count(), 3);
        assert!(sequences[0].is_active);
    }

    #[tokio::test]
    async fn empty_steps_count_zero() {
        let repo = setup().await;
        repo.insert(sequence("s1", "u1", 0)).await.expect("insert");
        let sequences = repo.list("u1").await.expect("list");
        assert_eq!(sequences[0].step_count(), 0);
    }
}
