use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::QueryBuilder;
use uuid::Uuid;

use quotahit_core::domain::contact::{
    Contact, ContactId, ContactPatch, DealStage, EnrichmentStatus, NewContact,
};

use super::{
    get_column, parse_optional_timestamp, parse_timestamp, ContactListQuery, ContactRepository,
    RepositoryError,
};
use crate::DbPool;

const CONTACT_COLUMNS: &str = "id, user_id, first_name, last_name, email, phone, company, title, \
     source, deal_stage, deal_value, lead_score, enrichment_status, do_not_call, do_not_email, \
     notes, custom_fields, last_contacted_at, created_at, updated_at";

pub struct SqlContactRepository {
    pool: DbPool,
}

impl SqlContactRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_contact(row: &SqliteRow) -> Result<Contact, RepositoryError> {
    let custom_fields_raw: String = get_column(row, "custom_fields")?;
    let custom_fields = serde_json::from_str::<serde_json::Value>(&custom_fields_raw)
        .ok()
        .and_then(|v| v.as_object().cloned())
        .unwrap_or_default();

    let stage_raw: String = get_column(row, "deal_stage")?;
    let enrichment_raw: String = get_column(row, "enrichment_status")?;
    let last_contacted_raw: Option<String> = get_column(row, "last_contacted_at")?;
    let created_raw: String = get_column(row, "created_at")?;
    let updated_raw: String = get_column(row, "updated_at")?;

    Ok(Contact {
        id: ContactId(get_column(row, "id")?),
        user_id: get_column(row, "user_id")?,
        first_name: get_column(row, "first_name")?,
        last_name: get_column(row, "last_name")?,
        email: get_column(row, "email")?,
        phone: get_column(row, "phone")?,
        company: get_column(row, "company")?,
        title: get_column(row, "title")?,
        source: get_column(row, "source")?,
        deal_stage: DealStage::parse_lenient(&stage_raw),
        deal_value: get_column(row, "deal_value")?,
        lead_score: get_column(row, "lead_score")?,
        enrichment_status: EnrichmentStatus::parse_lenient(&enrichment_raw),
        do_not_call: get_column(row, "do_not_call")?,
        do_not_email: get_column(row, "do_not_email")?,
        notes: get_column(row, "notes")?,
        custom_fields,
        last_contacted_at: parse_optional_timestamp(last_contacted_raw),
        created_at: parse_timestamp(&created_raw),
        updated_at: parse_timestamp(&updated_raw),
    })
}

#[async_trait::async_trait]
impl ContactRepository for SqlContactRepository {
    async fn insert(&self, new: NewContact) -> Result<Contact, RepositoryError> {
        let id = ContactId(Uuid::new_v4().to_string());
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO contacts (id, user_id, first_name, last_name, email, phone, company, \
             title, source, deal_stage, deal_value, notes, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id.0)
        .bind(&new.user_id)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.company)
        .bind(&new.title)
        .bind(&new.source)
        .bind(new.deal_stage.as_str())
        .bind(new.deal_value)
        .bind(&new.notes)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(Contact {
            id,
            user_id: new.user_id,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            phone: new.phone,
            company: new.company,
            title: new.title,
            source: new.source,
            deal_stage: new.deal_stage,
            deal_value: new.deal_value,
            lead_score: 0,
            enrichment_status: EnrichmentStatus::None,
            do_not_call: false,
            do_not_email: false,
            notes: new.notes,
            custom_fields: serde_json::Map::new(),
            last_contacted_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    async fn find(
        &self,
        id: &ContactId,
        user_id: &str,
    ) -> Result<Option<Contact>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ? AND user_id = ?"
        ))
        .bind(&id.0)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_contact(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, query: &ContactListQuery) -> Result<Vec<Contact>, RepositoryError> {
        let mut qb: QueryBuilder<sqlx::Sqlite> =
            QueryBuilder::new(format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE user_id = "));
        qb.push_bind(&query.user_id);

        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{search}%");
            qb.push(" AND (first_name LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR last_name LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR email LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR company LIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }
        if let Some(stage) = query.stage {
            qb.push(" AND deal_stage = ");
            qb.push_bind(stage.as_str());
        }

        // Sort column comes from the fixed enum, never from raw input.
        qb.push(format!(" ORDER BY {} DESC", query.sort.column()));
        qb.push(" LIMIT ");
        qb.push_bind(query.limit as i64);
        qb.push(" OFFSET ");
        qb.push_bind(query.offset as i64);

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_contact).collect()
    }

    async fn apply_patch(
        &self,
        id: &ContactId,
        user_id: &str,
        patch: &ContactPatch,
    ) -> Result<Option<Contact>, RepositoryError> {
        if patch.is_empty() {
            return self.find(id, user_id).await;
        }

        let mut qb: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE contacts SET ");
        let mut set = qb.separated(", ");

        if let Some(v) = &patch.first_name {
            set.push("first_name = ").push_bind_unseparated(v.clone());
        }
        if let Some(v) = &patch.last_name {
            set.push("last_name = ").push_bind_unseparated(v.clone());
        }
        if let Some(v) = &patch.email {
            set.push("email = ").push_bind_unseparated(v.clone());
        }
        if let Some(v) = &patch.phone {
            set.push("phone = ").push_bind_unseparated(v.clone());
        }
        if let Some(v) = &patch.company {
            set.push("company = ").push_bind_unseparated(v.clone());
        }
        if let Some(v) = &patch.title {
            set.push("title = ").push_bind_unseparated(v.clone());
        }
        if let Some(v) = &patch.source {
            set.push("source = ").push_bind_unseparated(v.clone());
        }
        if let Some(v) = patch.deal_stage {
            set.push("deal_stage = ").push_bind_unseparated(v.as_str());
        }
        if let Some(v) = patch.deal_value {
            set.push("deal_value = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.lead_score {
            set.push("lead_score = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.enrichment_status {
            set.push("enrichment_status = ").push_bind_unseparated(v.as_str());
        }
        if let Some(v) = patch.do_not_call {
            set.push("do_not_call = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.do_not_email {
            set.push("do_not_email = ").push_bind_unseparated(v);
        }
        if let Some(v) = &patch.notes {
            set.push("notes = ").push_bind_unseparated(v.clone());
        }
        if let Some(v) = &patch.custom_fields {
            let encoded = serde_json::Value::Object(v.clone()).to_string();
            set.push("custom_fields = ").push_bind_unseparated(encoded);
        }
        if let Some(v) = patch.last_contacted_at {
            set.push("last_contacted_at = ").push_bind_unseparated(v.to_rfc3339());
        }
        set.push("updated_at = ").push_bind_unseparated(Utc::now().to_rfc3339());

        qb.push(" WHERE id = ");
        qb.push_bind(&id.0);
        qb.push(" AND user_id = ");
        qb.push_bind(user_id);

        let result = qb.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find(id, user_id).await
    }

    async fn set_enrichment_status(
        &self,
        id: &ContactId,
        user_id: &str,
        status: EnrichmentStatus,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "UPDATE contacts SET enrichment_status = ?, updated_at = ? \
             WHERE id = ? AND user_id = ?",
        )
        .bind(status.as_str())
        .bind(Utc::now().to_rfc3339())
        .bind(&id.0)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn set_lead_score(
        &self,
        id: &ContactId,
        user_id: &str,
        score: i64,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "UPDATE contacts SET lead_score = ?, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(score)
        .bind(Utc::now().to_rfc3339())
        .bind(&id.0)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn set_deal_stage(
        &self,
        id: &ContactId,
        user_id: &str,
        stage: DealStage,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "UPDATE contacts SET deal_stage = ?, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(stage.as_str())
        .bind(Utc::now().to_rfc3339())
        .bind(&id.0)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Contact>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE user_id = ? ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_contact).collect()
    }

    async fn list_open_deals(&self, user_id: &str) -> Result<Vec<Contact>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts \
             WHERE user_id = ? AND deal_value > 0 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_contact).collect()
    }
}
