//! Lead intelligence: enrichment, scoring, qualification.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use quotahit_core::config::ActivityLogPolicy;
use quotahit_core::domain::activity::NewActivity;
use quotahit_core::domain::contact::{ContactId, DealStage, EnrichmentStatus};
use quotahit_core::scoring::{score_contact, ScoreBreakdown};
use quotahit_db::{ActivityRepository, ContactRepository};

use super::{log_activity, require_user_id};
use crate::{ActionError, ActionResult};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ContactRefInput {
    /// The contact's ID
    pub contact_id: String,
    /// The owning user's ID
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct EnrichLeadResponse {
    pub status: &'static str,
    pub contact_id: String,
    pub message: &'static str,
    pub note: &'static str,
}

/// Mark a contact as enriching. The enrichment pipeline itself runs out of
/// process; results land on the row asynchronously.
pub async fn enrich_lead(
    contacts: &dyn ContactRepository,
    input: ContactRefInput,
) -> ActionResult<EnrichLeadResponse> {
    require_user_id(&input.user_id)?;
    let id = ContactId(input.contact_id.clone());

    let updated = contacts.set_enrichment_status(&id, &input.user_id, EnrichmentStatus::Enriching).await?;
    if updated == 0 {
        return Err(ActionError::not_found(format!("Contact {} not found", input.contact_id)));
    }

    Ok(EnrichLeadResponse {
        status: "enriching",
        contact_id: input.contact_id,
        message: "Enrichment triggered. Use get_contact() to check results.",
        note: "For real-time enrichment, call POST /api/contacts/{id}/enrich via the API",
    })
}

#[derive(Debug, Serialize)]
pub struct ScoreLeadResponse {
    pub contact_id: String,
    pub score: i64,
    pub breakdown: ScoreBreakdown,
}

/// Recompute the lead score, persist it, and log the scoring event.
pub async fn score_lead(
    contacts: &dyn ContactRepository,
    activities: &dyn ActivityRepository,
    policy: ActivityLogPolicy,
    input: ContactRefInput,
) -> ActionResult<ScoreLeadResponse> {
    require_user_id(&input.user_id)?;
    let id = ContactId(input.contact_id.clone());

    let contact = contacts
        .find(&id, &input.user_id)
        .await?
        .ok_or_else(|| ActionError::not_found(format!("Contact {} not found", input.contact_id)))?;
    let activity_count = activities.count_for_contact(&id, &input.user_id).await?;

    let breakdown = score_contact(&contact, activity_count);
    contacts.set_lead_score(&id, &input.user_id, breakdown.total).await?;

    log_activity(
        activities,
        policy,
        NewActivity {
            user_id: input.user_id,
            contact_id: id,
            activity_type: "lead_scored".to_string(),
            title: format!("Lead scored: {}/100", breakdown.total),
            description: String::new(),
            details: Some(serde_json::json!({"score": breakdown.total, "source": "mcp"})),
        },
    )
    .await?;

    Ok(ScoreLeadResponse { contact_id: input.contact_id, score: breakdown.total, breakdown })
}

#[derive(Debug, Serialize)]
pub struct QualifyLeadResponse {
    pub contact_id: String,
    pub name: String,
    pub company: Option<String>,
    pub current_stage: DealStage,
    pub lead_score: i64,
    pub qualification_status: Value,
    pub bant_scores: Option<Value>,
    pub qualification_outcome: Option<Value>,
    pub note: &'static str,
}

/// Read back the qualification state stashed in the contact's custom fields.
pub async fn qualify_lead(
    contacts: &dyn ContactRepository,
    input: ContactRefInput,
) -> ActionResult<QualifyLeadResponse> {
    require_user_id(&input.user_id)?;
    let id = ContactId(input.contact_id.clone());

    let contact = contacts
        .find(&id, &input.user_id)
        .await?
        .ok_or_else(|| ActionError::not_found(format!("Contact {} not found", input.contact_id)))?;

    let custom = &contact.custom_fields;
    let qualification_status =
        custom.get("qualification_status").cloned().unwrap_or_else(|| Value::from("none"));

    Ok(QualifyLeadResponse {
        contact_id: input.contact_id,
        name: contact.full_name(),
        company: contact.company,
        current_stage: contact.deal_stage,
        lead_score: contact.lead_score,
        qualification_status,
        bant_scores: custom.get("bant_scores").cloned(),
        qualification_outcome: custom.get("qualification_outcome").cloned(),
        note: "Qualification runs automatically via Inngest when score > 40. To trigger manually, call POST /api/leads/score with this contactId.",
    })
}
