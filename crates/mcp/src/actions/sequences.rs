//! Follow-up sequences and pipeline stage moves.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use quotahit_core::config::ActivityLogPolicy;
use quotahit_core::domain::activity::NewActivity;
use quotahit_core::domain::contact::{ContactId, DealStage};
use quotahit_core::domain::sequence::FollowUpSequence;
use quotahit_db::{ActivityRepository, ContactRepository, SequenceRepository};

use super::{log_activity, require_user_id};
use crate::{ActionError, ActionResult};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListSequencesInput {
    /// The owning user's ID
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct SequenceSummary {
    pub id: String,
    pub name: String,
    pub trigger: String,
    pub steps: usize,
    pub active: bool,
    pub created: chrono::DateTime<chrono::Utc>,
}

impl From<FollowUpSequence> for SequenceSummary {
    fn from(sequence: FollowUpSequence) -> Self {
        SequenceSummary {
            id: sequence.id.0.clone(),
            name: sequence.name.clone(),
            trigger: sequence.trigger_event.clone(),
            steps: sequence.step_count(),
            active: sequence.is_active,
            created: sequence.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SequenceListResponse {
    pub count: usize,
    pub sequences: Vec<SequenceSummary>,
}

pub async fn list_sequences(
    sequences: &dyn SequenceRepository,
    input: ListSequencesInput,
) -> ActionResult<SequenceListResponse> {
    require_user_id(&input.user_id)?;
    let rows = sequences.list(&input.user_id).await?;
    Ok(SequenceListResponse {
        count: rows.len(),
        sequences: rows.into_iter().map(SequenceSummary::from).collect(),
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateDealStageInput {
    /// The contact's ID
    pub contact_id: String,
    /// The owning user's ID
    #[serde(default)]
    pub user_id: String,
    /// Target stage (lead, contacted, qualified, proposal, negotiation, won, lost)
    pub new_stage: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateDealStageResponse {
    pub updated: bool,
    pub contact_id: String,
    pub old_stage: DealStage,
    pub new_stage: DealStage,
}

pub async fn update_deal_stage(
    contacts: &dyn ContactRepository,
    activities: &dyn ActivityRepository,
    policy: ActivityLogPolicy,
    input: UpdateDealStageInput,
) -> ActionResult<UpdateDealStageResponse> {
    require_user_id(&input.user_id)?;
    // Validate the target stage before touching the store.
    let new_stage: DealStage = input
        .new_stage
        .parse()
        .map_err(|e: quotahit_core::DomainError| ActionError::invalid(e.to_string()))?;

    let id = ContactId(input.contact_id.clone());
    let contact = contacts
        .find(&id, &input.user_id)
        .await?
        .ok_or_else(|| ActionError::not_found(format!("Contact {} not found", input.contact_id)))?;
    let old_stage = contact.deal_stage;

    contacts.set_deal_stage(&id, &input.user_id, new_stage).await?;

    log_activity(
        activities,
        policy,
        NewActivity {
            user_id: input.user_id,
            contact_id: id,
            activity_type: "stage_changed".to_string(),
            title: format!("Stage: {} → {}", old_stage.as_str(), new_stage.as_str()),
            description: format!(
                "{} moved from {} to {} via MCP",
                contact.full_name(),
                old_stage.as_str(),
                new_stage.as_str()
            ),
            details: None,
        },
    )
    .await?;

    Ok(UpdateDealStageResponse {
        updated: true,
        contact_id: input.contact_id,
        old_stage,
        new_stage,
    })
}
