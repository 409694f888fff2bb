//! Contact CRUD actions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use quotahit_core::config::ActivityLogPolicy;
use quotahit_core::domain::activity::{Activity, NewActivity};
use quotahit_core::domain::contact::{
    Contact, ContactId, ContactPatch, ContactSort, DealStage, NewContact,
};
use quotahit_db::{ActivityRepository, ContactListQuery, ContactRepository};

use super::{log_activity, require_user_id};
use crate::{ActionError, ActionResult};

/// Hard cap on a single contact page.
pub const MAX_PAGE_SIZE: u32 = 100;
const DEFAULT_PAGE_SIZE: u32 = 25;
/// How many recent activities ride along with a contact detail.
const RECENT_ACTIVITY_LIMIT: u32 = 10;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListContactsInput {
    /// Substring matched against first name, last name, email, or company
    #[serde(default)]
    pub search: Option<String>,
    /// Filter by deal stage (lead, contacted, qualified, proposal, negotiation, won, lost)
    #[serde(default)]
    pub stage: Option<String>,
    /// Sort field: created_at (default), lead_score, deal_value, last_contacted
    #[serde(default)]
    pub sort_by: Option<String>,
    /// Max results (default 25, capped at 100)
    #[serde(default = "default_page_size")]
    pub limit: u32,
    /// Pagination offset
    #[serde(default)]
    pub offset: u32,
    /// Required — the owning user's ID
    #[serde(default)]
    pub user_id: String,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// Projected listing row with human-facing labels.
#[derive(Debug, Serialize)]
pub struct ContactSummary {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub stage: DealStage,
    pub score: i64,
    pub deal_value: f64,
    pub source: String,
    pub last_contacted: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<Contact> for ContactSummary {
    fn from(contact: Contact) -> Self {
        ContactSummary {
            id: contact.id.0.clone(),
            name: contact.full_name(),
            email: contact.email,
            company: contact.company,
            title: contact.title,
            stage: contact.deal_stage,
            score: contact.lead_score,
            deal_value: contact.deal_value,
            source: contact.source,
            last_contacted: contact.last_contacted_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContactListResponse {
    pub count: usize,
    pub contacts: Vec<ContactSummary>,
}

pub async fn list_contacts(
    contacts: &dyn ContactRepository,
    input: ListContactsInput,
) -> ActionResult<ContactListResponse> {
    require_user_id(&input.user_id)?;

    let stage = input
        .stage
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<DealStage>())
        .transpose()
        .map_err(|e| ActionError::invalid(e.to_string()))?;
    let sort = input
        .sort_by
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<ContactSort>())
        .transpose()
        .map_err(|e| ActionError::invalid(e.to_string()))?
        .unwrap_or_default();

    let query = ContactListQuery {
        user_id: input.user_id,
        search: input.search.filter(|s| !s.is_empty()),
        stage,
        sort,
        limit: input.limit.min(MAX_PAGE_SIZE),
        offset: input.offset,
    };

    let rows = contacts.list(&query).await?;
    Ok(ContactListResponse {
        count: rows.len(),
        contacts: rows.into_iter().map(ContactSummary::from).collect(),
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetContactInput {
    /// The contact's ID
    pub contact_id: String,
    /// The owning user's ID
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct ContactDetailResponse {
    pub contact: Contact,
    pub activities: Vec<Activity>,
}

pub async fn get_contact(
    contacts: &dyn ContactRepository,
    activities: &dyn ActivityRepository,
    input: GetContactInput,
) -> ActionResult<ContactDetailResponse> {
    require_user_id(&input.user_id)?;
    let id = ContactId(input.contact_id.clone());

    let contact = contacts
        .find(&id, &input.user_id)
        .await?
        .ok_or_else(|| ActionError::not_found(format!("Contact {} not found", input.contact_id)))?;
    let recent =
        activities.recent_for_contact(&id, &input.user_id, RECENT_ACTIVITY_LIMIT).await?;

    Ok(ContactDetailResponse { contact, activities: recent })
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateContactInput {
    /// Contact's first name (required)
    pub first_name: String,
    /// The owning user's ID (required)
    #[serde(default)]
    pub user_id: String,
    /// Contact's last name
    #[serde(default)]
    pub last_name: String,
    /// Email address
    #[serde(default)]
    pub email: Option<String>,
    /// Phone number
    #[serde(default)]
    pub phone: Option<String>,
    /// Company name
    #[serde(default)]
    pub company: Option<String>,
    /// Job title
    #[serde(default)]
    pub title: Option<String>,
    /// Lead source (manual, import, linkedin, website, referral, cold, inbound, mcp)
    #[serde(default)]
    pub source: Option<String>,
    /// Initial stage (defaults to lead)
    #[serde(default)]
    pub deal_stage: Option<String>,
    /// Estimated deal value in USD
    #[serde(default)]
    pub deal_value: f64,
    /// Initial notes
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Serialize)]
pub struct CreateContactResponse {
    pub created: bool,
    pub contact: Contact,
}

pub async fn create_contact(
    contacts: &dyn ContactRepository,
    activities: &dyn ActivityRepository,
    policy: ActivityLogPolicy,
    input: CreateContactInput,
) -> ActionResult<CreateContactResponse> {
    require_user_id(&input.user_id)?;
    if input.first_name.trim().is_empty() {
        return Err(ActionError::invalid("first_name is required"));
    }
    if input.deal_value < 0.0 {
        return Err(ActionError::invalid("deal_value must be >= 0"));
    }
    let deal_stage = match input.deal_stage.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => raw.parse().map_err(|e: quotahit_core::DomainError| {
            ActionError::invalid(e.to_string())
        })?,
        None => DealStage::Lead,
    };
    let source =
        input.source.filter(|s| !s.is_empty()).unwrap_or_else(|| "mcp".to_string());

    let contact = contacts
        .insert(NewContact {
            user_id: input.user_id.clone(),
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone: input.phone,
            company: input.company,
            title: input.title,
            source,
            deal_stage,
            deal_value: input.deal_value,
            notes: input.notes,
        })
        .await?;

    log_activity(
        activities,
        policy,
        NewActivity {
            user_id: input.user_id,
            contact_id: contact.id.clone(),
            activity_type: "contact_created".to_string(),
            title: "Contact created via MCP".to_string(),
            description: format!("Created {} from {}", contact.full_name(), contact.source),
            details: None,
        },
    )
    .await?;

    Ok(CreateContactResponse { created: true, contact })
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateContactInput {
    /// The contact's ID
    pub contact_id: String,
    /// The owning user's ID
    #[serde(default)]
    pub user_id: String,
    /// JSON object of fields to update, e.g. '{"deal_stage": "qualified", "deal_value": 5000}'
    #[serde(default = "default_patch")]
    pub updates: String,
}

fn default_patch() -> String {
    "{}".to_string()
}

#[derive(Debug, Serialize)]
pub struct UpdateContactResponse {
    pub updated: bool,
    pub contact: Contact,
}

pub async fn update_contact(
    contacts: &dyn ContactRepository,
    input: UpdateContactInput,
) -> ActionResult<UpdateContactResponse> {
    require_user_id(&input.user_id)?;

    // Parse and validate before any store access. Unknown keys, including
    // id and user_id, fall outside the patch allow-list and are dropped.
    let patch: ContactPatch = serde_json::from_str(&input.updates)
        .map_err(|_| ActionError::invalid("updates must be a valid JSON object of contact fields"))?;
    if let Some(value) = patch.deal_value {
        if value < 0.0 {
            return Err(ActionError::invalid("deal_value must be >= 0"));
        }
    }
    if let Some(score) = patch.lead_score {
        if !(0..=100).contains(&score) {
            return Err(ActionError::invalid("lead_score must be between 0 and 100"));
        }
    }

    let id = ContactId(input.contact_id.clone());
    let contact = contacts.apply_patch(&id, &input.user_id, &patch).await?.ok_or_else(|| {
        ActionError::not_found(format!("Contact {} not found or update failed", input.contact_id))
    })?;

    Ok(UpdateContactResponse { updated: true, contact })
}
