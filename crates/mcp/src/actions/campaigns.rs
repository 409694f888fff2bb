//! Campaign actions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use quotahit_core::domain::campaign::{Campaign, CampaignId, CampaignStatus, NewCampaign};
use quotahit_db::CampaignRepository;

use super::require_user_id;
use crate::{ActionError, ActionResult};

const DEFAULT_CAMPAIGN_LIMIT: u32 = 20;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListCampaignsInput {
    /// The owning user's ID
    #[serde(default)]
    pub user_id: String,
    /// Max results (default 20)
    #[serde(default = "default_campaign_limit")]
    pub limit: u32,
}

fn default_campaign_limit() -> u32 {
    DEFAULT_CAMPAIGN_LIMIT
}

#[derive(Debug, Serialize)]
pub struct CampaignSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub campaign_type: &'static str,
    pub status: CampaignStatus,
    pub total_contacts: i64,
    pub completed: i64,
    pub created: chrono::DateTime<chrono::Utc>,
}

impl From<Campaign> for CampaignSummary {
    fn from(campaign: Campaign) -> Self {
        CampaignSummary {
            id: campaign.id.0,
            name: campaign.name,
            campaign_type: campaign.campaign_type.as_str(),
            status: campaign.status,
            total_contacts: campaign.total_contacts,
            completed: campaign.completed_contacts,
            created: campaign.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CampaignListResponse {
    pub count: usize,
    pub campaigns: Vec<CampaignSummary>,
}

pub async fn list_campaigns(
    campaigns: &dyn CampaignRepository,
    input: ListCampaignsInput,
) -> ActionResult<CampaignListResponse> {
    require_user_id(&input.user_id)?;
    let rows = campaigns.list(&input.user_id, input.limit).await?;
    Ok(CampaignListResponse {
        count: rows.len(),
        campaigns: rows.into_iter().map(CampaignSummary::from).collect(),
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateCampaignInput {
    /// Campaign name (required)
    pub name: String,
    /// The owning user's ID
    #[serde(default)]
    pub user_id: String,
    /// Type: outbound (default), inbound, nurture, reactivation
    #[serde(default)]
    pub campaign_type: Option<String>,
    /// Campaign description
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct CreateCampaignResponse {
    pub created: bool,
    pub campaign: Campaign,
}

pub async fn create_campaign(
    campaigns: &dyn CampaignRepository,
    input: CreateCampaignInput,
) -> ActionResult<CreateCampaignResponse> {
    require_user_id(&input.user_id)?;
    if input.name.trim().is_empty() {
        return Err(ActionError::invalid("name is required"));
    }
    let campaign_type = input
        .campaign_type
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or("outbound")
        .parse()
        .map_err(|e: quotahit_core::DomainError| ActionError::invalid(e.to_string()))?;

    let campaign = campaigns
        .insert(NewCampaign {
            user_id: input.user_id,
            name: input.name,
            campaign_type,
            description: input.description,
        })
        .await?;

    Ok(CreateCampaignResponse { created: true, campaign })
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExecuteCampaignInput {
    /// The campaign's ID
    pub campaign_id: String,
    /// The owning user's ID
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct ExecuteCampaignResponse {
    pub started: bool,
    pub campaign: Campaign,
    pub note: &'static str,
}

/// Flip the campaign to active. Re-running against an already active
/// campaign restamps the start time rather than failing.
pub async fn execute_campaign(
    campaigns: &dyn CampaignRepository,
    input: ExecuteCampaignInput,
) -> ActionResult<ExecuteCampaignResponse> {
    require_user_id(&input.user_id)?;
    let id = CampaignId(input.campaign_id.clone());

    let campaign = campaigns.activate(&id, &input.user_id).await?.ok_or_else(|| {
        ActionError::not_found(format!("Campaign {} not found", input.campaign_id))
    })?;

    Ok(ExecuteCampaignResponse {
        started: true,
        campaign,
        note: "Campaign is now active. Contacts will be processed automatically.",
    })
}

#[cfg(test)]
mod tests {
    use super::super::testing;
    use super::*;

    fn create_input(user_id: &str, name: &str) -> CreateCampaignInput {
        CreateCampaignInput {
            name: name.to_string(),
            user_id: user_id.to_string(),
            campaign_type: None,
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn create_defaults_to_outbound_draft() {
        let pool = testing::pool().await;
        let campaigns = testing::campaigns(&pool);

        let response =
            create_campaign(&campaigns, create_input("u1", "Q3 push")).await.expect("create");
        assert!(response.created);
        assert_eq!(response.campaign.campaign_type.as_str(), "outbound");
        assert_eq!(response.campaign.status, CampaignStatus::Draft);
        assert!(response.campaign.started_at.is_none());
    }

    #[tokio::test]
    async fn create_rejects_blank_name_and_unknown_type() {
        let pool = testing::pool().await;
        let campaigns = testing::campaigns(&pool);

        let err = create_campaign(&campaigns, create_input("u1", "  "))
            .await
            .expect_err("should fail");
        assert!(matches!(err, ActionError::Invalid(_)));

        let mut input = create_input("u1", "Q3 push");
        input.campaign_type = Some("viral".to_string());
        let err = create_campaign(&campaigns, input).await.expect_err("should fail");
        assert!(matches!(err, ActionError::Invalid(_)));
    }

    #[tokio::test]
    async fn list_is_scoped_and_limited() {
        let pool = testing::pool().await;
        let campaigns = testing::campaigns(&pool);

        for i in 0..3 {
            create_campaign(&campaigns, create_input("u1", &format!("c{i}")))
                .await
                .expect("create");
        }
        create_campaign(&campaigns, create_input("u2", "other")).await.expect("create");

        let response = list_campaigns(
            &campaigns,
            ListCampaignsInput { user_id: "u1".to_string(), limit: 2 },
        )
        .await
        .expect("list");
        assert_eq!(response.count, 2);
        assert!(response.campaigns.iter().all(|c| c.campaign_type == "outbound"));
    }

    #[tokio::test]
    async fn execute_activates_and_stamps_start() {
        let pool = testing::pool().await;
        let campaigns = testing::campaigns(&pool);

        let created =
            create_campaign(&campaigns, create_input("u1", "Q3 push")).await.expect("create");
        let response = execute_campaign(
            &campaigns,
            ExecuteCampaignInput {
                campaign_id: created.campaign.id.0.clone(),
                user_id: "u1".to_string(),
            },
        )
        .await
        .expect("execute");
        assert!(response.started);
        assert_eq!(response.campaign.status, CampaignStatus::Active);
        assert!(response.campaign.started_at.is_some());
    }

    #[tokio::test]
    async fn execute_missing_campaign_is_not_found() {
        let pool = testing::pool().await;
        let campaigns = testing::campaigns(&pool);

        let err = execute_campaign(
            &campaigns,
            ExecuteCampaignInput { campaign_id: "nope".to_string(), user_id: "u1".to_string() },
        )
        .await
        .expect_err("should fail");
        assert!(matches!(err, ActionError::NotFound(_)));
    }
}
