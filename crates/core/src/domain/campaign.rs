use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CampaignId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignType {
    Outbound,
    Inbound,
    Nurture,
    Reactivation,
}

impl CampaignType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignType::Outbound => "outbound",
            CampaignType::Inbound => "inbound",
            CampaignType::Nurture => "nurture",
            CampaignType::Reactivation => "reactivation",
        }
    }
}

impl FromStr for CampaignType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "outbound" => Ok(CampaignType::Outbound),
            "inbound" => Ok(CampaignType::Inbound),
            "nurture" => Ok(CampaignType::Nurture),
            "reactivation" => Ok(CampaignType::Reactivation),
            other => Err(DomainError::InvalidCampaignType(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    #[default]
    Draft,
    Active,
    Paused,
    Completed,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Active => "active",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Completed => "completed",
        }
    }

    pub fn parse_lenient(s: &str) -> CampaignStatus {
        match s {
            "active" => CampaignStatus::Active,
            "paused" => CampaignStatus::Paused,
            "completed" => CampaignStatus::Completed,
            _ => CampaignStatus::Draft,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub user_id: String,
    pub name: String,
    pub campaign_type: CampaignType,
    pub status: CampaignStatus,
    pub description: String,
    pub total_contacts: i64,
    pub completed_contacts: i64,
    pub started_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewCampaign {
    pub user_id: String,
    pub name: String,
    pub campaign_type: CampaignType,
    pub description: String,
}
