use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactId(pub String);

/// Pipeline position of a contact. Persisted as the lowercase string form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealStage {
    Lead,
    Contacted,
    Qualified,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

impl DealStage {
    pub const ALL: [DealStage; 7] = [
        DealStage::Lead,
        DealStage::Contacted,
        DealStage::Qualified,
        DealStage::Proposal,
        DealStage::Negotiation,
        DealStage::Won,
        DealStage::Lost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DealStage::Lead => "lead",
            DealStage::Contacted => "contacted",
            DealStage::Qualified => "qualified",
            DealStage::Proposal => "proposal",
            DealStage::Negotiation => "negotiation",
            DealStage::Won => "won",
            DealStage::Lost => "lost",
        }
    }

    /// Historical close probability used by the revenue forecast.
    pub fn close_probability(&self) -> f64 {
        match self {
            DealStage::Lead => 0.05,
            DealStage::Contacted => 0.10,
            DealStage::Qualified => 0.30,
            DealStage::Proposal => 0.60,
            DealStage::Negotiation => 0.80,
            DealStage::Won => 1.00,
            DealStage::Lost => 0.00,
        }
    }

    /// Lead-score bonus for pipeline progress. Closed stages score zero.
    pub fn score_bonus(&self) -> i64 {
        match self {
            DealStage::Lead => 0,
            DealStage::Contacted => 3,
            DealStage::Qualified => 8,
            DealStage::Proposal => 12,
            DealStage::Negotiation => 15,
            DealStage::Won | DealStage::Lost => 0,
        }
    }

    /// Decode a stored stage, falling back to `Lead` for values written
    /// before the stage enum was constrained.
    pub fn parse_lenient(s: &str) -> DealStage {
        s.parse().unwrap_or(DealStage::Lead)
    }
}

impl FromStr for DealStage {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lead" => Ok(DealStage::Lead),
            "contacted" => Ok(DealStage::Contacted),
            "qualified" => Ok(DealStage::Qualified),
            "proposal" => Ok(DealStage::Proposal),
            "negotiation" => Ok(DealStage::Negotiation),
            "won" => Ok(DealStage::Won),
            "lost" => Ok(DealStage::Lost),
            other => Err(DomainError::InvalidDealStage(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentStatus {
    #[default]
    None,
    Enriching,
    Enriched,
    Failed,
}

impl EnrichmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichmentStatus::None => "none",
            EnrichmentStatus::Enriching => "enriching",
            EnrichmentStatus::Enriched => "enriched",
            EnrichmentStatus::Failed => "failed",
        }
    }

    pub fn parse_lenient(s: &str) -> EnrichmentStatus {
        match s {
            "enriching" => EnrichmentStatus::Enriching,
            "enriched" => EnrichmentStatus::Enriched,
            "failed" => EnrichmentStatus::Failed,
            _ => EnrichmentStatus::None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    /// Lead provenance. Free-form, with known values rewarded by scoring.
    pub source: String,
    pub deal_stage: DealStage,
    pub deal_value: f64,
    pub lead_score: i64,
    pub enrichment_status: EnrichmentStatus,
    pub do_not_call: bool,
    pub do_not_email: bool,
    pub notes: String,
    /// Free-form key/value bag; qualification sub-results live here.
    pub custom_fields: serde_json::Map<String, serde_json::Value>,
    pub last_contacted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Fields accepted when creating a contact. Defaults are applied by the
/// action layer (source "mcp", stage lead, value 0).
#[derive(Clone, Debug)]
pub struct NewContact {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub source: String,
    pub deal_stage: DealStage,
    pub deal_value: f64,
    pub notes: String,
}

/// Allow-list of mutable contact fields for partial updates.
///
/// Identity and ownership (`id`, `user_id`) are not representable here, so a
/// patch can never retarget a row; unknown keys in the incoming JSON are
/// ignored during deserialization.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ContactPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub source: Option<String>,
    pub deal_stage: Option<DealStage>,
    pub deal_value: Option<f64>,
    pub lead_score: Option<i64>,
    pub enrichment_status: Option<EnrichmentStatus>,
    pub do_not_call: Option<bool>,
    pub do_not_email: Option<bool>,
    pub notes: Option<String>,
    pub custom_fields: Option<serde_json::Map<String, serde_json::Value>>,
    pub last_contacted_at: Option<DateTime<Utc>>,
}

impl ContactPatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.company.is_none()
            && self.title.is_none()
            && self.source.is_none()
            && self.deal_stage.is_none()
            && self.deal_value.is_none()
            && self.lead_score.is_none()
            && self.enrichment_status.is_none()
            && self.do_not_call.is_none()
            && self.do_not_email.is_none()
            && self.notes.is_none()
            && self.custom_fields.is_none()
            && self.last_contacted_at.is_none()
    }
}

/// Sortable columns for contact listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContactSort {
    #[default]
    CreatedAt,
    LeadScore,
    DealValue,
    LastContacted,
}

impl ContactSort {
    pub fn column(&self) -> &'static str {
        match self {
            ContactSort::CreatedAt => "created_at",
            ContactSort::LeadScore => "lead_score",
            ContactSort::DealValue => "deal_value",
            ContactSort::LastContacted => "last_contacted_at",
        }
    }
}

impl FromStr for ContactSort {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(ContactSort::CreatedAt),
            "lead_score" => Ok(ContactSort::LeadScore),
            "deal_value" => Ok(ContactSort::DealValue),
            "last_contacted" | "last_contacted_at" => Ok(ContactSort::LastContacted),
            other => Err(DomainError::InvalidSortField(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ContactPatch, ContactSort, DealStage, EnrichmentStatus};

    #[test]
    fn stage_round_trips_through_str() {
        for stage in DealStage::ALL {
            assert_eq!(stage.as_str().parse::<DealStage>().expect("parse"), stage);
        }
    }

    #[test]
    fn unknown_stage_is_rejected() {
        assert!("closed-won".parse::<DealStage>().is_err());
    }

    #[test]
    fn lenient_stage_parse_falls_back_to_lead() {
        assert_eq!(DealStage::parse_lenient("garbage"), DealStage::Lead);
        assert_eq!(DealStage::parse_lenient("won"), DealStage::Won);
    }

    #[test]
    fn enrichment_status_lenient_parse() {
        assert_eq!(EnrichmentStatus::parse_lenient("enriched"), EnrichmentStatus::Enriched);
        assert_eq!(EnrichmentStatus::parse_lenient(""), EnrichmentStatus::None);
    }

    #[test]
    fn patch_ignores_identity_and_unknown_keys() {
        let patch: ContactPatch = serde_json::from_str(
            r#"{"id": "evil", "user_id": "evil", "nonsense": 1, "deal_value": 5000.0}"#,
        )
        .expect("deserialize");
        assert_eq!(patch.deal_value, Some(5000.0));
        assert!(patch.first_name.is_none());
    }

    #[test]
    fn empty_patch_is_detected() {
        let patch: ContactPatch = serde_json::from_str("{}").expect("deserialize");
        assert!(patch.is_empty());
    }

    #[test]
    fn sort_field_parsing() {
        assert_eq!("lead_score".parse::<ContactSort>().expect("parse"), ContactSort::LeadScore);
        assert_eq!(
            "last_contacted".parse::<ContactSort>().expect("parse").column(),
            "last_contacted_at"
        );
        assert!("email; DROP TABLE contacts".parse::<ContactSort>().is_err());
    }
}
