use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid deal stage '{0}' (valid: lead, contacted, qualified, proposal, negotiation, won, lost)")]
    InvalidDealStage(String),
    #[error("invalid campaign type '{0}' (valid: outbound, inbound, nurture, reactivation)")]
    InvalidCampaignType(String),
    #[error("invalid sort field '{0}' (valid: created_at, lead_score, deal_value, last_contacted)")]
    InvalidSortField(String),
}
