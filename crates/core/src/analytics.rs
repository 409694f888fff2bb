//! In-memory pipeline aggregation over a user's contacts.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::contact::{Contact, DealStage, EnrichmentStatus};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct StageSlice {
    pub count: u64,
    pub total_value: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PipelineSummary {
    pub total_contacts: u64,
    pub total_pipeline_value: f64,
    pub by_stage: BTreeMap<String, StageSlice>,
}

/// Group contacts by stage, summing count and deal value per stage.
pub fn pipeline_summary(contacts: &[Contact]) -> PipelineSummary {
    let mut by_stage: BTreeMap<String, StageSlice> = BTreeMap::new();
    for contact in contacts {
        let slice = by_stage.entry(contact.deal_stage.as_str().to_string()).or_default();
        slice.count += 1;
        slice.total_value += contact.deal_value;
    }

    PipelineSummary {
        total_contacts: contacts.len() as u64,
        total_pipeline_value: by_stage.values().map(|s| s.total_value).sum(),
        by_stage,
    }
}

/// Fixed five-bucket lead-score histogram, inclusive upper bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScoreDistribution {
    #[serde(rename = "0-20")]
    pub b0_20: u64,
    #[serde(rename = "21-40")]
    pub b21_40: u64,
    #[serde(rename = "41-60")]
    pub b41_60: u64,
    #[serde(rename = "61-80")]
    pub b61_80: u64,
    #[serde(rename = "81-100")]
    pub b81_100: u64,
}

impl ScoreDistribution {
    fn record(&mut self, score: i64) {
        match score {
            i64::MIN..=20 => self.b0_20 += 1,
            21..=40 => self.b21_40 += 1,
            41..=60 => self.b41_60 += 1,
            61..=80 => self.b61_80 += 1,
            _ => self.b81_100 += 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub total_contacts: u64,
    pub enriched: u64,
    pub enrichment_rate: f64,
    pub won_deals: u64,
    pub won_value: f64,
    pub win_rate: f64,
    pub avg_deal_value: f64,
    pub score_distribution: ScoreDistribution,
    pub by_source: BTreeMap<String, u64>,
    pub by_stage: BTreeMap<String, u64>,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Dashboard KPIs over all of a user's contacts. Returns `None` for an empty
/// book of business so callers can short-circuit before any rate division.
pub fn dashboard_metrics(contacts: &[Contact]) -> Option<DashboardMetrics> {
    if contacts.is_empty() {
        return None;
    }
    let total = contacts.len() as u64;

    let mut score_distribution = ScoreDistribution::default();
    let mut by_source: BTreeMap<String, u64> = BTreeMap::new();
    let mut by_stage: BTreeMap<String, u64> = BTreeMap::new();
    let mut won_deals = 0u64;
    let mut won_value = 0.0f64;
    let mut enriched = 0u64;

    for contact in contacts {
        score_distribution.record(contact.lead_score);

        let source =
            if contact.source.is_empty() { "unknown".to_string() } else { contact.source.clone() };
        *by_source.entry(source).or_default() += 1;
        *by_stage.entry(contact.deal_stage.as_str().to_string()).or_default() += 1;

        if contact.deal_stage == DealStage::Won {
            won_deals += 1;
            won_value += contact.deal_value;
        }
        if contact.enrichment_status == EnrichmentStatus::Enriched {
            enriched += 1;
        }
    }

    Some(DashboardMetrics {
        total_contacts: total,
        enriched,
        enrichment_rate: round1(enriched as f64 / total as f64 * 100.0),
        won_deals,
        won_value,
        win_rate: round1(won_deals as f64 / total as f64 * 100.0),
        avg_deal_value: if won_deals > 0 { round2(won_value / won_deals as f64) } else { 0.0 },
        score_distribution,
        by_source,
        by_stage,
    })
}
