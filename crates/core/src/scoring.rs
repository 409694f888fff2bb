//! Deterministic lead scoring.
//!
//! Components are summed, each independently capped, and the final score is
//! clamped to [0, 100]:
//!
//! - completeness: +5 for each of email/phone/company/title (max 20)
//! - enrichment:   +15 once enrichment has completed
//! - deal signals: +10 for any open value, +5 more above $10,000 (max 15)
//! - engagement:   +4 per logged activity, capped at 20
//! - stage bonus:  0/3/8/12/15 across the open pipeline stages
//! - source bonus: referral 10 down to cold 1, unknown sources 0
//! - penalty:      -20 when both do-not-contact flags are set

use serde::Serialize;

use crate::domain::contact::{Contact, EnrichmentStatus};

/// Per-category contributions plus the clamped total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub completeness: i64,
    pub enrichment: i64,
    pub deal_signals: i64,
    pub engagement: i64,
    pub stage: i64,
    pub source: i64,
    pub dnc_penalty: i64,
    pub total: i64,
}

/// Score bonus for lead provenance. Unrecognized sources contribute nothing.
pub fn source_bonus(source: &str) -> i64 {
    match source {
        "referral" => 10,
        "inbound" => 8,
        "linkedin" => 6,
        "website" => 5,
        "import" => 3,
        "manual" => 2,
        "cold" => 1,
        "mcp" => 3,
        _ => 0,
    }
}

pub fn score_contact(contact: &Contact, activity_count: u64) -> ScoreBreakdown {
    let present = |field: &Option<String>| field.as_deref().is_some_and(|s| !s.is_empty());

    let completeness = [&contact.email, &contact.phone, &contact.company, &contact.title]
        .into_iter()
        .filter(|f| present(f))
        .count() as i64
        * 5;

    let enrichment = if contact.enrichment_status == EnrichmentStatus::Enriched { 15 } else { 0 };

    let mut deal_signals = 0;
    if contact.deal_value > 0.0 {
        deal_signals += 10;
        if contact.deal_value > 10_000.0 {
            deal_signals += 5;
        }
    }

    let engagement = (activity_count as i64 * 4).min(20);
    let stage = contact.deal_stage.score_bonus();
    let source = source_bonus(&contact.source);
    let dnc_penalty = if contact.do_not_call && contact.do_not_email { -20 } else { 0 };

    let total = (completeness + enrichment + deal_signals + engagement + stage + source
        + dnc_penalty)
        .clamp(0, 100);

    ScoreBreakdown {
        completeness,
        enrichment,
        deal_signals,
        engagement,
        stage,
        source,
        dnc_penalty,
        total,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::domain::contact::{Contact, ContactId, DealStage, EnrichmentStatus};

    use super::score_contact;

    fn bare_contact() -> Contact {
        let now = Utc::now();
        Contact {
            id: ContactId("c-1".to_string()),
            user_id: "u-1".to_string(),
            first_name: "Ada".to_string(),
            last_name: String::new(),
            email: None,
            phone: None,
            company: None,
            title: None,
            source: "cold".to_string(),
            deal_stage: DealStage::Lead,
            deal_value: 0.0,
            lead_score: 0,
            enrichment_status: EnrichmentStatus::None,
            do_not_call: false,
            do_not_email: false,
            notes: String::new(),
            custom_fields: serde_json::Map::new(),
            last_contacted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn rich_contact() -> Contact {
        let mut c = bare_contact();
        c.email = Some("ada@acme.io".to_string());
        c.phone = Some("+1555".to_string());
        c.company = Some("Acme".to_string());
        c.title = Some("CTO".to_string());
        c.enrichment_status = EnrichmentStatus::Enriched;
        c.deal_value = 15_000.0;
        c.deal_stage = DealStage::Qualified;
        c.source = "referral".to_string();
        c
    }

    #[test]
    fn fully_qualified_referral_scores_eighty() {
        // 20 + 15 + 15 + 12 + 8 + 10 = 80
        let breakdown = score_contact(&rich_contact(), 3);
        assert_eq!(breakdown.completeness, 20);
        assert_eq!(breakdown.enrichment, 15);
        assert_eq!(breakdown.deal_signals, 15);
        assert_eq!(breakdown.engagement, 12);
        assert_eq!(breakdown.stage, 8);
        assert_eq!(breakdown.source, 10);
        assert_eq!(breakdown.total, 80);
    }

    #[test]
    fn bare_cold_lead_scores_one() {
        let breakdown = score_contact(&bare_contact(), 0);
        assert_eq!(breakdown.total, 1); // cold source bonus only
    }

    #[test]
    fn empty_source_scores_zero() {
        let mut c = bare_contact();
        c.source = String::new();
        assert_eq!(score_contact(&c, 0).total, 0);
    }

    #[test]
    fn engagement_caps_at_twenty() {
        assert_eq!(score_contact(&bare_contact(), 5).engagement, 20);
        assert_eq!(score_contact(&bare_contact(), 500).engagement, 20);
        assert_eq!(score_contact(&bare_contact(), 3).engagement, 12);
    }

    #[test]
    fn small_deal_skips_large_deal_bonus() {
        let mut c = bare_contact();
        c.deal_value = 500.0;
        assert_eq!(score_contact(&c, 0).deal_signals, 10);
        c.deal_value = 10_000.0; // boundary: strictly greater required
        assert_eq!(score_contact(&c, 0).deal_signals, 10);
        c.deal_value = 10_000.01;
        assert_eq!(score_contact(&c, 0).deal_signals, 15);
    }

    #[test]
    fn dual_dnc_flags_subtract_twenty() {
        let mut c = rich_contact();
        let without = score_contact(&c, 3).total;
        c.do_not_call = true;
        c.do_not_email = true;
        assert_eq!(score_contact(&c, 3).total, without - 20);
    }

    #[test]
    fn single_dnc_flag_is_free() {
        let mut c = rich_contact();
        let without = score_contact(&c, 3).total;
        c.do_not_call = true;
        assert_eq!(score_contact(&c, 3).total, without);
    }

    #[test]
    fn penalty_floors_at_zero() {
        let mut c = bare_contact();
        c.source = String::new();
        c.do_not_call = true;
        c.do_not_email = true;
        assert_eq!(score_contact(&c, 0).total, 0);
    }

    #[test]
    fn score_never_leaves_range() {
        let mut c = rich_contact();
        c.deal_stage = DealStage::Negotiation;
        let breakdown = score_contact(&c, 100);
        // 20 + 15 + 15 + 20 + 15 + 10 = 95
        assert_eq!(breakdown.total, 95);
        assert!((0..=100).contains(&breakdown.total));
    }

    #[test]
    fn closed_stages_earn_no_stage_bonus() {
        let mut c = bare_contact();
        c.deal_stage = DealStage::Won;
        assert_eq!(score_contact(&c, 0).stage, 0);
        c.deal_stage = DealStage::Lost;
        assert_eq!(score_contact(&c, 0).stage, 0);
    }
}
