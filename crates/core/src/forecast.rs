//! Stage-weighted revenue forecast.

use std::cmp::Ordering;

use serde::Serialize;

use crate::domain::contact::{Contact, DealStage};

/// How many deals the forecast reports individually.
pub const TOP_DEALS: usize = 10;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForecastDeal {
    pub name: String,
    pub company: Option<String>,
    pub stage: DealStage,
    pub value: f64,
    pub probability: f64,
    pub weighted_value: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Forecast {
    pub total_pipeline: f64,
    pub weighted_forecast: f64,
    pub deal_count: usize,
    pub top_deals: Vec<ForecastDeal>,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Weight every open deal by its stage's close probability. Contacts without
/// a positive deal value carry no forecastable revenue and are skipped.
pub fn build_forecast(contacts: &[Contact]) -> Forecast {
    let mut total_pipeline = 0.0;
    let mut total_weighted = 0.0;
    let mut deals = Vec::new();

    for contact in contacts.iter().filter(|c| c.deal_value > 0.0) {
        let probability = contact.deal_stage.close_probability();
        let weighted = contact.deal_value * probability;
        total_pipeline += contact.deal_value;
        total_weighted += weighted;

        deals.push(ForecastDeal {
            name: contact.full_name(),
            company: contact.company.clone(),
            stage: contact.deal_stage,
            value: contact.deal_value,
            probability,
            weighted_value: round2(weighted),
        });
    }

    // Stable sort keeps insertion order for equal weighted values.
    deals.sort_by(|a, b| {
        b.weighted_value.partial_cmp(&a.weighted_value).unwrap_or(Ordering::Equal)
    });

    let deal_count = deals.len();
    deals.truncate(TOP_DEALS);

    Forecast {
        total_pipeline,
        weighted_forecast: round2(total_weighted),
        deal_count,
        top_deals: deals,
    }
}
