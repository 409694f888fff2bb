//! End-to-end action flows over a real in-memory database, plus the server
//! handshake surface.

use rmcp::ServerHandler;

use quotahit_core::config::ActivityLogPolicy;
use quotahit_db::{
    connect_with_settings, migrations, DbPool, SqlActivityRepository, SqlContactRepository,
};
use quotahit_mcp::actions::{analytics, contacts, leads, sequences};
use quotahit_mcp::QuotaHitServer;

async fn pool() -> DbPool {
    let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
    migrations::run_pending(&pool).await.expect("migrations");
    pool
}

fn create_input(user_id: &str, first: &str) -> contacts::CreateContactInput {
    contacts::CreateContactInput {
        first_name: first.to_string(),
        user_id: user_id.to_string(),
        last_name: "Lovelace".to_string(),
        email: Some("ada@analytical.dev".to_string()),
        phone: None,
        company: Some("Analytical Engines".to_string()),
        title: Some("Principal Engineer".to_string()),
        source: Some("referral".to_string()),
        deal_stage: None,
        deal_value: 12_000.0,
        notes: String::new(),
    }
}

#[tokio::test]
async fn lead_flows_from_creation_to_forecast() {
    let pool = pool().await;
    let contact_repo = SqlContactRepository::new(pool.clone());
    let activity_repo = SqlActivityRepository::new(pool);

    let created = contacts::create_contact(
        &contact_repo,
        &activity_repo,
        ActivityLogPolicy::BestEffort,
        create_input("u1", "Ada"),
    )
    .await
    .expect("create contact");

    // Scoring sees the creation activity already logged.
    let scored = leads::score_lead(
        &contact_repo,
        &activity_repo,
        ActivityLogPolicy::BestEffort,
        leads::ContactRefInput {
            contact_id: created.contact.id.0.clone(),
            user_id: "u1".to_string(),
        },
    )
    .await
    .expect("score lead");
    // email+phone-less referral: 15 completeness + 15 deal + 4 engagement + 10 source
    assert_eq!(scored.breakdown.completeness, 15);
    assert_eq!(scored.breakdown.deal_signals, 15);
    assert_eq!(scored.breakdown.engagement, 4);
    assert_eq!(scored.score, 44);

    let moved = sequences::update_deal_stage(
        &contact_repo,
        &activity_repo,
        ActivityLogPolicy::BestEffort,
        sequences::UpdateDealStageInput {
            contact_id: created.contact.id.0.clone(),
            user_id: "u1".to_string(),
            new_stage: "proposal".to_string(),
        },
    )
    .await
    .expect("move stage");
    assert_eq!(moved.old_stage.as_str(), "lead");
    assert_eq!(moved.new_stage.as_str(), "proposal");

    // All three mutations left an activity trail on the detail view.
    let detail = contacts::get_contact(
        &contact_repo,
        &activity_repo,
        contacts::GetContactInput {
            contact_id: created.contact.id.0.clone(),
            user_id: "u1".to_string(),
        },
    )
    .await
    .expect("get contact");
    assert_eq!(detail.activities.len(), 3);

    let forecast = analytics::get_forecast(
        &contact_repo,
        analytics::UserInput { user_id: "u1".to_string() },
    )
    .await
    .expect("forecast");
    assert_eq!(forecast.deal_count, 1);
    assert_eq!(forecast.total_pipeline, 12_000.0);
    // Proposal closes at 60%.
    assert_eq!(forecast.weighted_forecast, 7_200.0);

    let pipeline = analytics::get_pipeline(
        &contact_repo,
        analytics::UserInput { user_id: "u1".to_string() },
    )
    .await
    .expect("pipeline");
    assert_eq!(pipeline.total_contacts, 1);
    assert_eq!(pipeline.by_stage["proposal"].count, 1);
}

#[tokio::test]
async fn server_advertises_tools_and_prompts() {
    let pool = pool().await;
    let server = QuotaHitServer::new(pool, ActivityLogPolicy::BestEffort);

    let info = server.get_info();
    assert!(info.capabilities.tools.is_some());
    assert!(info.capabilities.prompts.is_some());
    assert!(info.instructions.is_some());
}
