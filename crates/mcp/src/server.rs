//! MCP server surface: 15 tools and 6 prompts over stdio.

use std::future::Future;
use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, GetPromptRequestParam, GetPromptResult, Implementation,
        JsonObject, ListPromptsResult, PaginatedRequestParam, Prompt, PromptArgument,
        PromptMessage, PromptMessageContent, PromptMessageRole, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_handler, tool_router, transport::stdio, ErrorData as McpError, RoleServer,
    ServerHandler, ServiceExt,
};
use serde::Serialize;
use tracing::debug;

use quotahit_core::config::ActivityLogPolicy;
use quotahit_core::prompts;
use quotahit_db::{
    ActivityRepository, CampaignRepository, ContactRepository, DbPool, SequenceRepository,
    SqlActivityRepository, SqlCampaignRepository, SqlContactRepository, SqlSequenceRepository,
};

use crate::actions::{analytics, campaigns, contacts, leads, sequences};
use crate::ActionResult;

#[derive(Clone)]
pub struct QuotaHitServer {
    contacts: Arc<dyn ContactRepository>,
    activities: Arc<dyn ActivityRepository>,
    campaigns: Arc<dyn CampaignRepository>,
    sequences: Arc<dyn SequenceRepository>,
    activity_log: ActivityLogPolicy,
    tool_router: ToolRouter<Self>,
}

/// Map an action outcome onto the protocol. Expected failures become
/// error-tagged tool results the agent can read and react to; store
/// failures escalate to protocol errors.
fn respond<T: Serialize>(result: ActionResult<T>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(value) => {
            let body = serde_json::to_string_pretty(&value)
                .map_err(|e| McpError::internal_error(format!("serialize response: {e}"), None))?;
            Ok(CallToolResult::success(vec![Content::text(body)]))
        }
        Err(err) if err.is_expected() => {
            Ok(CallToolResult::error(vec![Content::text(err.to_string())]))
        }
        Err(err) => Err(McpError::internal_error(err.to_string(), None)),
    }
}

#[tool_router]
impl QuotaHitServer {
    pub fn new(pool: DbPool, activity_log: ActivityLogPolicy) -> Self {
        Self {
            contacts: Arc::new(SqlContactRepository::new(pool.clone())),
            activities: Arc::new(SqlActivityRepository::new(pool.clone())),
            campaigns: Arc::new(SqlCampaignRepository::new(pool.clone())),
            sequences: Arc::new(SqlSequenceRepository::new(pool)),
            activity_log,
            tool_router: Self::tool_router(),
        }
    }

    pub async fn run_stdio(self) -> anyhow::Result<()> {
        let service = self.serve(stdio()).await?;
        service.waiting().await?;
        Ok(())
    }

    #[tool(description = "Search and list contacts with filters for stage, text search, and sorting")]
    async fn list_contacts(
        &self,
        Parameters(input): Parameters<contacts::ListContactsInput>,
    ) -> Result<CallToolResult, McpError> {
        debug!(tool = "list_contacts", "handling");
        respond(contacts::list_contacts(self.contacts.as_ref(), input).await)
    }

    #[tool(description = "Get full details for a single contact, including recent activities")]
    async fn get_contact(
        &self,
        Parameters(input): Parameters<contacts::GetContactInput>,
    ) -> Result<CallToolResult, McpError> {
        debug!(tool = "get_contact", "handling");
        respond(
            contacts::get_contact(self.contacts.as_ref(), self.activities.as_ref(), input).await,
        )
    }

    #[tool(description = "Create a new contact in the CRM")]
    async fn create_contact(
        &self,
        Parameters(input): Parameters<contacts::CreateContactInput>,
    ) -> Result<CallToolResult, McpError> {
        debug!(tool = "create_contact", "handling");
        respond(
            contacts::create_contact(
                self.contacts.as_ref(),
                self.activities.as_ref(),
                self.activity_log,
                input,
            )
            .await,
        )
    }

    #[tool(description = "Update contact fields from a JSON object of changes")]
    async fn update_contact(
        &self,
        Parameters(input): Parameters<contacts::UpdateContactInput>,
    ) -> Result<CallToolResult, McpError> {
        debug!(tool = "update_contact", "handling");
        respond(contacts::update_contact(self.contacts.as_ref(), input).await)
    }

    #[tool(description = "Trigger AI enrichment for a contact; results arrive asynchronously")]
    async fn enrich_lead(
        &self,
        Parameters(input): Parameters<leads::ContactRefInput>,
    ) -> Result<CallToolResult, McpError> {
        debug!(tool = "enrich_lead", "handling");
        respond(leads::enrich_lead(self.contacts.as_ref(), input).await)
    }

    #[tool(description = "Calculate and persist the 0-100 lead score for a contact")]
    async fn score_lead(
        &self,
        Parameters(input): Parameters<leads::ContactRefInput>,
    ) -> Result<CallToolResult, McpError> {
        debug!(tool = "score_lead", "handling");
        respond(
            leads::score_lead(
                self.contacts.as_ref(),
                self.activities.as_ref(),
                self.activity_log,
                input,
            )
            .await,
        )
    }

    #[tool(description = "Get BANT+ qualification status for a contact")]
    async fn qualify_lead(
        &self,
        Parameters(input): Parameters<leads::ContactRefInput>,
    ) -> Result<CallToolResult, McpError> {
        debug!(tool = "qualify_lead", "handling");
        respond(leads::qualify_lead(self.contacts.as_ref(), input).await)
    }

    #[tool(description = "List calling/outreach campaigns")]
    async fn list_campaigns(
        &self,
        Parameters(input): Parameters<campaigns::ListCampaignsInput>,
    ) -> Result<CallToolResult, McpError> {
        debug!(tool = "list_campaigns", "handling");
        respond(campaigns::list_campaigns(self.campaigns.as_ref(), input).await)
    }

    #[tool(description = "Create a new calling/outreach campaign in draft status")]
    async fn create_campaign(
        &self,
        Parameters(input): Parameters<campaigns::CreateCampaignInput>,
    ) -> Result<CallToolResult, McpError> {
        debug!(tool = "create_campaign", "handling");
        respond(campaigns::create_campaign(self.campaigns.as_ref(), input).await)
    }

    #[tool(description = "Start executing a campaign (changes status to active)")]
    async fn execute_campaign(
        &self,
        Parameters(input): Parameters<campaigns::ExecuteCampaignInput>,
    ) -> Result<CallToolResult, McpError> {
        debug!(tool = "execute_campaign", "handling");
        respond(campaigns::execute_campaign(self.campaigns.as_ref(), input).await)
    }

    #[tool(description = "Get current pipeline status: contacts by stage with total values")]
    async fn get_pipeline(
        &self,
        Parameters(input): Parameters<analytics::UserInput>,
    ) -> Result<CallToolResult, McpError> {
        debug!(tool = "get_pipeline", "handling");
        respond(analytics::get_pipeline(self.contacts.as_ref(), input).await)
    }

    #[tool(description = "Get full dashboard analytics: KPIs, conversion rates, score distribution")]
    async fn get_analytics(
        &self,
        Parameters(input): Parameters<analytics::UserInput>,
    ) -> Result<CallToolResult, McpError> {
        debug!(tool = "get_analytics", "handling");
        respond(analytics::get_analytics(self.contacts.as_ref(), input).await)
    }

    #[tool(description = "Get a probability-weighted revenue forecast over open deals")]
    async fn get_forecast(
        &self,
        Parameters(input): Parameters<analytics::UserInput>,
    ) -> Result<CallToolResult, McpError> {
        debug!(tool = "get_forecast", "handling");
        respond(analytics::get_forecast(self.contacts.as_ref(), input).await)
    }

    #[tool(description = "List follow-up sequences and their status")]
    async fn list_sequences(
        &self,
        Parameters(input): Parameters<sequences::ListSequencesInput>,
    ) -> Result<CallToolResult, McpError> {
        debug!(tool = "list_sequences", "handling");
        respond(sequences::list_sequences(self.sequences.as_ref(), input).await)
    }

    #[tool(description = "Move a deal to a new pipeline stage")]
    async fn update_deal_stage(
        &self,
        Parameters(input): Parameters<sequences::UpdateDealStageInput>,
    ) -> Result<CallToolResult, McpError> {
        debug!(tool = "update_deal_stage", "handling");
        respond(
            sequences::update_deal_stage(
                self.contacts.as_ref(),
                self.activities.as_ref(),
                self.activity_log,
                input,
            )
            .await,
        )
    }
}

fn prompt_argument(name: &str, description: &str, required: bool) -> PromptArgument {
    PromptArgument {
        name: name.to_string(),
        title: None,
        description: Some(description.to_string()),
        required: Some(required),
    }
}

fn required_arg(arguments: &Option<JsonObject>, name: &str) -> Result<String, McpError> {
    arguments
        .as_ref()
        .and_then(|map| map.get(name))
        .and_then(|value| value.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            McpError::invalid_params(format!("missing required argument '{name}'"), None)
        })
}

fn optional_arg(arguments: &Option<JsonObject>, name: &str, default: &str) -> String {
    arguments
        .as_ref()
        .and_then(|map| map.get(name))
        .and_then(|value| value.as_str())
        .unwrap_or(default)
        .to_string()
}

fn prompt_result(description: &str, text: String) -> GetPromptResult {
    GetPromptResult {
        description: Some(description.to_string()),
        messages: vec![PromptMessage {
            role: PromptMessageRole::User,
            content: PromptMessageContent::text(text),
        }],
    }
}

#[tool_handler]
impl ServerHandler for QuotaHitServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "quotahit-mcp".to_string(),
                ..Default::default()
            },
            instructions: Some(
                "QuotaHit sales pipeline server. Tools cover contacts, lead scoring and \
                 enrichment, campaigns, analytics and follow-up sequences. Every tool takes \
                 a user_id and only ever sees that user's rows. Prompts provide reasoning \
                 templates for qualification, objections, outreach, and deal review."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().enable_prompts().build(),
            ..Default::default()
        }
    }

    fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListPromptsResult, McpError>> + Send + '_ {
        async move {
            Ok(ListPromptsResult {
                prompts: vec![
                    Prompt {
                        name: "qualify_lead_prompt".to_string(),
                        title: None,
                        description: Some(
                            "BANT+ qualification prompt for AI-driven lead qualification"
                                .to_string(),
                        ),
                        arguments: Some(vec![
                            prompt_argument("contact_name", "Lead's full name", true),
                            prompt_argument("company", "Lead's company", true),
                            prompt_argument("title", "Lead's job title", false),
                            prompt_argument("notes", "Notes on the lead so far", false),
                        ]),
                        icons: None,
                    },
                    Prompt {
                        name: "handle_objection_prompt".to_string(),
                        title: None,
                        description: Some(
                            "Sales objection handling with proven frameworks".to_string(),
                        ),
                        arguments: Some(vec![
                            prompt_argument("objection", "The objection raised", true),
                            prompt_argument("context", "Deal context", false),
                        ]),
                        icons: None,
                    },
                    Prompt {
                        name: "write_outreach_prompt".to_string(),
                        title: None,
                        description: Some("Generate personalized outreach message".to_string()),
                        arguments: Some(vec![
                            prompt_argument("contact_name", "Recipient's name", true),
                            prompt_argument("company", "Recipient's company", true),
                            prompt_argument(
                                "channel",
                                "Channel: email (default), sms, or linkedin",
                                false,
                            ),
                            prompt_argument("context", "Anything known about the recipient", false),
                        ]),
                        icons: None,
                    },
                    Prompt {
                        name: "summarize_deal_prompt".to_string(),
                        title: None,
                        description: Some(
                            "Summarize deal status and suggest next steps".to_string(),
                        ),
                        arguments: Some(vec![prompt_argument(
                            "contact_data",
                            "Contact and deal data as JSON",
                            true,
                        )]),
                        icons: None,
                    },
                    Prompt {
                        name: "score_conversation_prompt".to_string(),
                        title: None,
                        description: Some(
                            "Score a sales call transcript for quality and outcomes".to_string(),
                        ),
                        arguments: Some(vec![prompt_argument(
                            "transcript",
                            "The call transcript",
                            true,
                        )]),
                        icons: None,
                    },
                    Prompt {
                        name: "suggest_next_action_prompt".to_string(),
                        title: None,
                        description: Some(
                            "Suggest the single best next action for a contact".to_string(),
                        ),
                        arguments: Some(vec![
                            prompt_argument("contact_data", "Contact and deal data as JSON", true),
                            prompt_argument(
                                "recent_activities",
                                "Recent activity log entries",
                                false,
                            ),
                        ]),
                        icons: None,
                    },
                ],
                next_cursor: None,
            })
        }
    }

    fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<GetPromptResult, McpError>> + Send + '_ {
        async move {
            let args = &request.arguments;
            match request.name.as_str() {
                "qualify_lead_prompt" => {
                    let contact_name = required_arg(args, "contact_name")?;
                    let company = required_arg(args, "company")?;
                    let title = optional_arg(args, "title", "");
                    let notes = optional_arg(args, "notes", "");
                    Ok(prompt_result(
                        "BANT+ qualification prompt for AI-driven lead qualification",
                        prompts::qualify_lead(&contact_name, &company, &title, &notes),
                    ))
                }
                "handle_objection_prompt" => {
                    let objection = required_arg(args, "objection")?;
                    let context = optional_arg(args, "context", "");
                    Ok(prompt_result(
                        "Sales objection handling with proven frameworks",
                        prompts::handle_objection(&objection, &context),
                    ))
                }
                "write_outreach_prompt" => {
                    let contact_name = required_arg(args, "contact_name")?;
                    let company = required_arg(args, "company")?;
                    let channel = optional_arg(args, "channel", "email");
                    let context = optional_arg(args, "context", "");
                    Ok(prompt_result(
                        "Generate personalized outreach message",
                        prompts::write_outreach(&contact_name, &company, &channel, &context),
                    ))
                }
                "summarize_deal_prompt" => {
                    let contact_data = required_arg(args, "contact_data")?;
                    Ok(prompt_result(
                        "Summarize deal status and suggest next steps",
                        prompts::summarize_deal(&contact_data),
                    ))
                }
                "score_conversation_prompt" => {
                    let transcript = required_arg(args, "transcript")?;
                    Ok(prompt_result(
                        "Score a sales call transcript for quality and outcomes",
                        prompts::score_conversation(&transcript),
                    ))
                }
                "suggest_next_action_prompt" => {
                    let contact_data = required_arg(args, "contact_data")?;
                    let recent_activities = optional_arg(args, "recent_activities", "");
                    Ok(prompt_result(
                        "Suggest the single best next action for a contact",
                        prompts::suggest_next_action(&contact_data, &recent_activities),
                    ))
                }
                other => {
                    Err(McpError::invalid_params(format!("Unknown prompt: {other}"), None))
                }
            }
        }
    }
}
