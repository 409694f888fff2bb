//! Prompt templates handed to the calling agent's LLM.
//!
//! Pure string construction. Each template frames a role and the shape of the
//! expected answer; parsing or validating that answer is the caller's job.

/// BANT+ qualification briefing for a single lead.
pub fn qualify_lead(contact_name: &str, company: &str, title: &str, notes: &str) -> String {
    format!(
        r#"You are QuotaHit's AI Qualifier. Qualify this lead using BANT+ framework.

Lead: {contact_name}
Company: {company}
Title: {title}
Notes: {notes}

Score each dimension 0-100:
- **Budget**: Can they afford the solution? Do they have purchasing power?
- **Authority**: Are they a decision maker or influencer?
- **Need**: How strong is their pain point? Is it urgent?
- **Timeline**: When do they plan to buy? Is there a deadline?
- **Competition**: Are they evaluating alternatives? How far along?

Return a JSON object:
{{
  "budget": <0-100>,
  "authority": <0-100>,
  "need": <0-100>,
  "timeline": <0-100>,
  "competition": <0-100>,
  "outcome": "qualified" | "nurture" | "disqualified",
  "reasoning": "<1-2 sentences>",
  "next_action": "<recommended next step>"
}}"#
    )
}

pub fn handle_objection(objection: &str, context: &str) -> String {
    format!(
        r#"You are QuotaHit's AI Sales Coach. Help handle this objection.

Objection: "{objection}"
Context: {context}

Provide:
1. **Acknowledge** — Show you understand their concern
2. **Reframe** — Shift perspective without being pushy
3. **Evidence** — Share a relevant data point or case study
4. **Next Step** — Suggest a concrete next action

Keep it conversational, not scripted. Max 150 words."#
    )
}

pub fn write_outreach(contact_name: &str, company: &str, channel: &str, context: &str) -> String {
    format!(
        r#"You are QuotaHit's AI Outreach Agent. Write a personalized {channel} message.

To: {contact_name} at {company}
Channel: {channel}
Context: {context}

Guidelines:
- First line must be personalized (not "I hope this finds you well")
- Reference something specific about their company or role
- Clear value proposition in 1 sentence
- One specific CTA (not "let me know if you're interested")
- If email: subject line + body (under 150 words)
- If LinkedIn: connection request + follow-up (under 300 chars each)
- If WhatsApp: casual, direct, under 100 words"#
    )
}

pub fn summarize_deal(contact_data: &str) -> String {
    format!(
        r#"You are QuotaHit's AI Deal Analyst. Summarize this deal for a quick rep briefing.

Contact/Deal Data:
{contact_data}

Provide a 5-line briefing:
1. **Who**: Contact name, role, company (1 line)
2. **Status**: Current stage, score, last activity
3. **Opportunity**: Deal value, timeline, key need
4. **Risk**: Main objection or blocker
5. **Next Step**: Recommended immediate action"#
    )
}

pub fn score_conversation(transcript: &str) -> String {
    format!(
        r#"You are QuotaHit's AI Call Analyst. Score this sales conversation.

Transcript:
{transcript}

Score each dimension 1-10:
- **Discovery**: Did they ask good questions? Understand the prospect's needs?
- **Value Prop**: Did they articulate clear value? Connect features to pain points?
- **Objection Handling**: Did they handle pushback effectively?
- **Closing**: Did they move toward a next step? Was the CTA clear?
- **Rapport**: Was the tone appropriate? Did they build trust?

Return:
{{
  "scores": {{"discovery": X, "value_prop": X, "objection_handling": X, "closing": X, "rapport": X}},
  "overall": <average>,
  "top_strength": "<what they did best>",
  "top_improvement": "<biggest area to improve>",
  "coaching_tip": "<1 specific, actionable tip>"
}}"#
    )
}

pub fn suggest_next_action(contact_data: &str, recent_activities: &str) -> String {
    format!(
        r#"You are QuotaHit's AI Orchestrator. Given this contact's data and recent activities, suggest the single best next action.

Contact:
{contact_data}

Recent Activities:
{recent_activities}

Consider:
- Current pipeline stage and score
- Time since last contact
- Deal value and timeline urgency
- Available channels (email, call, WhatsApp, LinkedIn)

Return:
{{
  "action": "<specific action>",
  "channel": "<email|call|whatsapp|linkedin>",
  "urgency": "high" | "medium" | "low",
  "reasoning": "<why this action, why now>",
  "draft": "<draft message or talking points if applicable>"
}}"#
    )
}

#[cfg(test)]
mod tests {
    #[test]
    fn qualify_lead_interpolates_all_fields() {
        let prompt = super::qualify_lead("Ada Lovelace", "Acme", "CTO", "met at conf");
        assert!(prompt.contains("Lead: Ada Lovelace"));
        assert!(prompt.contains("Company: Acme"));
        assert!(prompt.contains("Title: CTO"));
        assert!(prompt.contains("Notes: met at conf"));
        assert!(prompt.contains(r#""outcome": "qualified" | "nurture" | "disqualified""#));
    }

    #[test]
    fn handle_objection_quotes_the_objection() {
        let prompt = super::handle_objection("too expensive", "mid-market SaaS");
        assert!(prompt.contains(r#"Objection: "too expensive""#));
        assert!(prompt.contains("Context: mid-market SaaS"));
    }

    #[test]
    fn write_outreach_mentions_channel_twice() {
        let prompt = super::write_outreach("Ada", "Acme", "linkedin", "");
        assert_eq!(prompt.matches("linkedin").count(), 2);
    }

    #[test]
    fn summarize_deal_embeds_data_block() {
        let prompt = super::summarize_deal("stage=proposal value=9000");
        assert!(prompt.contains("stage=proposal value=9000"));
        assert!(prompt.contains("5-line briefing"));
    }

    #[test]
    fn score_conversation_keeps_json_schema_braces() {
        let prompt = super::score_conversation("hello");
        assert!(prompt.contains(r#"{"discovery": X"#));
    }

    #[test]
    fn suggest_next_action_embeds_activities() {
        let prompt = super::suggest_next_action("Ada, qualified, $5k", "called yesterday");
        assert!(prompt.contains("called yesterday"));
        assert!(prompt.contains(r#""urgency": "high" | "medium" | "low""#));
    }
}
