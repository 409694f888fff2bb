//! QuotaHit MCP (Model Context Protocol) server.
//!
//! Exposes the sales pipeline to AI agents: 15 tools for contacts, lead
//! intelligence, campaigns, analytics and sequences, plus 6 reasoning
//! prompts. One long-lived process over stdio, request/response only.
//!
//! Failures travel on two channels. Expected, user-facing failures (missing
//! user id, malformed patch, row not found, invalid enum value) come back as
//! an error-tagged tool result. Infrastructure failures (store unreachable,
//! decode error) propagate as protocol-level errors and are never retried.

pub mod actions;
mod server;

pub use server::QuotaHitServer;

use thiserror::Error;

use quotahit_db::RepositoryError;

/// Failure of a single action invocation.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Bad input, rejected before touching the store.
    #[error("{0}")]
    Invalid(String),
    /// The scoped lookup matched no row.
    #[error("{0}")]
    NotFound(String),
    /// Store-level failure, surfaced to the caller as fatal.
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),
}

impl ActionError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ActionError::Invalid(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ActionError::NotFound(message.into())
    }

    /// Expected failures are reported in-band to the agent; everything else
    /// escalates to a protocol error.
    pub fn is_expected(&self) -> bool {
        matches!(self, ActionError::Invalid(_) | ActionError::NotFound(_))
    }
}

pub type ActionResult<T> = Result<T, ActionError>;
