use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use airdesk_agent::AgentRuntime;
use airdesk_core::agents::AgentKind;
use airdesk_core::domain::conversation::{ConversationTurn, Session, SessionId};
use airdesk_core::errors::{ApplicationError, InterfaceError};
use airdesk_db::{ConversationRepository, RepositoryError};

pub const QUERY_REQUIRED: &str = "Query is required";
pub const SESSION_NOT_FOUND: &str = "session not found";

#[derive(Clone)]
pub struct ChatState {
    runtime: Arc<AgentRuntime>,
    conversations: Arc<dyn ConversationRepository>,
}

impl ChatState {
    pub fn new(runtime: Arc<AgentRuntime>, conversations: Arc<dyn ConversationRepository>) -> Self {
        Self { runtime, conversations }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub agent: String,
    pub response: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub turns: Vec<ConversationTurn>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

pub fn router(state: ChatState) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/chat/{session_id}/history", get(history))
        .with_state(state)
}

fn error_body(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorBody { error: message.into() }))
}

fn persistence(error: RepositoryError) -> ApplicationError {
    ApplicationError::Persistence(error.to_string())
}

fn interface_failure(error: InterfaceError) -> ApiError {
    let status = match &error {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };

    error!(
        event_name = "chat.request_failed",
        correlation_id = error.correlation_id(),
        status = status.as_u16(),
        error = %error,
        "chat request failed"
    );
    error_body(status, error.user_message())
}

pub async fn chat(
    State(state): State<ChatState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|rejection| error_body(StatusCode::BAD_REQUEST, rejection.body_text()))?;

    let message = request.message.trim();
    if message.is_empty() {
        return Err(error_body(StatusCode::BAD_REQUEST, QUERY_REQUIRED));
    }

    let correlation_id = Uuid::new_v4().to_string();
    let fail = |error: ApplicationError| interface_failure(error.into_interface(&correlation_id));

    let mut session = resolve_session(
        state.conversations.as_ref(),
        state.runtime.graph().initial_agent(),
        request.session_id.as_deref(),
    )
    .await
    .map_err(|error| fail(persistence(error)))?;
    let history =
        state.conversations.history(&session.id).await.map_err(|error| fail(persistence(error)))?;

    let outcome = state
        .runtime
        .handle_message(&mut session, &history, message)
        .await
        .map_err(|error| fail(ApplicationError::from(error)))?;

    // Turns are recorded in pairs so a failed turn leaves no unanswered message behind.
    state
        .conversations
        .append_turn(&session.id, ConversationTurn::user(message))
        .await
        .map_err(|error| fail(persistence(error)))?;
    state
        .conversations
        .append_turn(&session.id, ConversationTurn::assistant(outcome.reply.clone()))
        .await
        .map_err(|error| fail(persistence(error)))?;
    state
        .conversations
        .save_session(session.clone())
        .await
        .map_err(|error| fail(persistence(error)))?;

    info!(
        event_name = "chat.turn_completed",
        correlation_id = %correlation_id,
        session_id = %session.id,
        agent = outcome.agent.as_str(),
        handoffs = outcome.handoffs.len(),
        tool_calls = outcome.tool_calls.len(),
        "chat turn completed"
    );

    Ok(Json(ChatResponse {
        session_id: session.id.0,
        agent: outcome.agent.as_str().to_string(),
        response: outcome.reply,
    }))
}

/// Unknown or missing ids start a fresh session under a new id.
async fn resolve_session(
    conversations: &dyn ConversationRepository,
    initial_agent: AgentKind,
    requested: Option<&str>,
) -> Result<Session, RepositoryError> {
    if let Some(id) = requested.map(str::trim).filter(|id| !id.is_empty()) {
        if let Some(session) = conversations.find_session(&SessionId(id.to_string())).await? {
            return Ok(session);
        }
    }

    let session = Session::start(SessionId::generate(), initial_agent);
    conversations.save_session(session.clone()).await?;
    info!(event_name = "chat.session_started", session_id = %session.id, "new chat session");
    Ok(session)
}

pub async fn history(
    State(state): State<ChatState>,
    Path(session_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let id = SessionId(session_id);

    let found = state.conversations.find_session(&id).await.map_err(|error| {
        interface_failure(persistence(error).into_interface(correlation_id.as_str()))
    })?;
    if found.is_none() {
        return Err(error_body(StatusCode::NOT_FOUND, SESSION_NOT_FOUND));
    }

    let turns = state.conversations.history(&id).await.map_err(|error| {
        interface_failure(persistence(error).into_interface(correlation_id.as_str()))
    })?;

    Ok(Json(HistoryResponse { session_id: id.0, turns }))
}
