use std::sync::Arc;

use axum::Router;
use thiserror::Error;
use tracing::info;

use airdesk_agent::guardrails::GuardrailPolicy;
use airdesk_agent::llm::{LlmError, OpenAiCompatibleClient};
use airdesk_agent::routing::{IntentClassifier, LlmClassifier, RuleClassifier};
use airdesk_agent::tools::ToolRegistry;
use airdesk_agent::AgentRuntime;
use airdesk_core::agents::{AgentGraph, AgentKind};
use airdesk_core::config::{AppConfig, RoutingStrategy};
use airdesk_db::{
    connect_with_settings, migrations, DbPool, SqlBookingRepository, SqlConversationRepository,
};

use crate::chat::{self, ChatState};
use crate::health;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub chat: ChatState,
}

impl Application {
    pub fn router(&self) -> Router {
        chat::router(self.chat.clone()).merge(health::router(self.db_pool.clone()))
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("llm classifier setup failed: {0}")]
    Llm(#[from] LlmError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let graph = AgentGraph::airline_support(&config.llm.model);
    let classifier = classifier(&config, &graph)?;
    let tools = ToolRegistry::airline(Arc::new(SqlBookingRepository::new(db_pool.clone())));
    let tool_names = tools.specs().iter().map(|spec| spec.name).collect::<Vec<_>>().join(",");
    info!(
        event_name = "system.bootstrap.tools",
        correlation_id = "bootstrap",
        tools = %tool_names,
        "tool registry ready"
    );
    let runtime = AgentRuntime::new(
        graph,
        tools,
        classifier,
        GuardrailPolicy::new(config.routing.max_handoffs as usize),
    );
    let conversations = Arc::new(SqlConversationRepository::new(db_pool.clone()));

    Ok(Application { config, db_pool, chat: ChatState::new(Arc::new(runtime), conversations) })
}

fn classifier(
    config: &AppConfig,
    graph: &AgentGraph,
) -> Result<Arc<dyn IntentClassifier>, BootstrapError> {
    match config.routing.strategy {
        RoutingStrategy::Rules => {
            info!(event_name = "system.bootstrap.routing", strategy = "rules", "rule routing");
            Ok(Arc::new(RuleClassifier::new()))
        }
        RoutingStrategy::Llm => {
            let client = OpenAiCompatibleClient::from_config(&config.llm)?;
            let instructions = graph
                .agent(AgentKind::Triage)
                .map(|triage| triage.instructions.clone())
                .unwrap_or_default();
            info!(
                event_name = "system.bootstrap.routing",
                strategy = "llm",
                model = %config.llm.model,
                "llm routing with rule fallback"
            );
            Ok(Arc::new(LlmClassifier::new(Arc::new(client), instructions)))
        }
    }
}
