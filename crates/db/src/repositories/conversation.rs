use chrono::{DateTime, Utc};
use sqlx::Row;

use airdesk_core::agents::AgentKind;
use airdesk_core::domain::conversation::{
    BookingDraft, ConversationTurn, Role, Session, SessionId,
};

use super::{ConversationRepository, RepositoryError};
use crate::DbPool;

pub struct SqlConversationRepository {
    pool: DbPool,
}

impl SqlConversationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc)).unwrap_or_else(|_| Utc::now())
}

fn row_to_session(row: &sqlx::sqlite::SqliteRow) -> Result<Session, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let active_agent_str: String =
        row.try_get("active_agent").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let draft_json: Option<String> =
        row.try_get("draft_json").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at_str: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let updated_at_str: String =
        row.try_get("updated_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let active_agent = AgentKind::parse(&active_agent_str).ok_or_else(|| {
        RepositoryError::Decode(format!("unknown active agent `{active_agent_str}`"))
    })?;
    let draft = draft_json
        .map(|raw| serde_json::from_str::<BookingDraft>(&raw))
        .transpose()
        .map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(Session {
        id: SessionId(id),
        active_agent,
        draft,
        created_at: parse_timestamp(&created_at_str),
        updated_at: parse_timestamp(&updated_at_str),
    })
}

fn row_to_turn(row: &sqlx::sqlite::SqliteRow) -> Result<ConversationTurn, RepositoryError> {
    let role_str: String =
        row.try_get("role").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let content: String =
        row.try_get("content").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at_str: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let role = Role::parse(&role_str)
        .ok_or_else(|| RepositoryError::Decode(format!("unknown role `{role_str}`")))?;

    Ok(ConversationTurn { role, content, created_at: parse_timestamp(&created_at_str) })
}

#[async_trait::async_trait]
impl ConversationRepository for SqlConversationRepository {
    async fn find_session(&self, id: &SessionId) -> Result<Option<Session>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, active_agent, draft_json, created_at, updated_at
             FROM conversation_session WHERE id = ?",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_session(r)?)),
            None => Ok(None),
        }
    }

    async fn save_session(&self, session: Session) -> Result<(), RepositoryError> {
        let draft_json = session
            .draft
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| RepositoryError::Decode(e.to_string()))?;

        sqlx::query(
            "INSERT INTO conversation_session (id, active_agent, draft_json, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 active_agent = excluded.active_agent,
                 draft_json = excluded.draft_json,
                 updated_at = excluded.updated_at",
        )
        .bind(session.id.as_str())
        .bind(session.active_agent.as_str())
        .bind(&draft_json)
        .bind(session.created_at.to_rfc3339())
        .bind(session.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn append_turn(
        &self,
        id: &SessionId,
        turn: ConversationTurn,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO conversation_turn (session_id, turn_number, role, content, created_at)
             VALUES (?,
                     (SELECT COALESCE(MAX(turn_number), 0) + 1
                      FROM conversation_turn WHERE session_id = ?),
                     ?, ?, ?)",
        )
        .bind(id.as_str())
        .bind(id.as_str())
        .bind(turn.role.as_str())
        .bind(&turn.content)
        .bind(turn.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn history(&self, id: &SessionId) -> Result<Vec<ConversationTurn>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> = sqlx::query(
            "SELECT role, content, created_at FROM conversation_turn
             WHERE session_id = ? ORDER BY turn_number ASC",
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_turn).collect::<Result<Vec<_>, _>>()
    }
}
