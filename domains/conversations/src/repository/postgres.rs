//! PostgreSQL conversation store
//!
//! One row per conversation; the message list is a JSONB array appended to
//! with `||` so each append is a single atomic row update.

use bahl_common::Result;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::ConversationStore;
use crate::domain::entities::{Conversation, ConversationId, ConversationSummary, Message};

#[derive(sqlx::FromRow)]
struct ConversationRow {
    id: Uuid,
    title: String,
    created_at: DateTime<Utc>,
    messages: Json<Vec<Message>>,
}

impl From<ConversationRow> for Conversation {
    fn from(row: ConversationRow) -> Self {
        Self {
            id: row.id.into(),
            title: row.title,
            created_at: row.created_at,
            messages: row.messages.0,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: Uuid,
    title: String,
}

#[derive(Clone)]
pub struct PgConversationStore {
    pool: PgPool,
}

impl PgConversationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and apply pending migrations
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Get a reference to the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close all pooled connections
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait::async_trait]
impl ConversationStore for PgConversationStore {
    async fn create(&self) -> Result<Conversation> {
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM conversations")
            .fetch_one(&self.pool)
            .await?;

        let conversation = Conversation::new(Conversation::default_title(existing.max(0) as u64));

        let created = sqlx::query_as::<_, ConversationRow>(
            r#"
            INSERT INTO conversations (id, title, created_at, messages)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, created_at, messages
            "#,
        )
        .bind(conversation.id.as_uuid())
        .bind(&conversation.title)
        .bind(conversation.created_at)
        .bind(Json(&conversation.messages))
        .fetch_one(&self.pool)
        .await?;

        Ok(created.into())
    }

    async fn list(&self) -> Result<Vec<ConversationSummary>> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT id, title
            FROM conversations
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ConversationSummary {
                id: row.id.into(),
                title: row.title,
            })
            .collect())
    }

    async fn find(&self, id: ConversationId) -> Result<Option<Conversation>> {
        let row = sqlx::query_as::<_, ConversationRow>(
            r#"
            SELECT id, title, created_at, messages
            FROM conversations
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn rename(&self, id: ConversationId, title: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE conversations SET title = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(title)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: ConversationId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM conversations WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn append_message(&self, id: ConversationId, message: &Message) -> Result<bool> {
        let result =
            sqlx::query("UPDATE conversations SET messages = messages || $2 WHERE id = $1")
                .bind(id.as_uuid())
                .bind(Json([message]))
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
