//! # Conversation Repository
//!
//! Inbox conversations. `campaign_id` is whatever campaign the inbox tagged
//! the conversation with; it is stored as-is, even when that campaign has
//! not been imported.

use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;

use whisper_core::{Conversation, ConversationStatus, ReportingPeriod};

use super::{decode_timestamp, encode_timestamp};
use crate::error::DbResult;

#[derive(Debug, FromRow)]
struct ConversationRecordRow {
    id: String,
    campaign_id: String,
    started_at: String,
    customer_phone: String,
    status: ConversationStatus,
}

impl ConversationRecordRow {
    fn into_conversation(self) -> DbResult<Conversation> {
        let started_at = decode_timestamp("conversation", &self.id, "started_at", &self.started_at)?;

        Ok(Conversation {
            id: self.id,
            campaign_id: self.campaign_id,
            started_at,
            customer_phone: self.customer_phone,
            status: self.status,
        })
    }
}

fn into_conversations(rows: Vec<ConversationRecordRow>) -> DbResult<Vec<Conversation>> {
    rows.into_iter()
        .map(ConversationRecordRow::into_conversation)
        .collect()
}

pub(crate) async fn fetch_all(conn: &mut SqliteConnection) -> DbResult<Vec<Conversation>> {
    let rows: Vec<ConversationRecordRow> = sqlx::query_as(
        r#"
        SELECT id, campaign_id, started_at, customer_phone, status
        FROM conversations
        ORDER BY started_at, id
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    into_conversations(rows)
}

/// Conversations a period report needs.
///
/// That is every conversation started inside `window`, plus, however old,
/// any conversation an order created inside `order_period` links to
/// directly and every conversation of a campaign such an order names as its
/// UTM hint. Neither of those two tiers is bounded by the window.
pub(crate) async fn fetch_for_period(
    conn: &mut SqliteConnection,
    window: &ReportingPeriod,
    order_period: &ReportingPeriod,
) -> DbResult<Vec<Conversation>> {
    let rows: Vec<ConversationRecordRow> = sqlx::query_as(
        r#"
        SELECT id, campaign_id, started_at, customer_phone, status
        FROM conversations
        WHERE started_at BETWEEN ?1 AND ?2
           OR id IN (
               SELECT conversation_id
               FROM orders
               WHERE conversation_id IS NOT NULL
                 AND created_at BETWEEN ?3 AND ?4
           )
           OR campaign_id IN (
               SELECT utm_campaign_id
               FROM orders
               WHERE utm_campaign_id IS NOT NULL
                 AND created_at BETWEEN ?3 AND ?4
           )
        ORDER BY started_at, id
        "#,
    )
    .bind(encode_timestamp(window.from))
    .bind(encode_timestamp(window.to))
    .bind(encode_timestamp(order_period.from))
    .bind(encode_timestamp(order_period.to))
    .fetch_all(&mut *conn)
    .await?;

    into_conversations(rows)
}

pub(crate) async fn upsert_conversation(
    conn: &mut SqliteConnection,
    conversation: &Conversation,
) -> DbResult<()> {
    debug!(id = %conversation.id, campaign_id = %conversation.campaign_id, "Upserting conversation");

    sqlx::query(
        r#"
        INSERT INTO conversations (id, campaign_id, started_at, customer_phone, status)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT (id) DO UPDATE SET
            campaign_id = excluded.campaign_id,
            started_at = excluded.started_at,
            customer_phone = excluded.customer_phone,
            status = excluded.status
        "#,
    )
    .bind(&conversation.id)
    .bind(&conversation.campaign_id)
    .bind(encode_timestamp(conversation.started_at))
    .bind(&conversation.customer_phone)
    .bind(conversation.status)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Repository for conversation database operations.
#[derive(Debug, Clone)]
pub struct ConversationRepository {
    pool: SqlitePool,
}

impl ConversationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ConversationRepository { pool }
    }

    /// Inserts a conversation or replaces the stored one with the same id.
    ///
    /// The inbox moves conversations from Abierta to Pedido Completo, so
    /// re-importing is expected.
    pub async fn upsert(&self, conversation: &Conversation) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        upsert_conversation(&mut conn, conversation).await
    }

    /// All conversations, oldest first.
    pub async fn list(&self) -> DbResult<Vec<Conversation>> {
        let mut conn = self.pool.acquire().await?;
        fetch_all(&mut conn).await
    }

    /// Conversations started inside `period` (inclusive), oldest first.
    pub async fn list_started_between(&self, period: &ReportingPeriod) -> DbResult<Vec<Conversation>> {
        let rows: Vec<ConversationRecordRow> = sqlx::query_as(
            r#"
            SELECT id, campaign_id, started_at, customer_phone, status
            FROM conversations
            WHERE started_at BETWEEN ?1 AND ?2
            ORDER BY started_at, id
            "#,
        )
        .bind(encode_timestamp(period.from))
        .bind(encode_timestamp(period.to))
        .fetch_all(&self.pool)
        .await?;

        into_conversations(rows)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM conversations")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, day, hour, 0, 0).unwrap()
    }

    fn conversation(id: &str, started_at: DateTime<Utc>) -> Conversation {
        Conversation {
            id: id.to_string(),
            campaign_id: "C1".to_string(),
            started_at,
            customer_phone: "+57 300 111 2233".to_string(),
            status: ConversationStatus::Open,
        }
    }

    #[tokio::test]
    async fn test_upsert_moves_status_forward() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.conversations();

        repo.upsert(&conversation("conv-A", at(1, 10))).await.unwrap();
        let mut completed = conversation("conv-A", at(1, 10));
        completed.status = ConversationStatus::OrderCompleted;
        repo.upsert(&completed).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all, vec![completed]);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_is_chronological() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.conversations();

        repo.upsert(&conversation("late", at(9, 0))).await.unwrap();
        repo.upsert(&conversation("early", at(2, 0))).await.unwrap();
        repo.upsert(&conversation("b-same", at(5, 0))).await.unwrap();
        repo.upsert(&conversation("a-same", at(5, 0))).await.unwrap();

        let ids: Vec<String> = repo.list().await.unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["early", "a-same", "b-same", "late"]);
    }

    #[tokio::test]
    async fn test_started_between_is_inclusive() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.conversations();

        repo.upsert(&conversation("before", at(1, 0) - chrono::Duration::milliseconds(1)))
            .await
            .unwrap();
        repo.upsert(&conversation("first", at(1, 0))).await.unwrap();
        repo.upsert(&conversation("last", at(31, 0))).await.unwrap();
        repo.upsert(&conversation("after", at(31, 1))).await.unwrap();

        let period = ReportingPeriod::new(at(1, 0), at(31, 0)).unwrap();
        let ids: Vec<String> = repo
            .list_started_between(&period)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["first", "last"]);
    }

    #[tokio::test]
    async fn test_fetch_for_period_includes_linked_conversations() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.conversations();

        repo.upsert(&conversation("old-linked", Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()))
            .await
            .unwrap();
        repo.upsert(&conversation("old-unlinked", Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap()))
            .await
            .unwrap();
        repo.upsert(&conversation("recent", at(10, 0))).await.unwrap();

        sqlx::query(
            "INSERT INTO orders (id, conversation_id, customer_phone, created_at, shipping_cost_cents, currency)
             VALUES ('O1', 'old-linked', '', '2025-10-12T00:00:00.000000000Z', 0, 'COP')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let period = ReportingPeriod::new(at(1, 0), at(31, 0)).unwrap();
        let window = period.widened(chrono::Duration::days(14));

        let mut conn = db.pool().acquire().await.unwrap();
        let ids: Vec<String> = fetch_for_period(&mut conn, &window, &period)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["old-linked", "recent"]);
    }
}
