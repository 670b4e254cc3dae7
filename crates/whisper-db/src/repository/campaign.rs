//! # Campaign Repository
//!
//! Campaign snapshots pulled from the ads platform. Re-importing a campaign
//! replaces its figures (spend grows during the month).

use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;

use whisper_core::{AccountType, Campaign, CampaignStatus, Money};

use super::{decode_timestamp, encode_timestamp};
use crate::error::DbResult;

const SELECT_CAMPAIGNS: &str = r#"
    SELECT
        id,
        name,
        account_type,
        daily_budget_cents,
        spend_total_cents,
        status,
        delivery_label,
        negatives_pct,
        last_updated
    FROM campaigns
"#;

/// Detal before Mayor, then by name.
const CAMPAIGN_ORDER: &str = "ORDER BY account_type, name, id";

#[derive(Debug, FromRow)]
struct CampaignRecordRow {
    id: String,
    name: String,
    account_type: AccountType,
    daily_budget_cents: i64,
    spend_total_cents: i64,
    status: CampaignStatus,
    delivery_label: CampaignStatus,
    negatives_pct: Option<f64>,
    last_updated: String,
}

impl CampaignRecordRow {
    fn into_campaign(self) -> DbResult<Campaign> {
        let last_updated = decode_timestamp("campaign", &self.id, "last_updated", &self.last_updated)?;

        Ok(Campaign {
            id: self.id,
            name: self.name,
            account_type: self.account_type,
            daily_budget: Money::from_cents(self.daily_budget_cents),
            spend_total: Money::from_cents(self.spend_total_cents),
            status: self.status,
            delivery_label: self.delivery_label,
            negatives_pct: self.negatives_pct,
            last_updated,
        })
    }
}

pub(crate) async fn fetch_all(conn: &mut SqliteConnection) -> DbResult<Vec<Campaign>> {
    let sql = format!("{SELECT_CAMPAIGNS} {CAMPAIGN_ORDER}");
    let rows: Vec<CampaignRecordRow> = sqlx::query_as(&sql).fetch_all(&mut *conn).await?;

    rows.into_iter().map(CampaignRecordRow::into_campaign).collect()
}

/// Inserts a campaign or replaces the stored one with the same id.
pub(crate) async fn upsert_campaign(conn: &mut SqliteConnection, campaign: &Campaign) -> DbResult<()> {
    debug!(id = %campaign.id, spend = %campaign.spend_total, "Upserting campaign");

    sqlx::query(
        r#"
        INSERT INTO campaigns (
            id, name, account_type,
            daily_budget_cents, spend_total_cents,
            status, delivery_label, negatives_pct, last_updated
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT (id) DO UPDATE SET
            name = excluded.name,
            account_type = excluded.account_type,
            daily_budget_cents = excluded.daily_budget_cents,
            spend_total_cents = excluded.spend_total_cents,
            status = excluded.status,
            delivery_label = excluded.delivery_label,
            negatives_pct = excluded.negatives_pct,
            last_updated = excluded.last_updated
        "#,
    )
    .bind(&campaign.id)
    .bind(&campaign.name)
    .bind(campaign.account_type)
    .bind(campaign.daily_budget.cents())
    .bind(campaign.spend_total.cents())
    .bind(campaign.status)
    .bind(campaign.delivery_label)
    .bind(campaign.negatives_pct)
    .bind(encode_timestamp(campaign.last_updated))
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Repository for campaign database operations.
#[derive(Debug, Clone)]
pub struct CampaignRepository {
    pool: SqlitePool,
}

impl CampaignRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CampaignRepository { pool }
    }

    /// Inserts a campaign or replaces the stored one with the same id.
    pub async fn upsert(&self, campaign: &Campaign) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        upsert_campaign(&mut conn, campaign).await
    }

    /// All campaigns, Detal first, then by name.
    pub async fn list(&self) -> DbResult<Vec<Campaign>> {
        let mut conn = self.pool.acquire().await?;
        fetch_all(&mut conn).await
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Campaign>> {
        let sql = format!("{SELECT_CAMPAIGNS} WHERE id = ?1");
        let row: Option<CampaignRecordRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(CampaignRecordRow::into_campaign).transpose()
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM campaigns")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
