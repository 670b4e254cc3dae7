//! # Snapshot Loading and Storing
//!
//! Reads the three reporting inputs inside one transaction, so an import
//! running at the same time can never produce a report that counts an
//! order but not its conversation. Imports write inside one transaction
//! too: a failed import leaves no trace.
//!
//! ## Period Loading
//! ```text
//!            window (period widened by the attribution window)
//!   ◄──────────────────────────────────────────────────────────────►
//!             period (orders, conversation counts)
//!          ◄──────────────────────────────────────────►
//!   ──────┼───────┼──────────────────────────────────┼───────┼──────► time
//!
//!   campaigns      all
//!   conversations  started in window, plus any linked by an in-period
//!                  order, plus every conversation of a campaign an
//!                  in-period order names as its UTM hint
//!   orders         created in period
//! ```
//!
//! Conversations outside the period are loaded only so phone matching near
//! the edges sees them; `Snapshot::aggregate` with the same period does not
//! count them.

use tracing::{debug, info};

use whisper_core::{AttributionConfig, ReportingPeriod, Snapshot};

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::order::OrderFilter;
use crate::repository::{campaign, conversation, order};

impl Database {
    /// Upserts every campaign, conversation and order of `snapshot` in one
    /// transaction. Orders replace stored orders with the same id, items
    /// included.
    ///
    /// Returns how many orders replaced a stored one. On error nothing is
    /// written.
    pub async fn write_snapshot(&self, snapshot: &Snapshot) -> DbResult<usize> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for item in &snapshot.campaigns {
            campaign::upsert_campaign(&mut *tx, item).await?;
        }
        for item in &snapshot.conversations {
            conversation::upsert_conversation(&mut *tx, item).await?;
        }
        let mut replaced = 0;
        for item in &snapshot.orders {
            if order::upsert_order(&mut *tx, item).await? {
                replaced += 1;
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            campaigns = snapshot.campaigns.len(),
            conversations = snapshot.conversations.len(),
            orders = snapshot.orders.len(),
            replaced_orders = replaced,
            "Snapshot stored"
        );
        Ok(replaced)
    }

    /// Loads a consistent snapshot, optionally restricted to `period`.
    ///
    /// `config` decides how far outside the period conversations are read.
    pub async fn snapshot(
        &self,
        period: Option<&ReportingPeriod>,
        config: &AttributionConfig,
    ) -> DbResult<Snapshot> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let campaigns = campaign::fetch_all(&mut *tx).await?;

        let (conversations, orders) = match period {
            Some(period) => {
                let window = period.widened(config.window);
                debug!(
                    from = %window.from,
                    to = %window.to,
                    "Loading conversations for widened window"
                );
                (
                    conversation::fetch_for_period(&mut *tx, &window, period).await?,
                    order::fetch_orders(&mut *tx, OrderFilter::CreatedBetween(period)).await?,
                )
            }
            None => (
                conversation::fetch_all(&mut *tx).await?,
                order::fetch_orders(&mut *tx, OrderFilter::All).await?,
            ),
        };

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            campaigns = campaigns.len(),
            conversations = conversations.len(),
            orders = orders.len(),
            "Snapshot loaded"
        );

        Ok(Snapshot {
            campaigns,
            conversations,
            orders,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
