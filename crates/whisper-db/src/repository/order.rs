//! # Order Repository
//!
//! Store orders and their line items.
//!
//! ## Storage Layout
//! ```text
//! orders (1) ────────< order_items (N)
//!   id                   order_id, position
//! ```
//!
//! Items keep their original position so net revenue is recomputed from
//! the same lines in the same order. An order is always written together
//! with its items, inside one transaction.

use std::collections::HashMap;

use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use whisper_core::{Money, Order, OrderItem, ReportingPeriod};

use super::{decode_timestamp, encode_timestamp};
use crate::error::{DbError, DbResult};

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, FromRow)]
struct OrderRecordRow {
    id: String,
    conversation_id: Option<String>,
    utm_campaign_id: Option<String>,
    customer_phone: String,
    created_at: String,
    shipping_cost_cents: i64,
    other_fees_cents: Option<i64>,
    currency: String,
}

#[derive(Debug, FromRow)]
struct OrderItemRecordRow {
    order_id: String,
    sku: String,
    title: String,
    unit_price_cents: i64,
    qty: i64,
    returned_qty: Option<i64>,
    discount_per_unit_cents: Option<i64>,
}

impl From<OrderItemRecordRow> for OrderItem {
    fn from(row: OrderItemRecordRow) -> Self {
        OrderItem {
            sku: row.sku,
            title: row.title,
            unit_price: Money::from_cents(row.unit_price_cents),
            qty: row.qty,
            returned_qty: row.returned_qty,
            discount_per_unit: row.discount_per_unit_cents.map(Money::from_cents),
        }
    }
}

impl OrderRecordRow {
    fn into_order(self, items: Vec<OrderItem>) -> DbResult<Order> {
        if items.is_empty() {
            return Err(DbError::corrupt("order", &self.id, "no items"));
        }
        let created_at = decode_timestamp("order", &self.id, "created_at", &self.created_at)?;

        Ok(Order {
            id: self.id,
            conversation_id: self.conversation_id,
            utm_campaign_id: self.utm_campaign_id,
            customer_phone: self.customer_phone,
            created_at,
            items,
            shipping_cost: Money::from_cents(self.shipping_cost_cents),
            other_fees: self.other_fees_cents.map(Money::from_cents),
            currency: self.currency,
        })
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Which orders to load.
#[derive(Debug, Clone, Copy)]
pub(crate) enum OrderFilter<'a> {
    All,
    Id(&'a str),
    CreatedBetween(&'a ReportingPeriod),
}

impl OrderFilter<'_> {
    /// WHERE clause over the `orders` table aliased as `o`.
    fn where_clause(&self) -> &'static str {
        match self {
            OrderFilter::All => "1 = 1",
            OrderFilter::Id(_) => "o.id = ?1",
            OrderFilter::CreatedBetween(_) => "o.created_at BETWEEN ?1 AND ?2",
        }
    }
}

/// Loads orders matching `filter` with their items, oldest first.
pub(crate) async fn fetch_orders(
    conn: &mut SqliteConnection,
    filter: OrderFilter<'_>,
) -> DbResult<Vec<Order>> {
    let where_clause = filter.where_clause();

    let order_sql = format!(
        r#"
        SELECT
            o.id, o.conversation_id, o.utm_campaign_id, o.customer_phone,
            o.created_at, o.shipping_cost_cents, o.other_fees_cents, o.currency
        FROM orders o
        WHERE {where_clause}
        ORDER BY o.created_at, o.id
        "#
    );
    let item_sql = format!(
        r#"
        SELECT
            i.order_id, i.sku, i.title, i.unit_price_cents, i.qty,
            i.returned_qty, i.discount_per_unit_cents
        FROM order_items i
        JOIN orders o ON o.id = i.order_id
        WHERE {where_clause}
        ORDER BY i.order_id, i.position
        "#
    );

    let mut order_query = sqlx::query_as::<_, OrderRecordRow>(&order_sql);
    let mut item_query = sqlx::query_as::<_, OrderItemRecordRow>(&item_sql);
    match filter {
        OrderFilter::All => {}
        OrderFilter::Id(id) => {
            order_query = order_query.bind(id);
            item_query = item_query.bind(id);
        }
        OrderFilter::CreatedBetween(period) => {
            let (from, to) = (encode_timestamp(period.from), encode_timestamp(period.to));
            order_query = order_query.bind(from.clone()).bind(to.clone());
            item_query = item_query.bind(from).bind(to);
        }
    }

    let order_rows = order_query.fetch_all(&mut *conn).await?;
    let item_rows = item_query.fetch_all(&mut *conn).await?;

    let mut items_by_order: HashMap<String, Vec<OrderItem>> = HashMap::new();
    for row in item_rows {
        items_by_order
            .entry(row.order_id.clone())
            .or_default()
            .push(OrderItem::from(row));
    }

    order_rows
        .into_iter()
        .map(|row| {
            let items = items_by_order.remove(&row.id).unwrap_or_default();
            row.into_order(items)
        })
        .collect()
}

async fn write_order(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO orders (
            id, conversation_id, utm_campaign_id, customer_phone,
            created_at, shipping_cost_cents, other_fees_cents, currency
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&order.id)
    .bind(&order.conversation_id)
    .bind(&order.utm_campaign_id)
    .bind(&order.customer_phone)
    .bind(encode_timestamp(order.created_at))
    .bind(order.shipping_cost.cents())
    .bind(order.other_fees.map(|fees| fees.cents()))
    .bind(&order.currency)
    .execute(&mut *conn)
    .await?;

    for (position, item) in order.items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO order_items (
                order_id, position, sku, title, unit_price_cents,
                qty, returned_qty, discount_per_unit_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&order.id)
        .bind(position as i64)
        .bind(&item.sku)
        .bind(&item.title)
        .bind(item.unit_price.cents())
        .bind(item.qty)
        .bind(item.returned_qty)
        .bind(item.discount_per_unit.map(|d| d.cents()))
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Writes `order` over any stored order with the same id. Items cascade
/// with the deleted row. Must run inside a transaction.
pub(crate) async fn upsert_order(conn: &mut SqliteConnection, order: &Order) -> DbResult<bool> {
    let replaced = sqlx::query("DELETE FROM orders WHERE id = ?1")
        .bind(&order.id)
        .execute(&mut *conn)
        .await?
        .rows_affected()
        > 0;
    write_order(conn, order).await?;

    if replaced {
        info!(id = %order.id, "Replaced stored order");
    }
    Ok(replaced)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts a new order with its items.
    ///
    /// Fails with `UniqueViolation` if the id already exists.
    pub async fn insert(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, items = order.items.len(), "Inserting order");

        let mut tx = self.pool.begin().await?;
        write_order(&mut *tx, order).await?;
        tx.commit().await?;

        Ok(())
    }

    /// Inserts an order, replacing a stored order with the same id and all
    /// of its items.
    ///
    /// Returns `true` when an existing order was replaced.
    pub async fn upsert(&self, order: &Order) -> DbResult<bool> {
        let mut tx = self.pool.begin().await?;
        let replaced = upsert_order(&mut *tx, order).await?;
        tx.commit().await?;
        Ok(replaced)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let mut conn = self.pool.acquire().await?;
        let mut orders = fetch_orders(&mut conn, OrderFilter::Id(id)).await?;
        Ok(orders.pop())
    }

    /// All orders, oldest first.
    pub async fn list(&self) -> DbResult<Vec<Order>> {
        let mut conn = self.pool.acquire().await?;
        fetch_orders(&mut conn, OrderFilter::All).await
    }

    /// Orders created inside `period` (inclusive), oldest first.
    pub async fn list_created_between(&self, period: &ReportingPeriod) -> DbResult<Vec<Order>> {
        let mut conn = self.pool.acquire().await?;
        fetch_orders(&mut conn, OrderFilter::CreatedBetween(period)).await
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
