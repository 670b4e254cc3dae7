//! # Wire Records
//!
//! JSON shapes sent by the external collaborators, and their conversion
//! into domain types.
//!
//! ## Boundary
//! ```text
//! ads platform  ──► CampaignRecord     ──┐
//! inbox         ──► ConversationRecord ──┼──► TryFrom ──► Campaign / Conversation / Order
//! sales store   ──► OrderRecord        ──┘    (validation.rs rules)
//! ```
//!
//! Everything past `TryFrom` may assume well-typed, validated fields.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{
    AccountType, Campaign, CampaignStatus, Conversation, ConversationStatus, Order, OrderItem,
    Snapshot,
};
use crate::validation::{
    optional_reference, parse_timestamp, validate_amount, validate_currency,
    validate_optional_amount, validate_percentage, validate_quantity, validate_required,
    ValidationResult,
};

// =============================================================================
// Records
// =============================================================================

/// Campaign as exposed by the ads platform adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRecord {
    pub id: String,
    pub name: String,
    pub account_type: AccountType,
    pub daily_budget: f64,
    pub spend_total: f64,
    pub status: CampaignStatus,
    pub delivery_label: CampaignStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negatives_pct: Option<f64>,
    pub last_updated: String,
}

/// Conversation as exposed by the inbox adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    pub id: String,
    pub campaign_id: String,
    pub started_at: String,
    pub customer_phone: String,
    pub status: ConversationStatus,
}

/// Order line as stored by the sales module.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRecord {
    pub sku: String,
    pub title: String,
    pub unit_price: f64,
    pub qty: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returned_qty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_per_unit: Option<f64>,
}

/// Order as stored by the sales module.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_campaign_id: Option<String>,
    pub customer_phone: String,
    pub created_at: String,
    pub items: Vec<OrderItemRecord>,
    pub shipping_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_fees: Option<f64>,
    pub currency: String,
}

/// A full export of the three collections, as used by `import`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotRecords {
    pub campaigns: Vec<CampaignRecord>,
    pub conversations: Vec<ConversationRecord>,
    pub orders: Vec<OrderRecord>,
}

// =============================================================================
// Conversions
// =============================================================================

impl TryFrom<CampaignRecord> for Campaign {
    type Error = CoreError;

    fn try_from(record: CampaignRecord) -> CoreResult<Self> {
        let id = record.id.clone();
        campaign_from_record(record).map_err(|source| CoreError::InvalidCampaign { id, source })
    }
}

fn campaign_from_record(record: CampaignRecord) -> ValidationResult<Campaign> {
    Ok(Campaign {
        id: validate_required("id", &record.id)?,
        name: validate_required("name", &record.name)?,
        account_type: record.account_type,
        daily_budget: validate_amount("dailyBudget", record.daily_budget)?,
        spend_total: validate_amount("spendTotal", record.spend_total)?,
        status: record.status,
        delivery_label: record.delivery_label,
        negatives_pct: record
            .negatives_pct
            .map(|pct| validate_percentage("negativesPct", pct))
            .transpose()?,
        last_updated: parse_timestamp("lastUpdated", &record.last_updated)?,
    })
}

impl TryFrom<ConversationRecord> for Conversation {
    type Error = CoreError;

    fn try_from(record: ConversationRecord) -> CoreResult<Self> {
        let id = record.id.clone();
        conversation_from_record(record)
            .map_err(|source| CoreError::InvalidConversation { id, source })
    }
}

fn conversation_from_record(record: ConversationRecord) -> ValidationResult<Conversation> {
    Ok(Conversation {
        id: validate_required("id", &record.id)?,
        campaign_id: validate_required("campaignId", &record.campaign_id)?,
        started_at: parse_timestamp("startedAt", &record.started_at)?,
        customer_phone: record.customer_phone,
        status: record.status,
    })
}

impl TryFrom<OrderRecord> for Order {
    type Error = CoreError;

    fn try_from(record: OrderRecord) -> CoreResult<Self> {
        let id = record.id.clone();
        order_from_record(record).map_err(|source| CoreError::InvalidOrder { id, source })
    }
}

fn order_from_record(record: OrderRecord) -> ValidationResult<Order> {
    if record.items.is_empty() {
        return Err(ValidationError::Empty {
            field: "items".to_string(),
        });
    }

    let items = record
        .items
        .into_iter()
        .enumerate()
        .map(|(index, item)| item_from_record(index, item))
        .collect::<ValidationResult<Vec<_>>>()?;

    Ok(Order {
        id: validate_required("id", &record.id)?,
        conversation_id: optional_reference(record.conversation_id),
        utm_campaign_id: optional_reference(record.utm_campaign_id),
        customer_phone: record.customer_phone,
        created_at: parse_timestamp("createdAt", &record.created_at)?,
        items,
        shipping_cost: validate_amount("shippingCost", record.shipping_cost)?,
        other_fees: validate_optional_amount("otherFees", record.other_fees)?,
        currency: validate_currency(&record.currency)?,
    })
}

fn item_from_record(index: usize, item: OrderItemRecord) -> ValidationResult<OrderItem> {
    let field = |name: &str| format!("items[{index}].{name}");

    Ok(OrderItem {
        sku: item.sku.trim().to_string(),
        title: item.title,
        unit_price: validate_amount(&field("unitPrice"), item.unit_price)?,
        qty: validate_quantity(&field("qty"), item.qty)?,
        returned_qty: item
            .returned_qty
            .map(|q| validate_quantity(&field("returnedQty"), q))
            .transpose()?,
        discount_per_unit: validate_optional_amount(&field("discountPerUnit"), item.discount_per_unit)?,
    })
}

// =============================================================================
// Batch Helpers
// =============================================================================

/// Validates a batch of campaign records, failing on the first bad one.
pub fn parse_campaigns(records: Vec<CampaignRecord>) -> CoreResult<Vec<Campaign>> {
    records.into_iter().map(Campaign::try_from).collect()
}

/// Validates a batch of conversation records, failing on the first bad one.
pub fn parse_conversations(records: Vec<ConversationRecord>) -> CoreResult<Vec<Conversation>> {
    records.into_iter().map(Conversation::try_from).collect()
}

/// Validates a batch of order records, failing on the first bad one.
pub fn parse_orders(records: Vec<OrderRecord>) -> CoreResult<Vec<Order>> {
    records.into_iter().map(Order::try_from).collect()
}

impl TryFrom<SnapshotRecords> for Snapshot {
    type Error = CoreError;

    fn try_from(records: SnapshotRecords) -> CoreResult<Self> {
        Ok(Snapshot {
            campaigns: parse_campaigns(records.campaigns)?,
            conversations: parse_conversations(records.conversations)?,
            orders: parse_orders(records.orders)?,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn order_json() -> serde_json::Value {
        serde_json::json!({
            "id": "o-2",
            "utmCampaignId": "120232224011150113",
            "conversationId": "",
            "customerPhone": "+57 300 444 5566",
            "createdAt": "2025-10-01T10:00:00.000Z",
            "items": [
                { "sku": "ARETES", "title": "Aretes Oro", "unitPrice": 120000, "qty": 2, "discountPerUnit": 5000 }
            ],
            "shippingCost": 12000,
            "currency": "COP"
        })
    }

    #[test]
    fn test_order_record_converts() {
        let record: OrderRecord = serde_json::from_value(order_json()).unwrap();
        let order = Order::try_from(record).unwrap();

        assert_eq!(order.id, "o-2");
        assert_eq!(order.conversation_id, None);
        assert_eq!(order.utm_campaign_id.as_deref(), Some("120232224011150113"));
        assert_eq!(order.items[0].qty, 2);
        assert_eq!(order.items[0].discount_per_unit, Some(Money::from_major(5_000)));
        assert_eq!(order.shipping_cost, Money::from_major(12_000));
        assert_eq!(order.other_fees, None);
    }

    #[test]
    fn test_order_without_items_is_rejected() {
        let mut json = order_json();
        json["items"] = serde_json::json!([]);
        let record: OrderRecord = serde_json::from_value(json).unwrap();

        let err = Order::try_from(record).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidOrder { ref id, source: ValidationError::Empty { .. } } if id == "o-2"
        ));
    }

    #[test]
    fn test_fractional_quantity_names_the_item() {
        let mut json = order_json();
        json["items"][0]["qty"] = serde_json::json!(1.5);
        let record: OrderRecord = serde_json::from_value(json).unwrap();

        let err = Order::try_from(record).unwrap_err();
        assert_eq!(err.to_string(), "Invalid order o-2: items[0].qty must be a whole number");
    }

    #[test]
    fn test_oversized_discount_is_tolerated() {
        let mut json = order_json();
        json["items"][0]["discountPerUnit"] = serde_json::json!(500000);
        json["items"][0]["returnedQty"] = serde_json::json!(9);
        let record: OrderRecord = serde_json::from_value(json).unwrap();

        assert!(Order::try_from(record).is_ok());
    }

    #[test]
    fn test_unknown_status_is_rejected_by_serde() {
        let json = serde_json::json!({
            "id": "c-1",
            "campaignId": "120233445687010113",
            "startedAt": "2025-10-01T10:00:00Z",
            "customerPhone": "+573001112233",
            "status": "Perdida"
        });
        assert!(serde_json::from_value::<ConversationRecord>(json).is_err());
    }

    #[test]
    fn test_campaign_record_converts() {
        let json = serde_json::json!({
            "id": "120233445687010113",
            "name": "Mensajes a WhatsApp del Mayor",
            "accountType": "Mayor",
            "dailyBudget": 150000,
            "spendTotal": 548428,
            "status": "Activa",
            "deliveryLabel": "Activa",
            "negativesPct": 22.5,
            "lastUpdated": "2025-10-01T10:00:00Z"
        });
        let record: CampaignRecord = serde_json::from_value(json).unwrap();
        let campaign = Campaign::try_from(record).unwrap();

        assert_eq!(campaign.account_type, AccountType::Wholesale);
        assert_eq!(campaign.spend_total, Money::from_major(548_428));
        assert_eq!(campaign.negatives_pct, Some(22.5));
    }

    #[test]
    fn test_bad_conversation_timestamp_fails_batch() {
        let records = vec![ConversationRecord {
            id: "c-9".to_string(),
            campaign_id: "120233445687010113".to_string(),
            started_at: "ayer".to_string(),
            customer_phone: String::new(),
            status: ConversationStatus::Open,
        }];

        let err = parse_conversations(records).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConversation { ref id, .. } if id == "c-9"));
    }
}
