//! # Demo Data Generator
//!
//! Populates the database with one month of campaigns, inbox conversations
//! and orders for development.
//!
//! ## Usage
//! ```bash
//! # Seed October 2025 into ./whisper_dev.db (default)
//! cargo run -p whisper-db --bin seed
//!
//! # More conversations per campaign
//! cargo run -p whisper-db --bin seed -- --conversations 60
//!
//! # Specify database path
//! cargo run -p whisper-db --bin seed -- --db ./data/whisper.db
//! ```
//!
//! ## Generated Data
//! - Campaigns in both ad accounts (Detal and Mayor), one of them paused
//! - Conversations spread over the month, some completed
//! - Orders for a share of completed conversations, linked in three ways:
//!   direct conversation id, UTM campaign hint, or phone only
//! - A few orders with returns and per-unit discounts

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::env;
use uuid::Uuid;
use whisper_core::{
    AccountType, Campaign, CampaignStatus, Conversation, ConversationStatus, Money, Order,
    OrderItem,
};
use whisper_db::{Database, DbConfig};

/// (id, name, account, daily budget, spend so far, status)
const CAMPAIGNS: &[(&str, &str, AccountType, i64, i64, CampaignStatus)] = &[
    ("120233445687010113", "Mensajes a WhatsApp Joyería", AccountType::Retail, 40_000, 1_240_000, CampaignStatus::Active),
    ("120233445687010114", "Balinería Detal", AccountType::Retail, 25_000, 610_000, CampaignStatus::Active),
    ("120233445687010115", "Dijes Personalizados", AccountType::Retail, 15_000, 180_000, CampaignStatus::Paused),
    ("120233445687020201", "Joyería Mayor", AccountType::Wholesale, 80_000, 2_450_000, CampaignStatus::Active),
    ("120233445687020202", "Balinería por Mayor", AccountType::Wholesale, 60_000, 1_730_000, CampaignStatus::Active),
];

/// (sku, title, unit price)
const PRODUCTS: &[(&str, &str, i64)] = &[
    ("CAD-ORO-18K", "Cadena Oro 18k", 420_000),
    ("ANI-ORO-LAM", "Anillo Oro Laminado", 85_000),
    ("DIJ-INI", "Dije Inicial", 45_000),
    ("BAL-3MM", "Balines 3mm x100", 32_000),
    ("BAL-5MM", "Balines 5mm x100", 48_000),
    ("ARE-TOP", "Aretes Topo", 60_000),
];

/// Shipping options in whole pesos.
const SHIPPING: &[i64] = &[0, 12_000, 15_000, 18_000];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut per_campaign: usize = 30;
    let mut db_path = String::from("./whisper_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--conversations" | "-n" => {
                if i + 1 < args.len() {
                    per_campaign = args[i + 1].parse().unwrap_or(30);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Gold Whisper Demo Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -n, --conversations <N>  Conversations per campaign (default: 30)");
                println!("  -d, --db <PATH>          Database file path (default: ./whisper_dev.db)");
                println!("  -h, --help               Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Gold Whisper Demo Data Generator");
    println!("===================================");
    println!("Database: {}", db_path);
    println!("Conversations per campaign: {}", per_campaign);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.orders().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} orders", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let month_start = Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).single().ok_or("bad start date")?;
    let start = std::time::Instant::now();

    for (id, name, account_type, budget, spend, status) in CAMPAIGNS {
        db.campaigns()
            .upsert(&Campaign {
                id: id.to_string(),
                name: name.to_string(),
                account_type: *account_type,
                daily_budget: Money::from_major(*budget),
                spend_total: Money::from_major(*spend),
                status: *status,
                delivery_label: *status,
                negatives_pct: Some(((spend / 1_000) % 12) as f64 + 0.5),
                last_updated: month_start + Duration::days(30),
            })
            .await?;
    }
    println!("✓ {} campaigns", CAMPAIGNS.len());

    let mut conversations = 0;
    let mut orders = 0;

    for (campaign_idx, (campaign_id, ..)) in CAMPAIGNS.iter().enumerate() {
        for n in 0..per_campaign {
            let seed = campaign_idx * 1_000 + n;
            let conversation = generate_conversation(campaign_id, seed, month_start);
            db.conversations().upsert(&conversation).await?;
            conversations += 1;

            if conversation.status == ConversationStatus::OrderCompleted {
                let order = generate_order(&conversation, campaign_id, seed);
                if let Err(e) = db.orders().insert(&order).await {
                    eprintln!("Failed to insert {}: {}", order.id, e);
                    continue;
                }
                orders += 1;
            }
        }
    }

    let elapsed = start.elapsed();
    println!("✓ {} conversations", conversations);
    println!("✓ {} orders", orders);
    println!();
    println!("✓ Seed complete in {:?}", elapsed);

    Ok(())
}

/// Generates one conversation inside the month.
fn generate_conversation(campaign_id: &str, seed: usize, month_start: DateTime<Utc>) -> Conversation {
    let started_at = month_start
        + Duration::hours(((seed * 37) % (30 * 24)) as i64)
        + Duration::minutes(((seed * 13) % 60) as i64);

    let status = match seed % 5 {
        0 | 3 => ConversationStatus::OrderCompleted,
        1 => ConversationStatus::Closed,
        _ => ConversationStatus::Open,
    };

    Conversation {
        id: format!("conv-{:05}", seed),
        campaign_id: campaign_id.to_string(),
        started_at,
        customer_phone: format!("+57 3{:02} {:03} {:04}", seed % 25, (seed * 7) % 1_000, (seed * 131) % 10_000),
        status,
    }
}

/// Generates an order for a completed conversation.
///
/// Every third order keeps only the phone, every third only a UTM hint.
fn generate_order(conversation: &Conversation, campaign_id: &str, seed: usize) -> Order {
    let (conversation_id, utm_campaign_id) = match seed % 3 {
        0 => (Some(conversation.id.clone()), None),
        1 => (None, Some(campaign_id.to_string())),
        _ => (None, None),
    };

    let lines = 1 + seed % 3;
    let items = (0..lines)
        .map(|line| {
            let (sku, title, price) = PRODUCTS[(seed + line * 5) % PRODUCTS.len()];
            let qty = 1 + ((seed + line) % 4) as i64;
            OrderItem {
                sku: sku.to_string(),
                title: title.to_string(),
                unit_price: Money::from_major(price),
                qty,
                returned_qty: (seed % 11 == 0 && qty > 1).then_some(1),
                discount_per_unit: (seed % 7 == 0).then(|| Money::from_major(price / 10)),
            }
        })
        .collect();

    Order {
        id: Uuid::new_v4().to_string(),
        conversation_id,
        utm_campaign_id,
        // Same number, formatted the way the store types it.
        customer_phone: conversation.customer_phone.replace(' ', ""),
        created_at: conversation.started_at + Duration::hours(2 + (seed % 48) as i64),
        items,
        shipping_cost: Money::from_major(SHIPPING[seed % SHIPPING.len()]),
        other_fees: (seed % 4 == 0).then(|| Money::from_major(3_500)),
        currency: "COP".to_string(),
    }
}
