//! # Import
//!
//! Loads a JSON export of wire records into the store.
//!
//! ```text
//! file.json ──► SnapshotRecords ──► Snapshot::try_from ──► write_snapshot
//!                 (serde)             (validation)        (one transaction)
//! ```
//!
//! The whole file is validated before anything is written, and the write is
//! all or nothing: one bad record, or one row the store rejects, leaves the
//! store as it was.

use std::path::Path;

use serde::Serialize;
use tracing::{info, instrument};
use whisper_core::wire::SnapshotRecords;
use whisper_core::Snapshot;
use whisper_db::Database;

use crate::error::{ReportError, ReportResult};

/// Counts of what an import wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportStats {
    pub campaigns: usize,
    pub conversations: usize,
    pub orders: usize,
    /// Orders that replaced a stored order with the same id.
    pub replaced_orders: usize,
}

/// Reads and parses a wire record file.
pub fn read_records(path: &Path) -> ReportResult<SnapshotRecords> {
    let contents = std::fs::read_to_string(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&contents).map_err(|source| ReportError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Validates and stores the records in `path`.
#[instrument(skip(db), fields(path = %path.display()))]
pub async fn import_file(db: &Database, path: &Path) -> ReportResult<ImportStats> {
    let records = read_records(path)?;
    let snapshot = Snapshot::try_from(records)?;
    import_snapshot(db, &snapshot).await
}

/// Stores an already validated snapshot in one transaction. Existing rows
/// with the same ids are replaced.
pub async fn import_snapshot(db: &Database, snapshot: &Snapshot) -> ReportResult<ImportStats> {
    let replaced_orders = db.write_snapshot(snapshot).await?;
    let stats = ImportStats {
        campaigns: snapshot.campaigns.len(),
        conversations: snapshot.conversations.len(),
        orders: snapshot.orders.len(),
        replaced_orders,
    };

    let stored = db.counts().await?;
    info!(
        campaigns = stats.campaigns,
        conversations = stats.conversations,
        orders = stats.orders,
        replaced_orders = stats.replaced_orders,
        stored_orders = stored.orders,
        "Import complete"
    );
    Ok(stats)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use whisper_core::{AttributionConfig, CoreError, Money};
    use whisper_db::{DbConfig, DbError};

    const RECORDS: &str = r#"{
        "campaigns": [{
            "id": "C1", "name": "Joyería Detal", "accountType": "Detal",
            "dailyBudget": 50000, "spendTotal": 100000,
            "status": "Activa", "deliveryLabel": "Activa",
            "lastUpdated": "2025-10-07T00:00:00Z"
        }],
        "conversations": [{
            "id": "conv-A", "campaignId": "C1", "startedAt": "2025-10-01T10:00:00Z",
            "customerPhone": "+57 300 111 2233", "status": "Pedido Completo"
        }],
        "orders": [{
            "id": "O1", "customerPhone": "3001112233", "createdAt": "2025-10-02T10:00:00Z",
            "items": [{ "sku": "DIJE", "title": "Dije", "unitPrice": 100000, "qty": 2 }],
            "shippingCost": 15000, "currency": "cop"
        }]
    }"#;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("whisper-import-{}-{name}.json", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn test_import_file() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let path = temp_file("ok", RECORDS);

        let stats = import_file(&db, &path).await.unwrap();
        assert_eq!(
            stats,
            ImportStats {
                campaigns: 1,
                conversations: 1,
                orders: 1,
                replaced_orders: 0
            }
        );

        let again = import_file(&db, &path).await.unwrap();
        assert_eq!(again.replaced_orders, 1);
        assert_eq!(db.orders().count().await.unwrap(), 1);

        let snapshot = db.snapshot(None, &AttributionConfig::default()).await.unwrap();
        assert_eq!(snapshot.orders[0].currency, "COP");

        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_invalid_record_writes_nothing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let path = temp_file("bad", &RECORDS.replace("\"qty\": 2", "\"qty\": 1.5"));

        let err = import_file(&db, &path).await.unwrap_err();
        assert!(matches!(err, ReportError::Core(CoreError::InvalidOrder { .. })));
        assert_eq!(db.campaigns().count().await.unwrap(), 0);

        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_store_rejection_rolls_back_whole_import() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let records: SnapshotRecords = serde_json::from_str(RECORDS).unwrap();
        let mut snapshot = Snapshot::try_from(records).unwrap();

        let mut rejected = snapshot.orders[0].clone();
        rejected.id = "O2".to_string();
        rejected.shipping_cost = Money::from_cents(-100);
        snapshot.orders.push(rejected);

        let err = import_snapshot(&db, &snapshot).await.unwrap_err();
        assert!(matches!(err, ReportError::Database(DbError::ConstraintViolation(_))));

        let counts = db.counts().await.unwrap();
        assert_eq!((counts.campaigns, counts.conversations, counts.orders), (0, 0, 0));
    }

    #[tokio::test]
    async fn test_unreadable_inputs() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = import_file(&db, Path::new("/nonexistent/records.json")).await.unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));

        let path = temp_file("garbled", "{ not json");
        let err = import_file(&db, &path).await.unwrap_err();
        assert!(matches!(err, ReportError::Json { .. }));
        std::fs::remove_file(path).ok();
    }
}
