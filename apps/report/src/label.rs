//! # Conversation Labels
//!
//! Suggests the campaign and category labels for a conversation from its
//! messages, matching against the campaigns in the store.

use serde::Serialize;
use tracing::debug;
use whisper_core::labels::{campaign_label_for_messages, category_label_for_messages, CampaignListing};
use whisper_db::Database;

use crate::error::ReportResult;

/// Labels suggested for one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSuggestion {
    /// `campaign:<id>`
    pub campaign: Option<String>,
    /// `category:<family>`
    pub category: Option<String>,
}

/// Labels `messages` against `listings`.
pub fn suggest_labels<S: AsRef<str>>(messages: &[S], listings: &[CampaignListing]) -> LabelSuggestion {
    LabelSuggestion {
        campaign: campaign_label_for_messages(messages, listings).map(|label| label.to_string()),
        category: category_label_for_messages(messages),
    }
}

/// Labels `messages` against every stored campaign.
pub async fn suggest_from_store<S: AsRef<str>>(
    db: &Database,
    messages: &[S],
) -> ReportResult<LabelSuggestion> {
    let listings: Vec<CampaignListing> = db
        .campaigns()
        .list()
        .await?
        .iter()
        .map(CampaignListing::from)
        .collect();
    debug!(listings = listings.len(), "Matching messages against campaigns");

    Ok(suggest_labels(messages, &listings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use whisper_core::{AccountType, Campaign, CampaignStatus, Money};
    use whisper_db::DbConfig;

    fn campaign(id: &str, name: &str, status: CampaignStatus, day: u32) -> Campaign {
        Campaign {
            id: id.to_string(),
            name: name.to_string(),
            account_type: AccountType::Retail,
            daily_budget: Money::from_major(20_000),
            spend_total: Money::zero(),
            status,
            delivery_label: status,
            negatives_pct: None,
            last_updated: Utc.with_ymd_and_hms(2025, 10, day, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_keyword_match_prefers_active_campaign() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.campaigns()
            .upsert(&campaign("120000000001", "Joyería Octubre", CampaignStatus::Paused, 20))
            .await
            .unwrap();
        db.campaigns()
            .upsert(&campaign("120000000002", "Joyeria Detal", CampaignStatus::Active, 3))
            .await
            .unwrap();

        let suggestion = suggest_from_store(&db, &["Hola, quiero ver el collar de oro"]).await.unwrap();
        assert_eq!(suggestion.campaign.as_deref(), Some("campaign:120000000002"));
        assert_eq!(suggestion.category.as_deref(), Some("category:joyeria"));
    }

    #[test]
    fn test_utm_campaign_id_wins() {
        let listings = vec![CampaignListing::from(&campaign("1", "Balinería", CampaignStatus::Active, 1))];
        let messages = ["Vi esto https://goldwhisper.co/p?campaign_id=120233445687010113 balines"];

        let suggestion = suggest_labels(&messages, &listings);
        assert_eq!(suggestion.campaign.as_deref(), Some("campaign:120233445687010113"));
        assert_eq!(suggestion.category.as_deref(), Some("category:balineria"));
    }

    #[test]
    fn test_no_store_no_campaign_label() {
        let suggestion = suggest_labels(&["quiero unos aretes"], &[]);
        assert_eq!(suggestion.campaign, None);
        assert_eq!(suggestion.category.as_deref(), Some("category:joyeria"));
    }
}
