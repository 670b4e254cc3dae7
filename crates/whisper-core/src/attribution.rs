//! # Attribution Module
//!
//! Decides which conversation, and through it which campaign, gets credit
//! for an order.
//!
//! ## Tier Chain
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Order → Conversation Attribution                    │
//! │                                                                         │
//! │  Order                                                                  │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  Tier::DirectLink    order.conversation_id == conversation.id           │
//! │    │  no match           → by-conversation-id                           │
//! │    ▼                                                                    │
//! │  Tier::CampaignHint  conversation.campaign_id == order.utm_campaign_id  │
//! │    │  no candidates      → by-utm-campaign-id          (last touch)     │
//! │    │                     → by-utm-campaign-id-closest  (nearest)        │
//! │    ▼                                                                    │
//! │  Tier::PhoneWindow   same normalized phone, |Δt| ≤ window               │
//! │    │  no candidates      → by-phone-last-touch         (last touch)     │
//! │    │                     → by-phone-closest            (nearest)        │
//! │    ▼                                                                    │
//! │  unattributed                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The first tier that yields a conversation wins. Candidate order follows
//! input order, and every tie-break picks the earliest candidate in input
//! order, so results are deterministic for a given snapshot.
//!
//! ## Usage
//! ```rust,ignore
//! let index = ConversationIndex::new(&conversations);
//! let config = AttributionConfig::default(); // 14-day window
//! let attribution = index.attribute(&order, &config);
//! ```

use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{Conversation, Order};

// =============================================================================
// Constants
// =============================================================================

/// Default attribution window for phone matching, in days.
pub const DEFAULT_WINDOW_DAYS: u32 = 14;

// =============================================================================
// Configuration
// =============================================================================

/// Attribution settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributionConfig {
    /// Maximum gap, in either direction, between a conversation's start and
    /// an order's creation for a phone match. Inclusive.
    pub window: Duration,
}

impl Default for AttributionConfig {
    fn default() -> Self {
        AttributionConfig::with_window_days(DEFAULT_WINDOW_DAYS)
    }
}

impl AttributionConfig {
    /// Creates a config with a window of `days` days.
    pub fn with_window_days(days: u32) -> Self {
        AttributionConfig {
            window: Duration::days(i64::from(days)),
        }
    }
}

// =============================================================================
// Reason
// =============================================================================

/// Why an order was (or was not) attributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum AttributionReason {
    ByConversationId,
    ByUtmCampaignId,
    ByUtmCampaignIdClosest,
    ByPhoneLastTouch,
    ByPhoneClosest,
    Unattributed,
}

impl AttributionReason {
    /// All reasons in tier order.
    pub const ALL: [AttributionReason; 6] = [
        AttributionReason::ByConversationId,
        AttributionReason::ByUtmCampaignId,
        AttributionReason::ByUtmCampaignIdClosest,
        AttributionReason::ByPhoneLastTouch,
        AttributionReason::ByPhoneClosest,
        AttributionReason::Unattributed,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            AttributionReason::ByConversationId => "by-conversation-id",
            AttributionReason::ByUtmCampaignId => "by-utm-campaign-id",
            AttributionReason::ByUtmCampaignIdClosest => "by-utm-campaign-id-closest",
            AttributionReason::ByPhoneLastTouch => "by-phone-last-touch",
            AttributionReason::ByPhoneClosest => "by-phone-closest",
            AttributionReason::Unattributed => "unattributed",
        }
    }
}

impl fmt::Display for AttributionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Attribution Result
// =============================================================================

/// Outcome of attributing one order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attribution<'a> {
    pub conversation: Option<&'a Conversation>,
    pub reason: AttributionReason,
}

impl<'a> Attribution<'a> {
    /// The no-match outcome. Not an error.
    pub const fn unattributed() -> Self {
        Attribution {
            conversation: None,
            reason: AttributionReason::Unattributed,
        }
    }

    fn matched(conversation: &'a Conversation, reason: AttributionReason) -> Self {
        Attribution {
            conversation: Some(conversation),
            reason,
        }
    }

    /// Campaign credited through the matched conversation.
    pub fn campaign_id(&self) -> Option<&'a str> {
        self.conversation.map(|c| c.campaign_id.as_str())
    }

    pub fn is_attributed(&self) -> bool {
        self.conversation.is_some()
    }
}

// =============================================================================
// Phone Normalization
// =============================================================================

/// Canonical comparable form of a free-form phone number.
///
/// Keeps digits, plus a `+` only when it precedes every digit. No
/// country-code inference: `+573001112233` and `3001112233` differ.
///
/// ## Example
/// ```rust
/// use whisper_core::attribution::normalize_phone;
///
/// assert_eq!(normalize_phone("+57 (300) 111-2233"), "+573001112233");
/// assert_eq!(normalize_phone("300 111 2233 ext+1"), "30011122331");
/// assert_eq!(normalize_phone("n/a"), "");
/// ```
pub fn normalize_phone(phone: &str) -> String {
    let mut normalized = String::with_capacity(phone.len());

    for c in phone.chars() {
        if c.is_ascii_digit() {
            normalized.push(c);
        } else if c == '+' && normalized.is_empty() {
            normalized.push(c);
        }
    }

    normalized
}

// =============================================================================
// Conversation Index
// =============================================================================

/// Lookup tables over one conversation batch, built once per run.
///
/// Every list keeps input order; tie-breaks depend on it.
#[derive(Debug)]
pub struct ConversationIndex<'a> {
    by_id: HashMap<&'a str, &'a Conversation>,
    by_campaign: HashMap<&'a str, Vec<&'a Conversation>>,
    by_phone: HashMap<String, Vec<&'a Conversation>>,
}

impl<'a> ConversationIndex<'a> {
    /// Indexes a conversation batch.
    pub fn new(conversations: &'a [Conversation]) -> Self {
        let mut by_id = HashMap::with_capacity(conversations.len());
        let mut by_campaign: HashMap<&'a str, Vec<&'a Conversation>> = HashMap::new();
        let mut by_phone: HashMap<String, Vec<&'a Conversation>> = HashMap::new();

        for conversation in conversations {
            // First occurrence wins on duplicate ids.
            by_id.entry(conversation.id.as_str()).or_insert(conversation);

            by_campaign
                .entry(conversation.campaign_id.as_str())
                .or_default()
                .push(conversation);

            by_phone
                .entry(normalize_phone(&conversation.customer_phone))
                .or_default()
                .push(conversation);
        }

        ConversationIndex {
            by_id,
            by_campaign,
            by_phone,
        }
    }

    /// Conversations declaring `campaign_id`, in input order.
    pub fn for_campaign(&self, campaign_id: &str) -> &[&'a Conversation] {
        self.by_campaign
            .get(campaign_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Campaign ids declared by at least one conversation.
    pub fn campaign_ids(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.by_campaign.keys().copied()
    }

    /// Runs the tier chain for one order.
    pub fn attribute(&self, order: &Order, config: &AttributionConfig) -> Attribution<'a> {
        Tier::CHAIN
            .iter()
            .find_map(|tier| tier.resolve(self, order, config))
            .unwrap_or_else(Attribution::unattributed)
    }
}

// =============================================================================
// Tiers
// =============================================================================

/// One matching strategy in the attribution chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Order carries the conversation id.
    DirectLink,
    /// Order carries a UTM campaign id.
    CampaignHint,
    /// Same customer phone within the window.
    PhoneWindow,
}

impl Tier {
    /// Evaluation order. First match short-circuits the rest.
    pub const CHAIN: [Tier; 3] = [Tier::DirectLink, Tier::CampaignHint, Tier::PhoneWindow];

    /// Applies this tier. `None` means fall through to the next tier.
    pub fn resolve<'a>(
        &self,
        index: &ConversationIndex<'a>,
        order: &Order,
        config: &AttributionConfig,
    ) -> Option<Attribution<'a>> {
        match self {
            Tier::DirectLink => direct_link(index, order),
            Tier::CampaignHint => campaign_hint(index, order),
            Tier::PhoneWindow => phone_window(index, order, config),
        }
    }
}

fn direct_link<'a>(index: &ConversationIndex<'a>, order: &Order) -> Option<Attribution<'a>> {
    let id = order.conversation_id.as_deref()?;
    let conversation = index.by_id.get(id)?;
    Some(Attribution::matched(conversation, AttributionReason::ByConversationId))
}

fn campaign_hint<'a>(index: &ConversationIndex<'a>, order: &Order) -> Option<Attribution<'a>> {
    let campaign_id = order.utm_campaign_id.as_deref()?;
    let candidates = index.for_campaign(campaign_id);

    let (conversation, touch) = last_touch_or_closest(candidates, order.created_at)?;
    let reason = match touch {
        Touch::LastTouch => AttributionReason::ByUtmCampaignId,
        Touch::Closest => AttributionReason::ByUtmCampaignIdClosest,
    };

    Some(Attribution::matched(conversation, reason))
}

fn phone_window<'a>(
    index: &ConversationIndex<'a>,
    order: &Order,
    config: &AttributionConfig,
) -> Option<Attribution<'a>> {
    // Blank phones normalize to "" and match each other.
    let candidates: Vec<&'a Conversation> = index
        .by_phone
        .get(&normalize_phone(&order.customer_phone))?
        .iter()
        .copied()
        .filter(|c| distance(c.started_at, order.created_at) <= config.window)
        .collect();

    let (conversation, touch) = last_touch_or_closest(&candidates, order.created_at)?;
    let reason = match touch {
        Touch::LastTouch => AttributionReason::ByPhoneLastTouch,
        Touch::Closest => AttributionReason::ByPhoneClosest,
    };

    Some(Attribution::matched(conversation, reason))
}

// =============================================================================
// Selection
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Touch {
    LastTouch,
    Closest,
}

/// Latest conversation started at or before `target`; failing that, the
/// one nearest to `target`. Ties go to the earliest candidate in the slice
/// (`min_by_key` keeps the first minimum).
fn last_touch_or_closest<'a>(
    candidates: &[&'a Conversation],
    target: DateTime<Utc>,
) -> Option<(&'a Conversation, Touch)> {
    let last_touch = candidates
        .iter()
        .copied()
        .filter(|c| c.started_at <= target)
        .min_by_key(|c| Reverse(c.started_at));

    if let Some(conversation) = last_touch {
        return Some((conversation, Touch::LastTouch));
    }

    candidates
        .iter()
        .copied()
        .min_by_key(|c| distance(c.started_at, target))
        .map(|conversation| (conversation, Touch::Closest))
}

/// Absolute time between two instants.
#[inline]
fn distance(a: DateTime<Utc>, b: DateTime<Utc>) -> Duration {
    if a >= b {
        a - b
    } else {
        b - a
    }
}

// =============================================================================
// Convenience
// =============================================================================

/// Attributes a single order against a conversation batch.
///
/// Builds a fresh [`ConversationIndex`]; when attributing many orders,
/// build the index once and call [`ConversationIndex::attribute`].
pub fn attribute<'a>(
    order: &Order,
    conversations: &'a [Conversation],
    config: &AttributionConfig,
) -> Attribution<'a> {
    ConversationIndex::new(conversations).attribute(order, config)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{ConversationStatus, OrderItem};
    use chrono::TimeZone;

    fn day(d: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap() + Duration::days(d)
    }

    fn conv(id: &str, campaign: &str, started: DateTime<Utc>, phone: &str) -> Conversation {
        Conversation {
            id: id.to_string(),
            campaign_id: campaign.to_string(),
            started_at: started,
            customer_phone: phone.to_string(),
            status: ConversationStatus::Open,
        }
    }

    fn order(created: DateTime<Utc>, phone: &str) -> Order {
        Order {
            id: "o-1".to_string(),
            conversation_id: None,
            utm_campaign_id: None,
            customer_phone: phone.to_string(),
            created_at: created,
            items: vec![OrderItem {
                sku: "DIJE".to_string(),
                title: "Dije Oro".to_string(),
                unit_price: Money::from_major(90_000),
                qty: 1,
                returned_qty: None,
                discount_per_unit: None,
            }],
            shipping_cost: Money::from_major(12_000),
            other_fees: None,
            currency: "COP".to_string(),
        }
    }

    fn run<'a>(o: &Order, convs: &'a [Conversation]) -> (Option<&'a str>, AttributionReason) {
        let a = attribute(o, convs, &AttributionConfig::default());
        (a.conversation.map(|c| c.id.as_str()), a.reason)
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("+57 300 111 2233"), "+573001112233");
        assert_eq!(normalize_phone("(+57) 300-111-2233"), "+573001112233");
        assert_eq!(normalize_phone("300+111"), "300111");
        assert_eq!(normalize_phone("++57"), "+57");
        assert_eq!(normalize_phone(""), "");
        assert_eq!(normalize_phone("sin teléfono"), "");
    }

    #[test]
    fn test_direct_link_beats_everything() {
        let convs = vec![
            conv("c-near", "C2", day(0), "+573001112233"),
            conv("c-linked", "C1", day(-60), "+570000000000"),
        ];
        let mut o = order(day(0), "+573001112233");
        o.conversation_id = Some("c-linked".to_string());
        o.utm_campaign_id = Some("C2".to_string());

        assert_eq!(run(&o, &convs), (Some("c-linked"), AttributionReason::ByConversationId));
    }

    #[test]
    fn test_dangling_direct_link_falls_through() {
        let convs = vec![
            conv("c-utm", "C1", day(-3), "+571111111111"),
            conv("c-phone", "C2", day(-1), "+573001112233"),
        ];
        let mut o = order(day(0), "+573001112233");
        o.conversation_id = Some("c-missing".to_string());
        o.utm_campaign_id = Some("C1".to_string());

        assert_eq!(run(&o, &convs), (Some("c-utm"), AttributionReason::ByUtmCampaignId));
    }

    #[test]
    fn test_campaign_hint_last_touch() {
        let convs = vec![
            conv("c-old", "C1", day(-10), ""),
            conv("c-late", "C1", day(-2), ""),
            conv("c-after", "C1", day(1), ""),
            conv("c-other", "C2", day(-1), ""),
        ];
        let mut o = order(day(0), "");
        o.utm_campaign_id = Some("C1".to_string());

        assert_eq!(run(&o, &convs), (Some("c-late"), AttributionReason::ByUtmCampaignId));
    }

    #[test]
    fn test_campaign_hint_ignores_window() {
        let convs = vec![conv("c-ancient", "C1", day(-400), "")];
        let mut o = order(day(0), "");
        o.utm_campaign_id = Some("C1".to_string());

        assert_eq!(run(&o, &convs), (Some("c-ancient"), AttributionReason::ByUtmCampaignId));
    }

    #[test]
    fn test_campaign_hint_closest_when_all_after() {
        let convs = vec![
            conv("c-far", "C1", day(9), ""),
            conv("c-near", "C1", day(2), ""),
        ];
        let mut o = order(day(0), "");
        o.utm_campaign_id = Some("C1".to_string());

        assert_eq!(run(&o, &convs), (Some("c-near"), AttributionReason::ByUtmCampaignIdClosest));
    }

    #[test]
    fn test_campaign_hint_without_candidates_falls_to_phone() {
        let convs = vec![conv("c-phone", "C2", day(-1), "300 111 2233")];
        let mut o = order(day(0), "3001112233");
        o.utm_campaign_id = Some("C-unknown".to_string());

        assert_eq!(run(&o, &convs), (Some("c-phone"), AttributionReason::ByPhoneLastTouch));
    }

    #[test]
    fn test_phone_last_touch_and_closest() {
        let convs = vec![
            conv("c-a", "C1", day(0), "+573001112233"),
            conv("c-b", "C1", day(5), "+57 300 111 2233"),
        ];
        assert_eq!(
            run(&order(day(6), "+573001112233"), &convs),
            (Some("c-b"), AttributionReason::ByPhoneLastTouch)
        );
        assert_eq!(
            run(&order(day(-1), "+573001112233"), &convs),
            (Some("c-a"), AttributionReason::ByPhoneClosest)
        );
    }

    #[test]
    fn test_phone_window_is_inclusive() {
        let phone = "+573004445566";
        let at_edge = vec![conv("c-edge", "C1", day(-14), phone)];
        assert_eq!(
            run(&order(day(0), phone), &at_edge),
            (Some("c-edge"), AttributionReason::ByPhoneLastTouch)
        );

        let ahead_edge = vec![conv("c-edge", "C1", day(14), phone)];
        assert_eq!(
            run(&order(day(0), phone), &ahead_edge),
            (Some("c-edge"), AttributionReason::ByPhoneClosest)
        );

        let beyond = vec![conv("c-out", "C1", day(-15), phone)];
        assert_eq!(run(&order(day(0), phone), &beyond), (None, AttributionReason::Unattributed));

        let just_beyond = vec![conv("c-out", "C1", day(-14) - Duration::milliseconds(1), phone)];
        assert_eq!(
            run(&order(day(0), phone), &just_beyond),
            (None, AttributionReason::Unattributed)
        );
    }

    #[test]
    fn test_custom_window() {
        let phone = "+573004445566";
        let convs = vec![conv("c-1", "C1", day(-20), phone)];
        let o = order(day(0), phone);

        let narrow = attribute(&o, &convs, &AttributionConfig::default());
        assert!(!narrow.is_attributed());

        let wide = attribute(&o, &convs, &AttributionConfig::with_window_days(30));
        assert_eq!(wide.campaign_id(), Some("C1"));
    }

    #[test]
    fn test_blank_phones_match_each_other() {
        let convs = vec![
            conv("c-blank", "C1", day(-1), ""),
            conv("c-real", "C2", day(-1), "+571"),
        ];
        assert_eq!(
            run(&order(day(0), ""), &convs),
            (Some("c-blank"), AttributionReason::ByPhoneLastTouch)
        );
        assert_eq!(
            run(&order(day(0), "n/a"), &convs),
            (Some("c-blank"), AttributionReason::ByPhoneLastTouch)
        );

        // Still bounded by the window.
        assert_eq!(
            run(&order(day(20), "  "), &convs),
            (None, AttributionReason::Unattributed)
        );
    }

    #[test]
    fn test_ties_pick_first_in_input_order() {
        let convs = vec![
            conv("c-first", "C1", day(-1), "+571"),
            conv("c-second", "C2", day(-1), "+571"),
        ];
        assert_eq!(
            run(&order(day(0), "+571"), &convs),
            (Some("c-first"), AttributionReason::ByPhoneLastTouch)
        );

        // Equidistant before/after cannot happen in the closest branch (a
        // before-candidate would win as last touch), so tie on equal starts.
        let after = vec![
            conv("c-x", "C1", day(3), "+571"),
            conv("c-y", "C1", day(3), "+571"),
        ];
        assert_eq!(
            run(&order(day(0), "+571"), &after),
            (Some("c-x"), AttributionReason::ByPhoneClosest)
        );
    }

    #[test]
    fn test_duplicate_ids_use_first() {
        let convs = vec![
            conv("c-dup", "C1", day(0), ""),
            conv("c-dup", "C2", day(0), ""),
        ];
        let mut o = order(day(0), "");
        o.conversation_id = Some("c-dup".to_string());

        let a = attribute(&o, &convs, &AttributionConfig::default());
        assert_eq!(a.campaign_id(), Some("C1"));
    }

    #[test]
    fn test_attribution_is_deterministic() {
        let convs = vec![
            conv("c-1", "C1", day(-3), "+573001112233"),
            conv("c-2", "C2", day(-3), "+573001112233"),
            conv("c-3", "C1", day(2), "+573001112233"),
        ];
        let o = order(day(0), "+573001112233");

        let first = run(&o, &convs);
        for _ in 0..10 {
            assert_eq!(run(&o, &convs), first);
        }
    }

    #[test]
    fn test_no_tiers_apply() {
        assert_eq!(run(&order(day(0), "+573001112233"), &[]), (None, AttributionReason::Unattributed));
    }

    #[test]
    fn test_reason_wire_names() {
        for reason in AttributionReason::ALL {
            let json = serde_json::to_string(&reason).unwrap();
            assert_eq!(json, format!("\"{}\"", reason.as_str()));
        }
    }
}
