//! # Labels Module
//!
//! Derives inbox labels (`campaign:<id>`, `category:<family>`) from the
//! text of a conversation's messages.
//!
//! ## Resolution Order
//! ```text
//! messages ──► joined text
//!                 │
//!                 ├─► URL with utm_campaign / campaign_id
//!                 │     campaign_id (≥ 6 digits) ──► campaign:<id>
//!                 │     utm_campaign name        ──► best listing by name
//!                 │
//!                 └─► keyword family (balineria, then joyeria)
//!                       ──► best listing by family name
//! ```
//!
//! Listings are whatever the ads platform currently reports; an empty
//! listing set yields no campaign label at all.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ValidationError;
use crate::types::{Campaign, CampaignStatus};

const CAMPAIGN_PREFIX: &str = "campaign:";
const CATEGORY_PREFIX: &str = "category:";
const MIN_CAMPAIGN_ID_DIGITS: usize = 6;

fn url_pattern() -> &'static Regex {
    static URL: OnceLock<Regex> = OnceLock::new();
    URL.get_or_init(|| Regex::new(r"(?i)https?://\S+").expect("URL pattern compiles"))
}

// =============================================================================
// Campaign Listing
// =============================================================================

/// A campaign as listed by the ads platform, used for name matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignListing {
    pub id: String,
    pub name: String,
    /// Platform delivery status, e.g. `ACTIVE` or `PAUSED`.
    #[serde(default)]
    pub effective_status: Option<String>,
    #[serde(default)]
    pub updated_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_time: Option<DateTime<Utc>>,
}

impl CampaignListing {
    pub fn is_active(&self) -> bool {
        self.effective_status.as_deref() == Some("ACTIVE")
    }

    fn recency(&self) -> Option<DateTime<Utc>> {
        self.updated_time.or(self.created_time)
    }
}

impl From<&Campaign> for CampaignListing {
    fn from(campaign: &Campaign) -> Self {
        let status = match campaign.status {
            CampaignStatus::Active => "ACTIVE",
            CampaignStatus::Paused => "PAUSED",
        };

        CampaignListing {
            id: campaign.id.clone(),
            name: campaign.name.clone(),
            effective_status: Some(status.to_string()),
            updated_time: Some(campaign.last_updated),
            created_time: None,
        }
    }
}

// =============================================================================
// Campaign Label
// =============================================================================

/// `campaign:<id>` inbox label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CampaignLabel(String);

impl CampaignLabel {
    pub fn new(campaign_id: impl Into<String>) -> Self {
        CampaignLabel(campaign_id.into())
    }

    pub fn campaign_id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CampaignLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CAMPAIGN_PREFIX}{}", self.0)
    }
}

impl FromStr for CampaignLabel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .trim()
            .strip_prefix(CAMPAIGN_PREFIX)
            .ok_or_else(|| ValidationError::invalid_format("label", "expected campaign:<id>"))?
            .trim();

        if id.is_empty() {
            return Err(ValidationError::required("label"));
        }

        Ok(CampaignLabel(id.to_string()))
    }
}

// =============================================================================
// UTM Extraction
// =============================================================================

/// Campaign hint found in a tracked URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UtmHint {
    /// `utm_campaign` value, decoded and lower-cased.
    Name(String),
    /// Numeric `campaign_id` value.
    CampaignId(String),
}

/// Finds the first URL in `text` that carries a campaign hint.
///
/// ## Example
/// ```rust
/// use whisper_core::labels::{extract_utm_campaign, UtmHint};
///
/// let text = "Hola! vengo de https://shop.example/?utm_campaign=Joyeria%20Oro&x=1";
/// assert_eq!(extract_utm_campaign(text), Some(UtmHint::Name("joyeria oro".to_string())));
///
/// let text = "https://shop.example/p?campaign_id=120233445687010113";
/// assert_eq!(
///     extract_utm_campaign(text),
///     Some(UtmHint::CampaignId("120233445687010113".to_string()))
/// );
/// ```
pub fn extract_utm_campaign(text: &str) -> Option<UtmHint> {
    url_pattern()
        .find_iter(text)
        .filter_map(|m| Url::parse(m.as_str()).ok())
        .find_map(|url| hint_from_url(&url))
}

fn hint_from_url(url: &Url) -> Option<UtmHint> {
    let mut campaign_id = None;

    for (key, value) in url.query_pairs() {
        match &*key {
            "utm_campaign" if !value.is_empty() => {
                return Some(UtmHint::Name(value.to_lowercase()));
            }
            "campaign_id" if campaign_id.is_none() => {
                campaign_id = Some(value.into_owned());
            }
            _ => {}
        }
    }

    campaign_id
        .filter(|id| id.len() >= MIN_CAMPAIGN_ID_DIGITS && id.chars().all(|c| c.is_ascii_digit()))
        .map(UtmHint::CampaignId)
}

// =============================================================================
// Text Normalization
// =============================================================================

/// Lower-cases and strips diacritics so "Joyería" matches "joyeria".
pub fn normalize_label_text(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| !is_combining_mark(*c))
        .map(fold_accent)
        .collect()
}

#[inline]
fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Base letter of an accented lower-case Latin-1 letter.
///
/// Covers Spanish and the other Western European accents. Precomposed
/// letters outside Latin-1 (`ō`, `ś`, `ł`, ...) pass through unchanged; the
/// same letters written as base + combining mark are still folded by
/// [`normalize_label_text`].
fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

// =============================================================================
// Keyword Families
// =============================================================================

/// Product family inferred from message keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordFamily {
    Balineria,
    Joyeria,
}

impl KeywordFamily {
    /// Checked in this order; the first family with a keyword hit wins.
    pub const PRIORITY: [KeywordFamily; 2] = [KeywordFamily::Balineria, KeywordFamily::Joyeria];

    pub const fn as_str(&self) -> &'static str {
        match self {
            KeywordFamily::Balineria => "balineria",
            KeywordFamily::Joyeria => "joyeria",
        }
    }

    /// Normalized keywords for this family.
    pub const fn keywords(&self) -> &'static [&'static str] {
        match self {
            KeywordFamily::Balineria => &["balineria", "balines", "balin"],
            KeywordFamily::Joyeria => &[
                "joyeria", "collar", "aretes", "anillo", "cadena", "pulsera", "dije",
            ],
        }
    }

    /// `category:<family>` inbox label.
    pub fn category_label(&self) -> String {
        format!("{CATEGORY_PREFIX}{}", self.as_str())
    }
}

impl fmt::Display for KeywordFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detects the keyword family of free text.
pub fn detect_keyword_family(text: &str) -> Option<KeywordFamily> {
    let normalized = normalize_label_text(text);

    KeywordFamily::PRIORITY
        .into_iter()
        .find(|family| family.keywords().iter().any(|k| normalized.contains(k)))
}

// =============================================================================
// Campaign Picking
// =============================================================================

/// Picks the listing whose name contains `key`.
///
/// Active listings beat paused ones, then the most recently updated (or
/// created) wins. Listings without any timestamp rank last. Remaining
/// ties go to the earliest listing.
pub fn pick_best_campaign<'a>(listings: &'a [CampaignListing], key: &str) -> Option<&'a CampaignListing> {
    let key = normalize_label_text(key);

    listings
        .iter()
        .filter(|listing| normalize_label_text(&listing.name).contains(&key))
        .min_by_key(|listing| (!listing.is_active(), std::cmp::Reverse(listing.recency())))
}

fn joined_text<S: AsRef<str>>(messages: &[S]) -> Option<String> {
    let text = messages
        .iter()
        .map(AsRef::as_ref)
        .filter(|m| !m.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Resolves a campaign label for a conversation's messages.
pub fn campaign_label_for_messages<S: AsRef<str>>(
    messages: &[S],
    listings: &[CampaignListing],
) -> Option<CampaignLabel> {
    let text = joined_text(messages)?;
    if listings.is_empty() {
        return None;
    }

    match extract_utm_campaign(&text) {
        Some(UtmHint::CampaignId(id)) => return Some(CampaignLabel::new(id)),
        Some(UtmHint::Name(name)) => {
            if let Some(listing) = pick_best_campaign(listings, &name) {
                return Some(CampaignLabel::new(listing.id.clone()));
            }
        }
        None => {}
    }

    let family = detect_keyword_family(&text)?;
    pick_best_campaign(listings, family.as_str()).map(|listing| CampaignLabel::new(listing.id.clone()))
}

/// Resolves a `category:<family>` label for a conversation's messages.
pub fn category_label_for_messages<S: AsRef<str>>(messages: &[S]) -> Option<String> {
    let text = joined_text(messages)?;
    detect_keyword_family(&text).map(|family| family.category_label())
}

// =============================================================================
// Unit Tests
// =============================================================================
