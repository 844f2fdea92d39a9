use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

// --- Venue & Area -----------------------------------------------------

/// A physical establishment with a stable external identifier. Created by
/// the Seeder; updated only by the Seeder or an admin; never hard-deleted
/// (excluded via the watchlist instead).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Venue {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub area: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    #[sqlx(json)]
    pub zip_codes: Vec<String>,
    #[sqlx(json)]
    pub address_components: Value,
    #[sqlx(json)]
    pub operating_hours: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Structured address components as returned by a geocoding provider.
/// Only the fields the area classifier consumes are modeled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddressComponents {
    /// e.g. "sublocality_level_1", "sublocality"
    pub sublocality_types: Vec<String>,
    pub sublocality_name: Option<String>,
    pub zip: Option<String>,
    pub street_number: Option<String>,
    pub street_name: Option<String>,
}

/// Input to the area classifier: every geographic signal it might use.
#[derive(Debug, Clone)]
pub struct ClassifyInput<'a> {
    pub lat: f64,
    pub lng: f64,
    pub full_address: &'a str,
    pub components: &'a AddressComponents,
}

/// A named neighborhood with a bounding box, center, radius, and zip set.
/// Static config; reloaded at process start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
    pub name: String,
    pub display_name: String,
    pub bounds: Bounds,
    pub center: (f64, f64),
    pub radius_m: f64,
    pub zip_codes: HashSet<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        self.south <= lat && lat <= self.north && self.west <= lng && lng <= self.east
    }

    pub fn area(&self) -> f64 {
        (self.north - self.south) * (self.east - self.west)
    }
}

impl Area {
    pub fn validate(&self) -> Result<(), String> {
        if self.bounds.south >= self.bounds.north {
            return Err(format!("area {}: south >= north", self.name));
        }
        if self.bounds.west >= self.bounds.east {
            return Err(format!("area {}: west >= east", self.name));
        }
        if !self.bounds.contains(self.center.0, self.center.1) {
            return Err(format!("area {}: center outside bounds", self.name));
        }
        Ok(())
    }
}

// --- Raw / merged / trimmed documents ----------------------------------

/// One page within a merged or trimmed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedPage {
    pub url: String,
    pub html: String,
    pub hash: String,
    #[serde(rename = "downloadedAt")]
    pub downloaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedDocument {
    #[serde(rename = "venueId")]
    pub venue_id: String,
    #[serde(rename = "venueName")]
    pub venue_name: String,
    #[serde(rename = "venueArea")]
    pub venue_area: Option<String>,
    pub website: Option<String>,
    #[serde(rename = "scrapedAt")]
    pub scraped_at: DateTime<Utc>,
    pub pages: Vec<MergedPage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrimmedPage {
    pub url: String,
    pub text: String,
    pub hash: String,
    #[serde(rename = "downloadedAt")]
    pub downloaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrimmedDocument {
    #[serde(rename = "venueId")]
    pub venue_id: String,
    #[serde(rename = "venueName")]
    pub venue_name: String,
    #[serde(rename = "venueArea")]
    pub venue_area: Option<String>,
    pub website: Option<String>,
    #[serde(rename = "scrapedAt")]
    pub scraped_at: DateTime<Utc>,
    pub pages: Vec<TrimmedPage>,
}

// --- Gold -----------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(type_name = "text", rename_all = "kebab-case")]
pub enum ExtractionMethod {
    #[serde(rename = "llm-bulk")]
    #[sqlx(rename = "llm-bulk")]
    Bulk,
    #[serde(rename = "llm-incremental")]
    #[sqlx(rename = "llm-incremental")]
    Incremental,
}

/// One promotional entry as returned by the extractor's LLM call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PromotionEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub days: Option<String>,
    pub times: Option<String>,
    pub label: Option<String>,
    #[serde(default)]
    pub specials: Vec<String>,
}

/// Sum type for the dynamic gold/promotions shape (design note: model as
/// `NotFound | Found { entries }`, not a loosely-typed JSON blob). The wire
/// representation is `{ found: bool, entries: [...] }`, read permissively
/// (unknown fields ignored) and written canonically.
#[derive(Debug, Clone, PartialEq)]
pub enum Promotions {
    NotFound,
    Found(Vec<PromotionEntry>),
}

impl Promotions {
    pub fn found(&self) -> bool {
        matches!(self, Promotions::Found(_))
    }

    pub fn entries(&self) -> &[PromotionEntry] {
        match self {
            Promotions::NotFound => &[],
            Promotions::Found(entries) => entries,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct PromotionsWire {
    found: bool,
    #[serde(default)]
    entries: Vec<PromotionEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reasoning: Option<String>,
}

impl Serialize for Promotions {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let wire = PromotionsWire {
            found: self.found(),
            entries: self.entries().to_vec(),
            reasoning: None,
        };
        wire.serialize(s)
    }
}

impl<'de> Deserialize<'de> for Promotions {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let wire = PromotionsWire::deserialize(d)?;
        Ok(if wire.found && !wire.entries.is_empty() {
            Promotions::Found(wire.entries)
        } else if wire.found {
            // found=true with no entries is still a terminal, valid answer.
            Promotions::Found(Vec::new())
        } else {
            Promotions::NotFound
        })
    }
}

/// Per-venue LLM extraction result. `source_hash` identifies the exact
/// trimmed content that produced this record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldRecord {
    #[serde(rename = "venueId")]
    pub venue_id: String,
    #[serde(rename = "venueName")]
    pub venue_name: String,
    #[serde(rename = "extractedAt")]
    pub extracted_at: DateTime<Utc>,
    #[serde(rename = "extractionMethod")]
    pub extraction_method: ExtractionMethod,
    #[serde(rename = "sourceHash")]
    pub source_hash: String,
    #[serde(rename = "sourceModifiedAt")]
    pub source_modified_at: DateTime<Utc>,
    #[serde(rename = "needsLLM")]
    pub needs_llm: bool,
    pub confidence: f32,
    pub promotions: Promotions,
}

// --- Spot --------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum SpotSource {
    Automated,
    User,
    Discovery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum SpotStatus {
    Pending,
    Approved,
    Denied,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Spot {
    pub id: i64,
    pub venue_id: Option<String>,
    pub title: String,
    pub description: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub lat: f64,
    pub lng: f64,
    pub area: Option<String>,
    pub source: SpotSource,
    pub status: SpotStatus,
    pub manual_override: bool,
    #[sqlx(json(nullable))]
    pub pending_edit: Option<Value>,
    pub pending_delete: bool,
    pub photo_url: Option<String>,
    pub source_url: Option<String>,
    pub edited_at: Option<DateTime<Utc>>,
    pub promotion_time: Option<String>,
    pub confidence: f32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Watchlist / streaks / runs / reviews / audit -----------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum WatchlistStatus {
    Excluded,
    Flagged,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WatchlistEntry {
    pub venue_id: String,
    pub name: String,
    pub area: Option<String>,
    pub status: WatchlistStatus,
    pub reason: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Streak {
    pub venue_id: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub last_date: chrono::NaiveDate,
    pub streak: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
    FailedStale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Completed,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub status: StepStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PipelineRun {
    pub id: i64,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: RunStatus,
    pub run_date: String,
    #[sqlx(json)]
    pub steps: std::collections::BTreeMap<String, StepRecord>,
    pub area_filter: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum LlmDecision {
    Accept,
    Reject,
    Unsure,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ConfidenceReview {
    pub venue_id: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub period: String,
    pub heuristic_score: f32,
    pub llm_decision: Option<LlmDecision>,
    pub llm_reasoning: Option<String>,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
pub enum AuditAction {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditLogEntry {
    pub id: i64,
    pub table_name: String,
    pub row_key: String,
    pub action: AuditAction,
    pub actor: String,
    #[sqlx(json)]
    pub diff: Value,
    pub at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotions_not_found_roundtrip() {
        let p = Promotions::NotFound;
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json, serde_json::json!({"found": false, "entries": []}));
        let back: Promotions = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn promotions_found_roundtrip() {
        let p = Promotions::Found(vec![PromotionEntry {
            kind: "Happy Hour".into(),
            days: Some("Monday-Friday".into()),
            times: Some("4pm-7pm".into()),
            label: None,
            specials: vec!["$2 off drinks".into()],
        }]);
        let json = serde_json::to_value(&p).unwrap();
        let back: Promotions = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn promotions_ignores_unknown_fields_on_read() {
        let json = serde_json::json!({"found": true, "entries": [], "reasoning": "nothing here", "extra": 1});
        let p: Promotions = serde_json::from_value(json).unwrap();
        assert_eq!(p, Promotions::Found(vec![]));
    }

    #[test]
    fn bounds_contains() {
        let b = Bounds { south: 0.0, west: 0.0, north: 10.0, east: 10.0 };
        assert!(b.contains(5.0, 5.0));
        assert!(!b.contains(11.0, 5.0));
    }
}
