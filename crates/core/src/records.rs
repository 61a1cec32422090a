//! Input record types handed to the analytics engine.
//!
//! These are read-only snapshots fetched by the data-access layer. Optional
//! fields are resolved to their documented defaults here, at the boundary,
//! so the algorithms never branch on missing or loosely-typed data.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Utilization assumed for an asset that reports none (percent).
pub const DEFAULT_UTILIZATION_RATE: f64 = 50.0;

/// Quantity assumed for a requirement that does not state one.
pub const DEFAULT_QUANTITY_NEEDED: u32 = 1;

// ---------------------------------------------------------------------------
// Specification values
// ---------------------------------------------------------------------------

/// A single free-form specification value (e.g. `vram_gb: 24`, `arch: "ampere"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpecValue {
    Number(f64),
    Flag(bool),
    Text(String),
}

impl SpecValue {
    /// Numeric view of the value. Text that parses as a number counts.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(t) => t.trim().parse().ok(),
            Self::Flag(_) => None,
        }
    }

    /// Lower-cased textual view used for non-numeric comparisons.
    pub fn normalized_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Flag(b) => b.to_string(),
            Self::Text(t) => t.to_lowercase(),
        }
    }

    fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(Self::Number),
            Value::Bool(b) => Some(Self::Flag(b)),
            Value::String(s) => Some(Self::Text(s)),
            _ => None,
        }
    }
}

impl From<f64> for SpecValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for SpecValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

impl From<&str> for SpecValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Specification map keyed by attribute name. Ordered for stable output.
pub type SpecMap = BTreeMap<String, SpecValue>;

/// Normalize a raw specification payload into a [`SpecMap`].
///
/// Accepts a JSON object or a JSON string containing an object. Entries whose
/// values are not scalars are skipped; anything else yields an empty map.
pub fn spec_map_from_value(value: Value) -> SpecMap {
    match value {
        Value::Object(entries) => entries
            .into_iter()
            .filter_map(|(key, v)| SpecValue::from_json(v).map(|sv| (key, sv)))
            .collect(),
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(inner @ Value::Object(_)) => spec_map_from_value(inner),
            _ => SpecMap::new(),
        },
        _ => SpecMap::new(),
    }
}

/// Serde adapter for specification fields. Never fails on malformed content.
pub fn deserialize_spec_map<'de, D>(deserializer: D) -> Result<SpecMap, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.map(spec_map_from_value).unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

/// Lifecycle status of an asset. Unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    Available,
    InUse,
    Maintenance,
    Retired,
    #[serde(untagged)]
    Other(String),
}

/// Identifier-only view of an asset (all the demand scorer needs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    pub id: DbId,
}

/// An inventory asset snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: DbId,
    pub category_id: DbId,
    pub status: AssetStatus,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cost_per_day: f64,
    /// Percent in `0..=100`. See [`Asset::utilization`] for the resolved value.
    #[serde(default)]
    pub utilization_rate: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_spec_map")]
    pub specifications: SpecMap,
}

impl Asset {
    pub fn is_available(&self) -> bool {
        self.status == AssetStatus::Available
    }

    /// Utilization percent, defaulted and clamped into `0..=100`.
    pub fn utilization(&self) -> f64 {
        self.utilization_rate
            .unwrap_or(DEFAULT_UTILIZATION_RATE)
            .clamp(0.0, 100.0)
    }
}

/// Category-and-status view of an asset, all gap analysis reads.
///
/// Full asset records deserialize into it too; extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStock {
    pub category_id: DbId,
    pub status: AssetStatus,
}

impl CategoryStock {
    pub fn is_available(&self) -> bool {
        self.status == AssetStatus::Available
    }
}

impl From<&Asset> for CategoryStock {
    fn from(asset: &Asset) -> Self {
        Self {
            category_id: asset.category_id,
            status: asset.status.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Allocations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStatus {
    Active,
    Released,
    #[serde(untagged)]
    Other(String),
}

/// An asset handed to a team, optionally on behalf of a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Allocation {
    pub asset_id: Option<DbId>,
    pub team_id: Option<DbId>,
    pub project_id: Option<DbId>,
    pub status: Option<AllocationStatus>,
    pub actual_hours_used: Option<f64>,
}

impl Allocation {
    /// Hours used for demand weighting. Absent or zero counts as one hour.
    pub fn demand_hours(&self) -> f64 {
        match self.actual_hours_used {
            Some(h) if h != 0.0 => h,
            _ => 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Requirements
// ---------------------------------------------------------------------------

/// A project's need for units of one asset category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Requirement {
    pub category_id: DbId,
    #[serde(default)]
    pub quantity_needed: Option<u32>,
    #[serde(default)]
    pub priority: Option<String>,
}

impl Requirement {
    pub fn new(category_id: DbId, quantity_needed: u32) -> Self {
        Self {
            category_id,
            quantity_needed: Some(quantity_needed),
            priority: None,
        }
    }

    pub fn quantity(&self) -> u32 {
        self.quantity_needed.unwrap_or(DEFAULT_QUANTITY_NEEDED)
    }
}

/// Sum requirement quantities per category. Totals are widened to `u64`.
pub fn requirement_map(requirements: &[Requirement]) -> BTreeMap<DbId, u64> {
    let mut map = BTreeMap::new();
    for req in requirements {
        let total = map.entry(req.category_id).or_insert(0_u64);
        *total = total.saturating_add(u64::from(req.quantity()));
    }
    map
}

// ---------------------------------------------------------------------------
// Usage logs
// ---------------------------------------------------------------------------

/// When a usage entry was recorded: a parsed instant or raw ISO-8601 text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogTimestamp {
    At(DateTime<FixedOffset>),
    Raw(String),
}

/// Offset-carrying layouts tried after RFC 3339.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%z"];

/// Offset-free layouts.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

impl LogTimestamp {
    /// Calendar date in the timestamp's own offset, if it can be read.
    pub fn day(&self) -> Option<NaiveDate> {
        match self {
            Self::At(at) => Some(at.date_naive()),
            Self::Raw(text) => parse_day(text),
        }
    }
}

fn parse_day(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let with_offset = match text.strip_suffix('Z') {
        Some(stripped) => format!("{stripped}+00:00"),
        None => text.to_string(),
    };

    if let Ok(at) = DateTime::parse_from_rfc3339(&with_offset) {
        return Some(at.date_naive());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(at) = DateTime::parse_from_str(&with_offset, fmt) {
            return Some(at.date_naive());
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(at) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(at.date());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// One usage entry: some hours on an asset at some moment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageLog {
    pub asset_id: Option<DbId>,
    pub hours_used: Option<f64>,
    pub logged_at: Option<LogTimestamp>,
}

impl UsageLog {
    pub fn hours(&self) -> f64 {
        self.hours_used.unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// Upgrade catalog
// ---------------------------------------------------------------------------

/// A catalog asset with the prerequisites it supersedes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: DbId,
    #[serde(default)]
    pub name: String,
    pub category: String,
    #[serde(default, deserialize_with = "deserialize_spec_map")]
    pub specifications: SpecMap,
    #[serde(default)]
    pub prerequisites: Vec<DbId>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -- specification normalization --

    #[test]
    fn spec_map_from_object() {
        let map = spec_map_from_value(json!({"vram_gb": 24, "arch": "ampere", "ecc": true}));
        assert_eq!(map.get("vram_gb"), Some(&SpecValue::Number(24.0)));
        assert_eq!(map.get("arch"), Some(&SpecValue::Text("ampere".into())));
        assert_eq!(map.get("ecc"), Some(&SpecValue::Flag(true)));
    }

    #[test]
    fn spec_map_from_serialized_text() {
        let map = spec_map_from_value(json!("{\"cores\": 64}"));
        assert_eq!(map.get("cores"), Some(&SpecValue::Number(64.0)));
    }

    #[test]
    fn spec_map_from_garbage_text_is_empty() {
        assert!(spec_map_from_value(json!("not json")).is_empty());
        assert!(spec_map_from_value(json!("[1, 2]")).is_empty());
    }

    #[test]
    fn spec_map_skips_nested_values() {
        let map = spec_map_from_value(json!({"ports": [1, 2], "ram": 32, "x": null}));
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("ram"));
    }

    #[test]
    fn spec_value_numeric_text() {
        assert_eq!(SpecValue::from(" 16 ").as_number(), Some(16.0));
        assert_eq!(SpecValue::from("ampere").as_number(), None);
        assert_eq!(SpecValue::from(true).as_number(), None);
    }

    // -- asset deserialization --

    #[test]
    fn asset_defaults_resolve() {
        let asset: Asset = serde_json::from_value(json!({
            "id": 1, "category_id": 3, "status": "available"
        }))
        .unwrap();
        assert!(asset.is_available());
        assert_eq!(asset.cost_per_day, 0.0);
        assert_eq!(asset.utilization(), DEFAULT_UTILIZATION_RATE);
        assert!(asset.specifications.is_empty());
    }

    #[test]
    fn asset_unknown_status_kept() {
        let asset: Asset = serde_json::from_value(json!({
            "id": 1, "category_id": 3, "status": "on_loan", "specifications": null
        }))
        .unwrap();
        assert_eq!(asset.status, AssetStatus::Other("on_loan".into()));
        assert!(!asset.is_available());
    }

    #[test]
    fn asset_utilization_clamped() {
        let asset: Asset = serde_json::from_value(json!({
            "id": 1, "category_id": 3, "status": "in_use", "utilization_rate": 140.0
        }))
        .unwrap();
        assert_eq!(asset.status, AssetStatus::InUse);
        assert_eq!(asset.utilization(), 100.0);
    }

    // -- allocation / requirement defaults --

    #[test]
    fn demand_hours_default_to_one() {
        let mut alloc = Allocation::default();
        assert_eq!(alloc.demand_hours(), 1.0);
        alloc.actual_hours_used = Some(0.0);
        assert_eq!(alloc.demand_hours(), 1.0);
        alloc.actual_hours_used = Some(6.5);
        assert_eq!(alloc.demand_hours(), 6.5);
    }

    #[test]
    fn requirement_quantity_defaults_to_one() {
        let req: Requirement = serde_json::from_value(json!({"category_id": 2})).unwrap();
        assert_eq!(req.quantity(), DEFAULT_QUANTITY_NEEDED);
    }

    #[test]
    fn requirement_map_sums_per_category() {
        let reqs = vec![
            Requirement::new(1, 2),
            Requirement::new(2, 1),
            Requirement::new(1, 3),
        ];
        let map = requirement_map(&reqs);
        assert_eq!(map.get(&1), Some(&5));
        assert_eq!(map.get(&2), Some(&1));
    }

    #[test]
    fn requirement_map_holds_totals_beyond_u32() {
        let reqs = vec![Requirement::new(1, u32::MAX), Requirement::new(1, u32::MAX)];
        let map = requirement_map(&reqs);
        assert_eq!(map.get(&1), Some(&(2 * u64::from(u32::MAX))));
    }

    #[test]
    fn category_stock_reads_full_or_bare_records() {
        let bare: CategoryStock =
            serde_json::from_value(json!({"category_id": 3, "status": "available"})).unwrap();
        assert!(bare.is_available());

        let full: CategoryStock = serde_json::from_value(json!({
            "id": 8, "category_id": 3, "status": "in_use", "cost_per_day": 4.0
        }))
        .unwrap();
        assert_eq!(full.category_id, 3);
        assert!(!full.is_available());
    }

    // -- timestamps --

    #[test]
    fn day_from_zulu_text() {
        let ts = LogTimestamp::Raw("2024-03-05T23:10:00Z".into());
        assert_eq!(ts.day(), NaiveDate::from_ymd_opt(2024, 3, 5));
    }

    #[test]
    fn day_keeps_local_offset() {
        let ts = LogTimestamp::Raw("2024-03-05T23:10:00-05:00".into());
        assert_eq!(ts.day(), NaiveDate::from_ymd_opt(2024, 3, 5));
    }

    #[test]
    fn day_from_naive_and_date_only_text() {
        let naive = LogTimestamp::Raw("2024-03-05 08:00:00".into());
        assert_eq!(naive.day(), NaiveDate::from_ymd_opt(2024, 3, 5));
        let date = LogTimestamp::Raw("2024-03-06".into());
        assert_eq!(date.day(), NaiveDate::from_ymd_opt(2024, 3, 6));
    }

    #[test]
    fn day_from_unparsable_text_is_none() {
        assert_eq!(LogTimestamp::Raw("yesterday".into()).day(), None);
    }

    #[test]
    fn usage_log_deserializes_rfc3339_as_instant() {
        let log: UsageLog = serde_json::from_value(json!({
            "asset_id": 4, "hours_used": 3.0, "logged_at": "2024-03-05T10:00:00+00:00"
        }))
        .unwrap();
        assert!(matches!(log.logged_at, Some(LogTimestamp::At(_))));
        assert_eq!(log.hours(), 3.0);
    }
}
