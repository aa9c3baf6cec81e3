//! Data models for roadmap entities.
//!
//! This module defines the core data structures:
//! - `Feature` - A roadmap item with RICE inputs, workflow status and priority
//! - `FeatureDraft` - The attributes collected before a feature gets an id
//! - `DragPayload` - The serialized copy of a feature carried during a kanban drag
//! - `FeatureCommand` - Whole-record mutation requests emitted by the UI layer
//!
//! Records are serialized with camelCase keys so that lists written by the
//! browser build of the app can be read back unchanged.

pub mod scoring;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub use scoring::{Quadrant, ScoreInputs};

/// Workflow status of a feature (kanban column).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureStatus {
    #[default]
    Backlog,
    Todo,
    InProgress,
    Done,
}

impl FeatureStatus {
    /// All statuses in board order.
    pub const ALL: [FeatureStatus; 4] = [
        FeatureStatus::Backlog,
        FeatureStatus::Todo,
        FeatureStatus::InProgress,
        FeatureStatus::Done,
    ];

    /// Parse a stored status value, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "BACKLOG" => Some(Self::Backlog),
            "TODO" | "TO_DO" => Some(Self::Todo),
            "IN_PROGRESS" | "INPROGRESS" => Some(Self::InProgress),
            "DONE" => Some(Self::Done),
            _ => None,
        }
    }

    /// Parse a stored status value, falling back to `Backlog` for anything unknown.
    pub fn normalize(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }

    /// Stored representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backlog => "BACKLOG",
            Self::Todo => "TODO",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
        }
    }

    /// Display label used on badges and column headers.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Backlog => "Backlog",
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }
}

impl fmt::Display for FeatureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl<'de> Deserialize<'de> for FeatureStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(value
            .as_ref()
            .and_then(|v| v.as_str())
            .map(FeatureStatus::normalize)
            .unwrap_or_default())
    }
}

/// Priority level used to order kanban columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    /// Sort weight: urgent=4, high=3, medium=2, low=1.
    pub fn weight(&self) -> u8 {
        match self {
            Self::Urgent => 4,
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Weight of an optional priority; unknown or missing priorities weigh 0.
pub fn priority_weight(priority: Option<Priority>) -> u8 {
    priority.map(|p| p.weight()).unwrap_or(0)
}

/// A feature on the product roadmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    /// Unique identifier (e.g., "ft-a1b2", or a millisecond timestamp for
    /// records created by the browser build)
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,

    /// Display name
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,

    /// Workflow status; unknown values read as `Backlog`
    #[serde(default)]
    pub status: FeatureStatus,

    /// Priority used for kanban ordering
    #[serde(
        default,
        deserialize_with = "lenient::priority",
        skip_serializing_if = "Option::is_none"
    )]
    pub priority: Option<Priority>,

    /// Users reached per quarter, expected 0-1000
    #[serde(default, deserialize_with = "lenient::number")]
    pub reach: f64,

    /// Contribution to the objective, expected 0-3
    #[serde(default, deserialize_with = "lenient::number")]
    pub impact: f64,

    /// Confidence in the estimates, percent 0-100
    #[serde(default, deserialize_with = "lenient::number")]
    pub confidence: f64,

    /// Work required in weeks, expected 1-8
    #[serde(default = "default_effort", deserialize_with = "lenient::effort")]
    pub effort: f64,

    /// Target date
    #[serde(
        default,
        deserialize_with = "lenient::date",
        skip_serializing_if = "Option::is_none"
    )]
    pub deadline: Option<NaiveDate>,

    #[serde(default, deserialize_with = "lenient::number")]
    pub business_value: f64,

    #[serde(default, deserialize_with = "lenient::number")]
    pub user_value: f64,

    #[serde(default, deserialize_with = "lenient::number")]
    pub technical_complexity: f64,

    #[serde(default, deserialize_with = "lenient::text")]
    pub risks: String,

    /// Business impact rating for the simple score (1-5)
    #[serde(default = "default_rating", deserialize_with = "lenient::rating")]
    pub business_impact: f64,

    /// Urgency rating for the simple score (1-5)
    #[serde(default = "default_rating", deserialize_with = "lenient::rating")]
    pub urgency: f64,

    /// Whether work on the feature is blocked
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_blocked: bool,

    /// Why the feature is blocked; empty when not blocked
    #[serde(default, deserialize_with = "lenient::text")]
    pub block_reason: String,
}

fn default_effort() -> f64 {
    1.0
}

fn default_rating() -> f64 {
    3.0
}

impl Feature {
    /// Create a new feature with the given ID and name and form defaults.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::from_draft(id, FeatureDraft::new(name))
    }

    /// Create a feature from a draft, assigning it an id.
    pub fn from_draft(id: impl Into<String>, draft: FeatureDraft) -> Self {
        Self {
            id: id.into(),
            name: draft.name,
            status: draft.status,
            priority: draft.priority,
            reach: draft.reach,
            impact: draft.impact,
            confidence: draft.confidence,
            effort: draft.effort,
            deadline: draft.deadline,
            business_value: 0.0,
            user_value: 0.0,
            technical_complexity: 0.0,
            risks: String::new(),
            business_impact: draft.business_impact,
            urgency: draft.urgency,
            is_blocked: false,
            block_reason: String::new(),
        }
    }

    /// RICE inputs of this feature.
    pub fn score_inputs(&self) -> ScoreInputs {
        ScoreInputs {
            reach: self.reach,
            impact: self.impact,
            confidence: self.confidence,
            effort: self.effort,
        }
    }

    /// Raw RICE score used by the matrix for ranking.
    pub fn raw_score(&self) -> f64 {
        self.score_inputs().raw()
    }

    /// RICE score normalized to 0-100, as shown on the kanban board.
    pub fn rice_score(&self) -> f64 {
        self.score_inputs().normalized()
    }

    /// Score from the form's simple value/effort framework.
    pub fn simple_score(&self) -> f64 {
        scoring::simple_score(self.business_impact, self.urgency, self.effort)
    }

    /// Matrix quadrant for this feature's impact and effort.
    pub fn quadrant(&self) -> Quadrant {
        Quadrant::classify(self.impact, self.effort)
    }

    pub fn priority_weight(&self) -> u8 {
        priority_weight(self.priority)
    }

    /// Check the record-level invariants.
    pub fn validate(&self) -> crate::Result<()> {
        if self.name.trim().is_empty() {
            return Err(crate::Error::InvalidInput(
                "feature name must not be empty".to_string(),
            ));
        }
        if self.is_blocked && self.block_reason.trim().is_empty() {
            return Err(crate::Error::InvalidInput(format!(
                "feature {} is blocked without a reason",
                self.id
            )));
        }
        Ok(())
    }
}

/// Attributes collected for a feature before it is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDraft {
    pub name: String,
    pub status: FeatureStatus,
    pub priority: Option<Priority>,
    pub reach: f64,
    pub impact: f64,
    pub confidence: f64,
    pub effort: f64,
    pub deadline: Option<NaiveDate>,
    pub business_impact: f64,
    pub urgency: f64,
}

impl FeatureDraft {
    /// A draft with the form defaults: backlog, medium priority, zero RICE
    /// inputs and an effort of 1.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: FeatureStatus::Backlog,
            priority: Some(Priority::Medium),
            reach: 0.0,
            impact: 0.0,
            confidence: 0.0,
            effort: 1.0,
            deadline: None,
            business_impact: 3.0,
            urgency: 3.0,
        }
    }
}

/// A sanitized copy of a feature carried as kanban drag data.
///
/// `Feature` holds no derived data, so serializing it is the whitelist:
/// scores and click areas never travel with the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DragPayload {
    pub feature: Feature,
}

impl DragPayload {
    pub fn new(feature: &Feature) -> Self {
        Self {
            feature: feature.clone(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_json(data: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(data)?)
    }
}

/// A whole-record mutation request passed up to the feature store.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureCommand {
    /// Replace the feature with the same id
    Update(Feature),
    /// Remove the feature with this id
    Delete(String),
}

/// Receiver of feature mutations (the store, or a test double).
pub trait FeatureSink {
    fn update_feature(&mut self, feature: Feature);

    fn delete_feature(&mut self, id: &str);

    /// Dispatch a command to the matching callback.
    fn apply(&mut self, command: FeatureCommand) {
        match command {
            FeatureCommand::Update(feature) => self.update_feature(feature),
            FeatureCommand::Delete(id) => self.delete_feature(&id),
        }
    }
}

/// Deserializers that coerce loosely typed stored values instead of failing.
mod lenient {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::Priority;

    fn to_number(value: &Value) -> Option<f64> {
        let n = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }?;
        n.is_finite().then_some(n)
    }

    pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(to_number).unwrap_or(0.0))
    }

    /// Effort falls back to 1 when missing, non-numeric or zero.
    pub fn effort<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value
            .as_ref()
            .and_then(to_number)
            .filter(|n| *n != 0.0)
            .unwrap_or(1.0))
    }

    pub fn rating<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(to_number).unwrap_or(3.0))
    }

    pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(serde::de::Error::custom(format!(
                "feature id must be a string or number, got {}",
                other
            ))),
        }
    }

    pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        })
    }

    /// Booleans and `"true"`/`"false"` strings; anything else reads as false.
    pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Bool(b)) => b,
            Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
            _ => false,
        })
    }

    pub fn priority<'de, D>(deserializer: D) -> Result<Option<Priority>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(|v| v.as_str()).and_then(Priority::parse))
    }

    /// Accepts `YYYY-MM-DD` or a full timestamp; empty strings mean no date.
    pub fn date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value
            .as_ref()
            .and_then(|v| v.as_str())
            .and_then(super::parse_date))
    }
}

/// Parse a deadline in `YYYY-MM-DD` form, or the date part of a timestamp.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| s.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
}

/// A stored feature collection split into readable features and the raw
/// records that could not be read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedFeatures {
    pub features: Vec<Feature>,
    /// Records kept verbatim so they survive a rewrite of the collection
    pub unreadable: Vec<serde_json::Value>,
}

/// Decode a stored feature collection (a JSON array of records).
///
/// Content that is not a JSON array is an error.
pub fn decode_collection(content: &str) -> crate::Result<DecodedFeatures> {
    let values: Vec<serde_json::Value> = serde_json::from_str(content)?;
    let mut decoded = DecodedFeatures::default();
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<Feature>(value.clone()) {
            Ok(feature) => decoded.features.push(feature),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping unreadable feature record");
                decoded.unreadable.push(value);
            }
        }
    }
    Ok(decoded)
}

/// The stored records for `features`, followed by the unreadable records
/// carried over from the last decode.
pub fn encode_collection(
    features: &[Feature],
    unreadable: &[serde_json::Value],
) -> crate::Result<Vec<serde_json::Value>> {
    let mut records = features
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    records.extend(unreadable.iter().cloned());
    Ok(records)
}

/// Decode a stored feature collection, dropping records that cannot be read.
pub fn decode_features(content: &str) -> crate::Result<Vec<Feature>> {
    Ok(decode_collection(content)?.features)
}

/// Default `strftime` pattern for deadline labels.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a deadline with a `strftime` pattern.
///
/// Patterns chrono cannot apply to a plain date (time fields, bad
/// specifiers) fall back to [`DEFAULT_DATE_FORMAT`].
pub fn format_date(date: NaiveDate, pattern: &str) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    if write!(out, "{}", date.format(pattern)).is_ok() {
        return out;
    }
    date.format(DEFAULT_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_normalizes_unknown_to_backlog() {
        assert_eq!(FeatureStatus::normalize("IN_PROGRESS"), FeatureStatus::InProgress);
        assert_eq!(FeatureStatus::normalize("done"), FeatureStatus::Done);
        assert_eq!(FeatureStatus::normalize("ARCHIVED"), FeatureStatus::Backlog);
        assert_eq!(FeatureStatus::normalize(""), FeatureStatus::Backlog);
    }

    #[test]
    fn test_priority_weight() {
        assert_eq!(priority_weight(Some(Priority::Urgent)), 4);
        assert_eq!(priority_weight(Some(Priority::High)), 3);
        assert_eq!(priority_weight(Some(Priority::Medium)), 2);
        assert_eq!(priority_weight(Some(Priority::Low)), 1);
        assert_eq!(priority_weight(None), 0);
    }

    #[test]
    fn test_deserialize_browser_record() {
        let json = r#"{
            "id": 1717171717171,
            "name": "Dark mode",
            "reach": "500",
            "impact": "2",
            "confidence": "80",
            "effort": "",
            "status": "WHATEVER",
            "priority": "urgent",
            "deadline": "",
            "isBlocked": false,
            "blockReason": null,
            "score": 12.5,
            "clickArea": {"x": 1, "y": 2, "width": 3, "height": 4}
        }"#;
        let feature: Feature = serde_json::from_str(json).unwrap();
        assert_eq!(feature.id, "1717171717171");
        assert_eq!(feature.reach, 500.0);
        assert_eq!(feature.impact, 2.0);
        assert_eq!(feature.confidence, 80.0);
        assert_eq!(feature.effort, 1.0);
        assert_eq!(feature.status, FeatureStatus::Backlog);
        assert_eq!(feature.priority, Some(Priority::Urgent));
        assert_eq!(feature.deadline, None);
        assert_eq!(feature.block_reason, "");
        assert_eq!(feature.business_impact, 3.0);
    }

    #[test]
    fn test_missing_numbers_coerce_to_defaults() {
        let feature: Feature = serde_json::from_str(r#"{"id": "ft-0001", "name": "x"}"#).unwrap();
        assert_eq!(feature.reach, 0.0);
        assert_eq!(feature.impact, 0.0);
        assert_eq!(feature.confidence, 0.0);
        assert_eq!(feature.effort, 1.0);
        assert_eq!(feature.priority, None);
    }

    #[test]
    fn test_serialize_uses_camel_case_and_drops_derived_data() {
        let mut feature = Feature::new("ft-0001", "Search");
        feature.is_blocked = true;
        feature.block_reason = "Waiting on API".to_string();
        feature.deadline = NaiveDate::from_ymd_opt(2026, 3, 1);
        let json = serde_json::to_value(&feature).unwrap();
        assert_eq!(json["isBlocked"], true);
        assert_eq!(json["blockReason"], "Waiting on API");
        assert_eq!(json["status"], "BACKLOG");
        assert_eq!(json["deadline"], "2026-03-01");
        assert!(json.get("score").is_none());
        assert!(json.get("clickArea").is_none());
    }

    #[test]
    fn test_drag_payload_round_trips_through_json() {
        let mut feature = Feature::new("ft-0002", "Export");
        feature.status = FeatureStatus::Todo;
        let payload = DragPayload::new(&feature).to_json();
        let parsed = DragPayload::from_json(&payload).unwrap();
        assert_eq!(parsed.feature, feature);
    }

    #[test]
    fn test_validate_requires_reason_when_blocked() {
        let mut feature = Feature::new("ft-0003", "Billing");
        assert!(feature.validate().is_ok());
        feature.is_blocked = true;
        assert!(feature.validate().is_err());
        feature.block_reason = "Legal review".to_string();
        assert!(feature.validate().is_ok());
    }

    #[test]
    fn test_parse_date_accepts_timestamps() {
        assert_eq!(parse_date("2026-01-05"), NaiveDate::from_ymd_opt(2026, 1, 5));
        assert_eq!(
            parse_date("2026-01-05T10:00:00.000Z"),
            NaiveDate::from_ymd_opt(2026, 1, 5)
        );
        assert_eq!(parse_date("soon"), None);
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(format_date(date, DEFAULT_DATE_FORMAT), "2026-03-09");
        assert_eq!(format_date(date, "%d/%m/%Y"), "09/03/2026");
        assert_eq!(format_date(date, "%H:%M"), "2026-03-09");
    }

    #[test]
    fn test_loose_flags_and_names() {
        let json = r#"[
            {"id": 1, "name": null, "isBlocked": null},
            {"id": 2, "name": 42, "isBlocked": "true", "blockReason": "Legal"},
            {"id": 3, "name": "Search", "isBlocked": 1}
        ]"#;
        let features = decode_features(json).unwrap();
        assert_eq!(features.len(), 3);
        assert_eq!(features[0].name, "");
        assert!(!features[0].is_blocked);
        assert_eq!(features[1].name, "42");
        assert!(features[1].is_blocked);
        assert!(!features[2].is_blocked);
    }

    #[test]
    fn test_decode_collection_keeps_unreadable_records() {
        let decoded =
            decode_collection(r#"[{"id": 7, "name": "Search"}, 42, {"name": "no id"}]"#).unwrap();
        assert_eq!(decoded.features.len(), 1);
        assert_eq!(
            decoded.unreadable,
            vec![serde_json::json!(42), serde_json::json!({"name": "no id"})]
        );
    }

    #[test]
    fn test_decode_features() {
        let features =
            decode_features(r#"[{"id": 7, "name": "Search"}, 42, {"name": "no id"}]"#).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].id, "7");
        assert!(decode_features("{}").is_err());
        assert!(decode_features("[]").unwrap().is_empty());
    }
}
