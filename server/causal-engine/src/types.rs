//! Core types for the causal engine (JSON contracts + domain model + edge statistics).

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Inbound types (JSON contract: what the caller sends)
// ---------------------------------------------------------------------------

/// One inbound snapshot line from stdin. Unknown fields are silently ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundSnapshot {
  #[serde(default)]
  pub event_types: Vec<InboundEventType>,
  #[serde(default)]
  pub event_instances: Vec<InboundInstance>,
  #[serde(default)]
  pub event_links: Vec<InboundLink>,
  #[serde(default)]
  pub options: Option<InboundOptions>,
  #[serde(default)]
  pub settings: Option<InboundSettings>,
  /// When set, the report carries incoming/outgoing views for this type.
  #[serde(default)]
  pub focus_type_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundEventType {
  pub id: String,
  pub label: String,
  pub category: String,
  #[serde(default)]
  pub emoji: Option<String>,
  #[serde(default)]
  pub color: Option<String>,
  pub created_at: String,
  #[serde(default)]
  pub is_built_in: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundInstance {
  pub id: String,
  pub event_type_id: String,
  pub timestamp_utc: String,
  #[serde(default)]
  pub local_offset_minutes: i32,
  #[serde(default)]
  pub intensity: Option<i64>,
  #[serde(default)]
  pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundLink {
  pub id: String,
  pub from_event_id: String,
  pub to_event_id: String,
  pub created_at: String,
  #[serde(default)]
  pub confidence: Option<f64>,
}

/// Per-request overrides for the inference thresholds.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundOptions {
  #[serde(default)]
  pub min_matched_pairs: Option<usize>,
  #[serde(default)]
  pub min_rate_ratio: Option<f64>,
  #[serde(default)]
  pub min_count_from: Option<usize>,
  #[serde(default)]
  pub min_count_to: Option<usize>,
}

/// Per-request overrides coming from user settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundSettings {
  #[serde(default)]
  pub edge_threshold: Option<f64>,
  #[serde(default)]
  pub insight_max_user_links: Option<usize>,
}

// ---------------------------------------------------------------------------
// Domain model (normalized)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
  Action,
  Symptom,
  Mood,
  Situation,
  Other,
}

impl Category {
  pub fn from_str_loose(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "action" => Some(Self::Action),
      "symptom" => Some(Self::Symptom),
      "mood" => Some(Self::Mood),
      "situation" => Some(Self::Situation),
      "other" => Some(Self::Other),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventType {
  pub id: String,
  pub label: String,
  pub category: Category,
  pub emoji: Option<String>,
  pub color: Option<String>,
  pub created_at: DateTime<Utc>,
  pub is_built_in: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventInstance {
  pub id: String,
  pub event_type_id: String,
  pub timestamp: DateTime<Utc>,
  /// Minutes to subtract from UTC to get local time at logging time.
  pub local_offset_minutes: i32,
  /// 1..=5 when present.
  pub intensity: Option<u8>,
  pub note: Option<String>,
}

impl EventInstance {
  /// Wall-clock time where the instance was logged.
  pub fn local_time(&self) -> NaiveDateTime {
    self.timestamp.naive_utc() - Duration::minutes(i64::from(self.local_offset_minutes))
  }
}

/// A directed, instance-level "this caused that" assertion.
#[derive(Debug, Clone, PartialEq)]
pub struct EventLink {
  pub id: String,
  pub from_event_id: String,
  pub to_event_id: String,
  pub created_at: DateTime<Utc>,
  /// Carried for callers; the engine does not read it.
  pub confidence: Option<f64>,
}

/// Immutable input collections for one engine run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
  pub event_types: Vec<EventType>,
  pub event_instances: Vec<EventInstance>,
  pub event_links: Vec<EventLink>,
}

// ---------------------------------------------------------------------------
// Edge statistics
// ---------------------------------------------------------------------------

/// Composite key for one directed type pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeKey {
  pub from_type_id: String,
  pub to_type_id: String,
}

impl EdgeKey {
  pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
    Self {
      from_type_id: from.into(),
      to_type_id: to.into(),
    }
  }

  pub fn reversed(&self) -> Self {
    Self {
      from_type_id: self.to_type_id.clone(),
      to_type_id: self.from_type_id.clone(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeSource {
  User,
  Inferred,
}

/// Directed, type-level relationship between two event types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeEdgeStats {
  pub from_type_id: String,
  pub to_type_id: String,

  /// Window of elapsed hours counted as "soon after".
  pub min_hours: f64,
  pub max_hours: f64,

  pub count_from: usize,
  pub count_to: usize,
  pub matched_pairs: usize,

  /// Delay distribution over matched pairs; `None` means unknown.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub median_delay_hours: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub p25_delay_hours: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub p75_delay_hours: Option<f64>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub rate_inside_window_per_hour: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub rate_outside_window_per_hour: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub total_window_hours: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub total_outside_window_hours: Option<f64>,

  pub user_link_count: usize,
  pub inferred_strength: f64,
  pub edge_sources: BTreeSet<EdgeSource>,
}

impl TypeEdgeStats {
  pub fn key(&self) -> EdgeKey {
    EdgeKey::new(self.from_type_id.clone(), self.to_type_id.clone())
  }

  pub fn has_source(&self, source: EdgeSource) -> bool {
    self.edge_sources.contains(&source)
  }
}

// ---------------------------------------------------------------------------
// Output types (JSON contract: what we emit)
// ---------------------------------------------------------------------------

/// Presentation-ready description of one suggested edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightSummary {
  pub from_type_id: String,
  pub to_type_id: String,
  pub title: String,
  pub window_label: String,
  pub occurrences: usize,
  pub out_of: usize,
  pub follow_through_pct: u32,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub typical_delay_hours: Option<i64>,
  pub strength_pct: u32,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub rate_ratio: Option<f64>,
  pub evidence: Vec<String>,
}

/// Ego view around one event type.
#[derive(Debug, Clone, Serialize)]
pub struct FocusView {
  pub type_id: String,
  pub incoming: Vec<TypeEdgeStats>,
  pub outgoing: Vec<TypeEdgeStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgeReport {
  pub snapshot_id: String,
  pub edges: Vec<TypeEdgeStats>,
  pub insights: Vec<InsightSummary>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub focus: Option<FocusView>,
}

// ---------------------------------------------------------------------------
// CLI stream wrappers
// ---------------------------------------------------------------------------

/// Structured error output for invalid input lines.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      field: None,
    }
  }

  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }
}
