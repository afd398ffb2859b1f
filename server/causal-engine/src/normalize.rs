//! Validate inbound snapshot records and convert them into the domain model.
//!
//! Referential integrity is not checked here: links to missing instances are
//! legal input and are dropped later by aggregation.

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::error::EngineError;
use crate::types::*;

/// Parse and normalize an InboundSnapshot into a Snapshot.
pub fn normalize(raw: &InboundSnapshot) -> Result<Snapshot, EngineError> {
  let event_types = raw
    .event_types
    .iter()
    .enumerate()
    .map(|(i, t)| normalize_type(i, t))
    .collect::<Result<Vec<_>, _>>()?;

  let event_instances = raw
    .event_instances
    .iter()
    .enumerate()
    .map(|(i, e)| normalize_instance(i, e))
    .collect::<Result<Vec<_>, _>>()?;

  let event_links = raw
    .event_links
    .iter()
    .enumerate()
    .map(|(i, l)| normalize_link(i, l))
    .collect::<Result<Vec<_>, _>>()?;

  Ok(Snapshot {
    event_types,
    event_instances,
    event_links,
  })
}

/// Apply per-request overrides on top of `base`.
pub fn resolve_config(base: &Config, raw: &InboundSnapshot) -> Result<Config, EngineError> {
  let mut config = base.clone();

  if let Some(options) = &raw.options {
    if let Some(v) = options.min_matched_pairs {
      config.min_matched_pairs = v;
    }
    if let Some(v) = options.min_rate_ratio {
      if !v.is_finite() || v < 0.0 {
        return Err(EngineError::validation(
          "options.min_rate_ratio",
          "must be a finite number >= 0",
        ));
      }
      config.min_rate_ratio = v;
    }
    if let Some(v) = options.min_count_from {
      config.min_count_from = v;
    }
    if let Some(v) = options.min_count_to {
      config.min_count_to = v;
    }
  }

  if let Some(settings) = &raw.settings {
    if let Some(v) = settings.edge_threshold {
      if !(0.0..=1.0).contains(&v) {
        return Err(EngineError::validation(
          "settings.edge_threshold",
          "must be within 0..=1",
        ));
      }
      config.edge_threshold = v;
    }
    if let Some(v) = settings.insight_max_user_links {
      config.insight_max_user_links = v;
    }
  }

  Ok(config)
}

fn normalize_type(i: usize, raw: &InboundEventType) -> Result<EventType, EngineError> {
  let field = |name: &str| format!("event_types[{}].{}", i, name);

  require_non_empty(&raw.id, || field("id"))?;
  if raw.label.trim().is_empty() {
    return Err(EngineError::validation(field("label"), "must not be empty"));
  }
  let category = Category::from_str_loose(&raw.category).ok_or_else(|| {
    EngineError::validation(
      field("category"),
      "expected action|symptom|mood|situation|other",
    )
  })?;

  Ok(EventType {
    id: raw.id.clone(),
    label: raw.label.trim().to_string(),
    category,
    emoji: raw.emoji.clone().filter(|e| !e.is_empty()),
    color: raw.color.clone().filter(|c| !c.is_empty()),
    created_at: parse_timestamp(&raw.created_at, || field("created_at"))?,
    is_built_in: raw.is_built_in,
  })
}

fn normalize_instance(i: usize, raw: &InboundInstance) -> Result<EventInstance, EngineError> {
  let field = |name: &str| format!("event_instances[{}].{}", i, name);

  require_non_empty(&raw.id, || field("id"))?;
  require_non_empty(&raw.event_type_id, || field("event_type_id"))?;

  let intensity = match raw.intensity {
    Some(v @ 1..=5) => Some(v as u8),
    Some(_) => return Err(EngineError::validation(field("intensity"), "expected 1..=5")),
    None => None,
  };

  Ok(EventInstance {
    id: raw.id.clone(),
    event_type_id: raw.event_type_id.clone(),
    timestamp: parse_timestamp(&raw.timestamp_utc, || field("timestamp_utc"))?,
    local_offset_minutes: raw.local_offset_minutes,
    intensity,
    note: raw.note.clone().filter(|n| !n.trim().is_empty()),
  })
}

fn normalize_link(i: usize, raw: &InboundLink) -> Result<EventLink, EngineError> {
  let field = |name: &str| format!("event_links[{}].{}", i, name);

  require_non_empty(&raw.id, || field("id"))?;
  require_non_empty(&raw.from_event_id, || field("from_event_id"))?;
  require_non_empty(&raw.to_event_id, || field("to_event_id"))?;

  if let Some(c) = raw.confidence {
    if !(0.0..=1.0).contains(&c) {
      return Err(EngineError::validation(field("confidence"), "must be within 0..=1"));
    }
  }

  Ok(EventLink {
    id: raw.id.clone(),
    from_event_id: raw.from_event_id.clone(),
    to_event_id: raw.to_event_id.clone(),
    created_at: parse_timestamp(&raw.created_at, || field("created_at"))?,
    confidence: raw.confidence,
  })
}

fn parse_timestamp(value: &str, field: impl FnOnce() -> String) -> Result<DateTime<Utc>, EngineError> {
  DateTime::parse_from_rfc3339(value)
    .map(|ts| ts.with_timezone(&Utc))
    .map_err(|e| EngineError::validation(field(), format!("invalid RFC3339: {}", e)))
}

fn require_non_empty(value: &str, field: impl FnOnce() -> String) -> Result<(), EngineError> {
  if value.trim().is_empty() {
    return Err(EngineError::validation(field(), "must not be empty"));
  }
  Ok(())
}
