//! Presentation-ready summaries for suggested edges.

use crate::types::{EventType, InsightSummary, TypeEdgeStats};

/// Describe one edge using the labels in `types` (ids when a type is unknown).
pub fn summarize(edge: &TypeEdgeStats, types: &[EventType]) -> InsightSummary {
  let from_label = label_for(&edge.from_type_id, types);
  let to_label = label_for(&edge.to_type_id, types);
  let window = window_label(edge.min_hours, edge.max_hours);

  let follow_through_pct = if edge.count_from > 0 {
    (edge.matched_pairs as f64 / edge.count_from as f64 * 100.0).round() as u32
  } else {
    0
  };
  let typical_delay_hours = edge.median_delay_hours.map(|h| h.round() as i64);
  let strength_pct = (edge.inferred_strength * 100.0).round() as u32;
  let rate_ratio = rate_ratio(edge);

  let mut evidence = vec![format!(
    "\"{}\" followed \"{}\" within {} in {} of {} cases",
    to_label, from_label, window, edge.matched_pairs, edge.count_from
  )];
  if let Some(h) = typical_delay_hours {
    evidence.push(format!("typically {}h later", h));
  }
  if edge.user_link_count > 0 {
    evidence.push(format!("{} user link(s) support this", edge.user_link_count));
  }
  if let (Some(inside), Some(outside)) =
    (edge.rate_inside_window_per_hour, edge.rate_outside_window_per_hour)
  {
    evidence.push(format!(
      "{:.4} events/hour inside window vs {:.4} outside",
      inside, outside
    ));
  }

  InsightSummary {
    from_type_id: edge.from_type_id.clone(),
    to_type_id: edge.to_type_id.clone(),
    title: format!("{} → {}", from_label, to_label),
    window_label: window,
    occurrences: edge.matched_pairs,
    out_of: edge.count_from,
    follow_through_pct,
    typical_delay_hours,
    strength_pct,
    rate_ratio,
    evidence,
  }
}

/// Rounded hour bounds: "6h" when both ends round equal, "0–12h" otherwise.
pub fn window_label(min_hours: f64, max_hours: f64) -> String {
  let lo = min_hours.round() as i64;
  let hi = max_hours.round() as i64;
  if lo == hi {
    format!("{}h", lo)
  } else {
    format!("{}–{}h", lo, hi)
  }
}

/// Inside/outside rate ratio (2 decimals), when both rates are known and outside is non-zero.
fn rate_ratio(edge: &TypeEdgeStats) -> Option<f64> {
  let inside = edge.rate_inside_window_per_hour?;
  let outside = edge.rate_outside_window_per_hour.filter(|&r| r > 0.0)?;
  Some((inside / outside * 100.0).round() / 100.0)
}

fn label_for(type_id: &str, types: &[EventType]) -> String {
  types
    .iter()
    .find(|t| t.id == type_id)
    .map(|t| t.label.clone())
    .unwrap_or_else(|| type_id.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::{Category, EdgeSource};
  use chrono::{TimeZone, Utc};
  use std::collections::BTreeSet;

  fn event_type(id: &str, label: &str) -> EventType {
    EventType {
      id: id.into(),
      label: label.into(),
      category: Category::Action,
      emoji: None,
      color: None,
      created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
      is_built_in: false,
    }
  }

  fn edge() -> TypeEdgeStats {
    TypeEdgeStats {
      from_type_id: "spicy".into(),
      to_type_id: "heartburn".into(),
      min_hours: 0.0,
      max_hours: 12.0,
      count_from: 8,
      count_to: 7,
      matched_pairs: 6,
      median_delay_hours: Some(2.4),
      p25_delay_hours: Some(1.8),
      p75_delay_hours: Some(3.1),
      rate_inside_window_per_hour: Some(0.0625),
      rate_outside_window_per_hour: Some(0.0025),
      total_window_hours: Some(96.0),
      total_outside_window_hours: Some(400.0),
      user_link_count: 1,
      inferred_strength: 0.883,
      edge_sources: BTreeSet::from([EdgeSource::User, EdgeSource::Inferred]),
    }
  }

  #[test]
  fn summary_fields() {
    let types = vec![event_type("spicy", "Eat spicy food"), event_type("heartburn", "Heartburn")];
    let s = summarize(&edge(), &types);

    assert_eq!(s.title, "Eat spicy food → Heartburn");
    assert_eq!(s.window_label, "0–12h");
    assert_eq!(s.occurrences, 6);
    assert_eq!(s.out_of, 8);
    assert_eq!(s.follow_through_pct, 75);
    assert_eq!(s.typical_delay_hours, Some(2));
    assert_eq!(s.strength_pct, 88);
    assert_eq!(s.rate_ratio, Some(25.0));
    assert!(s.evidence.iter().any(|e| e.contains("1 user link(s)")));
  }

  #[test]
  fn unknown_types_fall_back_to_ids() {
    let mut e = edge();
    e.median_delay_hours = None;
    e.rate_outside_window_per_hour = None;
    let s = summarize(&e, &[]);
    assert_eq!(s.title, "spicy → heartburn");
    assert_eq!(s.typical_delay_hours, None);
    assert_eq!(s.rate_ratio, None);
  }

  #[test]
  fn window_label_collapses_equal_bounds() {
    assert_eq!(window_label(5.8, 6.2), "6h");
    assert_eq!(window_label(0.4, 3.6), "0–4h");
  }
}
