//! Infer type-level edges from timing alone.
//!
//! For every ordered pair of distinct event types, five fixed candidate windows
//! are scanned. A window qualifies when enough "to" instances have a "from"
//! antecedent inside it and the inside/outside rate ratio is high enough.
//! The strongest qualifying window becomes the edge.
//!
//! Scoring: `0.7 * clamp(rate_ratio / 10) + 0.3 * clamp(matched_pairs / 10)`.

use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use crate::config::Config;
use crate::stats;
use crate::types::{EdgeKey, EdgeSource, EventInstance, TypeEdgeStats};

/// Elapsed-hours range in which an effect counts as following a cause.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourWindow {
  pub min_hours: f64,
  pub max_hours: f64,
}

impl HourWindow {
  const fn new(min_hours: f64, max_hours: f64) -> Self {
    Self { min_hours, max_hours }
  }

  pub fn width(&self) -> f64 {
    self.max_hours - self.min_hours
  }

  pub fn contains(&self, hours: f64) -> bool {
    hours >= self.min_hours && hours <= self.max_hours
  }
}

/// Scan order matters: only a strictly stronger window replaces the current best,
/// so earlier windows win ties.
pub const CANDIDATE_WINDOWS: [HourWindow; 5] = [
  HourWindow::new(0.0, 12.0),
  HourWindow::new(0.0, 24.0),
  HourWindow::new(0.0, 48.0),
  HourWindow::new(12.0, 72.0),
  HourWindow::new(24.0, 168.0),
];

/// Floor for the outside rate; keeps the rate ratio finite.
const RATE_EPSILON: f64 = 1e-4;

/// Score of one qualifying candidate window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowScore {
  pub window: HourWindow,
  pub matched_pairs: usize,
  /// Closest-antecedent delay per matched "to" instance, sorted ascending.
  pub delays: Vec<f64>,
  pub total_window_hours: f64,
  pub total_outside_window_hours: f64,
  pub rate_inside: f64,
  pub rate_outside: f64,
  pub rate_ratio: f64,
  pub strength: f64,
}

/// Infer edges for all ordered pairs of distinct types.
///
/// `user_edges` is consulted only to skip pairs that already carry at least
/// `min_matched_pairs` user links.
pub fn infer_correlations(
  instances: &[EventInstance],
  user_edges: &BTreeMap<EdgeKey, TypeEdgeStats>,
  config: &Config,
) -> BTreeMap<EdgeKey, TypeEdgeStats> {
  let mut result = BTreeMap::new();
  if instances.len() < 2 {
    return result;
  }

  // Hours per type, sorted ascending.
  let mut by_type: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
  for instance in instances {
    by_type
      .entry(instance.event_type_id.as_str())
      .or_default()
      .push(stats::to_hours(&instance.timestamp));
  }
  for hours in by_type.values_mut() {
    stats::sort_hours(hours);
  }

  let (min_time, max_time) = by_type
    .values()
    .flat_map(|hours| hours.iter().copied())
    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), h| (lo.min(h), hi.max(h)));
  let total_hours = max_time - min_time;

  for (&from_type, from_hours) in &by_type {
    for (&to_type, to_hours) in &by_type {
      if from_type == to_type {
        continue;
      }

      let key = EdgeKey::new(from_type, to_type);
      if let Some(user_edge) = user_edges.get(&key) {
        if user_edge.user_link_count >= config.min_matched_pairs {
          trace!(from = from_type, to = to_type, "strong user evidence; inference skipped");
          continue;
        }
      }

      if from_hours.len() < config.min_count_from || to_hours.len() < config.min_count_to {
        continue;
      }

      let Some(best) = best_window(from_hours, to_hours, total_hours, config) else {
        continue;
      };

      let (p25, p50, p75) = stats::delay_quartiles(&best.delays);
      let edge = TypeEdgeStats {
        from_type_id: from_type.to_string(),
        to_type_id: to_type.to_string(),
        min_hours: best.window.min_hours,
        max_hours: best.window.max_hours,
        count_from: from_hours.len(),
        count_to: to_hours.len(),
        matched_pairs: best.matched_pairs,
        median_delay_hours: p50,
        p25_delay_hours: p25,
        p75_delay_hours: p75,
        rate_inside_window_per_hour: Some(best.rate_inside),
        rate_outside_window_per_hour: Some(best.rate_outside),
        total_window_hours: Some(best.total_window_hours),
        total_outside_window_hours: Some(best.total_outside_window_hours),
        user_link_count: 0,
        inferred_strength: best.strength,
        edge_sources: BTreeSet::from([EdgeSource::Inferred]),
      };
      result.insert(key, edge);
    }
  }

  if config.suppress_weaker_reverse {
    drop_weaker_reverse(&mut result);
  }

  result
}

/// Strongest qualifying candidate window for one pair, first-scanned on ties.
pub fn best_window(
  from_hours: &[f64],
  to_hours: &[f64],
  total_hours: f64,
  config: &Config,
) -> Option<WindowScore> {
  let mut best: Option<WindowScore> = None;
  let mut best_strength = 0.0;

  for window in CANDIDATE_WINDOWS {
    let Some(score) = score_window(from_hours, to_hours, window, total_hours, config) else {
      continue;
    };
    if score.strength > best_strength {
      best_strength = score.strength;
      best = Some(score);
    }
  }

  best
}

/// Score a single window; `None` when it fails the match-count or rate-ratio gate.
///
/// `from_hours` must be sorted ascending.
pub fn score_window(
  from_hours: &[f64],
  to_hours: &[f64],
  window: HourWindow,
  total_hours: f64,
  config: &Config,
) -> Option<WindowScore> {
  let mut delays: Vec<f64> = to_hours
    .iter()
    .filter_map(|&to| closest_antecedent(from_hours, to, window))
    .collect();

  let matched_pairs = delays.len();
  if matched_pairs < config.min_matched_pairs {
    return None;
  }

  let count_from = from_hours.len() as f64;
  let count_to = to_hours.len() as f64;

  // Exposure estimate.
  let total_window_hours = count_from * window.width();
  let total_outside_window_hours = (total_hours * count_to - total_window_hours).max(0.0);

  let rate_inside = if total_window_hours > 0.0 {
    matched_pairs as f64 / total_window_hours
  } else {
    0.0
  };
  let outside_count = (to_hours.len() - matched_pairs) as f64;
  let rate_outside = if total_outside_window_hours > 0.0 {
    outside_count / total_outside_window_hours
  } else {
    RATE_EPSILON
  };

  let rate_ratio = rate_inside / (rate_outside + RATE_EPSILON);
  if rate_ratio < config.min_rate_ratio {
    return None;
  }

  let normalized_ratio = stats::clamp(rate_ratio / 10.0, 0.0, 1.0);
  let match_factor = stats::clamp(matched_pairs as f64 / 10.0, 0.0, 1.0);
  let strength = 0.7 * normalized_ratio + 0.3 * match_factor;

  stats::sort_hours(&mut delays);
  Some(WindowScore {
    window,
    matched_pairs,
    delays,
    total_window_hours,
    total_outside_window_hours,
    rate_inside,
    rate_outside,
    rate_ratio,
    strength,
  })
}

/// Smallest delay `to - from` inside the window among sorted `from_hours`.
///
/// The latest "from" with `to - from >= min_hours` gives the smallest
/// qualifying delay; it matches only if that delay is also within `max_hours`.
fn closest_antecedent(from_hours: &[f64], to: f64, window: HourWindow) -> Option<f64> {
  let idx = from_hours.partition_point(|&from| to - from >= window.min_hours);
  let from = *from_hours.get(idx.checked_sub(1)?)?;
  let delay = to - from;
  window.contains(delay).then_some(delay)
}

/// Remove inferred edges whose reverse pair scored strictly stronger.
fn drop_weaker_reverse(edges: &mut BTreeMap<EdgeKey, TypeEdgeStats>) {
  let weaker: Vec<EdgeKey> = edges
    .iter()
    .filter(|(key, edge)| {
      edges
        .get(&key.reversed())
        .is_some_and(|reverse| reverse.inferred_strength > edge.inferred_strength)
    })
    .map(|(key, _)| key.clone())
    .collect();

  for key in weaker {
    trace!(from = %key.from_type_id, to = %key.to_type_id, "weaker than reverse edge; dropped");
    edges.remove(&key);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{Duration, TimeZone, Utc};

  fn instance(id: &str, type_id: &str, hours: i64) -> EventInstance {
    let base = Utc.with_ymd_and_hms(2025, 2, 1, 6, 0, 0).unwrap();
    EventInstance {
      id: id.into(),
      event_type_id: type_id.into(),
      timestamp: base + Duration::hours(hours),
      local_offset_minutes: 0,
      intensity: None,
      note: None,
    }
  }

  fn series(type_id: &str, hours: &[i64]) -> Vec<EventInstance> {
    hours
      .iter()
      .enumerate()
      .map(|(i, &h)| instance(&format!("{}-{}", type_id, i), type_id, h))
      .collect()
  }

  fn coffee_then_headache() -> Vec<EventInstance> {
    let mut instances = series("x", &[0, 24, 48, 72]);
    instances.extend(series("y", &[2, 26, 50, 74]));
    instances
  }

  #[test]
  fn consistent_follow_up_is_inferred() {
    let edges = infer_correlations(&coffee_then_headache(), &BTreeMap::new(), &Config::default());

    let edge = edges.get(&EdgeKey::new("x", "y")).expect("x -> y edge");
    assert_eq!(edge.matched_pairs, 4);
    assert_eq!(edge.min_hours, 0.0);
    assert_eq!(edge.max_hours, 12.0);
    assert!(edge.inferred_strength > 0.3);
    assert_eq!(edge.edge_sources, BTreeSet::from([EdgeSource::Inferred]));
    assert_eq!(edge.user_link_count, 0);
    assert_eq!(edge.median_delay_hours, Some(2.0));
    assert_eq!(edge.count_from, 4);
    assert_eq!(edge.count_to, 4);
  }

  #[test]
  fn wrong_direction_is_not_inferred() {
    let edges = infer_correlations(&coffee_then_headache(), &BTreeMap::new(), &Config::default());
    assert!(!edges.contains_key(&EdgeKey::new("y", "x")));
  }

  #[test]
  fn weaker_reverse_survives_when_suppression_disabled() {
    let config = Config {
      suppress_weaker_reverse: false,
      ..Config::default()
    };
    let edges = infer_correlations(&coffee_then_headache(), &BTreeMap::new(), &config);

    let forward = &edges[&EdgeKey::new("x", "y")];
    let reverse = &edges[&EdgeKey::new("y", "x")];
    assert_eq!(reverse.max_hours, 24.0);
    assert!(reverse.inferred_strength < forward.inferred_strength);
  }

  #[test]
  fn minimum_counts_gate_pairs() {
    let config = Config {
      min_count_from: 5,
      ..Config::default()
    };
    let edges = infer_correlations(&coffee_then_headache(), &BTreeMap::new(), &config);
    assert!(edges.is_empty());

    let config = Config {
      min_count_to: 5,
      ..Config::default()
    };
    let edges = infer_correlations(&coffee_then_headache(), &BTreeMap::new(), &config);
    assert!(edges.is_empty());
  }

  #[test]
  fn fewer_than_two_instances_yields_nothing() {
    let instances = series("x", &[0]);
    let config = Config {
      min_count_from: 0,
      min_count_to: 0,
      min_matched_pairs: 0,
      ..Config::default()
    };
    assert!(infer_correlations(&instances, &BTreeMap::new(), &config).is_empty());
    assert!(infer_correlations(&[], &BTreeMap::new(), &config).is_empty());
  }

  #[test]
  fn self_pairs_never_appear() {
    // A single type logged in a tight rhythm would otherwise "follow itself".
    let instances = series("x", &[0, 2, 4, 6, 8, 10]);
    let config = Config {
      min_count_from: 1,
      min_count_to: 1,
      min_matched_pairs: 1,
      min_rate_ratio: 0.0,
      ..Config::default()
    };
    let edges = infer_correlations(&instances, &BTreeMap::new(), &config);
    assert!(edges.keys().all(|k| k.from_type_id != k.to_type_id));
    assert!(edges.is_empty());
  }

  #[test]
  fn strong_user_evidence_skips_inference() {
    let mut user_edges = BTreeMap::new();
    let key = EdgeKey::new("x", "y");
    user_edges.insert(
      key.clone(),
      TypeEdgeStats {
        from_type_id: "x".into(),
        to_type_id: "y".into(),
        min_hours: 1.0,
        max_hours: 3.0,
        count_from: 4,
        count_to: 4,
        matched_pairs: 3,
        median_delay_hours: Some(2.0),
        p25_delay_hours: Some(2.0),
        p75_delay_hours: Some(2.0),
        rate_inside_window_per_hour: None,
        rate_outside_window_per_hour: None,
        total_window_hours: None,
        total_outside_window_hours: None,
        user_link_count: 3,
        inferred_strength: 0.0,
        edge_sources: BTreeSet::from([EdgeSource::User]),
      },
    );
    let edges = infer_correlations(&coffee_then_headache(), &user_edges, &Config::default());
    assert!(!edges.contains_key(&key));
  }

  #[test]
  fn closest_antecedent_picks_minimum_delay() {
    let from = [0.0, 5.0, 9.0];
    let window = HourWindow::new(0.0, 12.0);
    assert_eq!(closest_antecedent(&from, 10.0, window), Some(1.0));
    assert_eq!(closest_antecedent(&from, 9.0, window), Some(0.0));
    assert_eq!(closest_antecedent(&from, 30.0, window), None);

    let lagged = HourWindow::new(12.0, 72.0);
    // 9.0 and 5.0 are too recent; 0.0 sits 14h back.
    assert_eq!(closest_antecedent(&from, 14.0, lagged), Some(14.0));
    assert_eq!(closest_antecedent(&from, 11.0, lagged), None);
  }

  #[test]
  fn window_without_outside_exposure_uses_epsilon() {
    // Two "to" instances both matched; the observation range is shorter than the window.
    let config = Config {
      min_matched_pairs: 2,
      ..Config::default()
    };
    let score = score_window(&[0.0, 1.0], &[2.0, 3.0], HourWindow::new(0.0, 12.0), 3.0, &config)
      .expect("qualifies");
    assert_eq!(score.total_outside_window_hours, 0.0);
    assert_eq!(score.rate_outside, RATE_EPSILON);
    assert!(score.rate_ratio.is_finite());
    assert_eq!(score.matched_pairs, 2);
  }

  #[test]
  fn earlier_window_wins_ties() {
    // Saturated ratio and match factor give every window strength 1.0.
    let from: Vec<f64> = (0..10).map(|i| i as f64 * 1000.0).collect();
    let to: Vec<f64> = from.iter().map(|f| f + 30.0).collect();
    let config = Config {
      min_matched_pairs: 1,
      ..Config::default()
    };
    let best = best_window(&from, &to, 9030.0, &config).expect("some window");
    assert_eq!(best.window, CANDIDATE_WINDOWS[2]);

    let to_near: Vec<f64> = from.iter().map(|f| f + 1.0).collect();
    let best = best_window(&from, &to_near, 9001.0, &config).expect("some window");
    assert_eq!(best.window, CANDIDATE_WINDOWS[0]);
  }
}
