//! Aggregate explicit user links into type-level edges.
//!
//! Each link contributes the elapsed hours from its "from" instance to its
//! "to" instance. Links are grouped by the ordered pair of instance *types*
//! and summarized into a padded delay window plus quartiles.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::trace;

use crate::stats;
use crate::types::{EdgeKey, EdgeSource, EventInstance, EventLink, TypeEdgeStats};

/// Padding applied to the observed p10..p90 delay envelope.
const WINDOW_LOW_PAD: f64 = 0.8;
const WINDOW_HIGH_PAD: f64 = 1.2;

/// Build user-evidence edges from links.
///
/// - Links with a missing endpoint are skipped.
/// - Links whose effect precedes the cause (negative delay) are skipped.
/// - Links between two instances of the same type are skipped (no self-pairs).
///
/// Strength is always zero here; aggregation records provenance only.
pub fn aggregate_user_links(
  instances: &[EventInstance],
  links: &[EventLink],
) -> BTreeMap<EdgeKey, TypeEdgeStats> {
  let by_id: HashMap<&str, &EventInstance> =
    instances.iter().map(|i| (i.id.as_str(), i)).collect();

  let mut groups: BTreeMap<EdgeKey, Vec<f64>> = BTreeMap::new();
  for link in links {
    let (Some(from), Some(to)) = (
      by_id.get(link.from_event_id.as_str()),
      by_id.get(link.to_event_id.as_str()),
    ) else {
      trace!(link = %link.id, "link endpoint missing; skipped");
      continue;
    };

    let delta = stats::to_hours(&to.timestamp) - stats::to_hours(&from.timestamp);
    if delta < 0.0 {
      trace!(link = %link.id, delta, "effect logged before cause; skipped");
      continue;
    }
    if from.event_type_id == to.event_type_id {
      trace!(link = %link.id, "link within one event type; skipped");
      continue;
    }

    groups
      .entry(EdgeKey::new(from.event_type_id.clone(), to.event_type_id.clone()))
      .or_default()
      .push(delta);
  }

  let type_counts = count_by_type(instances);
  let count_of = |type_id: &str| type_counts.get(type_id).copied().unwrap_or(0);

  groups
    .into_iter()
    .map(|(key, mut deltas)| {
      stats::sort_hours(&mut deltas);
      let (min_hours, max_hours) = padded_window(&deltas);
      let (p25, p50, p75) = stats::delay_quartiles(&deltas);
      let links = deltas.len();

      let edge = TypeEdgeStats {
        from_type_id: key.from_type_id.clone(),
        to_type_id: key.to_type_id.clone(),
        min_hours,
        max_hours,
        count_from: count_of(key.from_type_id.as_str()),
        count_to: count_of(key.to_type_id.as_str()),
        matched_pairs: links,
        median_delay_hours: p50,
        p25_delay_hours: p25,
        p75_delay_hours: p75,
        rate_inside_window_per_hour: None,
        rate_outside_window_per_hour: None,
        total_window_hours: None,
        total_outside_window_hours: None,
        user_link_count: links,
        inferred_strength: 0.0,
        edge_sources: BTreeSet::from([EdgeSource::User]),
      };
      (key, edge)
    })
    .collect()
}

/// Window `[max(0, p10 * 0.8), p90 * 1.2]` around sorted, non-empty delays.
fn padded_window(sorted: &[f64]) -> (f64, f64) {
  let p10 = stats::percentile(sorted, 10.0).unwrap_or(0.0);
  let p90 = stats::percentile(sorted, 90.0).unwrap_or(0.0);
  ((p10 * WINDOW_LOW_PAD).max(0.0), p90 * WINDOW_HIGH_PAD)
}

/// Instance counts per event type id.
pub(crate) fn count_by_type(instances: &[EventInstance]) -> HashMap<&str, usize> {
  let mut counts: HashMap<&str, usize> = HashMap::new();
  for instance in instances {
    *counts.entry(instance.event_type_id.as_str()).or_insert(0) += 1;
  }
  counts
}
