//! Merge user-evidence edges with inferred edges into one edge per type pair.
//!
//! Each conflicting field is resolved by a named policy below so the merge
//! contract can be tested on its own.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{EdgeKey, EdgeSource, TypeEdgeStats};

/// Union of the key sets. User edges are the base; inferred edges either fill
/// gaps or are folded into the matching user edge.
pub fn merge_edges(
  user_edges: &BTreeMap<EdgeKey, TypeEdgeStats>,
  inferred_edges: &BTreeMap<EdgeKey, TypeEdgeStats>,
) -> BTreeMap<EdgeKey, TypeEdgeStats> {
  let mut merged = user_edges.clone();

  for (key, inferred) in inferred_edges {
    match merged.get_mut(key) {
      Some(user) => merge_into(user, inferred),
      None => {
        merged.insert(key.clone(), inferred.clone());
      }
    }
  }

  merged
}

/// Fold an inferred edge into the user edge for the same pair.
///
/// Fields without a policy (counts, delay quartiles, user link count) stay
/// as the user edge has them.
pub fn merge_into(user: &mut TypeEdgeStats, inferred: &TypeEdgeStats) {
  user.edge_sources = union_sources(&user.edge_sources, &inferred.edge_sources);
  user.inferred_strength = strongest(user.inferred_strength, inferred.inferred_strength);

  let (min_hours, max_hours) = resolve_window(user, inferred);
  user.min_hours = min_hours;
  user.max_hours = max_hours;

  user.matched_pairs = accumulate_matches(user.matched_pairs, inferred.matched_pairs);

  user.rate_inside_window_per_hour =
    prefer_user_value(user.rate_inside_window_per_hour, inferred.rate_inside_window_per_hour);
  user.rate_outside_window_per_hour =
    prefer_user_value(user.rate_outside_window_per_hour, inferred.rate_outside_window_per_hour);
  user.total_window_hours = prefer_user_value(user.total_window_hours, inferred.total_window_hours);
  user.total_outside_window_hours =
    prefer_user_value(user.total_outside_window_hours, inferred.total_outside_window_hours);
}

/// Provenance is a set: both sides' sources, no duplicates.
pub fn union_sources(
  a: &BTreeSet<EdgeSource>,
  b: &BTreeSet<EdgeSource>,
) -> BTreeSet<EdgeSource> {
  a.union(b).copied().collect()
}

pub fn strongest(a: f64, b: f64) -> f64 {
  a.max(b)
}

/// User-observed timing wins whenever at least one link backs the user edge.
pub fn resolve_window(user: &TypeEdgeStats, inferred: &TypeEdgeStats) -> (f64, f64) {
  if user.user_link_count > 0 {
    (user.min_hours, user.max_hours)
  } else {
    (inferred.min_hours, inferred.max_hours)
  }
}

/// Matched pairs from the two methods are not assumed to overlap.
pub fn accumulate_matches(user: usize, inferred: usize) -> usize {
  user + inferred
}

/// User value when present, inferred value otherwise.
pub fn prefer_user_value(user: Option<f64>, inferred: Option<f64>) -> Option<f64> {
  user.or(inferred)
}
