//! Filtered, ranked views over a merged edge set.

use std::cmp::Ordering;

use crate::types::{EdgeSource, TypeEdgeStats};

/// Edges leaving `type_id` with strength at or above `min_strength`, ranked.
pub fn outgoing_edges<'a>(
  type_id: &str,
  edges: &'a [TypeEdgeStats],
  min_strength: f64,
) -> Vec<&'a TypeEdgeStats> {
  ranked(edges, |e| e.from_type_id == type_id && e.inferred_strength >= min_strength)
}

/// Edges arriving at `type_id` with strength at or above `min_strength`, ranked.
pub fn incoming_edges<'a>(
  type_id: &str,
  edges: &'a [TypeEdgeStats],
  min_strength: f64,
) -> Vec<&'a TypeEdgeStats> {
  ranked(edges, |e| e.to_type_id == type_id && e.inferred_strength >= min_strength)
}

/// Inference-driven discoveries the user has not already confirmed many times.
///
/// Sorted by strength alone, descending.
pub fn suggested_insights(
  edges: &[TypeEdgeStats],
  min_strength: f64,
  max_user_links: usize,
) -> Vec<&TypeEdgeStats> {
  let mut out: Vec<&TypeEdgeStats> = edges
    .iter()
    .filter(|e| {
      e.has_source(EdgeSource::Inferred)
        && e.inferred_strength >= min_strength
        && e.user_link_count <= max_user_links
    })
    .collect();
  out.sort_by(|a, b| b.inferred_strength.total_cmp(&a.inferred_strength));
  out
}

/// Descending by strength, then user link count, then matched pairs.
pub fn rank_order(a: &TypeEdgeStats, b: &TypeEdgeStats) -> Ordering {
  b.inferred_strength
    .total_cmp(&a.inferred_strength)
    .then_with(|| b.user_link_count.cmp(&a.user_link_count))
    .then_with(|| b.matched_pairs.cmp(&a.matched_pairs))
}

fn ranked<F>(edges: &[TypeEdgeStats], keep: F) -> Vec<&TypeEdgeStats>
where
  F: Fn(&TypeEdgeStats) -> bool,
{
  let mut out: Vec<&TypeEdgeStats> = edges.iter().filter(|e| keep(e)).collect();
  out.sort_by(|a, b| rank_order(a, b));
  out
}
