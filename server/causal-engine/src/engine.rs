//! Core engine: runs the batch pipeline and assembles reports.

use tracing::debug;

use crate::config::Config;
use crate::correlation;
use crate::error::EngineError;
use crate::evidence;
use crate::fingerprint;
use crate::insight;
use crate::merge;
use crate::normalize;
use crate::query;
use crate::types::*;

/// Aggregate user links, infer correlations (skipping well-evidenced pairs),
/// merge, and return the merged edges ordered by (from, to) type id.
pub fn compute_all_edges(
  instances: &[EventInstance],
  links: &[EventLink],
  config: &Config,
) -> Vec<TypeEdgeStats> {
  let user_edges = evidence::aggregate_user_links(instances, links);
  let inferred_edges = correlation::infer_correlations(instances, &user_edges, config);
  let merged = merge::merge_edges(&user_edges, &inferred_edges);

  debug!(
    instances = instances.len(),
    links = links.len(),
    user_edges = user_edges.len(),
    inferred_edges = inferred_edges.len(),
    merged_edges = merged.len(),
    "edges computed"
  );

  merged.into_values().collect()
}

/// The causal-evidence engine. Stateless between calls; holds only configuration.
pub struct Engine {
  config: Config,
}

impl Engine {
  pub fn new(config: Config) -> Self {
    Self { config }
  }

  pub fn with_defaults() -> Self {
    Self::new(Config::default())
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// All merged edges for a normalized snapshot.
  pub fn edges(&self, snapshot: &Snapshot) -> Vec<TypeEdgeStats> {
    compute_all_edges(&snapshot.event_instances, &snapshot.event_links, &self.config)
  }

  /// Process one inbound snapshot into a full report.
  pub fn process(&self, raw: &InboundSnapshot) -> Result<EdgeReport, EngineError> {
    let config = normalize::resolve_config(&self.config, raw)?;
    let snapshot = normalize::normalize(raw)?;
    let snapshot_id = fingerprint::snapshot_id(&snapshot);

    let edges = compute_all_edges(&snapshot.event_instances, &snapshot.event_links, &config);
    Ok(assemble_report(snapshot_id, &snapshot, edges, raw.focus_type_id.as_deref(), &config))
  }
}

fn assemble_report(
  snapshot_id: String,
  snapshot: &Snapshot,
  edges: Vec<TypeEdgeStats>,
  focus_type_id: Option<&str>,
  config: &Config,
) -> EdgeReport {
  let insights: Vec<InsightSummary> =
    query::suggested_insights(&edges, config.edge_threshold, config.insight_max_user_links)
      .into_iter()
      .map(|edge| insight::summarize(edge, &snapshot.event_types))
      .collect();

  let focus = focus_type_id.map(|type_id| FocusView {
    type_id: type_id.to_string(),
    incoming: query::incoming_edges(type_id, &edges, config.edge_threshold)
      .into_iter()
      .cloned()
      .collect(),
    outgoing: query::outgoing_edges(type_id, &edges, config.edge_threshold)
      .into_iter()
      .cloned()
      .collect(),
  });

  debug!(
    snapshot = %snapshot_id,
    edges = edges.len(),
    insights = insights.len(),
    "report assembled"
  );

  EdgeReport {
    snapshot_id,
    edges,
    insights,
    focus,
  }
}
