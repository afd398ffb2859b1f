//! Engine configuration with sane defaults.

/// Tunable thresholds for edge inference and the query views.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
  /// Minimum matched "to" instances for a candidate window to qualify.
  /// Also the user-link count at which inference is skipped for a pair.
  pub min_matched_pairs: usize,
  /// Minimum inside/outside rate ratio for a candidate window to qualify.
  pub min_rate_ratio: f64,
  /// Minimum instances of the "from" type before a pair is considered.
  pub min_count_from: usize,
  /// Minimum instances of the "to" type before a pair is considered.
  pub min_count_to: usize,
  /// Minimum inferred strength (0..1) for edges shown in query views.
  pub edge_threshold: f64,
  /// Suggested insights exclude edges with more user links than this.
  pub insight_max_user_links: usize,
  /// Drop an inferred edge when the reverse pair scored strictly stronger.
  pub suppress_weaker_reverse: bool,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      min_matched_pairs: 3,
      min_rate_ratio: 1.5,
      min_count_from: 3,
      min_count_to: 3,
      edge_threshold: 0.3,
      insight_max_user_links: 1,
      suppress_weaker_reverse: true,
    }
  }
}
