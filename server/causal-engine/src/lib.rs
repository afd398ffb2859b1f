//! CueGraph causal-evidence engine: deterministic, heuristic (no significance testing).
//!
//! Turns a timestamped event log plus sparse user-asserted links into a set of
//! directed, quantified relationships between event *types*: user-link
//! aggregation, fixed-window correlation inference, precedence-based merging,
//! and ranked query views.
//!
//! No DB, no network; pure computation over immutable snapshots.

pub mod config;
pub mod correlation;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod fingerprint;
pub mod insight;
pub mod merge;
pub mod normalize;
pub mod query;
pub mod stats;
pub mod types;

pub use config::Config;
pub use engine::{compute_all_edges, Engine};
pub use error::EngineError;
pub use types::{EdgeReport, InboundSnapshot, TypeEdgeStats};
