//! Binary entrypoint: read JSON lines from stdin, write JSON lines to stdout.
//!
//! Each input line is an InboundSnapshot. Output lines are either:
//! - An EdgeReport (edges, suggested insights, optional focus view)
//! - An ErrorOutput (when input validation fails)
//!
//! Logs go to stderr; set RUST_LOG (default "warn") to adjust.

use std::io::{self, BufRead, Write};

use causal_engine::types::ErrorOutput;
use causal_engine::{Engine, EngineError, InboundSnapshot};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
  init_tracing();

  if let Err(e) = run() {
    error!("causal-engine: {}", e);
    std::process::exit(1);
  }
}

fn init_tracing() {
  let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

  tracing_subscriber::registry()
    .with(env_filter)
    .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
    .init();
}

fn run() -> Result<(), EngineError> {
  let stdin = io::stdin();
  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());
  let engine = Engine::with_defaults();
  info!(config = ?engine.config(), "causal-engine ready");

  for line in stdin.lock().lines() {
    let line = line?;

    // Skip blank lines.
    let trimmed = line.trim();
    if trimmed.is_empty() {
      continue;
    }

    let raw: InboundSnapshot = match serde_json::from_str(trimmed) {
      Ok(v) => v,
      Err(e) => {
        write_line(&mut out, &ErrorOutput::new(format!("json parse: {}", e)))?;
        continue;
      }
    };

    match engine.process(&raw) {
      Ok(report) => write_line(&mut out, &report)?,
      Err(e) => {
        let err = match &e {
          EngineError::Validation { field, reason } => {
            ErrorOutput::new(reason.clone()).with_field(field.clone())
          }
          _ => ErrorOutput::new(e.to_string()),
        };
        write_line(&mut out, &err)?;
      }
    }
    // One report per request; callers wait on each line.
    out.flush()?;
  }

  out.flush()?;
  Ok(())
}

fn write_line<W: Write, T: serde::Serialize>(out: &mut W, value: &T) -> Result<(), EngineError> {
  serde_json::to_writer(&mut *out, value)?;
  writeln!(out)?;
  Ok(())
}
