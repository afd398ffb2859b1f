//! Stable snapshot fingerprint so callers can skip recomputing unchanged logs.

use crate::types::Snapshot;

/// Compute an order-insensitive id for the engine-relevant parts of a snapshot.
///
/// Key components: type ids, instance (id, type, timestamp ms), link (id, from, to).
/// Labels, notes and intensities do not affect edges and are left out.
pub fn snapshot_id(snapshot: &Snapshot) -> String {
  let mut type_ids: Vec<&str> = snapshot.event_types.iter().map(|t| t.id.as_str()).collect();
  type_ids.sort_unstable();

  let mut instances: Vec<(&str, &str, i64)> = snapshot
    .event_instances
    .iter()
    .map(|i| (i.id.as_str(), i.event_type_id.as_str(), i.timestamp.timestamp_millis()))
    .collect();
  instances.sort_unstable();

  let mut links: Vec<(&str, &str, &str)> = snapshot
    .event_links
    .iter()
    .map(|l| (l.id.as_str(), l.from_event_id.as_str(), l.to_event_id.as_str()))
    .collect();
  links.sort_unstable();

  let mut hasher = blake3::Hasher::new();
  hasher.update(b"types");
  for id in type_ids {
    hasher.update(b"|");
    hasher.update(id.as_bytes());
  }
  hasher.update(b"#instances");
  for (id, type_id, ms) in instances {
    hasher.update(b"|");
    hasher.update(id.as_bytes());
    hasher.update(b":");
    hasher.update(type_id.as_bytes());
    hasher.update(b"@");
    hasher.update(&ms.to_le_bytes());
  }
  hasher.update(b"#links");
  for (id, from, to) in links {
    hasher.update(b"|");
    hasher.update(id.as_bytes());
    hasher.update(b":");
    hasher.update(from.as_bytes());
    hasher.update(b">");
    hasher.update(to.as_bytes());
  }

  let hex = hasher.finalize().to_hex();
  format!("snap-{}", &hex[..16])
}
