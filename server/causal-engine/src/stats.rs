//! Numeric utilities: interpolated percentiles, clamping, and elapsed-hour arithmetic.

use chrono::{DateTime, Utc};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Linearly interpolated percentile over values sorted ascending.
///
/// - `p` is in 0..=100 (values outside are clamped).
/// - Returns `None` for an empty slice.
/// - Never extrapolates past the last element.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
  let last = sorted.len().checked_sub(1)?;
  let index = clamp(p, 0.0, 100.0) / 100.0 * last as f64;
  let lower = index.floor() as usize;
  let upper = index.ceil() as usize;
  let weight = index.fract();

  if upper > last {
    return Some(sorted[last]);
  }
  Some(sorted[lower] * (1.0 - weight) + sorted[upper] * weight)
}

pub fn median(sorted: &[f64]) -> Option<f64> {
  percentile(sorted, 50.0)
}

pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
  value.max(lo).min(hi)
}

/// Hours since the Unix epoch, keeping sub-hour precision.
pub fn to_hours(ts: &DateTime<Utc>) -> f64 {
  ts.timestamp_millis() as f64 / MILLIS_PER_HOUR
}

/// Sort a list of delays ascending in place (total order, NaN last).
pub fn sort_hours(values: &mut [f64]) {
  values.sort_by(|a, b| a.total_cmp(b));
}

/// Quartile summary of a sorted delay list: (p25, median, p75).
pub fn delay_quartiles(sorted: &[f64]) -> (Option<f64>, Option<f64>, Option<f64>) {
  (percentile(sorted, 25.0), median(sorted), percentile(sorted, 75.0))
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
  }

  #[test]
  fn percentile_of_empty_is_absent() {
    assert_eq!(percentile(&[], 0.0), None);
    assert_eq!(percentile(&[], 50.0), None);
    assert_eq!(median(&[]), None);
  }

  #[test]
  fn percentile_bounds_hit_first_and_last() {
    let xs = [1.0, 4.0, 9.0, 16.0];
    assert_eq!(percentile(&xs, 0.0), Some(1.0));
    assert_eq!(percentile(&xs, 100.0), Some(16.0));

    let single = [7.5];
    assert_eq!(percentile(&single, 0.0), Some(7.5));
    assert_eq!(percentile(&single, 100.0), Some(7.5));
  }

  #[test]
  fn percentile_interpolates_between_neighbors() {
    let xs = [0.0, 10.0, 20.0, 30.0, 40.0];
    assert!(approx(percentile(&xs, 25.0).unwrap(), 10.0));
    assert!(approx(percentile(&xs, 10.0).unwrap(), 4.0));
    assert!(approx(percentile(&xs, 90.0).unwrap(), 36.0));
    assert!(approx(median(&[1.0, 2.0]).unwrap(), 1.5));
  }

  #[test]
  fn percentile_out_of_range_is_clamped() {
    let xs = [2.0, 3.0];
    assert_eq!(percentile(&xs, -20.0), Some(2.0));
    assert_eq!(percentile(&xs, 250.0), Some(3.0));
  }

  #[test]
  fn clamp_basics() {
    assert_eq!(clamp(-1.0, 0.0, 1.0), 0.0);
    assert_eq!(clamp(0.4, 0.0, 1.0), 0.4);
    assert_eq!(clamp(83.0, 0.0, 1.0), 1.0);
  }

  #[test]
  fn to_hours_keeps_fractional_hours() {
    let a = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
    let b = Utc.with_ymd_and_hms(2025, 3, 1, 9, 45, 0).unwrap();
    assert!(approx(to_hours(&b) - to_hours(&a), 1.75));
  }

  #[test]
  fn quartiles_over_sorted_delays() {
    let mut delays = vec![4.0, 1.0, 3.0, 2.0, 5.0];
    sort_hours(&mut delays);
    let (p25, p50, p75) = delay_quartiles(&delays);
    assert_eq!(p25, Some(2.0));
    assert_eq!(p50, Some(3.0));
    assert_eq!(p75, Some(4.0));
  }
}
