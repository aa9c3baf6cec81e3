//! Per-bucket scroll offsets.

use crate::board::BucketKey;
use serde::Serialize;
use std::collections::BTreeMap;

/// Vertical scroll offset of every bucket, always within `[0, max]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScrollState {
    offsets: BTreeMap<BucketKey, f64>,
}

fn clamp(value: f64, max: f64) -> f64 {
    let max = if max.is_finite() { max.max(0.0) } else { 0.0 };
    if value.is_finite() {
        value.clamp(0.0, max)
    } else {
        0.0
    }
}

impl ScrollState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current offset of a bucket (0 when never scrolled)
    pub fn offset(&self, bucket: BucketKey) -> f64 {
        self.offsets.get(&bucket).copied().unwrap_or(0.0)
    }

    /// Set an offset, clamped to `[0, max]`
    pub fn set(&mut self, bucket: BucketKey, value: f64, max: f64) {
        let value = clamp(value, max);
        if value == 0.0 {
            self.offsets.remove(&bucket);
        } else {
            self.offsets.insert(bucket, value);
        }
    }

    /// Scroll by `delta`. Returns whether the offset changed.
    pub fn scroll_by(&mut self, bucket: BucketKey, delta: f64, max: f64) -> bool {
        if !delta.is_finite() {
            return false;
        }
        let before = self.offset(bucket);
        self.set(bucket, before + delta, max);
        self.offset(bucket) != before
    }

    /// Re-clamp every offset against fresh limits; buckets without a limit reset.
    pub fn clamp_to(&mut self, limits: &BTreeMap<BucketKey, f64>) {
        self.offsets.retain(|bucket, offset| match limits.get(bucket) {
            Some(max) => {
                *offset = clamp(*offset, *max);
                *offset > 0.0
            }
            None => false,
        });
    }

    pub fn reset(&mut self) {
        self.offsets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Quadrant;

    const KEY: BucketKey = BucketKey::Quadrant(Quadrant::HighValue);

    #[test]
    fn test_scroll_clamps() {
        let mut state = ScrollState::new();
        assert!(state.scroll_by(KEY, 500.0, 348.0));
        assert_eq!(state.offset(KEY), 348.0);
        assert!(!state.scroll_by(KEY, 10.0, 348.0));
        assert!(state.scroll_by(KEY, -1000.0, 348.0));
        assert_eq!(state.offset(KEY), 0.0);
    }

    #[test]
    fn test_scroll_without_overflow_is_noop() {
        let mut state = ScrollState::new();
        assert!(!state.scroll_by(KEY, 120.0, 0.0));
        assert_eq!(state.offset(KEY), 0.0);
    }

    #[test]
    fn test_buckets_independent() {
        let mut state = ScrollState::new();
        state.set(KEY, 40.0, 100.0);
        assert_eq!(state.offset(BucketKey::Blocked), 0.0);
        assert_eq!(state.offset(KEY), 40.0);
    }

    #[test]
    fn test_clamp_to_new_limits() {
        let mut state = ScrollState::new();
        state.set(KEY, 300.0, 400.0);
        state.set(BucketKey::Blocked, 50.0, 400.0);
        let limits = BTreeMap::from([(KEY, 120.0)]);
        state.clamp_to(&limits);
        assert_eq!(state.offset(KEY), 120.0);
        assert_eq!(state.offset(BucketKey::Blocked), 0.0);
    }

    #[test]
    fn test_non_finite_delta() {
        let mut state = ScrollState::new();
        state.set(KEY, 30.0, 100.0);
        assert!(!state.scroll_by(KEY, f64::NAN, 100.0));
        assert_eq!(state.offset(KEY), 30.0);
    }
}
