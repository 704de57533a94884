//! Frame timing: duration aggregation and playback intervals.
//!
//! Decode side: [`derive_rate`] turns per-frame durations into one
//! frames-per-second figure. A rate of `0.0` means "no intrinsic timing"
//! (a static image, or an animation whose frames all have zero duration),
//! not a zero-fps playback rate.
//!
//! Encode side: [`interval_ms`] and [`timestamp_ms`] turn a target rate
//! into cumulative display timestamps.
//!
//! ```rust
//! use anim_core::timing::{interval_ms, timestamp_ms};
//!
//! let dt = interval_ms(25.0);
//! assert_eq!(timestamp_ms(3, dt), 120);
//! ```

use crate::canvas::Frame;

/// Fallback playback rate when none (or a non-positive one) is given.
pub const DEFAULT_RATE: f64 = 24.0;

/// Sum of all frame durations in milliseconds.
pub fn total_duration_ms(frames: &[Frame]) -> u64 {
    frames.iter().map(|f| u64::from(f.duration_ms)).sum()
}

/// Effective playback rate in frames per second.
///
/// `1000 * frame_count / total_duration_ms`, or `0.0` when the total is zero.
pub fn derive_rate(frames: &[Frame]) -> f64 {
    rate_from_total(frames.len(), total_duration_ms(frames))
}

pub(crate) fn rate_from_total(count: usize, total_ms: u64) -> f64 {
    if total_ms == 0 {
        return 0.0;
    }
    1000.0 * count as f64 / total_ms as f64
}

/// Milliseconds between frames at `target_rate`, falling back to
/// [`DEFAULT_RATE`] when the rate is not a positive finite number.
pub fn interval_ms(target_rate: f64) -> f64 {
    let rate = if target_rate.is_finite() && target_rate > 0.0 {
        target_rate
    } else {
        DEFAULT_RATE
    };
    1000.0 / rate
}

/// Cumulative display timestamp of frame `index`, rounded to whole milliseconds.
#[inline]
pub fn timestamp_ms(index: usize, interval_ms: f64) -> u64 {
    (index as f64 * interval_ms).round().max(0.0) as u64
}

/// Container timestamps for `count` frames plus the end timestamp.
///
/// Each entry is [`timestamp_ms`] raised to at least one millisecond past
/// its predecessor, so intervals below 1 ms still give strictly
/// increasing timestamps.
pub fn timestamps_ms(count: usize, interval_ms: f64) -> Vec<u64> {
    let mut out: Vec<u64> = Vec::with_capacity(count + 1);
    for i in 0..=count {
        let ts = timestamp_ms(i, interval_ms);
        out.push(match out.last() {
            Some(&prev) => ts.max(prev + 1),
            None => ts,
        });
    }
    out
}
