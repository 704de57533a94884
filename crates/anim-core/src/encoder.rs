//! Animation encoder driver.
//!
//! [`encode`] walks a [`FrameStore`] in display order and hands each full
//! frame to a [`PatchEncoder`] session together with its cumulative
//! timestamp and an [`EncoderProfile`]. The session then assembles the
//! container. Submission is single-threaded because container timestamps
//! must be strictly increasing.
//!
//! Quality versus speed always favors quality: effort, segment count and
//! filter strength are fixed by the profile; only `quality` comes from
//! the caller, and `quality >= 100` selects lossless.
//!
//! # Example
//!
//! ```rust
//! use anim_core::encoder::{EncodeConfig, EncoderProfile};
//!
//! let config = EncodeConfig::default().with_quality(100).with_rate(30.0);
//! let profile = EncoderProfile::from_config(&config);
//! assert!(profile.lossless);
//! assert_eq!(profile.near_lossless, 100);
//! ```

use std::fmt;

use tracing::{debug, trace};

use crate::canvas::Canvas;
use crate::error::{Error, Result};
use crate::progress::{overall_percent, Flow, Monotonic, ProgressSink};
use crate::store::FrameStore;
use crate::timing::{self, DEFAULT_RATE};

/// Quality at or above which encoding is lossless.
pub const LOSSLESS_QUALITY: u8 = 100;

/// Caller-facing encode settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeConfig {
    /// Quality 0..=100; 100 selects lossless.
    pub quality: u8,
    /// Frames per second; non-positive values fall back to 24.
    pub target_rate: f64,
    /// Container loop count (0 = loop forever).
    pub loop_count: u16,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            quality: 75,
            target_rate: DEFAULT_RATE,
            loop_count: 0,
        }
    }
}

impl EncodeConfig {
    /// Sets quality, clamped to 100.
    #[must_use]
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.min(LOSSLESS_QUALITY);
        self
    }

    /// Sets the target frame rate.
    #[must_use]
    pub fn with_rate(mut self, target_rate: f64) -> Self {
        self.target_rate = target_rate;
        self
    }

    /// Sets the loop count.
    #[must_use]
    pub fn with_loop_count(mut self, loop_count: u16) -> Self {
        self.loop_count = loop_count;
        self
    }

    /// Milliseconds between consecutive frame timestamps.
    #[inline]
    pub fn interval_ms(&self) -> f64 {
        timing::interval_ms(self.target_rate)
    }
}

/// Compression settings handed to the patch encoder for every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderProfile {
    /// Lossless bitstream.
    pub lossless: bool,
    /// Near-lossless preprocessing level (100 = off).
    pub near_lossless: u8,
    /// RGB quality for lossy coding.
    pub quality: u8,
    /// Alpha plane quality for lossy coding.
    pub alpha_quality: u8,
    /// Compression effort (0 = fast, 6 = slowest/best).
    pub method: u8,
    /// Number of segments for lossy coding.
    pub segments: u8,
    /// Deblocking filter strength.
    pub filter_strength: u8,
    /// Limit on the first partition size (0 = none).
    pub partition_limit: u8,
}

impl EncoderProfile {
    /// Fixed compression effort.
    pub const METHOD: u8 = 6;
    /// Fixed segment count.
    pub const SEGMENTS: u8 = 4;
    /// Fixed filter strength.
    pub const FILTER_STRENGTH: u8 = 60;
    /// Fixed partition limit.
    pub const PARTITION_LIMIT: u8 = 0;

    /// Derives the profile for `config`.
    pub fn from_config(config: &EncodeConfig) -> Self {
        let quality = config.quality.min(LOSSLESS_QUALITY);
        let lossless = quality >= LOSSLESS_QUALITY;
        Self {
            lossless,
            near_lossless: if lossless { 100 } else { 0 },
            quality,
            alpha_quality: quality,
            method: Self::METHOD,
            segments: Self::SEGMENTS,
            filter_strength: Self::FILTER_STRENGTH,
            partition_limit: Self::PARTITION_LIMIT,
        }
    }
}

/// One encoder session: compresses frames and assembles the container.
///
/// Dropping a session without calling [`assemble`](PatchEncoder::assemble)
/// discards everything submitted so far.
pub trait PatchEncoder {
    /// Error produced by the codec or muxer.
    type Error: fmt::Display;

    /// Compresses one full frame displayed from `timestamp_ms` on.
    fn add(
        &mut self,
        frame: &Canvas,
        timestamp_ms: u64,
        profile: &EncoderProfile,
    ) -> std::result::Result<(), Self::Error>;

    /// Finishes the container. `end_timestamp_ms` is where the last frame
    /// stops being displayed.
    fn assemble(self, end_timestamp_ms: u64) -> std::result::Result<Vec<u8>, Self::Error>;
}

/// Encodes every frame of `store` through `session`.
///
/// Frame `i` is submitted at `round(i * interval)` ms, raised where needed
/// so timestamps strictly increase (see [`timing::timestamps_ms`]).
/// Progress is reported as
/// `(i * 100 + intra) / frame_count` around each submission. Any failure
/// aborts the operation; the session is dropped and nothing is returned.
pub fn encode<E, P>(
    store: &FrameStore,
    config: &EncodeConfig,
    mut session: E,
    progress: &mut P,
) -> Result<Vec<u8>>
where
    E: PatchEncoder,
    P: ProgressSink + ?Sized,
{
    let count = store.frame_count();
    let interval = config.interval_ms();
    let profile = EncoderProfile::from_config(config);
    trace!(frames = count, interval_ms = interval, ?profile, "encoder::encode");

    let timestamps = timing::timestamps_ms(count, interval);
    let mut progress = Monotonic::new(progress);

    for (i, frame) in store.frames().enumerate() {
        debug_assert_eq!(
            frame.canvas.dimensions(),
            (store.width(), store.height()),
            "frame store invariant"
        );

        if progress.report(overall_percent(i, 0, count)) == Flow::Stop {
            return Err(Error::Cancelled { percent: progress.last() });
        }

        let timestamp = timestamps[i];
        session
            .add(&frame.canvas, timestamp, &profile)
            .map_err(|e| Error::encode_submission(i, e.to_string()))?;
        debug!(frame = i, timestamp_ms = timestamp, "Submitted frame");

        if progress.report(overall_percent(i, 100, count)) == Flow::Stop {
            return Err(Error::Cancelled { percent: progress.last() });
        }
    }

    let end = timestamps[count];
    let bytes = session
        .assemble(end)
        .map_err(|e| Error::encode_assembly(e.to_string()))?;
    debug!(bytes = bytes.len(), end_timestamp_ms = end, "Assembled animation");

    progress.report(100);
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Frame;
    use crate::pixel::Rgba8;
    use crate::progress::NoProgress;

    /// Records submissions instead of compressing.
    #[derive(Default)]
    struct Recorder {
        timestamps: Vec<u64>,
        profiles: Vec<EncoderProfile>,
        fail_at: Option<usize>,
        fail_assembly: bool,
    }

    impl PatchEncoder for &mut Recorder {
        type Error = String;

        fn add(
            &mut self,
            frame: &Canvas,
            timestamp_ms: u64,
            profile: &EncoderProfile,
        ) -> std::result::Result<(), String> {
            if self.fail_at == Some(self.timestamps.len()) {
                return Err("codec rejected frame".into());
            }
            assert_eq!(frame.dimensions(), (2, 2));
            self.timestamps.push(timestamp_ms);
            self.profiles.push(*profile);
            Ok(())
        }

        fn assemble(self, end_timestamp_ms: u64) -> std::result::Result<Vec<u8>, String> {
            if self.fail_assembly {
                return Err("mux failed".into());
            }
            Ok(end_timestamp_ms.to_le_bytes().to_vec())
        }
    }

    fn store(n: usize) -> FrameStore {
        let frames = (0..n)
            .map(|i| Frame::new(Canvas::filled(2, 2, Rgba8::new(i as u8, 0, 0, 255)).unwrap(), 40))
            .collect();
        FrameStore::new(2, 2, frames).unwrap()
    }

    #[test]
    fn test_profile_lossy() {
        let p = EncoderProfile::from_config(&EncodeConfig::default().with_quality(80));
        assert!(!p.lossless);
        assert_eq!(p.near_lossless, 0);
        assert_eq!(p.quality, 80);
        assert_eq!(p.alpha_quality, 80);
        assert_eq!(p.method, 6);
    }

    #[test]
    fn test_quality_clamped() {
        let c = EncodeConfig::default().with_quality(250);
        assert_eq!(c.quality, 100);
        assert!(EncoderProfile::from_config(&c).lossless);
    }

    #[test]
    fn test_timestamps_are_cumulative() {
        let mut rec = Recorder::default();
        let config = EncodeConfig::default().with_rate(25.0);
        let out = encode(&store(3), &config, &mut rec, &mut NoProgress).unwrap();
        assert_eq!(rec.timestamps, vec![0, 40, 80]);
        assert_eq!(out, 120u64.to_le_bytes().to_vec());
    }

    #[test]
    fn test_rate_fallback() {
        let mut rec = Recorder::default();
        let config = EncodeConfig::default().with_rate(0.0);
        encode(&store(2), &config, &mut rec, &mut NoProgress).unwrap();
        assert_eq!(rec.timestamps, vec![0, 42]);
    }

    #[test]
    fn test_high_rate_timestamps_strictly_increase() {
        let mut rec = Recorder::default();
        let config = EncodeConfig::default().with_rate(3000.0);
        let out = encode(&store(3), &config, &mut rec, &mut NoProgress).unwrap();
        assert_eq!(rec.timestamps, vec![0, 1, 2]);
        assert_eq!(out, 3u64.to_le_bytes().to_vec());
    }

    #[test]
    fn test_progress_monotonic() {
        let mut rec = Recorder::default();
        let mut seen = Vec::new();
        let mut sink = |p: u32| {
            seen.push(p);
            Flow::Continue
        };
        encode(&store(2), &EncodeConfig::default(), &mut rec, &mut sink).unwrap();
        assert_eq!(seen, vec![0, 50, 50, 100, 100]);
    }

    #[test]
    fn test_submission_failure() {
        let mut rec = Recorder {
            fail_at: Some(1),
            ..Default::default()
        };
        let err = encode(&store(3), &EncodeConfig::default(), &mut rec, &mut NoProgress).unwrap_err();
        assert!(matches!(err, Error::EncodeSubmission { frame: 1, .. }));
    }

    #[test]
    fn test_assembly_failure() {
        let mut rec = Recorder {
            fail_assembly: true,
            ..Default::default()
        };
        let err = encode(&store(1), &EncodeConfig::default(), &mut rec, &mut NoProgress).unwrap_err();
        assert!(matches!(err, Error::EncodeAssembly(_)));
    }

    #[test]
    fn test_stop_between_frames() {
        let mut rec = Recorder::default();
        let mut sink = |p: u32| if p > 0 { Flow::Stop } else { Flow::Continue };
        let err = encode(&store(4), &EncodeConfig::default(), &mut rec, &mut sink).unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(rec.timestamps.len(), 1);
    }
}
