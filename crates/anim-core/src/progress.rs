//! Progress reporting side channel.
//!
//! Long operations report a percentage in `[0, 100]` at frame
//! granularity, never per pixel. A sink may answer [`Flow::Stop`]; the
//! operation then ends between frames with [`Error::Cancelled`](crate::Error::Cancelled).

/// What the sink wants the operation to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    /// Keep going.
    #[default]
    Continue,
    /// Stop at the next frame boundary.
    Stop,
}

/// Receives progress percentages.
pub trait ProgressSink {
    /// Called with a percentage in `[0, 100]`.
    fn report(&mut self, percent: u32) -> Flow;
}

impl<F: FnMut(u32) -> Flow> ProgressSink for F {
    fn report(&mut self, percent: u32) -> Flow {
        self(percent)
    }
}

/// A sink that ignores all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _percent: u32) -> Flow {
        Flow::Continue
    }
}

/// Wraps a sink so it only ever sees clamped, non-decreasing values.
pub(crate) struct Monotonic<'a, P: ProgressSink + ?Sized> {
    sink: &'a mut P,
    last: u32,
}

impl<'a, P: ProgressSink + ?Sized> Monotonic<'a, P> {
    pub(crate) fn new(sink: &'a mut P) -> Self {
        Self { sink, last: 0 }
    }

    /// Reports `percent` (clamped) unless it would go backwards.
    pub(crate) fn report(&mut self, percent: u32) -> Flow {
        let percent = percent.min(100).max(self.last);
        self.last = percent;
        self.sink.report(percent)
    }

    pub(crate) fn last(&self) -> u32 {
        self.last
    }
}

/// Overall percentage for `index` of `count` units with `intra` percent of
/// the current unit done.
#[inline]
pub fn overall_percent(index: usize, intra: u32, count: usize) -> u32 {
    if count == 0 {
        return 100;
    }
    let done = index as u64 * 100 + u64::from(intra.min(100));
    (done / count as u64).min(100) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        let mut sink = |p: u32| {
            seen.push(p);
            Flow::Continue
        };
        assert_eq!(sink.report(10), Flow::Continue);
        assert_eq!(seen, vec![10]);
    }

    #[test]
    fn test_monotonic_clamps() {
        let mut seen = Vec::new();
        let mut sink = |p: u32| {
            seen.push(p);
            Flow::Continue
        };
        let mut m = Monotonic::new(&mut sink);
        m.report(30);
        m.report(20);
        m.report(250);
        assert_eq!(m.last(), 100);
        assert_eq!(seen, vec![30, 30, 100]);
    }

    #[test]
    fn test_overall_percent() {
        assert_eq!(overall_percent(0, 0, 4), 0);
        assert_eq!(overall_percent(0, 100, 4), 25);
        assert_eq!(overall_percent(3, 100, 4), 100);
        assert_eq!(overall_percent(1, 50, 2), 75);
        assert_eq!(overall_percent(0, 0, 0), 100);
    }
}
