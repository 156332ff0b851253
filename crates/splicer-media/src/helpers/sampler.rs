// crates/splicer-media/src/helpers/sampler.rs
//
// Constant-frame-rate resampling of a decoded video stream.
//
// Output slot k of a segment shows at time k / fps. Each slot gets the most
// recent source frame at or before that time (nearest within half a slot),
// so a 30 fps source at 24 fps output drops frames and a 15 fps source
// repeats them. The segment always ends up with exactly `slots` frames:
// a short source holds its last frame, and a source with no frames at all
// is filled from a fallback (black).

use crate::error::Result;

pub struct FrameSampler<T> {
    fps:     f64,
    slots:   u64,
    emitted: u64,
    held:    Option<T>,
}

impl<T> FrameSampler<T> {
    pub fn new(slots: u64, fps: u32) -> Self {
        Self { fps: fps.max(1) as f64, slots, emitted: 0, held: None }
    }

    pub fn is_full(&self) -> bool {
        self.emitted >= self.slots
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Offer a source frame presented at `t` seconds (segment-relative; may be
    /// negative for pre-roll). Every slot that falls before `t` is filled with
    /// the previously held frame, then `frame` becomes the held frame.
    pub fn offer(&mut self, t: f64, frame: T, mut emit: impl FnMut(&T) -> Result<()>) -> Result<()> {
        if self.is_full() {
            return Ok(());
        }
        if let Some(prev) = self.held.as_ref() {
            while !self.is_full() && self.slot_mid(self.emitted) < t {
                emit(prev)?;
                self.emitted += 1;
            }
        }
        self.held = Some(frame);
        Ok(())
    }

    /// Fill the remaining slots with the held frame, or with `fallback()` if
    /// the source produced nothing.
    pub fn finish(&mut self, fallback: impl FnOnce() -> T, mut emit: impl FnMut(&T) -> Result<()>) -> Result<()> {
        if self.is_full() {
            return Ok(());
        }
        let last = match self.held.take() {
            Some(f) => f,
            None    => fallback(),
        };
        while !self.is_full() {
            emit(&last)?;
            self.emitted += 1;
        }
        Ok(())
    }

    fn slot_mid(&self, k: u64) -> f64 {
        (k as f64 + 0.5) / self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(slots: u64, fps: u32, frames: &[(f64, u32)]) -> Vec<u32> {
        let mut out = Vec::new();
        let mut s = FrameSampler::new(slots, fps);
        for &(t, f) in frames {
            s.offer(t, f, |&v| { out.push(v); Ok(()) }).unwrap();
        }
        s.finish(|| 0, |&v| { out.push(v); Ok(()) }).unwrap();
        out
    }

    #[test]
    fn same_rate_passes_frames_through() {
        let frames: Vec<_> = (0..4).map(|i| (i as f64 / 24.0, i + 1)).collect();
        assert_eq!(run(4, 24, &frames), vec![1, 2, 3, 4]);
    }

    #[test]
    fn low_rate_source_repeats_frames() {
        // 12 fps source → 24 fps output: each frame shown twice.
        let frames: Vec<_> = (0..3).map(|i| (i as f64 / 12.0, i + 1)).collect();
        assert_eq!(run(6, 24, &frames), vec![1, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn high_rate_source_drops_frames() {
        // 48 fps source → 24 fps output: every other frame.
        let frames: Vec<_> = (0..8).map(|i| (i as f64 / 48.0, i + 1)).collect();
        assert_eq!(run(4, 24, &frames), vec![1, 3, 5, 7]);
    }

    #[test]
    fn preroll_frame_fills_start() {
        // Keyframe 0.2 s before the segment; next frame lands on slot 1.
        let frames = [(-0.2, 9), (1.0 / 24.0, 1)];
        assert_eq!(run(2, 24, &frames), vec![9, 1]);
    }

    #[test]
    fn short_source_holds_last_frame() {
        assert_eq!(run(4, 24, &[(0.0, 5)]), vec![5, 5, 5, 5]);
    }

    #[test]
    fn empty_source_uses_fallback() {
        assert_eq!(run(3, 24, &[]), vec![0, 0, 0]);
    }

    #[test]
    fn never_exceeds_slot_count() {
        let frames: Vec<_> = (0..100).map(|i| (i as f64 / 24.0, i)).collect();
        assert_eq!(run(10, 24, &frames).len(), 10);
    }
}
