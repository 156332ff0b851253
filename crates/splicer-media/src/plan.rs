// crates/splicer-media/src/plan.rs
//
// Turns the clip list + transitions into an ordered list of output segments.
//
// A segment is either a stretch of one clip played on its own, or an overlap
// where the tail of one clip is blended with the head of the next:
//
//   clip 0 ─────────────┐
//                  ╲ xfade ╱
//                       └──────── clip 1 ───────
//
//   Segments:  [Solo 0] [Blend 0→1] [Solo 1]
//
// Frame and sample counts are derived from cumulative output-timeline
// positions (round(end) - round(start)) so per-segment rounding never
// accumulates into A/V drift across many clips.

use splicer_core::transitions::{overlap_after, ClipTransition};

use crate::encode::ClipSpec;

/// Output audio sample rate for every combine.
pub const AUDIO_RATE: u32 = 44_100;

#[derive(Clone, Debug, PartialEq)]
pub enum SegmentKind {
    /// `clip` plays alone from `source_offset`.
    Solo { clip: usize, source_offset: f64 },
    /// Tail of `from` (starting at `from_offset`) blended into the head of `to`.
    Blend { from: usize, to: usize, from_offset: f64 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub kind:      SegmentKind,
    /// Source-time length of the segment in seconds.
    pub duration:  f64,
    /// Where the segment starts on the output timeline.
    pub out_start: f64,
    /// Exact number of video frames to emit.
    pub frames:    u64,
    /// Exact number of audio samples (per channel) to emit.
    pub samples:   u64,
}

fn slots(start: f64, duration: f64, rate: f64) -> u64 {
    let a = (start * rate).round() as i64;
    let b = ((start + duration) * rate).round() as i64;
    (b - a).max(0) as u64
}

/// Build the segment list for `clips` joined by `transitions` at `fps`.
pub fn plan_segments(clips: &[ClipSpec], transitions: &[ClipTransition], fps: u32) -> Vec<Segment> {
    let fps = fps.max(1) as f64;
    let mut segments = Vec::with_capacity(clips.len() * 2);
    let mut out_t = 0.0;
    let mut head_skip = 0.0;

    for (i, clip) in clips.iter().enumerate() {
        let tail = if i + 1 < clips.len() { overlap_after(transitions, i) } else { 0.0 };
        let solo = (clip.duration - head_skip - tail).max(0.0);

        if solo > 0.0 {
            segments.push(Segment {
                kind:      SegmentKind::Solo { clip: i, source_offset: clip.source_offset + head_skip },
                duration:  solo,
                out_start: out_t,
                frames:    slots(out_t, solo, fps),
                samples:   slots(out_t, solo, AUDIO_RATE as f64),
            });
            out_t += solo;
        }

        if tail > 0.0 {
            segments.push(Segment {
                kind: SegmentKind::Blend {
                    from:        i,
                    to:          i + 1,
                    from_offset: clip.source_offset + head_skip + solo,
                },
                duration:  tail,
                out_start: out_t,
                frames:    slots(out_t, tail, fps),
                samples:   slots(out_t, tail, AUDIO_RATE as f64),
            });
            out_t += tail;
        }
        head_skip = tail;
    }

    segments
}

/// Total video frames across all segments; the progress denominator.
pub fn total_frames(segments: &[Segment]) -> u64 {
    segments.iter().map(|s| s.frames).sum()
}
