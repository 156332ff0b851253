// crates/splicer-core/src/transitions/mod.rs
//
// Transitions between adjacent clips in the combined output.
//
// Two layers:
//
//   Plan:   `TransitionType` / `ClipTransition` / `plan_transitions`.
//           Decides, per clip boundary, whether clips are spliced (Cut) or
//           overlapped (Crossfade) and for how long. Pure arithmetic on clip
//           durations, no pixels.
//
//   Pixels: `Crossfade` blends two packed YUV420P frames. The media crate
//           calls it once per overlapped frame pair.
//
// Overlap model: a crossfade of `d` seconds plays the last `d` seconds of
// clip A on top of the first `d` seconds of clip B, like concatenating with
// a negative gap of `d`. Output duration shrinks by `d` per boundary.

pub mod helpers;
mod crossfade;

pub use crossfade::Crossfade;

use serde::{Deserialize, Serialize};

/// Smallest and largest crossfade the options row accepts, and its step.
pub const MIN_CROSSFADE_SECS:  f32 = 0.1;
pub const MAX_CROSSFADE_SECS:  f32 = 5.0;
pub const CROSSFADE_STEP_SECS: f32 = 0.1;

/// Overlaps shorter than this are planned as hard cuts.
const MIN_OVERLAP_SECS: f64 = 0.001;

/// The kind of transition at one clip boundary.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum TransitionType {
    /// Hard splice. Zero overlap.
    #[default]
    Cut,
    /// Linear dissolve; clips overlap by `duration_secs`.
    Crossfade { duration_secs: f32 },
}

impl TransitionType {
    /// Overlap in seconds. 0.0 for Cut.
    pub fn duration_secs(&self) -> f32 {
        match self {
            TransitionType::Cut                         => 0.0,
            TransitionType::Crossfade { duration_secs } => *duration_secs,
        }
    }
}

/// A transition placed after clip `after_clip_index` (0 = between clips 0 and 1).
#[derive(Clone, Debug, PartialEq)]
pub struct ClipTransition {
    pub after_clip_index: usize,
    pub kind:             TransitionType,
}

/// The checkbox / duration pair from the options row.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossfadeOptions {
    pub enabled:       bool,
    pub duration_secs: f32,
}

impl Default for CrossfadeOptions {
    fn default() -> Self {
        Self { enabled: false, duration_secs: 1.0 }
    }
}

impl CrossfadeOptions {
    /// Clamp the duration into the accepted range and snap it to the step.
    ///
    /// ```
    /// use splicer_core::transitions::CrossfadeOptions;
    /// let o = CrossfadeOptions { enabled: true, duration_secs: 9.0 }.sanitized();
    /// assert_eq!(o.duration_secs, 5.0);
    /// ```
    pub fn sanitized(self) -> Self {
        let d = if self.duration_secs.is_finite() { self.duration_secs } else { 1.0 };
        let d = d.clamp(MIN_CROSSFADE_SECS, MAX_CROSSFADE_SECS);
        let snapped = (d / CROSSFADE_STEP_SECS).round() / (1.0 / CROSSFADE_STEP_SECS).round();
        Self { enabled: self.enabled, duration_secs: snapped.clamp(MIN_CROSSFADE_SECS, MAX_CROSSFADE_SECS) }
    }
}

/// Decide the transition at every boundary of a clip sequence.
///
/// With crossfades disabled, or fewer than two clips, the result is empty
/// (every boundary is a Cut). Otherwise each boundary gets the requested
/// duration, limited to half of the shorter neighbour so that a clip's
/// incoming and outgoing overlaps never consume more than the clip itself.
///
/// ```
/// use splicer_core::transitions::{plan_transitions, CrossfadeOptions};
/// let opts = CrossfadeOptions { enabled: true, duration_secs: 1.0 };
/// let plan = plan_transitions(&[5.0, 1.0, 5.0], opts);
/// assert_eq!(plan.len(), 2);
/// assert_eq!(plan[0].kind.duration_secs(), 0.5);
/// ```
pub fn plan_transitions(durations: &[f64], options: CrossfadeOptions) -> Vec<ClipTransition> {
    if !options.enabled || durations.len() < 2 {
        return Vec::new();
    }
    let requested = options.sanitized().duration_secs as f64;

    durations.windows(2)
        .enumerate()
        .filter_map(|(i, pair)| {
            let limit = pair[0].min(pair[1]) / 2.0;
            let d = requested.min(limit);
            (d >= MIN_OVERLAP_SECS).then(|| ClipTransition {
                after_clip_index: i,
                kind: TransitionType::Crossfade { duration_secs: d as f32 },
            })
        })
        .collect()
}

/// Overlap in seconds after clip `index`, 0.0 when the boundary is a Cut.
pub fn overlap_after(transitions: &[ClipTransition], index: usize) -> f64 {
    transitions.iter()
        .find(|t| t.after_clip_index == index)
        .map(|t| t.kind.duration_secs() as f64)
        .unwrap_or(0.0)
}

/// Length of the combined output: the sum of clip durations minus every overlap.
///
/// ```
/// use splicer_core::transitions::{output_duration, ClipTransition, TransitionType};
/// let t = vec![ClipTransition { after_clip_index: 0, kind: TransitionType::Crossfade { duration_secs: 1.0 } }];
/// assert_eq!(output_duration(&[4.0, 3.0], &t), 6.0);
/// assert_eq!(output_duration(&[4.0, 3.0], &[]), 7.0);
/// ```
pub fn output_duration(durations: &[f64], transitions: &[ClipTransition]) -> f64 {
    let total: f64 = durations.iter().sum();
    let overlaps: f64 = transitions.iter()
        .filter(|t| t.after_clip_index + 1 < durations.len())
        .map(|t| t.kind.duration_secs() as f64)
        .sum();
    (total - overlaps).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled(d: f32) -> CrossfadeOptions {
        CrossfadeOptions { enabled: true, duration_secs: d }
    }

    #[test]
    fn disabled_options_plan_nothing() {
        let plan = plan_transitions(&[3.0, 3.0, 3.0], CrossfadeOptions::default());
        assert!(plan.is_empty());
    }

    #[test]
    fn single_clip_has_no_boundaries() {
        assert!(plan_transitions(&[10.0], enabled(1.0)).is_empty());
    }

    #[test]
    fn every_boundary_gets_requested_duration() {
        let plan = plan_transitions(&[4.0, 4.0, 4.0, 4.0], enabled(1.5));
        let idx: Vec<_> = plan.iter().map(|t| t.after_clip_index).collect();
        assert_eq!(idx, [0, 1, 2]);
        assert!(plan.iter().all(|t| t.kind == TransitionType::Crossfade { duration_secs: 1.5 }));
    }

    #[test]
    fn overlaps_never_consume_a_clip() {
        let durations = [10.0, 0.8, 10.0];
        let plan = plan_transitions(&durations, enabled(5.0));
        let into_mid  = overlap_after(&plan, 0);
        let out_of_mid = overlap_after(&plan, 1);
        assert!(into_mid + out_of_mid <= durations[1] + 1e-6);
    }

    #[test]
    fn zero_length_neighbour_becomes_cut() {
        let plan = plan_transitions(&[3.0, 0.0, 3.0], enabled(1.0));
        assert!(plan.is_empty());
    }

    #[test]
    fn output_duration_subtracts_each_overlap() {
        let durations = [5.0, 5.0, 5.0];
        let plan = plan_transitions(&durations, enabled(1.0));
        assert!((output_duration(&durations, &plan) - 13.0).abs() < 1e-6);
    }

    #[test]
    fn sanitized_snaps_to_step() {
        let o = enabled(0.04).sanitized();
        assert!((o.duration_secs - 0.1).abs() < 1e-6);
        let o = enabled(1.26).sanitized();
        assert!((o.duration_secs - 1.3).abs() < 1e-6);
        let o = enabled(f32::NAN).sanitized();
        assert_eq!(o.duration_secs, 1.0);
    }
}
