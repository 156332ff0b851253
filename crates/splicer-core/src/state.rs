// crates/splicer-core/src/state.rs
// Everything the UI renders from. The clip list and settings are serialized
// with the session; combine status is runtime-only.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clip_list::ClipList;
use crate::settings::Settings;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default)]
    pub clips:    ClipList,
    #[serde(default)]
    pub settings: Settings,

    // ── Combine status (runtime-only, not serialized) ─────────────────────────
    /// Job currently encoding, or None when idle.
    #[serde(skip)]
    pub combine_job:      Option<Uuid>,
    /// (frames_done, total_frames) from the latest progress report.
    #[serde(skip)]
    pub combine_progress: Option<(u64, u64)>,
}

impl AppState {
    pub fn is_combining(&self) -> bool {
        self.combine_job.is_some()
    }

    /// Progress in [0, 1], or None before the first report.
    pub fn combine_fraction(&self) -> Option<f32> {
        self.combine_progress
            .map(|(done, total)| (done as f32 / total.max(1) as f32).min(1.0))
    }

    pub fn finish_combine(&mut self) {
        self.combine_job      = None;
        self.combine_progress = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_is_clamped() {
        let mut s = AppState::default();
        assert_eq!(s.combine_fraction(), None);
        s.combine_progress = Some((30, 20));
        assert_eq!(s.combine_fraction(), Some(1.0));
        s.combine_progress = Some((5, 0));
        assert_eq!(s.combine_fraction(), Some(1.0));
    }

    #[test]
    fn combine_status_is_not_persisted() {
        let mut s = AppState::default();
        s.combine_job = Some(Uuid::new_v4());
        let back: AppState = serde_json::from_str(&serde_json::to_string(&s).unwrap()).unwrap();
        assert!(!back.is_combining());
    }
}
