// crates/splicer-ui/src/context.rs
//
// AppContext owns the runtime handles that are NOT part of the serializable
// AppState. SplicerApp holds one of these plus an AppState and its panels.
//
//   AppContext
//     ├── media_worker  the FFmpeg worker and its result channel
//     └── notices       message boxes queued for display after the UI pass

use eframe::egui;
use splicer_core::state::AppState;
use splicer_media::{MediaResult, MediaWorker};

use crate::helpers::dialogs::Notice;

pub struct AppContext {
    pub media_worker: MediaWorker,
    /// Shown (and drained) by app.rs once the frame's panels are drawn.
    pub notices:      Vec<Notice>,
}

impl AppContext {
    pub fn new(media_worker: MediaWorker) -> Self {
        Self { media_worker, notices: Vec::new() }
    }

    /// Drain every queued MediaWorker result into state.
    ///
    /// Combine results carry a job id; anything from a job that is no longer
    /// current (cancelled and superseded) is dropped.
    pub fn ingest_media_results(&mut self, state: &mut AppState, ctx: &egui::Context) {
        while let Ok(result) = self.media_worker.rx.try_recv() {
            self.ingest(result, state);
            ctx.request_repaint();
        }
    }

    fn ingest(&mut self, result: MediaResult, state: &mut AppState) {
        match result {
            MediaResult::ClipProbed { id, info } => {
                // Entry may have been removed while the probe ran.
                state.clips.set_info(id, info);
            }

            MediaResult::ProbeFailed { id, msg } => {
                log::warn!("[probe] {id}: {msg}");
                state.clips.set_probe_error(id, msg);
            }

            MediaResult::CombineProgress { job_id, frame, total_frames } => {
                if state.combine_job == Some(job_id) {
                    state.combine_progress = Some((frame, total_frames));
                }
            }

            MediaResult::CombineDone { job_id, path } => {
                if state.combine_job != Some(job_id) {
                    return;
                }
                state.finish_combine();
                log::info!("[combine] saved {}", path.display());
                self.notices.push(Notice::info(
                    "Success",
                    format!("Videos combined successfully and saved to:\n{}", path.display()),
                ));
            }

            MediaResult::CombineError { job_id, msg, cancelled } => {
                if state.combine_job != Some(job_id) {
                    return;
                }
                state.finish_combine();
                if cancelled {
                    log::info!("[combine] cancelled");
                } else {
                    log::error!("[combine] {msg}");
                    self.notices.push(Notice::error(
                        "Error",
                        format!("An error occurred during video combination:\n{msg}"),
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::dialogs::NoticeLevel;
    use splicer_core::media_types::ClipInfo;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn context() -> AppContext {
        AppContext::new(MediaWorker::new())
    }

    #[test]
    fn probe_results_update_entries() {
        let mut cx = context();
        let mut state = AppState::default();
        let ids = state.clips.add_files(vec![PathBuf::from("/v/a.mp4"), PathBuf::from("/v/b.mp4")]);
        let info = ClipInfo { width: 320, height: 240, duration: 3.0, has_audio: false };

        cx.ingest(MediaResult::ClipProbed { id: ids[0], info }, &mut state);
        cx.ingest(MediaResult::ProbeFailed { id: ids[1], msg: "bad header".into() }, &mut state);

        assert_eq!(state.clips.get(ids[0]).and_then(|e| e.info), Some(info));
        assert_eq!(state.clips.first_failed().map(|e| e.id), Some(ids[1]));
        assert!(cx.notices.is_empty());
        cx.media_worker.shutdown();
    }

    #[test]
    fn done_queues_success_notice() {
        let mut cx = context();
        let mut state = AppState::default();
        let job = Uuid::new_v4();
        state.combine_job = Some(job);

        cx.ingest(MediaResult::CombineProgress { job_id: job, frame: 12, total_frames: 48 }, &mut state);
        assert_eq!(state.combine_progress, Some((12, 48)));

        cx.ingest(MediaResult::CombineDone { job_id: job, path: "/out/combined.mp4".into() }, &mut state);
        assert!(!state.is_combining());
        assert_eq!(cx.notices.len(), 1);
        assert_eq!(cx.notices[0].level, NoticeLevel::Info);
        assert!(cx.notices[0].text.ends_with("combined.mp4"));
        cx.media_worker.shutdown();
    }

    #[test]
    fn cancellation_is_silent() {
        let mut cx = context();
        let mut state = AppState::default();
        let job = Uuid::new_v4();
        state.combine_job = Some(job);

        cx.ingest(MediaResult::CombineError { job_id: job, msg: "cancelled".into(), cancelled: true }, &mut state);
        assert!(!state.is_combining());
        assert!(cx.notices.is_empty());
        cx.media_worker.shutdown();
    }

    #[test]
    fn failure_queues_error_notice() {
        let mut cx = context();
        let mut state = AppState::default();
        let job = Uuid::new_v4();
        state.combine_job = Some(job);

        cx.ingest(MediaResult::CombineError { job_id: job, msg: "disk full".into(), cancelled: false }, &mut state);
        assert_eq!(cx.notices[0].level, NoticeLevel::Error);
        assert!(cx.notices[0].text.contains("disk full"));
        cx.media_worker.shutdown();
    }

    #[test]
    fn stale_job_results_are_ignored() {
        let mut cx = context();
        let mut state = AppState::default();
        let current = Uuid::new_v4();
        state.combine_job = Some(current);

        let stale = Uuid::new_v4();
        cx.ingest(MediaResult::CombineProgress { job_id: stale, frame: 1, total_frames: 2 }, &mut state);
        cx.ingest(MediaResult::CombineDone { job_id: stale, path: "/out/x.mp4".into() }, &mut state);

        assert_eq!(state.combine_job, Some(current));
        assert_eq!(state.combine_progress, None);
        assert!(cx.notices.is_empty());
        cx.media_worker.shutdown();
    }
}
