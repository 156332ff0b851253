// crates/splicer-core/src/media_types.rs
//
// Types that flow across the channel between splicer-media and splicer-ui.
// No egui, no ffmpeg. Just plain data.

use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Probed properties of one source clip.
///
/// `width` / `height` are display dimensions (no macroblock padding).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipInfo {
    pub width:    u32,
    pub height:   u32,
    pub duration: f64,
    pub has_audio: bool,
}

impl ClipInfo {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Results sent from the MediaWorker background threads to the UI.
#[derive(Debug)]
pub enum MediaResult {
    ClipProbed      { id: Uuid, info: ClipInfo },
    ProbeFailed     { id: Uuid, msg: String },
    CombineProgress { job_id: Uuid, frame: u64, total_frames: u64 },
    CombineDone     { job_id: Uuid, path: PathBuf },
    /// `cancelled` distinguishes a user abort from a real failure so the UI
    /// can skip the error dialog.
    CombineError    { job_id: Uuid, msg: String, cancelled: bool },
}
