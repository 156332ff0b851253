// crates/splicer-ui/src/helpers/dialogs.rs
//
// Native dialogs (rfd). Every dialog here is modal and blocks the UI thread
// until dismissed, so they are only ever opened from app.rs after the UI
// pass, never from inside a panel's ui().

use std::path::{Path, PathBuf};

use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm", "m4v"];

pub const DEFAULT_OUTPUT_NAME: &str = "combined.mp4";

// ── Message boxes ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message box waiting to be shown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub text:  String,
}

impl Notice {
    pub fn info(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, title: title.into(), text: text.into() }
    }

    pub fn warning(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, title: title.into(), text: text.into() }
    }

    pub fn error(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, title: title.into(), text: text.into() }
    }

    /// Show the message box and wait for OK.
    pub fn show(&self) {
        let level = match self.level {
            NoticeLevel::Info    => MessageLevel::Info,
            NoticeLevel::Warning => MessageLevel::Warning,
            NoticeLevel::Error   => MessageLevel::Error,
        };
        let _ = MessageDialog::new()
            .set_level(level)
            .set_title(&self.title)
            .set_description(&self.text)
            .set_buttons(MessageButtons::Ok)
            .show();
    }
}

// ── File pickers ──────────────────────────────────────────────────────────────

/// Multi-select video picker. `None` when the user cancels.
pub fn pick_clips(start_dir: Option<&Path>) -> Option<Vec<PathBuf>> {
    let mut dialog = FileDialog::new()
        .set_title("Select Video Clips")
        .add_filter("Video files", VIDEO_EXTENSIONS)
        .add_filter("All files", &["*"]);
    if let Some(dir) = start_dir.filter(|d| d.is_dir()) {
        dialog = dialog.set_directory(dir);
    }
    dialog.pick_files().filter(|p| !p.is_empty())
}

/// Save-as dialog for the combined file, already passed through
/// `resolve_output_path`. `None` when the user cancels.
pub fn pick_output(start_dir: Option<&Path>) -> Option<PathBuf> {
    let mut dialog = FileDialog::new()
        .set_title("Save Combined Video")
        .set_file_name(DEFAULT_OUTPUT_NAME)
        .add_filter("MP4 files", &["mp4"])
        .add_filter("All files", &["*"]);
    if let Some(dir) = start_dir.filter(|d| d.is_dir()) {
        dialog = dialog.set_directory(dir);
    }
    dialog.save_file().map(resolve_output_path)
}

/// Append `.mp4` when the chosen name has no extension, so the muxer can
/// pick a container.
pub fn resolve_output_path(path: PathBuf) -> PathBuf {
    if path.extension().is_some_and(|e| !e.is_empty()) {
        path
    } else {
        path.with_extension("mp4")
    }
}

/// Is this a file worth adding? Directories and missing paths are not.
/// Extension is not checked: dropping an odd container still gets probed.
pub fn is_addable(path: &Path) -> bool {
    path.is_file()
}
