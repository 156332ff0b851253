// crates/splicer-core/src/commands.rs
//
// Every user action is an AppCommand. Panels push these; app.rs applies them
// after the UI pass, so panels only ever read state.

use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    // ── Clip list ────────────────────────────────────────────────────────────
    /// Open the multi-select file dialog.
    OpenAddDialog,
    AddFiles(Vec<PathBuf>),
    RemoveSelected,
    RemoveClip(Uuid),
    ClearClips,

    // ── Selection ────────────────────────────────────────────────────────────
    SelectOnly(Uuid),
    ToggleSelect(Uuid),
    SelectRangeTo(Uuid),
    SelectAll,
    ClearSelection,

    /// Drag-reorder step: put `id` at row `target`.
    DragTo { id: Uuid, target: usize },

    // ── Options ──────────────────────────────────────────────────────────────
    SetCrossfadeEnabled(bool),
    SetCrossfadeDuration(f32),

    // ── Combine ──────────────────────────────────────────────────────────────
    /// Validate, ask for the output path, start the encode.
    Combine,
    CancelCombine,
}
