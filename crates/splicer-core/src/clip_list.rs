// crates/splicer-core/src/clip_list.rs
//
// The ordered clip list: the only durable state in Splicer.
//
// The visual list and the path sequence handed to the combine pipeline are
// the same Vec<ClipEntry>. Every add / move / remove therefore applies to
// both at once; there is no second list to keep in lockstep.
//
// Selection is stored by id, not by index, so it follows entries through
// reorders without bookkeeping.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::media_types::ClipInfo;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClipListError {
    #[error("Please select clips to remove.")]
    NothingSelected,
    #[error("Please add video clips to combine.")]
    Empty,
}

/// One selected source file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClipEntry {
    pub id:   Uuid,
    pub path: PathBuf,
    /// File name component of `path`, shown in the list.
    pub name: String,
    /// Filled in by the probe worker. Runtime-only.
    #[serde(skip)]
    pub info: Option<ClipInfo>,
    /// Why the probe failed, if it did. Runtime-only.
    #[serde(skip)]
    pub probe_error: Option<String>,
}

impl ClipEntry {
    pub fn new(path: PathBuf) -> Self {
        let name = display_name(&path);
        Self { id: Uuid::new_v4(), path, name, info: None, probe_error: None }
    }

    /// Neither probed nor failed yet.
    pub fn is_pending(&self) -> bool {
        self.info.is_none() && self.probe_error.is_none()
    }
}

/// Display name for a path: the file name, falling back to the full path
/// for roots and other nameless paths.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ClipList {
    entries: Vec<ClipEntry>,
    #[serde(skip)]
    selected: BTreeSet<Uuid>,
    /// Last plainly-clicked entry; Shift-click extends from here.
    #[serde(skip)]
    anchor: Option<Uuid>,
}

impl ClipList {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &ClipEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[ClipEntry] {
        &self.entries
    }

    pub fn get(&self, id: Uuid) -> Option<&ClipEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn index_of(&self, id: Uuid) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// True once every entry has probe results.
    pub fn all_probed(&self) -> bool {
        self.entries.iter().all(|e| e.info.is_some())
    }

    // ── Mutation ─────────────────────────────────────────────────────────────

    /// Append a batch of files, sorted by display name.
    ///
    /// Only the incoming batch is sorted; existing entries keep their order.
    /// Returns the ids of the new entries in the order they were appended.
    ///
    /// ```
    /// use splicer_core::clip_list::ClipList;
    /// let mut list = ClipList::new();
    /// list.add_files(vec!["/b/2.mp4".into(), "/a/3.mp4".into(), "/z/1.mp4".into()]);
    /// let names: Vec<_> = list.iter().map(|e| e.name.as_str()).collect();
    /// assert_eq!(names, ["1.mp4", "2.mp4", "3.mp4"]);
    /// ```
    pub fn add_files<I>(&mut self, paths: I) -> Vec<Uuid>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut batch: Vec<ClipEntry> = paths.into_iter().map(ClipEntry::new).collect();
        // Stable: equal names keep the order the dialog returned them in.
        batch.sort_by(|a, b| a.name.cmp(&b.name));
        let ids = batch.iter().map(|e| e.id).collect();
        self.entries.extend(batch);
        ids
    }

    /// Move the entry at `from` so it ends up at index `to`.
    ///
    /// Same semantics as `v.insert(to, v.remove(from))`. Out-of-range indices
    /// are ignored. Returns whether anything moved.
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        let n = self.entries.len();
        if from >= n || to >= n || from == to {
            return false;
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        true
    }

    /// Reorder-on-drag: move the dragged entry to the row under the pointer.
    ///
    /// Called every frame of a drag gesture with the row index nearest the
    /// pointer; `target` past the end is clamped to the last row.
    pub fn drag_to(&mut self, id: Uuid, target: usize) -> bool {
        let Some(from) = self.index_of(id) else { return false };
        let to = target.min(self.entries.len().saturating_sub(1));
        self.move_item(from, to)
    }

    /// Remove exactly the selected entries. Returns them in their former order.
    pub fn remove_selected(&mut self) -> Result<Vec<ClipEntry>, ClipListError> {
        if self.selected.is_empty() {
            return Err(ClipListError::NothingSelected);
        }
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|e| self.selected.contains(&e.id));
        self.entries = kept;
        self.selected.clear();
        self.anchor = None;
        Ok(removed)
    }

    pub fn remove(&mut self, id: Uuid) -> Option<ClipEntry> {
        let idx = self.index_of(id)?;
        self.selected.remove(&id);
        if self.anchor == Some(id) {
            self.anchor = None;
        }
        Some(self.entries.remove(idx))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.selected.clear();
        self.anchor = None;
    }

    pub fn set_info(&mut self, id: Uuid, info: ClipInfo) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(e) => { e.info = Some(info); e.probe_error = None; true }
            None    => false,
        }
    }

    pub fn set_probe_error(&mut self, id: Uuid, msg: String) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(e) => { e.probe_error = Some(msg); true }
            None    => false,
        }
    }

    /// First entry whose probe failed.
    pub fn first_failed(&self) -> Option<&ClipEntry> {
        self.entries.iter().find(|e| e.probe_error.is_some())
    }

    /// Keep only entries matching `keep`; returns how many were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(&ClipEntry) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| keep(e));
        let live: BTreeSet<Uuid> = self.entries.iter().map(|e| e.id).collect();
        self.selected.retain(|id| live.contains(id));
        if self.anchor.is_some_and(|a| !live.contains(&a)) {
            self.anchor = None;
        }
        before - self.entries.len()
    }

    // ── Selection ────────────────────────────────────────────────────────────

    pub fn is_selected(&self, id: Uuid) -> bool {
        self.selected.contains(&id)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Plain click.
    pub fn select_only(&mut self, id: Uuid) {
        if self.index_of(id).is_none() { return; }
        self.selected.clear();
        self.selected.insert(id);
        self.anchor = Some(id);
    }

    /// Ctrl-click.
    pub fn toggle(&mut self, id: Uuid) {
        if self.index_of(id).is_none() { return; }
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
        self.anchor = Some(id);
    }

    /// Shift-click: select every entry between the anchor and `id`, inclusive.
    /// Without an anchor this behaves like a plain click.
    pub fn select_range_to(&mut self, id: Uuid) {
        let Some(end) = self.index_of(id) else { return };
        let Some(start) = self.anchor.and_then(|a| self.index_of(a)) else {
            self.select_only(id);
            return;
        };
        let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
        self.selected = self.entries[lo..=hi].iter().map(|e| e.id).collect();
    }

    pub fn select_all(&mut self) {
        self.selected = self.entries.iter().map(|e| e.id).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
        self.anchor = None;
    }
}
