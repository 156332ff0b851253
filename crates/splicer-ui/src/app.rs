// crates/splicer-ui/src/app.rs
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context as _, Result};
use eframe::egui;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use splicer_core::clip_list::{ClipList, ClipListError};
use splicer_core::commands::AppCommand;
use splicer_core::state::AppState;
use splicer_media::{ClipSpec, CombineSpec, MediaWorker};

use crate::context::AppContext;
use crate::helpers::dialogs::{self, Notice};
use crate::modules::{clip_list::ClipListPanel, combine::CombinePanel, Panel};
use crate::theme::{configure_style, ACCENT};

/// How often to repaint while background work may deliver results.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Serialize, Deserialize)]
struct AppStorage {
    state: AppState,
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct SplicerApp {
    state:        AppState,
    context:      AppContext,
    clip_list:    ClipListPanel,
    combine:      CombinePanel,
    /// Commands emitted by panels each frame, processed after the UI pass
    pending_cmds: Vec<AppCommand>,
}

impl SplicerApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        configure_style(&cc.egui_ctx);
        cc.egui_ctx.options_mut(|o| {
            o.theme_preference = egui::ThemePreference::Dark;
        });

        let mut state = cc.storage
            .and_then(|s| eframe::get_value::<AppStorage>(s, eframe::APP_KEY))
            .map(|d| d.state)
            .unwrap_or_default();
        state.settings = state.settings.sanitized();

        let missing = state.clips.retain(|e| e.path.is_file());
        if missing > 0 {
            log::info!("[app] dropped {missing} restored clip(s) that no longer exist");
        }

        // Probe results are runtime-only, so every restored clip is re-read.
        let media_worker = MediaWorker::new();
        for entry in state.clips.iter() {
            media_worker.probe(entry.id, entry.path.clone());
        }
        log::info!("[app] restored {} clip(s)", state.clips.len());

        Self {
            state,
            context:      AppContext::new(media_worker),
            clip_list:    ClipListPanel::default(),
            combine:      CombinePanel,
            pending_cmds: Vec::new(),
        }
    }

    fn process_command(&mut self, cmd: AppCommand) {
        match cmd {
            // ── Clip list ────────────────────────────────────────────────────
            AppCommand::OpenAddDialog => {
                let start = self.state.settings.last_add_dir.clone();
                if let Some(paths) = dialogs::pick_clips(start.as_deref()) {
                    if let Some(dir) = paths.first().and_then(|p| p.parent()) {
                        self.state.settings.last_add_dir = Some(dir.to_path_buf());
                    }
                    self.add_paths(paths);
                }
            }
            AppCommand::AddFiles(paths) => {
                self.add_paths(paths);
            }
            AppCommand::RemoveSelected => match self.state.clips.remove_selected() {
                Ok(removed) => log::info!("[app] removed {} clip(s)", removed.len()),
                Err(e)      => self.context.notices.push(Notice::warning("No selection", e.to_string())),
            },
            AppCommand::RemoveClip(id) => {
                self.state.clips.remove(id);
            }
            AppCommand::ClearClips => {
                self.state.clips.clear();
            }

            // ── Selection ────────────────────────────────────────────────────
            AppCommand::SelectOnly(id)    => self.state.clips.select_only(id),
            AppCommand::ToggleSelect(id)  => self.state.clips.toggle(id),
            AppCommand::SelectRangeTo(id) => self.state.clips.select_range_to(id),
            AppCommand::SelectAll         => self.state.clips.select_all(),
            AppCommand::ClearSelection    => self.state.clips.clear_selection(),

            AppCommand::DragTo { id, target } => {
                self.state.clips.drag_to(id, target);
            }

            // ── Options ──────────────────────────────────────────────────────
            AppCommand::SetCrossfadeEnabled(enabled) => {
                self.state.settings.crossfade.enabled = enabled;
            }
            AppCommand::SetCrossfadeDuration(secs) => {
                let mut crossfade = self.state.settings.crossfade;
                crossfade.duration_secs = secs;
                self.state.settings.crossfade = crossfade.sanitized();
            }

            // ── Combine ──────────────────────────────────────────────────────
            AppCommand::Combine => self.start_combine(),
            AppCommand::CancelCombine => {
                if let Some(job_id) = self.state.combine_job {
                    self.context.media_worker.cancel_combine(job_id);
                }
            }
        }
    }

    /// Append files (sorted by name within the batch) and start probing them.
    fn add_paths(&mut self, paths: Vec<PathBuf>) {
        let paths: Vec<PathBuf> = paths.into_iter().filter(|p| dialogs::is_addable(p)).collect();
        if paths.is_empty() {
            return;
        }
        let ids = self.state.clips.add_files(paths);
        for id in &ids {
            if let Some(entry) = self.state.clips.get(*id) {
                self.context.media_worker.probe(entry.id, entry.path.clone());
            }
        }
        log::info!("[app] added {} clip(s)", ids.len());
    }

    fn start_combine(&mut self) {
        if self.state.is_combining() {
            return;
        }
        if let Err(notice) = check_ready(&self.state.clips) {
            self.context.notices.push(notice);
            return;
        }

        let start = self.state.settings.last_save_dir.clone();
        let Some(output) = dialogs::pick_output(start.as_deref()) else {
            log::info!("[app] save dialog cancelled");
            return;
        };
        if let Some(dir) = output.parent() {
            self.state.settings.last_save_dir = Some(dir.to_path_buf());
        }

        match build_request(&self.state, output) {
            Ok(spec) => {
                self.state.combine_job      = Some(spec.job_id);
                self.state.combine_progress = None;
                self.context.media_worker.start_combine(spec);
            }
            Err(e) => {
                log::error!("[app] {e:#}");
                self.context.notices.push(Notice::error(
                    "Error",
                    format!("An error occurred during video combination:\n{e:#}"),
                ));
            }
        }
    }

    fn handle_drag_and_drop(&mut self, ctx: &egui::Context) {
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw.dropped_files.iter().filter_map(|f| f.path.clone()).collect()
        });
        if !dropped.is_empty() {
            self.pending_cmds.push(AppCommand::AddFiles(dropped));
        }

        if ctx.input(|i| !i.raw.hovered_files.is_empty()) {
            let painter = ctx.layer_painter(egui::LayerId::new(
                egui::Order::Foreground,
                egui::Id::new("file_drop_overlay"),
            ));
            let rect = ctx.screen_rect();
            painter.rect_filled(rect, 0.0, egui::Color32::from_black_alpha(160));
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "Drop to add clips",
                egui::FontId::proportional(18.0),
                ACCENT,
            );
        }
    }
}

/// Refuse to start a combine the list can't satisfy.
fn check_ready(clips: &ClipList) -> std::result::Result<(), Notice> {
    if clips.is_empty() {
        return Err(Notice::warning("No clips", ClipListError::Empty.to_string()));
    }
    if let Some(bad) = clips.first_failed() {
        let why = bad.probe_error.as_deref().unwrap_or_default();
        return Err(Notice::error(
            "Error",
            format!("An error occurred during video combination:\nCould not read '{}': {why}", bad.name),
        ));
    }
    if !clips.all_probed() {
        return Err(Notice::warning(
            "Still reading clips",
            "Some clips are still being read. Please try again in a moment.",
        ));
    }
    Ok(())
}

/// Snapshot the list and settings into a job for the worker.
fn build_request(state: &AppState, output: PathBuf) -> Result<CombineSpec> {
    let clips = state.clips.iter()
        .map(|e| {
            let info = e.info.with_context(|| format!("'{}' has not been read yet", e.name))?;
            Ok(ClipSpec::whole(e.path.clone(), info))
        })
        .collect::<Result<Vec<_>>>()?;

    CombineSpec::new(Uuid::new_v4(), clips, output, &state.settings)
        .context("could not prepare the combine job")
}

// ── eframe::App ───────────────────────────────────────────────────────────────

impl eframe::App for SplicerApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &AppStorage { state: self.state.clone() });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.context.media_worker.shutdown();
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_drag_and_drop(ctx);
        self.context.ingest_media_results(&mut self.state, ctx);

        egui::TopBottomPanel::bottom("combine_panel")
            .resizable(false)
            .show(ctx, |ui| {
                self.combine.ui(ui, &self.state, &mut self.pending_cmds);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.clip_list.ui(ui, &self.state, &mut self.pending_cmds);
        });

        // ── Process commands emitted by panels this frame ─────────────────────
        let cmds: Vec<AppCommand> = self.pending_cmds.drain(..).collect();
        for cmd in cmds {
            self.process_command(cmd);
        }

        // ── Modal dialogs, one at a time, after everything is drawn ───────────
        for notice in std::mem::take(&mut self.context.notices) {
            notice.show();
        }

        let waiting = self.state.is_combining() || self.state.clips.iter().any(|e| e.is_pending());
        if waiting {
            ctx.request_repaint_after(POLL_INTERVAL);
        }
    }
}
