// crates/splicer-ui/src/modules/clip_list.rs
//
// ClipListPanel: toolbar (Add / Remove / Clear) plus the ordered clip list.
//
// Interaction:
//   click          → select only this row
//   Ctrl/Cmd-click → toggle this row
//   Shift-click    → select the range from the last plain click
//   right-click    → context menu with Remove
//   drag           → the row follows the pointer; every time the pointer
//                    crosses into another row a DragTo command moves it there
//   Delete / ⌫     → remove selection;  Ctrl-A → select all;  Esc → deselect
//
// The list order IS the combine order; there is no separate model to sync.

use egui::{Align, CursorIcon, Id, Layout, Margin, RichText, Sense, Stroke, Ui};
use uuid::Uuid;

use splicer_core::commands::AppCommand;
use splicer_core::helpers::time::format_duration;
use splicer_core::state::AppState;
use splicer_core::transitions::{output_duration, plan_transitions};

use super::Panel;
use crate::helpers::format::clip_detail;
use crate::theme::{ACCENT, DARK_BG_2, DARK_BG_3, DARK_TEXT_DIM, ERROR_TEXT, ROW_SELECTED};

const ROW_HEIGHT: f32 = 26.0;

#[derive(Default)]
pub struct ClipListPanel {
    /// Row currently being dragged.
    dragging: Option<Uuid>,
}

impl Panel for ClipListPanel {
    fn ui(&mut self, ui: &mut Ui, state: &AppState, cmd: &mut Vec<AppCommand>) {
        self.hotkeys(ui, state, cmd);
        toolbar(ui, state, cmd);
        ui.separator();
        self.list(ui, state, cmd);
    }
}

fn toolbar(ui: &mut Ui, state: &AppState, cmd: &mut Vec<AppCommand>) {
    egui::Frame::new()
        .fill(DARK_BG_2)
        .inner_margin(Margin { left: 8, right: 8, top: 6, bottom: 6 })
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                if ui.button("＋ Add Clips").clicked() {
                    cmd.push(AppCommand::OpenAddDialog);
                }
                if ui.button("Remove Selected").clicked() {
                    cmd.push(AppCommand::RemoveSelected);
                }
                if ui.add_enabled(!state.clips.is_empty(), egui::Button::new("Clear")).clicked() {
                    cmd.push(AppCommand::ClearClips);
                }

                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    ui.label(RichText::new(summary(state)).size(11.0).color(DARK_TEXT_DIM));
                });
            });
        });
}

/// "3 clips · 1:12" once every clip is probed, otherwise just the count.
fn summary(state: &AppState) -> String {
    let n = state.clips.len();
    let count = if n == 1 { "1 clip".to_string() } else { format!("{n} clips") };
    if n == 0 || !state.clips.all_probed() {
        return count;
    }
    let durations: Vec<f64> = state.clips.iter()
        .filter_map(|e| e.info.map(|i| i.duration))
        .collect();
    let transitions = plan_transitions(&durations, state.settings.crossfade.sanitized());
    format!("{count} · {}", format_duration(output_duration(&durations, &transitions)))
}

impl ClipListPanel {
    fn hotkeys(&self, ui: &mut Ui, state: &AppState, cmd: &mut Vec<AppCommand>) {
        // Leave keys alone while a text field (the duration box) has focus.
        if ui.ctx().memory(|m| m.focused().is_some()) {
            return;
        }
        let (delete, select_all, escape) = ui.input(|i| (
            i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace),
            i.modifiers.command && i.key_pressed(egui::Key::A),
            i.key_pressed(egui::Key::Escape),
        ));
        if delete && state.clips.selected_count() > 0 {
            cmd.push(AppCommand::RemoveSelected);
        }
        if select_all {
            cmd.push(AppCommand::SelectAll);
        }
        if escape {
            cmd.push(AppCommand::ClearSelection);
        }
    }

    fn list(&mut self, ui: &mut Ui, state: &AppState, cmd: &mut Vec<AppCommand>) {
        if state.clips.is_empty() {
            self.dragging = None;
            ui.add_space(40.0);
            ui.vertical_centered(|ui| {
                ui.label(RichText::new("🎬").size(32.0));
                ui.add_space(6.0);
                ui.label(RichText::new("Drop video files here\nor use Add Clips")
                    .size(11.0).color(DARK_TEXT_DIM));
            });
            return;
        }

        let modifiers   = ui.input(|i| i.modifiers);
        let pointer     = ui.ctx().pointer_interact_pos();
        let mut row_hit: Option<usize> = None;

        egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
            for (index, entry) in state.clips.iter().enumerate() {
                let id          = entry.id;
                let is_selected = state.clips.is_selected(id);
                let is_dragged  = self.dragging == Some(id);

                let fill = if is_selected { ROW_SELECTED } else if index % 2 == 0 { DARK_BG_2 } else { DARK_BG_3 };
                let stroke = if is_dragged { Stroke::new(1.5, ACCENT) } else { Stroke::NONE };

                let frame = egui::Frame::new()
                    .fill(fill)
                    .stroke(stroke)
                    .corner_radius(egui::CornerRadius::same(3))
                    .inner_margin(Margin { left: 8, right: 8, top: 4, bottom: 4 })
                    .show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.set_min_height(ROW_HEIGHT - 8.0);
                        ui.horizontal(|ui| {
                            ui.label(RichText::new(format!("{:>2}.", index + 1))
                                .size(11.0).monospace().color(DARK_TEXT_DIM));
                            ui.add(egui::Label::new(RichText::new(&entry.name).size(12.0)).truncate());
                            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                                let color = if entry.probe_error.is_some() { ERROR_TEXT } else { DARK_TEXT_DIM };
                                ui.label(RichText::new(clip_detail(entry)).size(10.0).monospace().color(color));
                            });
                        });
                    });

                let rect = frame.response.rect;
                let resp = ui.interact(rect, Id::new("clip_row").with(id), Sense::click_and_drag());

                if let Some(err) = &entry.probe_error {
                    resp.clone().on_hover_text(err.as_str());
                }

                if resp.clicked() {
                    cmd.push(if modifiers.shift {
                        AppCommand::SelectRangeTo(id)
                    } else if modifiers.command {
                        AppCommand::ToggleSelect(id)
                    } else {
                        AppCommand::SelectOnly(id)
                    });
                }

                if resp.drag_started() {
                    self.dragging = Some(id);
                }
                if resp.drag_stopped() {
                    self.dragging = None;
                }
                if resp.dragged() {
                    ui.ctx().set_cursor_icon(CursorIcon::Grabbing);
                } else if resp.hovered() {
                    ui.ctx().set_cursor_icon(CursorIcon::Grab);
                }

                // Pointer row for an in-progress drag; compared on y only so
                // the drag keeps tracking when the pointer leaves the list sideways.
                if let Some(p) = pointer {
                    if p.y >= rect.top() && p.y < rect.bottom() {
                        row_hit = Some(index);
                    }
                }

                resp.context_menu(|ui| {
                    ui.set_min_width(140.0);
                    if ui.button("🗑  Remove").clicked() {
                        cmd.push(AppCommand::RemoveClip(id));
                        ui.close();
                    }
                    ui.separator();
                    ui.label(RichText::new(entry.path.display().to_string()).size(10.0).color(DARK_TEXT_DIM));
                });
            }

            // Click on empty space below the rows clears the selection.
            let rest = ui.allocate_response(
                egui::vec2(ui.available_width(), ui.available_height().max(ROW_HEIGHT)),
                Sense::click(),
            );
            if rest.clicked() {
                cmd.push(AppCommand::ClearSelection);
            }
        });

        // ── Drag reorder ──────────────────────────────────────────────────────
        if let Some(id) = self.dragging {
            if !ui.input(|i| i.pointer.primary_down()) {
                self.dragging = None;
            } else if let (Some(target), Some(current)) = (row_hit, state.clips.index_of(id)) {
                if target != current {
                    cmd.push(AppCommand::DragTo { id, target });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splicer_core::media_types::ClipInfo;
    use splicer_core::transitions::CrossfadeOptions;

    fn state_with(durations: &[f64]) -> AppState {
        let mut state = AppState::default();
        let ids = state.clips.add_files(durations.iter().enumerate().map(|(i, _)| format!("/v/{i}.mp4").into()));
        for (id, &d) in ids.iter().zip(durations) {
            state.clips.set_info(*id, ClipInfo { width: 640, height: 360, duration: d, has_audio: true });
        }
        state
    }

    #[test]
    fn summary_counts_clips() {
        assert_eq!(summary(&AppState::default()), "0 clips");
        assert_eq!(summary(&state_with(&[2.0])), "1 clip · 2.0s");
    }

    #[test]
    fn summary_accounts_for_crossfades() {
        let mut state = state_with(&[10.0, 10.0]);
        assert_eq!(summary(&state), "2 clips · 20.0s");
        state.settings.crossfade = CrossfadeOptions { enabled: true, duration_secs: 2.0 };
        assert_eq!(summary(&state), "2 clips · 18.0s");
    }

    #[test]
    fn summary_waits_for_probes() {
        let mut state = AppState::default();
        state.clips.add_files(vec!["/v/a.mp4".into()]);
        assert_eq!(summary(&state), "1 clip");
    }
}
