// crates/splicer-ui/src/modules/combine.rs
//
// CombinePanel: transition options and the Combine button.
//
// While a job runs the button row is replaced by a progress bar and a Cancel
// button. The options stay editable; they only apply to the next combine.

use egui::{Align, Layout, RichText, Ui};

use splicer_core::commands::AppCommand;
use splicer_core::state::AppState;
use splicer_core::transitions::{CROSSFADE_STEP_SECS, MAX_CROSSFADE_SECS, MIN_CROSSFADE_SECS};

use super::Panel;
use crate::helpers::format::progress_label;
use crate::theme::{ACCENT, ACCENT_DIM, DARK_TEXT_DIM};

#[derive(Default)]
pub struct CombinePanel;

impl Panel for CombinePanel {
    fn ui(&mut self, ui: &mut Ui, state: &AppState, cmd: &mut Vec<AppCommand>) {
        ui.add_space(4.0);
        options_row(ui, state, cmd);
        ui.add_space(6.0);

        if state.is_combining() {
            progress_row(ui, state, cmd);
        } else {
            let ready = !state.clips.is_empty();
            let button = egui::Button::new(RichText::new("Combine Videos").strong().size(14.0))
                .fill(if ready { ACCENT_DIM } else { ui.visuals().widgets.inactive.bg_fill })
                .min_size(egui::vec2(ui.available_width(), 32.0));
            if ui.add(button).clicked() {
                // Empty list still goes through so the user gets the warning dialog.
                cmd.push(AppCommand::Combine);
            }
        }
        ui.add_space(4.0);
    }
}

fn options_row(ui: &mut Ui, state: &AppState, cmd: &mut Vec<AppCommand>) {
    let crossfade = state.settings.crossfade;

    ui.horizontal(|ui| {
        let mut enabled = crossfade.enabled;
        if ui.checkbox(&mut enabled, "Enable Crossfade Transitions").changed() {
            cmd.push(AppCommand::SetCrossfadeEnabled(enabled));
        }

        ui.add_space(12.0);

        ui.add_enabled_ui(crossfade.enabled, |ui| {
            ui.label("Duration (s)");
            let mut secs = crossfade.duration_secs;
            let resp = ui.add(
                egui::DragValue::new(&mut secs)
                    .range(MIN_CROSSFADE_SECS..=MAX_CROSSFADE_SECS)
                    .speed(CROSSFADE_STEP_SECS as f64)
                    .fixed_decimals(1),
            );
            if resp.changed() {
                cmd.push(AppCommand::SetCrossfadeDuration(secs));
            }
        });
    });
}

fn progress_row(ui: &mut Ui, state: &AppState, cmd: &mut Vec<AppCommand>) {
    ui.horizontal(|ui| {
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            if ui.button("Cancel").clicked() {
                cmd.push(AppCommand::CancelCombine);
            }
            let bar = egui::ProgressBar::new(state.combine_fraction().unwrap_or(0.0))
                .fill(ACCENT)
                .desired_height(22.0)
                .animate(state.combine_progress.is_none());
            ui.add(bar);
        });
    });
    ui.label(RichText::new(progress_label(state.combine_progress)).size(11.0).color(DARK_TEXT_DIM));
}
