// crates/splicer-ui/src/modules/mod.rs
//
// Panel registry. To add a new panel:
//   1. Create modules/mypanel.rs implementing Panel
//   2. Add `pub mod mypanel;` below
//   3. Add a field and one `ui()` call in app.rs

pub mod clip_list;
pub mod combine;

use egui::Ui;
use splicer_core::commands::AppCommand;
use splicer_core::state::AppState;

/// Every panel implements this trait.
/// Panels read state and emit commands; they never mutate state directly.
pub trait Panel {
    fn ui(&mut self, ui: &mut Ui, state: &AppState, cmd: &mut Vec<AppCommand>);
}
