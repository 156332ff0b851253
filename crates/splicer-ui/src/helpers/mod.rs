// crates/splicer-ui/src/helpers/mod.rs

pub mod dialogs;
pub mod format;
pub mod log;
