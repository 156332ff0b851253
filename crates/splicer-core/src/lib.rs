// crates/splicer-core/src/lib.rs
//
// Plain data shared by splicer-media and splicer-ui. No egui, no ffmpeg.

pub mod clip_list;
pub mod commands;
pub mod helpers;
pub mod media_types;
pub mod settings;
pub mod state;
pub mod transitions;
