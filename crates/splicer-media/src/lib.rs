// crates/splicer-media/src/lib.rs
//
// No egui dependency; communicates with splicer-ui via channels only.
//
// To add a new media capability:
//   1. Create a new module file here
//   2. Add `mod mymodule;` below
//   3. Call it from worker.rs (a new MediaWorker method)

pub mod audio;
pub mod encode;
pub mod error;
pub mod helpers;
pub mod plan;
pub mod probe;
mod reader;
pub mod worker;

#[cfg(test)]
mod testing;

// Re-export the main public API so splicer-ui imports are simple.
pub use worker::MediaWorker;
pub use error::MediaError;
pub use splicer_core::media_types::MediaResult;

// Re-export combine types so app.rs can build a CombineSpec without a deep import path.
pub use encode::{ClipSpec, CombineSpec};
