// crates/splicer-media/src/helpers/mod.rs
//
// Frame and seek plumbing for the combine pipeline. Not part of the public
// API consumed by splicer-ui.

pub mod normalize;
pub mod rotation;
pub mod sampler;
pub mod seek;
pub mod yuv;
