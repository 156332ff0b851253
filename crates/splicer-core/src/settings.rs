// crates/splicer-core/src/settings.rs
//
// User-adjustable configuration, persisted between sessions by the UI crate
// (eframe storage). Every field has a serde default so settings written by an
// older build still load.

use std::path::PathBuf;
use serde::{Deserialize, Serialize};

use crate::transitions::CrossfadeOptions;

pub const DEFAULT_FPS:     u32 = 24;
pub const DEFAULT_THREADS: u32 = 4;
const MAX_FPS:     u32 = 120;
const MAX_THREADS: u32 = 64;

/// libx264 speed/size trade-off. Faster presets produce larger files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum X264Preset {
    #[default]
    Ultrafast,
    Superfast,
    Veryfast,
    Faster,
    Fast,
    Medium,
    Slow,
}

impl X264Preset {
    /// Value passed to libx264's `preset` option.
    pub fn as_str(self) -> &'static str {
        match self {
            X264Preset::Ultrafast => "ultrafast",
            X264Preset::Superfast => "superfast",
            X264Preset::Veryfast  => "veryfast",
            X264Preset::Faster    => "faster",
            X264Preset::Fast      => "fast",
            X264Preset::Medium    => "medium",
            X264Preset::Slow      => "slow",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub crossfade: CrossfadeOptions,
    /// Output frame rate. Every clip is resampled to this rate.
    pub fps:       u32,
    pub preset:    X264Preset,
    /// Encoder thread count handed to libx264.
    pub threads:   u32,
    /// Directory the Add dialog opens in.
    pub last_add_dir:  Option<PathBuf>,
    /// Directory the Save dialog opens in.
    pub last_save_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            crossfade:     CrossfadeOptions::default(),
            fps:           DEFAULT_FPS,
            preset:        X264Preset::default(),
            threads:       DEFAULT_THREADS,
            last_add_dir:  None,
            last_save_dir: None,
        }
    }
}

impl Settings {
    /// Clamp every field into its legal range.
    pub fn sanitized(mut self) -> Self {
        self.crossfade = self.crossfade.sanitized();
        self.fps       = self.fps.clamp(1, MAX_FPS);
        self.threads   = self.threads.clamp(1, MAX_THREADS);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_export_parameters() {
        let s = Settings::default();
        assert_eq!(s.fps, 24);
        assert_eq!(s.threads, 4);
        assert_eq!(s.preset.as_str(), "ultrafast");
        assert!(!s.crossfade.enabled);
        assert_eq!(s.crossfade.duration_secs, 1.0);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let s: Settings = serde_json::from_str(r#"{ "fps": 30 }"#).unwrap();
        assert_eq!(s.fps, 30);
        assert_eq!(s.threads, DEFAULT_THREADS);
        assert_eq!(s.preset, X264Preset::Ultrafast);
    }

    #[test]
    fn preset_serializes_lowercase() {
        let json = serde_json::to_string(&X264Preset::Veryfast).unwrap();
        assert_eq!(json, "\"veryfast\"");
    }

    #[test]
    fn sanitized_clamps_out_of_range_values() {
        let s = Settings { fps: 0, threads: 1000, ..Settings::default() }.sanitized();
        assert_eq!(s.fps, 1);
        assert_eq!(s.threads, MAX_THREADS);
    }
}
