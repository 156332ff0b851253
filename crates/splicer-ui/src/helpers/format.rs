// crates/splicer-ui/src/helpers/format.rs
//
// UI-layer string utilities that don't belong in splicer-core.
//
// Time formatting lives in splicer_core::helpers::time. This module holds
// strings that only exist to be rendered.

use splicer_core::clip_list::ClipEntry;
use splicer_core::helpers::time::format_duration;

/// Secondary text for a clip row: "1920×1080 · 12.3s", or the probe state.
pub fn clip_detail(entry: &ClipEntry) -> String {
    match (&entry.info, &entry.probe_error) {
        (Some(info), _) => format!("{}×{} · {}", info.width, info.height, format_duration(info.duration)),
        (None, Some(_)) => "unreadable".into(),
        (None, None)    => "reading…".into(),
    }
}

/// Progress line under the bar: "42% · frame 120 / 288".
pub fn progress_label(progress: Option<(u64, u64)>) -> String {
    match progress {
        Some((frame, total)) => {
            let pct = (frame as f64 / total.max(1) as f64 * 100.0).min(100.0) as u32;
            format!("{pct}% · frame {frame} / {total}")
        }
        None => "Starting…".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splicer_core::media_types::ClipInfo;
    use std::path::PathBuf;

    #[test]
    fn detail_reflects_probe_state() {
        let mut e = ClipEntry::new(PathBuf::from("/v/a.mp4"));
        assert_eq!(clip_detail(&e), "reading…");
        e.probe_error = Some("bad".into());
        assert_eq!(clip_detail(&e), "unreadable");
        e.info = Some(ClipInfo { width: 1280, height: 720, duration: 4.2, has_audio: true });
        assert_eq!(clip_detail(&e), "1280×720 · 4.2s");
    }

    #[test]
    fn progress_is_capped_at_100() {
        assert_eq!(progress_label(Some((10, 5))), "100% · frame 10 / 5");
        assert_eq!(progress_label(Some((1, 4))), "25% · frame 1 / 4");
        assert_eq!(progress_label(None), "Starting…");
    }
}
