// crates/splicer-media/src/probe.rs
//
// In-process FFmpeg probing: display size, duration, and whether there is
// sound. Only stream headers are read; nothing is decoded.
//
// The reported size is the upright one: a stream stored 1920x1080 with a
// quarter-turn display matrix probes as 1080x1920.

use std::path::Path;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::input;
use ffmpeg::media::Type;

use splicer_core::media_types::ClipInfo;

use crate::error::{FfmpegContext, MediaError, Result};
use crate::helpers::rotation::{rotated_size, stream_rotation};

pub fn probe_clip(path: &Path) -> Result<ClipInfo> {
    let ictx = input(path).map_err(|source| MediaError::Open { path: path.to_path_buf(), source })?;

    let stream = ictx.streams().best(Type::Video)
        .ok_or_else(|| MediaError::NoVideoStream(path.to_path_buf()))?;

    let decoder = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
        .step("video codec context")?
        .decoder()
        .video()
        .step("open video decoder")?;
    if decoder.width() == 0 || decoder.height() == 0 {
        return Err(MediaError::Pipeline(format!("'{}' reports a 0x0 video stream", path.display())));
    }
    let rotation = stream_rotation(&stream);
    let (width, height) = rotated_size((decoder.width(), decoder.height()), rotation);

    // Container duration first; some files only carry it on the stream.
    let mut duration = ictx.duration() as f64 / ffmpeg::ffi::AV_TIME_BASE as f64;
    if duration <= 0.0 {
        duration = stream.duration() as f64 * f64::from(stream.time_base());
    }
    if !duration.is_finite() || duration <= 0.0 {
        return Err(MediaError::UnknownDuration(path.to_path_buf()));
    }

    let has_audio = ictx.streams().best(Type::Audio).is_some();

    log::info!(
        "[probe] {}x{}{} {duration:.2}s{} ← {}",
        width, height,
        if rotation != 0 { format!(" (turned {rotation}°)") } else { String::new() },
        if has_audio { " +audio" } else { "" },
        path.display(),
    );
    Ok(ClipInfo { width, height, duration, has_audio })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SynthClip;

    #[test]
    fn missing_file_is_an_open_error() {
        let _ = ffmpeg::init();
        let err = probe_clip(Path::new("/definitely/not/here.mp4")).unwrap_err();
        assert!(matches!(err, MediaError::Open { .. }), "{err}");
    }

    #[test]
    fn non_media_file_is_rejected() {
        let _ = ffmpeg::init();
        let mut file = tempfile::Builder::new().suffix(".mp4").tempfile().unwrap();
        std::io::Write::write_all(&mut file, b"this is not a video").unwrap();
        assert!(probe_clip(file.path()).is_err());
    }

    #[test]
    fn reports_size_duration_and_audio() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.mp4");
        SynthClip::new(320, 240).seconds(1.0).with_audio().write(&path).unwrap();

        let info = probe_clip(&path).unwrap();
        assert_eq!(info.size(), (320, 240));
        assert!((info.duration - 1.0).abs() < 0.1, "duration {}", info.duration);
        assert!(info.has_audio);
    }

    #[test]
    fn rotated_stream_reports_upright_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portrait.mp4");
        // Phone-style: stored landscape, displayed turned 90° clockwise.
        SynthClip::new(320, 240).display_rotation(-90.0).write(&path).unwrap();

        let info = probe_clip(&path).unwrap();
        assert_eq!(info.size(), (240, 320));
        assert!(!info.has_audio);
    }
}
