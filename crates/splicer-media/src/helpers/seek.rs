// crates/splicer-media/src/helpers/seek.rs
//
// All demuxer seeks go through here so failure handling is uniform: a failed
// seek is logged and decoding continues from the current position. Callers
// filter frames by PTS, so the only cost of a failed seek is decode time.

use ffmpeg_the_third as ffmpeg;

/// Seek `ictx` to the keyframe at or before `target_secs`, measured from
/// `origin` (the file's first presentation time, in seconds).
///
/// Backward seek: a forward seek can land on a keyframe well past the
/// target when the target is mid-GOP, and every frame in between would be
/// missing from the decode stream.
///
/// A target of 0 is skipped: the demuxer already starts there, and
/// `avformat_seek_file(max_ts=0)` returns EPERM on Windows for a freshly
/// opened context.
///
/// Returns whether the demuxer is now positioned at or before the target.
pub fn seek_to_secs(
    ictx:        &mut ffmpeg::format::context::Input,
    target_secs: f64,
    origin:      f64,
    label:       &str,
) -> bool {
    if target_secs <= 0.0 {
        return true;
    }

    let seek_ts = seek_timestamp(target_secs, origin);
    match ictx.seek(seek_ts, ..=seek_ts) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("[seek] {label}: seek to {target_secs:.3}s failed ({e}); decoding from current position");
            false
        }
    }
}

/// `target_secs` past `origin`, in AV_TIME_BASE units.
fn seek_timestamp(target_secs: f64, origin: f64) -> i64 {
    ((target_secs + origin) * ffmpeg::ffi::AV_TIME_BASE as f64).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_is_offset_by_the_file_origin() {
        assert_eq!(seek_timestamp(2.0, 0.0), 2_000_000);
        // MPEG-TS sources commonly start at 1.4s.
        assert_eq!(seek_timestamp(2.0, 1.4), 3_400_000);
        assert_eq!(seek_timestamp(0.5, -0.04), 460_000);
    }
}
