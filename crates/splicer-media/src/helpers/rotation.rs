// crates/splicer-media/src/helpers/rotation.rs
//
// Display rotation of a video stream.
//
// Phone footage is usually stored landscape with a display matrix saying
// "show this turned by 90°". libavcodec hands back the stored orientation,
// so the clip inspector and the frame normaliser both ask here which way
// is up.
//
// Rotations are reported as clockwise degrees in {0, 90, 180, 270}: the turn
// that has to be applied to a decoded frame to display it upright.

use ffmpeg_the_third as ffmpeg;
use ffmpeg::ffi;

/// Clockwise turn needed to show `stream` upright. 0 when the stream has no
/// display matrix or the matrix is not a quarter turn.
pub fn stream_rotation(stream: &ffmpeg::format::stream::Stream) -> u32 {
    // SAFETY: codecpar and its coded side data are owned by the stream and
    // outlive this call; the display matrix payload is nine i32 values.
    let ccw = unsafe {
        let par = (*stream.as_ptr()).codecpar;
        if par.is_null() {
            return 0;
        }
        let sd = ffi::av_packet_side_data_get(
            (*par).coded_side_data,
            (*par).nb_coded_side_data,
            ffi::AVPacketSideDataType::AV_PKT_DATA_DISPLAYMATRIX,
        );
        if sd.is_null() || ((*sd).size as usize) < 9 * std::mem::size_of::<i32>() {
            return 0;
        }
        ffi::av_display_rotation_get((*sd).data as *const i32)
    };
    clockwise_degrees(ccw)
}

/// Convert a display matrix angle (counter-clockwise, -180..=180) into the
/// clockwise quarter turn that undoes it.
pub fn clockwise_degrees(ccw: f64) -> u32 {
    if !ccw.is_finite() {
        return 0;
    }
    let turns = (-ccw / 90.0).round() as i64;
    let cw = turns.rem_euclid(4) as u32 * 90;
    // Only whole quarter turns are applied; anything else is shown as stored.
    if (-ccw - turns as f64 * 90.0).abs() > 1.0 {
        return 0;
    }
    cw
}

/// Size of a `(w, h)` frame once turned by `degrees`.
pub fn rotated_size(size: (u32, u32), degrees: u32) -> (u32, u32) {
    match degrees {
        90 | 270 => (size.1, size.0),
        _        => size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix_angle(ccw: f64) -> f64 {
        let mut m = [0i32; 9];
        // SAFETY: `m` is the nine-entry matrix display.h expects.
        unsafe {
            ffi::av_display_rotation_set(m.as_mut_ptr(), ccw);
            ffi::av_display_rotation_get(m.as_ptr())
        }
    }

    #[test]
    fn phone_portrait_matrix_turns_clockwise() {
        // iPhone portrait footage carries a -90° matrix.
        assert_eq!(clockwise_degrees(matrix_angle(-90.0)), 90);
        assert_eq!(clockwise_degrees(matrix_angle(90.0)), 270);
        assert_eq!(clockwise_degrees(matrix_angle(180.0)), 180);
        assert_eq!(clockwise_degrees(matrix_angle(0.0)), 0);
    }

    #[test]
    fn near_quarter_turns_snap_and_odd_angles_are_ignored() {
        assert_eq!(clockwise_degrees(-89.6), 90);
        assert_eq!(clockwise_degrees(-180.0), 180);
        assert_eq!(clockwise_degrees(45.0), 0);
        assert_eq!(clockwise_degrees(f64::NAN), 0);
    }

    #[test]
    fn quarter_turns_swap_the_frame_size() {
        assert_eq!(rotated_size((1920, 1080), 90), (1080, 1920));
        assert_eq!(rotated_size((1920, 1080), 270), (1080, 1920));
        assert_eq!(rotated_size((1920, 1080), 180), (1920, 1080));
        assert_eq!(rotated_size((1920, 1080), 0), (1920, 1080));
    }
}
