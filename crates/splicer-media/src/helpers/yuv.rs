// crates/splicer-media/src/helpers/yuv.rs
//
// YUV420P frame utilities for the combine pipeline.
//
// Packed layout (no stride padding), as produced by `extract_yuv`:
//   [0 .. w*h]                         Y plane
//   [w*h .. w*h + uv_w*uv_h]           U plane
//   [w*h + uv_w*uv_h .. end]           V plane
//
// ffmpeg VideoFrame rows may be padded out to the stride; the functions here
// convert between strided frames and packed buffers, and composite packed
// buffers onto the letterbox canvas.

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::Pixel;
use ffmpeg::util::frame::video::Video as VideoFrame;

use splicer_core::transitions::helpers::{split_planes_mut, uv_len, y_len};

/// Copy `rows` rows of `row_len` bytes between a strided plane and a packed one.
fn copy_plane_out(dst: &mut [u8], src: &[u8], stride: usize, row_len: usize, rows: usize) {
    for row in 0..rows {
        dst[row * row_len .. row * row_len + row_len]
            .copy_from_slice(&src[row * stride .. row * stride + row_len]);
    }
}

fn copy_plane_in(dst: &mut [u8], stride: usize, src: &[u8], row_len: usize, rows: usize) {
    for row in 0..rows {
        dst[row * stride .. row * stride + row_len]
            .copy_from_slice(&src[row * row_len .. row * row_len + row_len]);
    }
}

/// Extract packed YUV420P bytes from a `w x h` YUV420P VideoFrame.
pub fn extract_yuv(yuv: &VideoFrame, w: u32, h: u32) -> Vec<u8> {
    let (wu, hu) = (w as usize, h as usize);
    let (uv_w, uv_h) = (wu / 2, hu / 2);
    let mut raw = vec![0u8; y_len(w, h) + uv_len(w, h) * 2];
    {
        let (y, u, v) = split_planes_mut(&mut raw, w, h);
        copy_plane_out(y, yuv.data(0), yuv.stride(0), wu,   hu);
        copy_plane_out(u, yuv.data(1), yuv.stride(1), uv_w, uv_h);
        copy_plane_out(v, yuv.data(2), yuv.stride(2), uv_w, uv_h);
    }
    raw
}

/// Write a packed YUV420P buffer into a VideoFrame's planes, respecting stride.
pub fn write_yuv(packed: &[u8], yuv: &mut VideoFrame, w: u32, h: u32) {
    let (wu, hu) = (w as usize, h as usize);
    let (uv_w, uv_h) = (wu / 2, hu / 2);
    let yl = y_len(w, h);
    let cl = uv_len(w, h);

    let stride = yuv.stride(0);
    copy_plane_in(yuv.data_mut(0), stride, &packed[..yl], wu, hu);
    let stride = yuv.stride(1);
    copy_plane_in(yuv.data_mut(1), stride, &packed[yl .. yl + cl], uv_w, uv_h);
    let stride = yuv.stride(2);
    copy_plane_in(yuv.data_mut(2), stride, &packed[yl + cl ..], uv_w, uv_h);
}

/// Allocate a `w x h` YUV420P frame holding `packed`.
pub fn frame_from_packed(packed: &[u8], w: u32, h: u32) -> VideoFrame {
    let mut frame = VideoFrame::new(Pixel::YUV420P, w, h);
    write_yuv(packed, &mut frame, w, h);
    frame
}

/// Composite a packed `src` frame onto a packed `canvas` at `offset`.
///
/// `offset` must be even so chroma rows and columns line up. Source pixels
/// falling outside the canvas are clipped.
pub fn paste_packed(
    canvas:   &mut [u8],
    canvas_w: u32,
    canvas_h: u32,
    src:      &[u8],
    src_w:    u32,
    src_h:    u32,
    offset:   (u32, u32),
) {
    debug_assert!(offset.0 % 2 == 0 && offset.1 % 2 == 0, "paste_packed: odd offset {offset:?}");

    let (cw, ch) = (canvas_w as usize, canvas_h as usize);
    let (sw, sh) = (src_w as usize, src_h as usize);
    let (ox, oy) = (offset.0 as usize, offset.1 as usize);

    let src_y_len  = sw * sh;
    let src_uv_len = (sw / 2) * (sh / 2);
    let src_y = &src[..src_y_len];
    let src_u = &src[src_y_len .. src_y_len + src_uv_len];
    let src_v = &src[src_y_len + src_uv_len ..];

    let (dst_y, dst_u, dst_v) = split_planes_mut(canvas, canvas_w, canvas_h);

    blit(dst_y, cw, ch, src_y, sw, sh, ox, oy);
    blit(dst_u, cw / 2, ch / 2, src_u, sw / 2, sh / 2, ox / 2, oy / 2);
    blit(dst_v, cw / 2, ch / 2, src_v, sw / 2, sh / 2, ox / 2, oy / 2);
}

/// Turn a packed `w x h` frame clockwise by `degrees` (0, 90, 180 or 270).
/// The result is `h x w` for quarter turns. `w` and `h` must be even.
pub fn rotate_packed(src: &[u8], w: u32, h: u32, degrees: u32) -> Vec<u8> {
    if degrees % 360 == 0 {
        return src.to_vec();
    }
    let (wu, hu) = (w as usize, h as usize);
    let yl = wu * hu;
    let cl = (wu / 2) * (hu / 2);
    let mut out = vec![0u8; src.len()];
    {
        let (dy, rest) = out.split_at_mut(yl);
        let (du, dv) = rest.split_at_mut(cl);
        rotate_plane(&src[..yl], wu, hu, degrees, dy);
        rotate_plane(&src[yl .. yl + cl], wu / 2, hu / 2, degrees, du);
        rotate_plane(&src[yl + cl .. yl + cl * 2], wu / 2, hu / 2, degrees, dv);
    }
    out
}

fn rotate_plane(src: &[u8], w: usize, h: usize, degrees: u32, dst: &mut [u8]) {
    for y in 0..h {
        let row = &src[y * w .. y * w + w];
        for (x, &px) in row.iter().enumerate() {
            let idx = match degrees {
                90  => x * h + (h - 1 - y),
                180 => (h - 1 - y) * w + (w - 1 - x),
                270 => (w - 1 - x) * h + y,
                _   => y * w + x,
            };
            dst[idx] = px;
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn blit(
    dst: &mut [u8], dw: usize, dh: usize,
    src: &[u8],     sw: usize, sh: usize,
    ox:  usize,     oy: usize,
) {
    if ox >= dw || oy >= dh { return; }
    let cols = sw.min(dw - ox);
    let rows = sh.min(dh - oy);
    for row in 0..rows {
        let d = (oy + row) * dw + ox;
        let s = row * sw;
        dst[d .. d + cols].copy_from_slice(&src[s .. s + cols]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splicer_core::transitions::helpers::{black_frame, BLACK_UV, BLACK_Y};

    fn solid(w: u32, h: u32, y: u8, uv: u8) -> Vec<u8> {
        let mut buf = vec![uv; y_len(w, h) + uv_len(w, h) * 2];
        buf[..y_len(w, h)].fill(y);
        buf
    }

    #[test]
    fn paste_centres_source_and_keeps_bars_black() {
        let (cw, ch) = (8, 4);
        let mut canvas = black_frame(cw, ch);
        let src = solid(4, 4, 200, 60);
        paste_packed(&mut canvas, cw, ch, &src, 4, 4, (2, 0));

        for row in 0..4usize {
            for col in 0..8usize {
                let expected = if (2..6).contains(&col) { 200 } else { BLACK_Y };
                assert_eq!(canvas[row * 8 + col], expected, "luma at {row},{col}");
            }
        }
        // U plane: 4x2, source covers columns 1..3.
        let u = &canvas[32..40];
        assert_eq!(u, &[BLACK_UV, 60, 60, BLACK_UV, BLACK_UV, 60, 60, BLACK_UV]);
    }

    #[test]
    fn paste_clips_oversized_source() {
        let mut canvas = black_frame(4, 2);
        let src = solid(6, 4, 99, 77);
        paste_packed(&mut canvas, 4, 2, &src, 6, 4, (2, 0));
        assert_eq!(&canvas[..8], &[BLACK_Y, BLACK_Y, 99, 99, BLACK_Y, BLACK_Y, 99, 99]);
    }

    /// 4x2 frame with distinct luma per pixel and distinct chroma per plane.
    fn numbered() -> Vec<u8> {
        let mut buf: Vec<u8> = (0..8).collect();
        buf.extend_from_slice(&[100, 101, 200, 201]);
        buf
    }

    #[test]
    fn rotate_quarter_turn_clockwise() {
        // 0 1 2 3        4 0
        // 4 5 6 7   →    5 1
        //                6 2
        //                7 3
        let out = rotate_packed(&numbered(), 4, 2, 90);
        assert_eq!(&out[..8], &[4, 0, 5, 1, 6, 2, 7, 3]);
        // Chroma planes are 2x1 → 1x2.
        assert_eq!(&out[8..], &[100, 101, 200, 201]);
    }

    #[test]
    fn rotate_half_and_three_quarter_turns() {
        let half = rotate_packed(&numbered(), 4, 2, 180);
        assert_eq!(&half[..8], &[7, 6, 5, 4, 3, 2, 1, 0]);
        assert_eq!(&half[8..], &[101, 100, 201, 200]);

        let ccw = rotate_packed(&numbered(), 4, 2, 270);
        assert_eq!(&ccw[..8], &[3, 7, 2, 6, 1, 5, 0, 4]);
        assert_eq!(&ccw[8..], &[101, 100, 201, 200]);
    }

    #[test]
    fn four_quarter_turns_restore_the_frame() {
        let src = numbered();
        let mut buf = src.clone();
        let (mut w, mut h) = (4, 2);
        for _ in 0..4 {
            buf = rotate_packed(&buf, w, h, 90);
            std::mem::swap(&mut w, &mut h);
        }
        assert_eq!(buf, src);
        assert_eq!(rotate_packed(&src, 4, 2, 0), src);
    }

    #[test]
    fn paste_at_origin_of_equal_size_replaces_canvas() {
        let mut canvas = black_frame(4, 4);
        let src = solid(4, 4, 1, 2);
        paste_packed(&mut canvas, 4, 4, &src, 4, 4, (0, 0));
        assert_eq!(canvas, src);
    }
}
