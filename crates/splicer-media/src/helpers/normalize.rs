// crates/splicer-media/src/helpers/normalize.rs
//
// FrameNormalizer: decoded frame of any size/format/orientation → upright
// YUV420P frame of the output canvas size.
//
// Clips that already match the canvas (or have the same aspect ratio) are
// scaled straight to the canvas. Everything else is scaled to its fitted
// size and pasted, centred, onto a black canvas.
//
// Rotated sources are scaled in their stored orientation to the turned
// fitted size, then turned upright, so the scaler never touches more pixels
// than end up on screen.
//
// The swscale context is built lazily from the first decoded frame, so the
// placement is computed from the frame the decoder actually produces rather
// than from container metadata.

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::Pixel;
use ffmpeg::software::scaling::{Context as ScaleCtx, Flags as ScaleFlags};
use ffmpeg::util::frame::video::Video as VideoFrame;

use splicer_core::helpers::geometry::{placement, Placement};
use splicer_core::transitions::helpers::black_frame;

use crate::error::{FfmpegContext, MediaError, Result};
use crate::helpers::rotation::rotated_size;
use crate::helpers::yuv::{extract_yuv, frame_from_packed, paste_packed, rotate_packed};

pub struct FrameNormalizer {
    canvas:   (u32, u32),
    /// Clockwise turn applied after scaling.
    rotation: u32,
    scaler:   Option<(ScaleCtx, Placement)>,
}

impl FrameNormalizer {
    pub fn new(canvas: (u32, u32), rotation: u32) -> Self {
        Self { canvas, rotation, scaler: None }
    }

    fn scale(&mut self, decoded: &VideoFrame) -> Result<(VideoFrame, Placement)> {
        if self.scaler.is_none() {
            let shown = rotated_size((decoded.width(), decoded.height()), self.rotation);
            let p = placement(shown, self.canvas);
            let stored = rotated_size(p.scaled, self.rotation);
            let sc = ScaleCtx::get(
                decoded.format(), decoded.width(), decoded.height(),
                Pixel::YUV420P,   stored.0,        stored.1,
                ScaleFlags::BILINEAR,
            ).step("create swscale context")?;
            log::debug!(
                "[normalize] {}x{} (turn {}°) → {}x{} at {:?} on {}x{}",
                decoded.width(), decoded.height(), self.rotation, p.scaled.0, p.scaled.1,
                p.offset, self.canvas.0, self.canvas.1,
            );
            self.scaler = Some((sc, p));
        }

        let Some((sc, p)) = self.scaler.as_mut() else {
            return Err(MediaError::Pipeline("scaler missing after initialisation".into()));
        };
        let mut yuv = VideoFrame::empty();
        sc.run(decoded, &mut yuv).step("scale video frame")?;
        Ok((yuv, *p))
    }

    /// Turn the scaled frame upright and place it on the canvas.
    fn compose(&self, yuv: &VideoFrame, p: Placement) -> Vec<u8> {
        let stored = rotated_size(p.scaled, self.rotation);
        let upright = rotate_packed(&extract_yuv(yuv, stored.0, stored.1), stored.0, stored.1, self.rotation);
        if !p.is_padded() {
            return upright;
        }
        let (cw, ch) = self.canvas;
        let mut canvas = black_frame(cw, ch);
        paste_packed(&mut canvas, cw, ch, &upright, p.scaled.0, p.scaled.1, p.offset);
        canvas
    }

    /// Normalise into a packed YUV420P canvas buffer (used by crossfades).
    pub fn to_packed(&mut self, decoded: &VideoFrame) -> Result<Vec<u8>> {
        let (yuv, p) = self.scale(decoded)?;
        Ok(self.compose(&yuv, p))
    }

    /// Normalise into an encoder-ready VideoFrame.
    pub fn to_frame(&mut self, decoded: &VideoFrame) -> Result<VideoFrame> {
        let (yuv, p) = self.scale(decoded)?;
        if !p.is_padded() && self.rotation == 0 {
            return Ok(yuv);
        }
        let packed = self.compose(&yuv, p);
        Ok(frame_from_packed(&packed, self.canvas.0, self.canvas.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splicer_core::transitions::helpers::{uv_len, y_len, BLACK_UV, BLACK_Y};

    /// `w x h` YUV420P frame with luma from `luma(x, y)` and flat chroma.
    fn frame(w: u32, h: u32, luma: impl Fn(u32, u32) -> u8, chroma: u8) -> VideoFrame {
        let mut packed = vec![chroma; y_len(w, h) + uv_len(w, h) * 2];
        for y in 0..h {
            for x in 0..w {
                packed[(y * w + x) as usize] = luma(x, y);
            }
        }
        frame_from_packed(&packed, w, h)
    }

    fn near(actual: u8, expected: u8) -> bool {
        actual.abs_diff(expected) <= 2
    }

    #[test]
    fn narrow_clip_is_pillarboxed_with_black_bars() {
        let _ = ffmpeg::init();
        let (cw, ch) = (64, 32);
        let mut n = FrameNormalizer::new((cw, ch), 0);
        let packed = n.to_packed(&frame(32, 32, |_, _| 200, 60)).unwrap();
        assert_eq!(packed.len(), y_len(cw, ch) + uv_len(cw, ch) * 2);

        for row in [0usize, 15, 31] {
            let line = &packed[row * 64 .. row * 64 + 64];
            assert!(line[..16].iter().all(|&p| p == BLACK_Y), "left bar, row {row}");
            assert!(line[48..].iter().all(|&p| p == BLACK_Y), "right bar, row {row}");
            assert!(line[16..48].iter().all(|&p| near(p, 200)), "picture, row {row}");
        }
        // U plane is 32x16; the picture covers columns 8..24.
        let u = &packed[y_len(cw, ch) .. y_len(cw, ch) + 32];
        assert!(u[..8].iter().chain(&u[24..]).all(|&p| p == BLACK_UV));
        assert!(u[8..24].iter().all(|&p| near(p, 60)));
    }

    #[test]
    fn matching_clip_fills_the_canvas() {
        let _ = ffmpeg::init();
        let mut n = FrameNormalizer::new((32, 16), 0);
        let out = n.to_frame(&frame(32, 16, |_, _| 90, 128)).unwrap();
        assert_eq!((out.width(), out.height()), (32, 16));
        assert_eq!(out.format(), Pixel::YUV420P);
        assert!(near(out.data(0)[0], 90));
    }

    #[test]
    fn rotated_clip_is_turned_upright_before_placement() {
        let _ = ffmpeg::init();
        // Stored 64x32 with a dark left half; shown turned 90° clockwise the
        // dark half ends up on top of a 32x64 picture.
        let stored = frame(64, 32, |x, _| if x < 32 { 50 } else { 200 }, 128);
        let mut n = FrameNormalizer::new((64, 64), 90);
        let out = n.to_frame(&stored).unwrap();
        assert_eq!((out.width(), out.height()), (64, 64));

        let packed = extract_yuv(&out, 64, 64);
        let at = |x: usize, y: usize| packed[y * 64 + x];
        assert!(near(at(30, 4), 50));
        assert!(near(at(30, 60), 200));
        assert_eq!(at(4, 30), BLACK_Y);
        assert_eq!(at(60, 30), BLACK_Y);
    }
}
