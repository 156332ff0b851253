// crates/splicer-core/src/transitions/helpers.rs
//
// Maths shared by the video blend and the audio mix.
//
// Sections:
//   - Frame alpha
//   - Pixel blend / sample mix
//   - Packed YUV420P plane layout

// ── Frame alpha ───────────────────────────────────────────────────────────────

/// Blend alpha for overlap frame `i` of `n`.
///
/// Strictly inside (0, 1): the pure-A and pure-B frames belong to the clips
/// on either side of the overlap, not to the overlap itself.
///
/// ```
/// use splicer_core::transitions::helpers::frame_alpha;
/// // 4 blend frames → alphas 0.2, 0.4, 0.6, 0.8
/// assert!((frame_alpha(0, 4) - 0.2).abs() < 1e-6);
/// assert!((frame_alpha(3, 4) - 0.8).abs() < 1e-6);
/// ```
#[inline]
pub fn frame_alpha(i: usize, n: usize) -> f32 {
    (i + 1) as f32 / (n + 1) as f32
}

// ── Pixel blend / sample mix ──────────────────────────────────────────────────

/// `alpha = 0.0` → `a`, `alpha = 1.0` → `b`. Gamma-encoded byte space.
#[inline]
pub fn blend_byte(a: u8, b: u8, alpha: f32) -> u8 {
    ((1.0 - alpha) * a as f32 + alpha * b as f32).round() as u8
}

/// Linear crossfade of one PCM sample pair; same alpha convention as `blend_byte`.
#[inline]
pub fn mix_sample(a: f32, b: f32, alpha: f32) -> f32 {
    (1.0 - alpha) * a + alpha * b
}

// ── Packed YUV420P plane layout ───────────────────────────────────────────────
//
//   [ Y plane : w * h bytes          ]
//   [ U plane : (w/2) * (h/2) bytes  ]
//   [ V plane : (w/2) * (h/2) bytes  ]

/// Limited-range YUV for RGB black, used for letterbox bars.
pub const BLACK_Y:  u8 = 16;
pub const BLACK_UV: u8 = 128;

#[inline]
pub fn y_len(w: u32, h: u32) -> usize {
    w as usize * h as usize
}

#[inline]
pub fn uv_len(w: u32, h: u32) -> usize {
    (w / 2) as usize * (h / 2) as usize
}

/// Total byte length of a packed frame.
#[inline]
pub fn frame_len(w: u32, h: u32) -> usize {
    y_len(w, h) + uv_len(w, h) * 2
}

/// A packed YUV420P frame filled with black.
pub fn black_frame(w: u32, h: u32) -> Vec<u8> {
    let mut buf = vec![BLACK_UV; frame_len(w, h)];
    buf[..y_len(w, h)].fill(BLACK_Y);
    buf
}

/// Mutable (Y, U, V) views into a packed YUV420P buffer.
pub fn split_planes_mut(buf: &mut [u8], w: u32, h: u32) -> (&mut [u8], &mut [u8], &mut [u8]) {
    let yl = y_len(w, h);
    let cl = uv_len(w, h);
    debug_assert_eq!(buf.len(), yl + cl * 2, "split_planes_mut: {}x{} buffer has wrong length", w, h);
    let (y, rest) = buf.split_at_mut(yl);
    let (u, v)    = rest.split_at_mut(cl);
    (y, u, v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_alpha_exclusive_range() {
        let n = 7;
        for i in 0..n {
            let a = frame_alpha(i, n);
            assert!(a > 0.0 && a < 1.0, "alpha {a} out of range for i={i}");
        }
    }

    #[test]
    fn blend_byte_endpoints() {
        assert_eq!(blend_byte(0, 255, 0.0), 0);
        assert_eq!(blend_byte(0, 255, 1.0), 255);
        assert_eq!(blend_byte(100, 200, 0.5), 150);
    }

    #[test]
    fn mix_sample_midpoint() {
        assert!((mix_sample(1.0, -1.0, 0.5)).abs() < 1e-6);
        assert_eq!(mix_sample(0.25, 0.75, 0.0), 0.25);
    }

    #[test]
    fn black_frame_layout() {
        let f = black_frame(4, 2);
        assert_eq!(f.len(), 8 + 2 + 2);
        assert!(f[..8].iter().all(|&b| b == BLACK_Y));
        assert!(f[8..].iter().all(|&b| b == BLACK_UV));
    }

    #[test]
    fn split_planes_mut_lengths() {
        let mut buf = black_frame(6, 4);
        let (y, u, v) = split_planes_mut(&mut buf, 6, 4);
        assert_eq!((y.len(), u.len(), v.len()), (24, 6, 6));
    }
}
