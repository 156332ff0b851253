// crates/splicer-core/src/helpers/geometry.rs
//
// Frame-size normalisation for the combine pipeline.
//
// Every clip is encoded at one common size: the maximum width and the
// maximum height across all inputs (taken independently). A clip that does
// not already match is scaled down to fit inside that box with its aspect
// ratio preserved, then centred on a black canvas.
//
// All sizes handed to the encoder are even: YUV420P subsamples chroma 2:1
// in both directions and libx264 rejects odd dimensions.

/// Round up to the next even number.
#[inline]
pub fn even_up(v: u32) -> u32 {
    (v + 1) & !1
}

/// Round down to an even number, never below 2.
#[inline]
pub fn even_down(v: u32) -> u32 {
    (v & !1).max(2)
}

/// Common output size for a set of clip sizes.
///
/// Returns `None` when `sizes` is empty.
///
/// ```
/// use splicer_core::helpers::geometry::target_size;
/// assert_eq!(target_size(&[(1920, 800), (1280, 1080)]), Some((1920, 1080)));
/// assert_eq!(target_size(&[(641, 359)]), Some((642, 360)));
/// assert_eq!(target_size(&[]), None);
/// ```
pub fn target_size(sizes: &[(u32, u32)]) -> Option<(u32, u32)> {
    let max_w = sizes.iter().map(|&(w, _)| w).max()?;
    let max_h = sizes.iter().map(|&(_, h)| h).max()?;
    Some((even_up(max_w.max(2)), even_up(max_h.max(2))))
}

/// Largest size with `src`'s aspect ratio that fits inside `target`.
///
/// Scale factor is `min(tw / sw, th / sh)`; the scaled dimensions are
/// truncated, then rounded down to even.
pub fn fit_within(src: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (sw, sh) = (src.0.max(1) as f64, src.1.max(1) as f64);
    let (tw, th) = (target.0 as f64, target.1 as f64);
    let scale = (tw / sw).min(th / sh);
    let w = ((sw * scale) as u32).min(target.0);
    let h = ((sh * scale) as u32).min(target.1);
    (even_down(w), even_down(h))
}

/// Where one clip lands on the output canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Size the clip is scaled to.
    pub scaled:  (u32, u32),
    /// Top-left corner of the scaled clip on the canvas. Always even.
    pub offset:  (u32, u32),
    /// Size of the whole canvas.
    pub canvas:  (u32, u32),
}

impl Placement {
    /// True when black bars are needed around the scaled clip.
    pub fn is_padded(&self) -> bool {
        self.scaled != self.canvas
    }
}

/// Fit `src` inside `target` and centre it.
///
/// A clip whose size already matches `target` is placed at the origin unscaled.
///
/// ```
/// use splicer_core::helpers::geometry::placement;
/// // 4:3 clip on a 16:9 canvas → pillarboxed.
/// let p = placement((640, 480), (1280, 720));
/// assert_eq!(p.scaled, (960, 720));
/// assert_eq!(p.offset, (160, 0));
/// assert!(p.is_padded());
/// ```
pub fn placement(src: (u32, u32), target: (u32, u32)) -> Placement {
    if src == target {
        return Placement { scaled: target, offset: (0, 0), canvas: target };
    }
    let scaled = fit_within(src, target);
    let offset = (
        ((target.0 - scaled.0) / 2) & !1,
        ((target.1 - scaled.1) / 2) & !1,
    );
    Placement { scaled, offset, canvas: target }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_takes_width_and_height_independently() {
        let sizes = [(1280, 720), (720, 1280), (1920, 1080)];
        assert_eq!(target_size(&sizes), Some((1920, 1280)));
    }

    #[test]
    fn fit_preserves_aspect_ratio() {
        let (w, h) = fit_within((1280, 720), (1920, 1280));
        assert_eq!((w, h), (1920, 1080));
        let (w, h) = fit_within((720, 1280), (1920, 1280));
        assert_eq!((w, h), (720, 1280));
    }

    #[test]
    fn fit_rounds_down_to_even() {
        // scale = min(1000/333, 1000/500) = 2.0 → 666 x 1000
        assert_eq!(fit_within((333, 500), (1000, 1000)), (666, 1000));
        // 3:2 into 101-wide box would give 101 → 100.
        let (w, _) = fit_within((300, 200), (101, 1000));
        assert_eq!(w, 100);
    }

    #[test]
    fn fit_never_exceeds_target() {
        for src in [(1, 1), (7, 3), (1919, 1081), (4096, 2160), (2, 4000)] {
            let (w, h) = fit_within(src, (1920, 1080));
            assert!(w <= 1920 && h <= 1080, "{src:?} → {w}x{h}");
            assert!(w % 2 == 0 && h % 2 == 0);
        }
    }

    #[test]
    fn placement_letterboxes_wide_clip() {
        let p = placement((1920, 800), (1920, 1080));
        assert_eq!(p.scaled, (1920, 800));
        assert_eq!(p.offset, (0, 140));
        assert!(p.is_padded());
    }

    #[test]
    fn placement_of_matching_clip_is_identity() {
        let p = placement((1280, 720), (1280, 720));
        assert_eq!(p.scaled, (1280, 720));
        assert_eq!(p.offset, (0, 0));
        assert!(!p.is_padded());
    }

    #[test]
    fn placement_of_same_aspect_smaller_clip_scales_up_without_bars() {
        let p = placement((640, 360), (1280, 720));
        assert_eq!(p.scaled, (1280, 720));
        assert!(!p.is_padded());
    }
}
