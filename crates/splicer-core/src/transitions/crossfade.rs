// crates/splicer-core/src/transitions/crossfade.rs
//
// Linear dissolve between two packed YUV420P frames of identical size.
//
// No easing: the incoming clip's opacity ramps linearly across the overlap.

use crate::transitions::helpers::blend_byte;

pub struct Crossfade;

impl Crossfade {
    /// Blend `frame_a` (outgoing) and `frame_b` (incoming) at `alpha`.
    pub fn apply(&self, frame_a: &[u8], frame_b: &[u8], alpha: f32) -> Vec<u8> {
        debug_assert_eq!(
            frame_a.len(),
            frame_b.len(),
            "Crossfade::apply: frame size mismatch {} vs {}",
            frame_a.len(),
            frame_b.len(),
        );
        let alpha = alpha.clamp(0.0, 1.0);
        frame_a.iter()
            .zip(frame_b.iter())
            .map(|(&a, &b)| blend_byte(a, b, alpha))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_zero_returns_frame_a() {
        let out = Crossfade.apply(&[100; 12], &[200; 12], 0.0);
        assert!(out.iter().all(|&v| v == 100));
    }

    #[test]
    fn alpha_one_returns_frame_b() {
        let out = Crossfade.apply(&[100; 12], &[200; 12], 1.0);
        assert!(out.iter().all(|&v| v == 200));
    }

    #[test]
    fn quarter_alpha_is_linear() {
        let out = Crossfade.apply(&[0; 6], &[200; 6], 0.25);
        assert!(out.iter().all(|&v| v == 50));
    }
}
