//! Separable Gaussian blur over premultiplied RGBA8.
//!
//! Matches the browser `blur(<σ>px)` filter: `σ` is the standard deviation
//! in output pixels, and samples beyond the image edge are transparent, so
//! blurred borders fade out instead of smearing the edge colour.

use scrollitelli_common::{ScrolliError, ScrolliResult};

/// Kernel reach in standard deviations.
const KERNEL_SIGMAS: f64 = 3.0;

/// Mass of a Gaussian within `±KERNEL_SIGMAS` standard deviations.
const KERNEL_MASS: f64 = 0.9973;

pub fn gaussian_blur_premul(
    src: &[u8],
    width: u32,
    height: u32,
    sigma: f64,
) -> ScrolliResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| ScrolliError::render("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(ScrolliError::render(
            "gaussian_blur_premul expects src matching width*height*4",
        ));
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Ok(src.to_vec());
    }

    // Taps further out than the longest side never land inside the image.
    let kernel = gaussian_kernel_q16(sigma, width.max(height).max(1));
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    horizontal_pass(src, &mut tmp, width, height, &kernel);
    vertical_pass(&tmp, &mut out, width, height, &kernel);
    Ok(out)
}

/// Normalized kernel in Q16 fixed point.
///
/// The full kernel reaches `ceil(3σ)` and sums to exactly `1 << 16`. When
/// that reach exceeds `max_radius` the kernel is cut there, keeping the
/// weights of the full kernel, so the dropped tails behave like samples
/// beyond the image edge.
fn gaussian_kernel_q16(sigma: f64, max_radius: u32) -> Vec<u32> {
    let full_radius = (sigma * KERNEL_SIGMAS).ceil().max(1.0);
    let truncated = full_radius > f64::from(max_radius);
    let radius = if truncated {
        max_radius as i32
    } else {
        full_radius as i32
    };
    let denom = 2.0 * sigma * sigma;

    let weights_f: Vec<f64> = (-radius..=radius)
        .map(|i| {
            let x = i as f64;
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = if truncated {
        (2.0 * std::f64::consts::PI).sqrt() * sigma * KERNEL_MASS
    } else {
        weights_f.iter().sum()
    };

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|wf| ((wf / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();

    if !truncated {
        let acc: i64 = weights.iter().map(|&w| i64::from(w)).sum();
        let delta = 65536 - acc;
        if delta != 0 {
            let mid = weights.len() / 2;
            weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
        }
    }
    weights
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let w = width as i64;
    for y in 0..height as i64 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = x + ki as i64 - radius;
                if sx < 0 || sx >= w {
                    continue;
                }
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let w = width as i64;
    let h = height as i64;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = y + ki as i64 - radius;
                if sy < 0 || sy >= h {
                    continue;
                }
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    v.min(255) as u8
}

/// Convert straight-alpha RGBA8 to premultiplied, in place.
pub fn premultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * a + 127) / 255) as u8;
        }
    }
}

/// Convert premultiplied RGBA8 back to straight alpha, in place.
pub fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sigma_is_identity() {
        let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
        let out = gaussian_blur_premul(&src, 1, 2, 0.0).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn test_rejects_mismatched_buffer() {
        assert!(gaussian_blur_premul(&[0u8; 7], 1, 2, 1.0).is_err());
    }

    #[test]
    fn test_kernel_sums_to_one() {
        for sigma in [0.5, 1.0, 2.0, 4.0, 20.0] {
            let k = gaussian_kernel_q16(sigma, 1024);
            assert_eq!(k.iter().map(|&w| u64::from(w)).sum::<u64>(), 65536);
            assert_eq!(k.len() % 2, 1);
        }
    }

    #[test]
    fn test_interior_of_constant_image_is_unchanged() {
        let (w, h) = (20u32, 20u32);
        let px = [40u8, 80, 120, 255];
        let src = px.repeat((w * h) as usize);
        let out = gaussian_blur_premul(&src, w, h, 1.0).unwrap();
        let center = ((10 * w + 10) * 4) as usize;
        assert_eq!(&out[center..center + 4], &px);
    }

    #[test]
    fn test_edges_fade_toward_transparent() {
        let (w, h) = (9u32, 9u32);
        let src = [255u8, 255, 255, 255].repeat((w * h) as usize);
        let out = gaussian_blur_premul(&src, w, h, 2.0).unwrap();
        assert!(out[3] < 255, "corner alpha should drop, got {}", out[3]);
    }

    #[test]
    fn test_blur_spreads_energy_from_single_pixel() {
        let (w, h) = (5u32, 5u32);
        let mut src = vec![0u8; (w * h * 4) as usize];
        let center = ((2 * w + 2) * 4) as usize;
        src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

        let out = gaussian_blur_premul(&src, w, h, 1.0).unwrap();
        assert!(out[center + 3] < 255);
        let neighbor = ((2 * w + 3) * 4) as usize;
        assert!(out[neighbor + 3] > 0);
    }

    #[test]
    fn test_premultiply_round_trip_on_opaque() {
        let mut px = vec![12u8, 200, 99, 255];
        premultiply_in_place(&mut px);
        unpremultiply_in_place(&mut px);
        assert_eq!(px, vec![12, 200, 99, 255]);
    }

    #[test]
    fn test_kernel_is_cut_at_image_extent() {
        let k = gaussian_kernel_q16(20_000.0, 32);
        assert_eq!(k.len(), 65);
        let total: u64 = k.iter().map(|&w| u64::from(w)).sum();
        assert!(total < 65536);

        // Cutting below the full reach keeps the full kernel's weights.
        let full = gaussian_kernel_q16(4.0, 1024);
        let cut = gaussian_kernel_q16(4.0, 6);
        assert_eq!(full.len(), 25);
        assert_eq!(cut.len(), 13);
        for (&a, &b) in full[6..19].iter().zip(&cut) {
            let tolerance = f64::from(a) * 0.005 + 1.0;
            assert!(f64::from(a.abs_diff(b)) <= tolerance, "{a} vs {b}");
        }
    }

    #[test]
    fn test_huge_sigma_stays_bounded() {
        let (w, h) = (32u32, 32u32);
        let src = [200u8, 100, 50, 255].repeat((w * h) as usize);
        let out = gaussian_blur_premul(&src, w, h, 1.0e9).unwrap();
        assert_eq!(out.len(), src.len());
        // Spread this wide, almost nothing stays inside the frame.
        assert!(out.chunks_exact(4).all(|px| px[3] < 8));
    }
}
