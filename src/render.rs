use rayon::prelude::*;

use crate::clock::Offsets;
use crate::config::SkyColor;
use crate::field::{CHANNELS, CloudField};
use crate::noise::FractalSampler;

const CLOUD_WHITE: [u8; 3] = [255, 255, 255];
const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Map a fractal sample in [-1, 1] to cloud opacity.
///
/// Below the threshold the sky is clear; above it opacity ramps linearly from
/// 0 at the threshold to 255 at the noise peak. Non-finite samples and a
/// threshold of 1 (or NaN) are clear sky.
#[inline]
pub fn cloud_alpha(n: f64, threshold: f64) -> u8 {
    let u = (n + 1.0) * 0.5;
    if !u.is_finite() || !(threshold < 1.0) || u < threshold {
        return 0;
    }
    let intensity = ((u - threshold) / (1.0 - threshold)).clamp(0.0, 1.0);
    (intensity * 255.0).round() as u8
}

#[inline]
fn block_color(alpha: u8) -> [u8; 4] {
    if alpha == 0 {
        TRANSPARENT
    } else {
        [CLOUD_WHITE[0], CLOUD_WHITE[1], CLOUD_WHITE[2], alpha]
    }
}

/// Overwrite `field` with one frame of clouds.
///
/// The surface is walked in `pixel_size` blocks; each block takes one fractal
/// sample at its top-left pixel, shifted by the drift offsets, and is filled
/// with a single color (clipped at the right/bottom edges). Bands of
/// `pixel_size` rows are independent and rendered in parallel. A field with no
/// pixels is left untouched. Thresholds outside [0, 1] are clamped.
pub fn generate_clouds(
    field: &mut CloudField,
    sampler: &FractalSampler,
    pixel_size: usize,
    threshold: f64,
    off: Offsets,
) {
    let w = field.w;
    if field.is_empty() || field.rgba.len() != w * field.h * CHANNELS {
        return;
    }
    let block = pixel_size.max(1);
    // NaN survives the clamp and is gated to clear sky by `cloud_alpha`.
    let threshold = threshold.clamp(0.0, 1.0);
    let row_bytes = w * CHANNELS;

    field
        .rgba
        .par_chunks_mut(row_bytes * block)
        .enumerate()
        .for_each(|(band, rows)| {
            let by = (band * block) as f64;
            let (first, rest) = rows.split_at_mut(row_bytes);

            for bx in (0..w).step_by(block) {
                let n = sampler.sample(bx as f64 - off.dx, by - off.dy, off.dz);
                let color = block_color(cloud_alpha(n, threshold));
                let end = (bx + block).min(w);
                for px in first[bx * CHANNELS..end * CHANNELS].chunks_exact_mut(CHANNELS) {
                    px.copy_from_slice(&color);
                }
            }

            // Remaining rows of the band repeat the first (partial at the bottom edge).
            for row in rest.chunks_exact_mut(row_bytes) {
                row.copy_from_slice(first);
            }
        });
}

#[inline]
fn lerp_color(a: [u8; 4], b: [u8; 4], t: f32) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    [
        (a[0] as f32 + (b[0] as f32 - a[0] as f32) * t).round() as u8,
        (a[1] as f32 + (b[1] as f32 - a[1] as f32) * t).round() as u8,
        (a[2] as f32 + (b[2] as f32 - a[2] as f32) * t).round() as u8,
        255,
    ]
}

/// Source-over blend of the straight-alpha cloud layer onto an opaque sky.
/// Returns a fully opaque RGBA8 frame of the same size.
pub fn composite_over_sky(clouds: &CloudField, sky: SkyColor) -> Vec<u8> {
    let w = clouds.w;
    let h = clouds.h;
    let mut rgba = vec![0u8; w * h * CHANNELS];
    if rgba.is_empty() || clouds.rgba.len() != rgba.len() {
        return rgba;
    }
    let base = sky.rgba();

    rgba.par_chunks_mut(w * CHANNELS)
        .zip(clouds.rgba.par_chunks(w * CHANNELS))
        .for_each(|(out, src)| {
            for (o, s) in out
                .chunks_exact_mut(CHANNELS)
                .zip(src.chunks_exact(CHANNELS))
            {
                let color = lerp_color(base, [s[0], s[1], s[2], 255], s[3] as f32 / 255.0);
                o.copy_from_slice(&color);
            }
        });

    rgba
}
