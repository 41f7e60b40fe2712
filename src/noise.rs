use crate::rng::Rng;

/// Seed for the process-wide noise lattice. Every `NoiseField::new()` builds
/// the same table, so frames are reproducible across engine instances.
pub const NOISE_SEED: u64 = 1337;

pub const DEFAULT_OCTAVES: u32 = 3;
/// Past this, octaves are finer than a pixel and only add cost.
pub const MAX_OCTAVES: u32 = 16;
pub const LACUNARITY: f64 = 2.0;
pub const GAIN: f64 = 0.5;

/// Edge-midpoint gradients of the unit cube (12), padded to 16 so the lookup
/// is a mask instead of a modulo.
const GRADIENTS: [[f64; 3]; 16] = [
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0],
    [0.0, -1.0, 1.0],
    [0.0, 1.0, -1.0],
    [0.0, -1.0, -1.0],
    [1.0, 1.0, 0.0],
    [0.0, -1.0, 1.0],
    [-1.0, 1.0, 0.0],
    [0.0, -1.0, -1.0],
];

#[inline]
fn smootherstep(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[inline]
fn grad(hash: u8, dx: f64, dy: f64, dz: f64) -> f64 {
    let g = &GRADIENTS[(hash & 15) as usize];
    g[0] * dx + g[1] * dy + g[2] * dz
}

/// Wrap a lattice coordinate into the 256-entry permutation period.
#[inline]
fn lattice(v: f64) -> usize {
    (v as i64 & 255) as usize
}

/// 3D gradient-lattice noise (improved Perlin) over an owned permutation table.
///
/// Output is continuous, deterministic for a given seed, and clamped to
/// [-1, 1]. The lattice is shifted by a seed-derived sub-cell origin so the
/// zero crossings at integer coordinates don't line up with pixel (0, 0).
#[derive(Clone, Debug)]
pub struct NoiseField {
    perm: [u8; 512],
    origin: [f64; 3],
}

impl Default for NoiseField {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseField {
    pub fn new() -> Self {
        Self::with_seed(NOISE_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        let mut rng = Rng::new(seed);
        let origin = [
            rng.next_f64() * 256.0,
            rng.next_f64() * 256.0,
            rng.next_f64() * 256.0,
        ];

        let mut base = [0u8; 256];
        for (i, p) in base.iter_mut().enumerate() {
            *p = i as u8;
        }
        // Fisher-Yates
        for i in (1..256).rev() {
            let j = rng.range_usize(i + 1);
            base.swap(i, j);
        }

        // Doubled so corner lookups never need a second mask.
        let mut perm = [0u8; 512];
        perm[..256].copy_from_slice(&base);
        perm[256..].copy_from_slice(&base);

        Self { perm, origin }
    }

    #[must_use]
    pub fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        let x = x + self.origin[0];
        let y = y + self.origin[1];
        let z = z + self.origin[2];

        let xf = x.floor();
        let yf = y.floor();
        let zf = z.floor();
        let fx = x - xf;
        let fy = y - yf;
        let fz = z - zf;
        let xi = lattice(xf);
        let yi = lattice(yf);
        let zi = lattice(zf);

        let p = &self.perm;
        let a = p[xi] as usize + yi;
        let aa = p[a] as usize + zi;
        let ab = p[a + 1] as usize + zi;
        let b = p[xi + 1] as usize + yi;
        let ba = p[b] as usize + zi;
        let bb = p[b + 1] as usize + zi;

        let d000 = grad(p[aa], fx, fy, fz);
        let d100 = grad(p[ba], fx - 1.0, fy, fz);
        let d010 = grad(p[ab], fx, fy - 1.0, fz);
        let d110 = grad(p[bb], fx - 1.0, fy - 1.0, fz);
        let d001 = grad(p[aa + 1], fx, fy, fz - 1.0);
        let d101 = grad(p[ba + 1], fx - 1.0, fy, fz - 1.0);
        let d011 = grad(p[ab + 1], fx, fy - 1.0, fz - 1.0);
        let d111 = grad(p[bb + 1], fx - 1.0, fy - 1.0, fz - 1.0);

        let sx = smootherstep(fx);
        let sy = smootherstep(fy);
        let sz = smootherstep(fz);

        let x00 = lerp(d000, d100, sx);
        let x10 = lerp(d010, d110, sx);
        let x01 = lerp(d001, d101, sx);
        let x11 = lerp(d011, d111, sx);
        let y0 = lerp(x00, x10, sy);
        let y1 = lerp(x01, x11, sy);

        lerp(y0, y1, sz).clamp(-1.0, 1.0)
    }
}

/// Fractal Brownian motion over a single `NoiseField`: each octave doubles the
/// frequency and halves the amplitude, and the sum is divided by the total
/// amplitude so the result stays in [-1, 1] for any octave count.
#[derive(Clone, Debug)]
pub struct FractalSampler {
    noise: NoiseField,
    frequency: f64,
    octaves: u32,
    norm: f64,
}

impl FractalSampler {
    pub fn new(frequency: f64, octaves: u32) -> Self {
        Self::with_noise(NoiseField::new(), frequency, octaves)
    }

    /// `octaves` is capped at `MAX_OCTAVES`.
    pub fn with_noise(noise: NoiseField, frequency: f64, octaves: u32) -> Self {
        let octaves = octaves.min(MAX_OCTAVES);
        let mut norm = 0.0;
        let mut amp = 1.0;
        for _ in 0..octaves {
            norm += amp;
            amp *= GAIN;
        }
        Self {
            noise,
            frequency,
            octaves,
            norm,
        }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn octaves(&self) -> u32 {
        self.octaves
    }

    #[must_use]
    pub fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        let mut sum = 0.0;
        let mut amp = 1.0;
        let mut freq = self.frequency;
        for _ in 0..self.octaves {
            sum += self.noise.sample(x * freq, y * freq, z * freq) * amp;
            amp *= GAIN;
            freq *= LACUNARITY;
        }
        if self.norm > 0.0 {
            (sum / self.norm).clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}
