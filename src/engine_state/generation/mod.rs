//! # Generation Module
//!
//! Procedural sources for the voxel world. Everything in here is a pure function of
//! the world seed and the sampled coordinates, so chunks come out identical no matter
//! which worker thread builds them or in which order.
//!
//! * [`PerlinNoise`] - seeded 2D gradient noise plus fractal (octave) summation
//! * [`terrain::TerrainGenerator`] - column heights and per-voxel material typing

pub mod terrain;

/// Number of distinct entries in the permutation table.
const PERMUTATION_SIZE: usize = 256;

/// Seeded 2D gradient noise.
///
/// The permutation table is a Fisher-Yates shuffle of `0..256` driven by the seed,
/// stored twice back to back so corner hashing never has to wrap.
#[derive(Clone, Debug)]
pub struct PerlinNoise {
    permutation: [u8; PERMUTATION_SIZE * 2],
}

impl PerlinNoise {
    /// Builds the permutation table for `seed`.
    pub fn new(seed: u32) -> Self {
        let mut rng = fastrand::Rng::with_seed(seed as u64);

        let mut shuffled = [0u8; PERMUTATION_SIZE];
        for (i, slot) in shuffled.iter_mut().enumerate() {
            *slot = i as u8;
        }
        for i in (1..PERMUTATION_SIZE).rev() {
            let j = rng.usize(0..=i);
            shuffled.swap(i, j);
        }

        let mut permutation = [0u8; PERMUTATION_SIZE * 2];
        permutation[..PERMUTATION_SIZE].copy_from_slice(&shuffled);
        permutation[PERMUTATION_SIZE..].copy_from_slice(&shuffled);

        PerlinNoise { permutation }
    }

    #[inline]
    fn p(&self, index: usize) -> usize {
        self.permutation[index] as usize
    }

    /// Samples single-octave noise at `(x, y)`.
    ///
    /// The result is roughly in `[-1, 1]` and is exactly zero on lattice points.
    pub fn noise(&self, x: f64, y: f64) -> f64 {
        let cell_x = x.floor();
        let cell_y = y.floor();

        let xi = (cell_x as i64 & 255) as usize;
        let yi = (cell_y as i64 & 255) as usize;

        let x = x - cell_x;
        let y = y - cell_y;

        let u = fade(x);
        let v = fade(y);

        let a = self.p(xi) + yi;
        let aa = self.p(a);
        let ab = self.p(a + 1);
        let b = self.p(xi + 1) + yi;
        let ba = self.p(b);
        let bb = self.p(b + 1);

        lerp(
            v,
            lerp(u, grad(self.p(aa), x, y), grad(self.p(ba), x - 1.0, y)),
            lerp(
                u,
                grad(self.p(ab), x, y - 1.0),
                grad(self.p(bb), x - 1.0, y - 1.0),
            ),
        )
    }

    /// Sums `octaves` noise samples at doubling frequency and `persistence`-scaled
    /// amplitude, starting at frequency `scale`.
    ///
    /// The sum is divided by the total amplitude, which keeps the output in `[-1, 1]`.
    /// Zero octaves yield `0.0`.
    pub fn fractal_noise(
        &self,
        x: f64,
        y: f64,
        octaves: u32,
        persistence: f64,
        scale: f64,
    ) -> f64 {
        let mut value = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = scale;
        let mut max_value = 0.0;

        for _ in 0..octaves {
            value += self.noise(x * frequency, y * frequency) * amplitude;
            max_value += amplitude;
            amplitude *= persistence;
            frequency *= 2.0;
        }

        if max_value == 0.0 {
            return 0.0;
        }

        value / max_value
    }
}

/// Quintic smoothstep `6t^5 - 15t^4 + 10t^3`.
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

/// Dot product with one of four gradients selected by the low two bits of `hash`.
#[inline]
fn grad(hash: usize, x: f64, y: f64) -> f64 {
    let h = hash & 3;
    let u = if h < 2 { x } else { y };
    let v = if h < 2 { y } else { x };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permutation_is_a_duplicated_shuffle() {
        let noise = PerlinNoise::new(7);
        let mut seen = [false; PERMUTATION_SIZE];
        for i in 0..PERMUTATION_SIZE {
            seen[noise.permutation[i] as usize] = true;
            assert_eq!(noise.permutation[i], noise.permutation[i + PERMUTATION_SIZE]);
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_same_seed_same_values() {
        let a = PerlinNoise::new(42);
        let b = PerlinNoise::new(42);
        for i in 0..200 {
            let x = i as f64 * 0.37 - 30.0;
            let y = i as f64 * -0.91 + 12.5;
            assert_eq!(a.noise(x, y), b.noise(x, y));
            assert_eq!(
                a.fractal_noise(x, y, 4, 0.5, 1.0),
                b.fractal_noise(x, y, 4, 0.5, 1.0)
            );
        }
    }

    #[test]
    fn test_repeated_calls_are_stable() {
        let noise = PerlinNoise::new(9001);
        let first = noise.fractal_noise(123.456, -78.9, 4, 0.5, 0.01);
        for _ in 0..10 {
            assert_eq!(noise.fractal_noise(123.456, -78.9, 4, 0.5, 0.01), first);
        }
    }

    #[test]
    fn test_different_seeds_differ_somewhere() {
        let a = PerlinNoise::new(1);
        let b = PerlinNoise::new(2);
        let differs = (0..100).any(|i| {
            let x = i as f64 * 0.61 + 0.3;
            let y = i as f64 * 0.17 + 0.7;
            a.noise(x, y) != b.noise(x, y)
        });
        assert!(differs);
    }

    #[test]
    fn test_fractal_noise_is_bounded() {
        for seed in [0, 1, 42, 12345, u32::MAX] {
            let noise = PerlinNoise::new(seed);
            for i in -50..50 {
                for j in -50..50 {
                    let value =
                        noise.fractal_noise(i as f64 * 0.73, j as f64 * 1.31, 4, 0.5, 0.05);
                    assert!(value >= -1.0 - 1e-9 && value <= 1.0 + 1e-9, "{value}");
                }
            }
        }
    }

    #[test]
    fn test_noise_is_zero_on_lattice_points() {
        let noise = PerlinNoise::new(3);
        assert_eq!(noise.noise(0.0, 0.0), 0.0);
        assert_eq!(noise.noise(5.0, -3.0), 0.0);
    }

    #[test]
    fn test_zero_octaves() {
        let noise = PerlinNoise::new(3);
        assert_eq!(noise.fractal_noise(1.5, 2.5, 0, 0.5, 1.0), 0.0);
    }

    #[test]
    fn test_fade_endpoints() {
        assert_eq!(fade(0.0), 0.0);
        assert_eq!(fade(1.0), 1.0);
        assert!((fade(0.5) - 0.5).abs() < 1e-12);
    }
}
