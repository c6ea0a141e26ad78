use noise::{NoiseFn, Perlin};

/// Seeded 2D gradient noise sampled on grid coordinates.
#[derive(Clone)]
pub struct NoiseField {
    seed: u32,
    perlin: Perlin,
}

impl NoiseField {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            perlin: Perlin::new(seed),
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Sample at `(row / scale, col / scale)`. The result lies in `[-1, 1]`.
    pub fn sample(&self, row: i32, col: i32, scale: f64) -> f64 {
        let point = [row as f64 / scale, col as f64 / scale];
        self.perlin.get(point).clamp(-1.0, 1.0)
    }
}
