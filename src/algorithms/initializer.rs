use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InitializationMethod {
    /// Uniform in `[0, scale)`, divided by the number of factors.
    ScaledUniform { scale: f32 },
    Zeros,
}

impl Default for InitializationMethod {
    fn default() -> Self {
        InitializationMethod::ScaledUniform { scale: 0.01 }
    }
}

impl InitializationMethod {
    fn sample(&self, rng: &mut StdRng, cols: usize) -> f32 {
        match *self {
            InitializationMethod::ScaledUniform { scale } => rng.gen::<f32>() * scale / cols as f32,
            InitializationMethod::Zeros => 0.0,
        }
    }
}

/// Produces factor matrices from a fixed seed so fits are reproducible.
pub struct FactorInitializer {
    method: InitializationMethod,
    rng: StdRng,
}

impl FactorInitializer {
    pub fn new(method: InitializationMethod, seed: u64) -> Self {
        Self {
            method,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Row-major draw order, so the same seed yields the same matrix.
    pub fn matrix(&mut self, rows: usize, cols: usize) -> DMatrix<f32> {
        let values: Vec<f32> = (0..rows * cols)
            .map(|_| self.method.sample(&mut self.rng, cols))
            .collect();
        DMatrix::from_row_slice(rows, cols, &values)
    }
}
