//! Implicit-feedback alternating least squares (Hu, Koren & Volinsky).
//!
//! Each observed weight `w` becomes a confidence `1 + alpha * w` attached to a
//! binary preference. Every half-iteration holds one side fixed and solves
//! every row of the other side independently:
//!
//! ```text
//! (YᵀY + Yᵀ(C_u - I)Y + λI) x_u = Yᵀ C_u p_u
//! ```
//!
//! `YᵀY` is shared by all rows of a half-iteration, so each row only adds the
//! terms of its own observed entries. Rows are solved on the current rayon
//! pool and collected in row order.

use super::initializer::{FactorInitializer, InitializationMethod};
use super::matrix::{ConfidenceMatrix, CsrMatrix};
use crate::error::{Axis, RecError, RecResult};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, PartialEq)]
pub struct AlsParams {
    pub factors: usize,
    pub iterations: usize,
    pub regularization: f32,
    pub alpha: f32,
    pub seed: u64,
    pub init: InitializationMethod,
}

impl Default for AlsParams {
    fn default() -> Self {
        Self {
            factors: 50,
            iterations: 10,
            regularization: 0.01,
            alpha: 1.0,
            seed: DEFAULT_SEED,
            init: InitializationMethod::default(),
        }
    }
}

impl AlsParams {
    pub fn new(factors: usize, iterations: usize, regularization: f32, alpha: f32) -> Self {
        Self {
            factors,
            iterations,
            regularization,
            alpha,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> RecResult<()> {
        if self.factors == 0 {
            return Err(RecError::InvalidHyperparameter("factors must be positive".into()));
        }
        if self.iterations == 0 {
            return Err(RecError::InvalidHyperparameter("iterations must be positive".into()));
        }
        if !self.regularization.is_finite() || self.regularization < 0.0 {
            return Err(RecError::InvalidHyperparameter(format!(
                "regularization must be finite and non-negative, got {}",
                self.regularization
            )));
        }
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(RecError::InvalidHyperparameter(format!(
                "alpha must be finite and non-negative, got {}",
                self.alpha
            )));
        }
        Ok(())
    }
}

/// Fitted latent factors. Never mutated once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorModel {
    user_factors: DMatrix<f32>,
    item_factors: DMatrix<f32>,
}

impl FactorModel {
    pub fn from_factors(user_factors: DMatrix<f32>, item_factors: DMatrix<f32>) -> RecResult<Self> {
        if user_factors.ncols() != item_factors.ncols() {
            return Err(RecError::InvalidHyperparameter(format!(
                "user factors have {} columns but item factors have {}",
                user_factors.ncols(),
                item_factors.ncols()
            )));
        }
        Ok(Self { user_factors, item_factors })
    }

    pub fn num_users(&self) -> usize {
        self.user_factors.nrows()
    }

    pub fn num_items(&self) -> usize {
        self.item_factors.nrows()
    }

    pub fn factors(&self) -> usize {
        self.user_factors.ncols()
    }

    pub fn user_factors(&self) -> &DMatrix<f32> {
        &self.user_factors
    }

    pub fn item_factors(&self) -> &DMatrix<f32> {
        &self.item_factors
    }
}

#[derive(Debug, Clone, Default)]
pub struct AlsFactorizer {
    params: AlsParams,
}

impl AlsFactorizer {
    pub fn new(params: AlsParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &AlsParams {
        &self.params
    }

    pub fn fit(&self, matrix: &ConfidenceMatrix) -> RecResult<FactorModel> {
        self.params.validate()?;
        if matrix.nnz() == 0 {
            return Err(RecError::EmptyMatrix);
        }

        let params = &self.params;
        let started = Instant::now();
        info!(
            "Fitting ALS on {}x{} matrix ({} entries): factors={} iterations={} regularization={} alpha={}",
            matrix.num_users(),
            matrix.num_items(),
            matrix.nnz(),
            params.factors,
            params.iterations,
            params.regularization,
            params.alpha
        );

        let mut init = FactorInitializer::new(params.init, params.seed);
        let mut user_factors = init.matrix(matrix.num_users(), params.factors);
        let mut item_factors = init.matrix(matrix.num_items(), params.factors);

        for iteration in 0..params.iterations {
            let iteration_start = Instant::now();
            user_factors = solve_half(matrix.by_user(), &item_factors, params, Axis::User)?;
            item_factors = solve_half(matrix.by_item(), &user_factors, params, Axis::Item)?;
            debug!("ALS iteration {} finished in {:?}", iteration + 1, iteration_start.elapsed());
        }

        info!("ALS fit completed in {:?}", started.elapsed());
        Ok(FactorModel { user_factors, item_factors })
    }
}

fn solve_half(
    rows: &CsrMatrix,
    fixed: &DMatrix<f32>,
    params: &AlsParams,
    axis: Axis,
) -> RecResult<DMatrix<f32>> {
    let k = fixed.ncols();
    let fixed = fixed.map(f64::from);
    let mut shared = fixed.tr_mul(&fixed);
    for d in 0..k {
        shared[(d, d)] += f64::from(params.regularization);
    }

    let solved = (0..rows.rows())
        .into_par_iter()
        .map(|row| solve_row(rows, row, &fixed, &shared, f64::from(params.alpha), axis))
        .collect::<RecResult<Vec<DVector<f64>>>>()?;

    Ok(DMatrix::from_fn(rows.rows(), k, |r, c| solved[r][c] as f32))
}

fn solve_row(
    rows: &CsrMatrix,
    row: usize,
    fixed: &DMatrix<f64>,
    shared: &DMatrix<f64>,
    alpha: f64,
    axis: Axis,
) -> RecResult<DVector<f64>> {
    let k = fixed.ncols();
    // No observations: the right-hand side is zero, so is the solution.
    if rows.row_len(row) == 0 {
        return Ok(DVector::zeros(k));
    }

    let mut a = shared.clone();
    let mut b = DVector::<f64>::zeros(k);
    for (col, weight) in rows.row(row) {
        let weight = f64::from(weight);
        let y = fixed.row(col).transpose();
        let confidence = 1.0 + alpha * weight;
        let preference = if weight > 0.0 { 1.0 } else { 0.0 };
        a.ger(confidence - 1.0, &y, &y, 1.0);
        b.axpy(confidence * preference, &y, 1.0);
    }

    let x = match a.clone().cholesky() {
        Some(cholesky) => cholesky.solve(&b),
        None => a
            .lu()
            .solve(&b)
            .ok_or(RecError::DegenerateRow { axis, index: row })?,
    };

    if x.iter().all(|v| v.is_finite()) {
        Ok(x)
    } else {
        Err(RecError::DegenerateRow { axis, index: row })
    }
}

/// Fit with the default seed and initialization.
pub fn fit(
    matrix: &ConfidenceMatrix,
    factors: usize,
    iterations: usize,
    regularization: f32,
    alpha: f32,
) -> RecResult<FactorModel> {
    AlsFactorizer::new(AlsParams::new(factors, iterations, regularization, alpha)).fit(matrix)
}
