//! Operand matrices, the exact golden product, and matrix sources

use num_bigint::BigInt;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;
use tracing::debug;

use crate::error::{GenError, GenResult};

/// Dense integer matrix, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<i64>,
}

impl Matrix {
    pub fn from_vec(rows: usize, cols: usize, data: Vec<i64>) -> GenResult<Self> {
        if data.len() != rows * cols {
            return Err(GenError::shape(
                format!("{} elements for {}x{}", rows * cols, rows, cols),
                format!("{} elements", data.len()),
            ));
        }
        Ok(Self { rows, cols, data })
    }

    pub fn from_rows(rows: &[Vec<i64>]) -> GenResult<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().find(|r| r.len() != cols) {
            return Err(GenError::shape(
                format!("rows of length {}", cols),
                format!("a row of length {}", bad.len()),
            ));
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data: rows.iter().flatten().copied().collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> i64 {
        self.data[row * self.cols + col]
    }

    pub fn row(&self, row: usize) -> &[i64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn column(&self, col: usize) -> impl Iterator<Item = i64> + '_ {
        (0..self.rows).map(move |r| self.get(r, col))
    }

    /// Exact product `self @ rhs`; every element is accumulated in `BigInt`
    pub fn matmul(&self, rhs: &Matrix) -> GenResult<GoldenMatrix> {
        if self.cols != rhs.rows {
            return Err(GenError::shape(
                format!("{} rows in right operand", self.cols),
                format!("{}x{}", rhs.rows, rhs.cols),
            ));
        }

        let mut data = Vec::with_capacity(self.rows * rhs.cols);
        for i in 0..self.rows {
            for j in 0..rhs.cols {
                let mut acc = BigInt::default();
                for k in 0..self.cols {
                    acc += BigInt::from(self.get(i, k)) * rhs.get(k, j);
                }
                data.push(acc);
            }
        }

        Ok(GoldenMatrix {
            rows: self.rows,
            cols: rhs.cols,
            data,
        })
    }
}

/// Exact product matrix, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoldenMatrix {
    rows: usize,
    cols: usize,
    data: Vec<BigInt>,
}

impl GoldenMatrix {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> &BigInt {
        &self.data[row * self.cols + col]
    }

    /// Elements in row-major order, `(0, 0)` first
    pub fn iter(&self) -> impl Iterator<Item = &BigInt> {
        self.data.iter()
    }
}

/// Anything that can supply operand matrices with elements in `[min, max]`
pub trait MatrixSource {
    fn matrix(&mut self, rows: usize, cols: usize, min: i64, max: i64) -> GenResult<Matrix>;
}

/// Uniform random matrices from a ChaCha8 stream
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: ChaCha8Rng,
}

impl RandomSource {
    /// Seeded source; the same seed always produces the same matrices
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl MatrixSource for RandomSource {
    fn matrix(&mut self, rows: usize, cols: usize, min: i64, max: i64) -> GenResult<Matrix> {
        if min > max {
            return Err(GenError::config(format!("empty element range [{}, {}]", min, max)));
        }
        debug!(rows, cols, min, max, "sampling random matrix");
        let data = (0..rows * cols)
            .map(|_| self.rng.gen_range(min..=max))
            .collect();
        Matrix::from_vec(rows, cols, data)
    }
}

/// Hands out pre-built matrices in order
#[derive(Debug, Clone, Default)]
pub struct FixedSource {
    queue: VecDeque<Matrix>,
}

impl FixedSource {
    pub fn new(matrices: impl IntoIterator<Item = Matrix>) -> Self {
        Self {
            queue: matrices.into_iter().collect(),
        }
    }
}

impl MatrixSource for FixedSource {
    /// The element range is not enforced here: out-of-range values are
    /// exactly what the lane masks are meant to truncate.
    fn matrix(&mut self, rows: usize, cols: usize, _min: i64, _max: i64) -> GenResult<Matrix> {
        let matrix = self
            .queue
            .pop_front()
            .ok_or_else(|| GenError::config("fixed matrix source exhausted"))?;
        if matrix.shape() != (rows, cols) {
            return Err(GenError::shape(
                format!("{}x{}", rows, cols),
                format!("{}x{}", matrix.rows, matrix.cols),
            ));
        }
        Ok(matrix)
    }
}
