use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::error::{KernelError, Result};

/// Row-major dense matrix of `f64`.
///
/// Instances are built fresh by each operator and never mutated once handed
/// back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix::filled(rows, cols, 0.0)
    }

    pub fn ones(rows: usize, cols: usize) -> Matrix {
        Matrix::filled(rows, cols, 1.0)
    }

    fn filled(rows: usize, cols: usize, value: f64) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![value; cols]; rows]
        }
    }

    pub fn identity(n: usize) -> Matrix {
        let mut res = Matrix::zeros(n, n);
        for i in 0..n {
            res.data[i][i] = 1.0;
        }
        res
    }

    /// Samples every entry uniformly from `[-bound, bound)`.
    pub fn uniform<R: Rng + ?Sized>(rows: usize, cols: usize, bound: f64, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);

        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = rng.gen::<f64>() * 2.0 * bound - bound;
            }
        }

        res
    }

    /// Wraps nested rows, rejecting ragged input.
    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let rows = data.len();
        let cols = data.first().map_or(0, |row| row.len());
        if let Some((i, row)) = data.iter().enumerate().find(|(_, row)| row.len() != cols) {
            return Err(KernelError::shape(
                format!("{cols} columns in every row"),
                format!("{} columns in row {i}", row.len()),
            ));
        }
        Ok(Matrix { rows, cols, data })
    }

    pub fn shape(&self) -> [usize; 2] {
        [self.rows, self.cols]
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    /// Elementwise sum.
    pub fn add(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, |a, b| a + b)
    }

    /// Elementwise (Hadamard) product.
    pub fn hadamard(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, |a, b| a * b)
    }

    fn zip_with<F>(&self, rhs: &Matrix, op: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        if self.shape() != rhs.shape() {
            return Err(KernelError::shape(
                format!("{:?}", self.shape()),
                format!("{:?}", rhs.shape()),
            ));
        }

        let data = self.data.iter().zip(rhs.data.iter())
            .map(|(row_a, row_b)| {
                row_a.iter().zip(row_b.iter()).map(|(&x, &y)| op(x, y)).collect()
            })
            .collect();
        Ok(Matrix { rows: self.rows, cols: self.cols, data })
    }

    /// Matrix product `C[i][j] = Σ_k A[i][k]·B[k][j]`.
    pub fn matmul(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.cols != rhs.rows {
            return Err(KernelError::shape(
                format!("rhs with {} rows", self.cols),
                format!("{} rows", rhs.rows),
            ));
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for j in 0..res.cols {
                let mut sum = 0.0;

                for k in 0..self.cols {
                    sum += self.data[i][k] * rhs.data[k][j];
                }

                res.data[i][j] = sum;
            }
        }

        Ok(res)
    }

    /// Matrix-vector product `y = A·x`.
    pub fn mat_vec(&self, x: &[f64]) -> Result<Vec<f64>> {
        if x.len() != self.cols {
            return Err(KernelError::shape(
                format!("vector of length {}", self.cols),
                format!("length {}", x.len()),
            ));
        }
        Ok(self.data.iter()
            .map(|row| row.iter().zip(x).map(|(w, v)| w * v).sum())
            .collect())
    }

    /// Outer product `M[i][j] = a[i]·b[j]`.
    pub fn outer(a: &[f64], b: &[f64]) -> Matrix {
        Matrix {
            rows: a.len(),
            cols: b.len(),
            data: a.iter().map(|&ai| b.iter().map(|&bj| ai * bj).collect()).collect(),
        }
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().flatten().sum()
    }

    /// Mean of all entries; `0.0` for an empty matrix.
    pub fn mean(&self) -> f64 {
        let n = self.rows * self.cols;
        if n == 0 { 0.0 } else { self.sum() / n as f64 }
    }
}
