//! LU factorization with partial pivoting.

use crate::error::{LcsimError, Result};

use super::{Matrix, PIVOT_EPSILON};

/// LU factorization of a square matrix with partial (row) pivoting.
///
/// `factor` performs Gaussian elimination, recording the row permutation
/// and the elimination multipliers in a packed form: the strict lower
/// triangle holds the unit-lower factor (diagonal of ones implied) and the
/// upper triangle holds the reduced matrix. `solve` reuses the stored
/// factors for any number of right-hand sides, which is what makes the
/// one-factorization-per-circuit lifecycle cheap.
///
/// Partial pivoting matters here: conductance matrices built from Norton
/// companion models can carry near-zero diagonal entries for weakly
/// connected nodes, and eliminating without row exchanges would divide by
/// a vanishing pivot.
#[derive(Debug, Clone)]
pub struct PluFactorization {
    /// Packed L and U factors (row-major), valid once factored
    lu: Vec<f64>,
    /// Row permutation: `pivots[i]` is the original row in position i
    pivots: Vec<usize>,
    /// System dimension
    size: usize,
    factored: bool,
}

impl PluFactorization {
    /// Create an empty, unfactored instance.
    pub fn new() -> Self {
        Self {
            lu: Vec::new(),
            pivots: Vec::new(),
            size: 0,
            factored: false,
        }
    }

    /// Whether a successful factorization is stored.
    pub fn is_factored(&self) -> bool {
        self.factored
    }

    /// Factor the given square matrix in packed LU form.
    ///
    /// Fails with [`LcsimError::Singular`] if at some column every candidate
    /// pivot magnitude is at or below the pivot epsilon.
    pub fn factor(&mut self, matrix: &Matrix) -> Result<()> {
        let n = matrix.rows();
        if n != matrix.cols() {
            return Err(LcsimError::InvalidDimension {
                rows: n,
                cols: matrix.cols(),
            });
        }

        self.factored = false;
        self.size = n;
        self.lu.clear();
        self.lu.extend_from_slice(matrix.as_slice());
        self.pivots.clear();
        self.pivots.extend(0..n);

        for k in 0..n {
            // Select the largest-magnitude entry at or below the diagonal
            let mut max_val = self.lu[k * n + k].abs();
            let mut max_row = k;
            for i in (k + 1)..n {
                let val = self.lu[i * n + k].abs();
                if val > max_val {
                    max_val = val;
                    max_row = i;
                }
            }

            if max_val <= PIVOT_EPSILON {
                return Err(LcsimError::Singular);
            }

            if max_row != k {
                self.pivots.swap(k, max_row);
                for j in 0..n {
                    self.lu.swap(k * n + j, max_row * n + j);
                }
            }

            // Eliminate below the pivot, storing multipliers in place
            let pivot = self.lu[k * n + k];
            for i in (k + 1)..n {
                let factor = self.lu[i * n + k] / pivot;
                self.lu[i * n + k] = factor;
                for j in (k + 1)..n {
                    self.lu[i * n + j] -= factor * self.lu[k * n + j];
                }
            }
        }

        self.factored = true;
        Ok(())
    }

    /// Solve `A x = rhs` using the stored factors.
    ///
    /// Applies the recorded row permutation, then forward substitution
    /// against the unit-lower factor and back substitution against the
    /// upper factor.
    pub fn solve(&self, rhs: &[f64]) -> Result<Vec<f64>> {
        if !self.factored {
            return Err(LcsimError::NotFactored);
        }
        let n = self.size;
        if rhs.len() != n {
            return Err(LcsimError::DimensionMismatch {
                len: rhs.len(),
                size: n,
            });
        }

        let mut x: Vec<f64> = (0..n).map(|i| rhs[self.pivots[i]]).collect();

        // Forward substitution (L y = P b, unit diagonal)
        for i in 0..n {
            for j in 0..i {
                x[i] -= self.lu[i * n + j] * x[j];
            }
        }

        // Back substitution (U x = y)
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                x[i] -= self.lu[i * n + j] * x[j];
            }
            x[i] /= self.lu[i * n + i];
        }

        Ok(x)
    }
}

impl Default for PluFactorization {
    fn default() -> Self {
        Self::new()
    }
}
