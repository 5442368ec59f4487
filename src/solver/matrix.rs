//! Dense matrix storage with bounds-checked access.

use crate::error::{LcsimError, Result};

/// A fixed-size dense matrix of `f64` values.
///
/// Dimensions are set at construction and never change. All element access
/// is bounds-checked; out-of-range indices surface as
/// [`LcsimError::OutOfBounds`] rather than panicking. Storage is row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Create a new zero-filled matrix with the given dimensions.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(LcsimError::InvalidDimension { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(LcsimError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }

    /// Get the element at (row, col).
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        Ok(self.data[self.index(row, col)?])
    }

    /// Set the element at (row, col).
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        let i = self.index(row, col)?;
        self.data[i] = value;
        Ok(())
    }

    /// Add to the element at (row, col). Used for accumulating MNA stamps.
    pub fn add(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        let i = self.index(row, col)?;
        self.data[i] += value;
        Ok(())
    }

    /// Exchange the full contents of two rows.
    pub fn swap_rows(&mut self, r1: usize, r2: usize) -> Result<()> {
        // Validate both rows even when the swap is a no-op
        self.index(r1, 0)?;
        self.index(r2, 0)?;
        if r1 == r2 {
            return Ok(());
        }
        for col in 0..self.cols {
            self.data.swap(r1 * self.cols + col, r2 * self.cols + col);
        }
        Ok(())
    }

    /// Exchange two individual elements.
    pub fn swap_values(&mut self, r1: usize, c1: usize, r2: usize, c2: usize) -> Result<()> {
        let i1 = self.index(r1, c1)?;
        let i2 = self.index(r2, c2)?;
        self.data.swap(i1, i2);
        Ok(())
    }

    /// Reset every element to zero without changing dimensions.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    /// Row-major view of the backing store.
    pub(crate) fn as_slice(&self) -> &[f64] {
        &self.data
    }
}
