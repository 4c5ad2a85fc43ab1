use serde::{Deserialize, Serialize};

use crate::normalize::precision::Precision;

/// A dense row-major matrix; `data.len() == rows * cols`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseMatrix<T> {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<T>,
}

impl<T: Precision> DenseMatrix<T> {
    pub fn zeros(rows: usize, cols: usize) -> DenseMatrix<T> {
        DenseMatrix {
            rows,
            cols,
            data: vec![T::ZERO; rows * cols],
        }
    }

    /// Row `i` as a slice.
    ///
    /// # Panics
    /// Panics if `i >= rows`.
    pub fn row(&self, i: usize) -> &[T] {
        assert!(i < self.rows, "row {} out of range for {} rows", i, self.rows);
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    /// Splits into one `Vec` per row, the nested layout most from-scratch
    /// training loops consume.
    pub fn into_rows(self) -> Vec<Vec<T>> {
        if self.cols == 0 {
            return vec![Vec::new(); self.rows];
        }
        self.data.chunks_exact(self.cols).map(<[T]>::to_vec).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_and_get() {
        let m = DenseMatrix {
            rows: 2,
            cols: 3,
            data: vec![1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0],
        };
        assert_eq!(m.row(1), &[4.0, 5.0, 6.0]);
        assert_eq!(m.get(0, 2), Some(3.0));
        assert_eq!(m.get(2, 0), None);
        assert_eq!(m.into_rows(), vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
    }

    #[test]
    fn test_zero_width_rows() {
        let m: DenseMatrix<f32> = DenseMatrix::zeros(3, 0);
        assert_eq!(m.into_rows().len(), 3);
    }
}
