use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::dataset::label::NUM_CLASSES;
use crate::dataset::set::LabeledImageSet;
use crate::error::Result;
use crate::normalize::matrix::DenseMatrix;
use crate::normalize::precision::{one_hot, scale, Precision};

/// One sample ready for a training loop: scaled pixels plus a one-hot target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPair<T> {
    /// `rows * cols` values in `[0, 1]`.
    pub pixels: Vec<T>,
    /// Length-10 vector with `1` at the sample's class.
    pub one_hot: Vec<T>,
}

/// Floating-point views of the owned buffers. None of them mutate the set,
/// and every call returns freshly allocated vectors.
impl LabeledImageSet {
    /// Every sample as a `(pixels, one_hot)` pair, computed in parallel.
    pub fn normalized_pairs<T: Precision>(&self) -> Vec<NormalizedPair<T>> {
        let size = self.image_size();
        self.install(|| {
            (0..self.count)
                .into_par_iter()
                .map(|i| NormalizedPair {
                    pixels: scale(&self.pixels[i * size..(i + 1) * size]),
                    one_hot: one_hot(self.labels[i]),
                })
                .collect()
        })
    }

    /// `len() × image_size()` matrix of scaled pixels.
    pub fn normalized_input_matrix<T: Precision>(&self) -> DenseMatrix<T> {
        DenseMatrix {
            rows: self.count,
            cols: self.image_size(),
            data: self.normalized_pixel_vector(),
        }
    }

    /// `len() × 10` matrix of one-hot targets.
    pub fn normalized_output_matrix<T: Precision>(&self) -> DenseMatrix<T> {
        let mut out = DenseMatrix::zeros(self.count, NUM_CLASSES);
        for (row, &label) in out.data.chunks_exact_mut(NUM_CLASSES).zip(&self.labels) {
            row[label as usize] = T::ONE;
        }
        out
    }

    /// The whole pixel buffer scaled, without per-sample structure.
    pub fn normalized_pixel_vector<T: Precision>(&self) -> Vec<T> {
        self.install(|| self.pixels.par_iter().map(|&b| T::from_pixel(b)).collect())
    }

    pub(crate) fn normalized_pair<T: Precision>(&self, i: usize) -> Result<NormalizedPair<T>> {
        let pixels = scale(self.image(i)?);
        Ok(NormalizedPair {
            pixels,
            one_hot: one_hot(self.labels[i]),
        })
    }

    /// Runs `op` on the configured pool, or on rayon's global pool.
    fn install<R, F>(&self, op: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_sample_set() -> LabeledImageSet {
        LabeledImageSet::new(2, 2, 2, &[10, 20, 30, 40, 50, 60, 70, 80], &[3, 7]).unwrap()
    }

    #[test]
    fn test_normalized_pairs_f32() {
        let pairs = two_sample_set().normalized_pairs::<f32>();
        assert_eq!(pairs.len(), 2);
        assert_eq!(
            pairs[1].pixels,
            vec![50.0 / 255.0, 60.0 / 255.0, 70.0 / 255.0, 80.0 / 255.0]
        );
        assert_eq!(
            pairs[1].one_hot,
            vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0]
        );
        assert_eq!(pairs[0].one_hot[3], 1.0);
    }

    #[test]
    fn test_normalized_pairs_are_independent_copies() {
        let set = two_sample_set();
        let mut first = set.normalized_pairs::<f64>();
        first[0].one_hot[3] = 42.0;
        let second = set.normalized_pairs::<f64>();
        assert_eq!(second[0].one_hot[3], 1.0);
    }

    #[test]
    fn test_matrices_match_pairs() {
        let set = two_sample_set();
        let pairs = set.normalized_pairs::<f64>();
        let inputs = set.normalized_input_matrix::<f64>();
        let outputs = set.normalized_output_matrix::<f64>();
        assert_eq!((inputs.rows, inputs.cols), (2, 4));
        assert_eq!((outputs.rows, outputs.cols), (2, 10));
        for (i, pair) in pairs.iter().enumerate() {
            assert_eq!(inputs.row(i), pair.pixels.as_slice());
            assert_eq!(outputs.row(i), pair.one_hot.as_slice());
        }
    }

    #[test]
    fn test_pixel_vector_covers_whole_buffer() {
        let v = two_sample_set().normalized_pixel_vector::<f32>();
        assert_eq!(v.len(), 8);
        assert_eq!(v[0], 10.0 / 255.0);
        assert_eq!(v[7], 80.0 / 255.0);
    }

    #[test]
    fn test_dedicated_pool_gives_same_result() {
        let labels: Vec<u8> = (0..100usize).map(|i| (i % 10) as u8).collect();
        let pixels: Vec<u8> = (0..400usize).map(|i| (i % 256) as u8).collect();
        let global = LabeledImageSet::new(100, 2, 2, &pixels, &labels).unwrap();
        let pooled = LabeledImageSet::new(100, 2, 2, &pixels, &labels)
            .unwrap()
            .with_parallelism(2)
            .unwrap();
        assert_eq!(global.normalized_pairs::<f32>(), pooled.normalized_pairs::<f32>());
    }
}
