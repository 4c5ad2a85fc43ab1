use std::fmt::Debug;

use crate::dataset::label::NUM_CLASSES;

/// Floating-point type a normalized view is produced in.
///
/// Implemented for `f32` and `f64`; a pixel byte `b` maps to `b / 255`.
pub trait Precision: Copy + Send + Sync + PartialEq + Debug + 'static {
    const ZERO: Self;
    const ONE: Self;

    fn from_pixel(byte: u8) -> Self;
}

impl Precision for f32 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;

    fn from_pixel(byte: u8) -> Self {
        f32::from(byte) / 255.0
    }
}

impl Precision for f64 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;

    fn from_pixel(byte: u8) -> Self {
        f64::from(byte) / 255.0
    }
}

/// Scales every byte of `pixels` into `[0, 1]`.
pub fn scale<T: Precision>(pixels: &[u8]) -> Vec<T> {
    pixels.iter().map(|&b| T::from_pixel(b)).collect()
}

/// A fresh one-hot vector of length [`NUM_CLASSES`] with `1` at `label`.
///
/// # Panics
/// Panics if `label` is not a class in `0..=9`; dataset labels are validated
/// at construction.
pub fn one_hot<T: Precision>(label: u8) -> Vec<T> {
    let mut v = vec![T::ZERO; NUM_CLASSES];
    v[label as usize] = T::ONE;
    v
}
