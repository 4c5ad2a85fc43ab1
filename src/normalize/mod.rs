pub mod matrix;
pub mod precision;
pub mod views;

pub use matrix::DenseMatrix;
pub use precision::{one_hot, scale, Precision};
pub use views::NormalizedPair;
