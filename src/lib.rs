pub mod config;
pub mod dataset;
pub mod error;
pub mod idx;
pub mod normalize;

// Convenience re-exports
pub use config::DatasetConfig;
pub use dataset::{Label, LabeledImageSet, LabeledImageSetBuilder, NUM_CLASSES};
pub use error::{MnistError, Result, StreamKind};
pub use idx::{decode_images, decode_labels, DecodedImages, DecodedLabels};
pub use normalize::{DenseMatrix, NormalizedPair, Precision};
