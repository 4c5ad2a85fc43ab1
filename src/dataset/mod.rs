pub mod builder;
pub mod cursor;
pub(crate) mod index;
pub mod label;
pub mod set;

pub use builder::LabeledImageSetBuilder;
pub use label::{Label, NUM_CLASSES};
pub use set::LabeledImageSet;
