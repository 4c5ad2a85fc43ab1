use crate::dataset::index::LabelIndex;
use crate::dataset::set::{check_shape, checked_image_size, LabeledImageSet};
use crate::error::{MnistError, Result};

/// Fixed-capacity incremental construction of a [`LabeledImageSet`].
///
/// Samples are appended one at a time and the class index is updated on every
/// insertion, so `finish` needs no extra pass. A failed `append` leaves the
/// builder exactly as it was.
///
/// Nothing is reserved up front: `capacity` is often taken from a stream
/// header, so the buffers grow with the samples actually appended.
#[derive(Debug)]
pub struct LabeledImageSetBuilder {
    capacity: usize,
    rows: usize,
    cols: usize,
    pixels: Vec<u8>,
    labels: Vec<u8>,
    index: LabelIndex,
}

impl LabeledImageSetBuilder {
    pub fn new(capacity: usize, rows: usize, cols: usize) -> Self {
        LabeledImageSetBuilder {
            capacity,
            rows,
            cols,
            pixels: Vec::new(),
            labels: Vec::new(),
            index: LabelIndex::default(),
        }
    }

    /// Appends one `rows * cols` image with its class.
    pub fn append(&mut self, image: &[u8], label: impl Into<u8>) -> Result<()> {
        let image_size = checked_image_size(self.rows, self.cols)?;
        if image.len() != image_size {
            return Err(MnistError::ShapeMismatch {
                what: "image",
                expected: image_size,
                actual: image.len(),
            });
        }
        if self.is_complete() {
            return Err(MnistError::CapacityExceeded {
                capacity: self.capacity,
            });
        }

        let label = label.into();
        self.index.push(self.labels.len(), label)?;
        self.labels.push(label);
        self.pixels.extend_from_slice(image);
        Ok(())
    }

    /// Samples appended so far.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_complete(&self) -> bool {
        self.labels.len() == self.capacity
    }

    /// Hands the buffers and index over to a dataset.
    ///
    /// Fails with `ShapeMismatch` until all `capacity` samples are present;
    /// a partially filled dataset is never produced.
    pub fn finish(self) -> Result<LabeledImageSet> {
        if !self.is_complete() {
            return Err(MnistError::ShapeMismatch {
                what: "builder fill",
                expected: self.capacity,
                actual: self.labels.len(),
            });
        }
        check_shape(self.capacity, self.rows, self.cols, self.pixels.len(), self.labels.len())?;
        Ok(LabeledImageSet::assemble(
            self.capacity,
            self.rows,
            self.cols,
            self.pixels,
            self.labels,
            self.index,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::label::Label;

    #[test]
    fn test_append_until_full() {
        let mut builder = LabeledImageSet::builder(2, 1, 2);
        builder.append(&[1, 2], 4u8).unwrap();
        assert!(!builder.is_complete());
        builder.append(&[3, 4], Label::Nine).unwrap();
        assert!(builder.is_complete());

        let set = builder.finish().unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.sample_by_label(9u8, 0).unwrap(), vec![3, 4]);
        assert_eq!(set.global_index_of(4u8, 0).unwrap(), 0);
    }

    #[test]
    fn test_append_past_capacity() {
        let mut builder = LabeledImageSetBuilder::new(1, 1, 1);
        builder.append(&[0], 0u8).unwrap();
        let err = builder.append(&[1], 1u8).unwrap_err();
        assert!(matches!(err, MnistError::CapacityExceeded { capacity: 1 }));
        // The builder is still usable with what it already holds.
        assert_eq!(builder.len(), 1);
        let set = builder.finish().unwrap();
        assert_eq!(set.label_of(0).unwrap(), 0);
    }

    #[test]
    fn test_append_wrong_image_size() {
        let mut builder = LabeledImageSetBuilder::new(3, 2, 2);
        let err = builder.append(&[0; 3], 1u8).unwrap_err();
        assert!(matches!(err, MnistError::ShapeMismatch { expected: 4, actual: 3, .. }));
        assert!(builder.is_empty());
    }

    #[test]
    fn test_append_invalid_label_leaves_builder_untouched() {
        let mut builder = LabeledImageSetBuilder::new(2, 1, 1);
        assert!(builder.append(&[9], 12u8).is_err());
        assert!(builder.is_empty());
        builder.append(&[9], 1u8).unwrap();
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_huge_capacity_does_not_preallocate() {
        let mut builder = LabeledImageSet::builder(usize::MAX / 2, 28, 28);
        assert_eq!(builder.capacity(), usize::MAX / 2);
        assert!(matches!(
            builder.append(&[0; 3], 1u8),
            Err(MnistError::ShapeMismatch { expected: 784, actual: 3, .. })
        ));
        builder.append(&[7; 784], 1u8).unwrap();
        assert_eq!(builder.len(), 1);
        assert!(!builder.is_complete());
    }

    #[test]
    fn test_overflowing_image_size() {
        let mut builder = LabeledImageSetBuilder::new(1, usize::MAX, 2);
        assert!(matches!(
            builder.append(&[0], 0u8),
            Err(MnistError::ShapeMismatch { what: "image size", .. })
        ));
        // Zero capacity is complete at once, but the shape is still checked.
        let empty = LabeledImageSetBuilder::new(0, usize::MAX, 2);
        assert!(matches!(
            empty.finish(),
            Err(MnistError::ShapeMismatch { what: "image size", .. })
        ));
    }

    #[test]
    fn test_finish_before_full() {
        let mut builder = LabeledImageSetBuilder::new(3, 1, 1);
        builder.append(&[0], 0u8).unwrap();
        assert!(matches!(
            builder.finish(),
            Err(MnistError::ShapeMismatch { what: "builder fill", expected: 3, actual: 1 })
        ));
    }
}
