use std::fmt;
use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::dataset::builder::LabeledImageSetBuilder;
use crate::dataset::cursor::Cursor;
use crate::dataset::index::LabelIndex;
use crate::dataset::label::{class_label, NUM_CLASSES};
use crate::error::{MnistError, Result};
use crate::idx::{DecodedImages, DecodedLabels};

/// An in-memory image/label dataset with a per-class index.
///
/// Pixels live in one flat row-major buffer (`len() * rows() * cols()` bytes)
/// next to a parallel label buffer. Both are frozen after construction; the
/// only mutable state is the sequential cursor (`&mut self`) and the random
/// source, which sits behind a mutex so `&self` sampling is safe from any
/// number of threads.
pub struct LabeledImageSet {
    pub(crate) count: usize,
    pub(crate) rows: usize,
    pub(crate) cols: usize,
    pub(crate) pixels: Vec<u8>,
    pub(crate) labels: Vec<u8>,
    pub(crate) index: LabelIndex,
    pub(crate) cursor: Cursor,
    pub(crate) pool: Option<Arc<ThreadPool>>,
    rng: Mutex<StdRng>,
}

impl LabeledImageSet {
    /// Builds a dataset from two complete buffers, copying both.
    ///
    /// Fails with `ShapeMismatch` unless `pixels.len() == count * rows * cols`
    /// and `labels.len() == count`, and with `InvalidLabel` if any label is
    /// not a class in `0..=9`.
    pub fn new(count: usize, rows: usize, cols: usize, pixels: &[u8], labels: &[u8]) -> Result<Self> {
        check_shape(count, rows, cols, pixels.len(), labels.len())?;
        LabeledImageSet::from_parts(count, rows, cols, pixels.to_vec(), labels.to_vec())
    }

    /// Builds a dataset from the two decoded streams, taking ownership of
    /// their buffers.
    pub fn from_decoded(images: DecodedImages, labels: DecodedLabels) -> Result<Self> {
        if images.count != labels.count {
            return Err(MnistError::CountMismatch {
                images: images.count,
                labels: labels.count,
            });
        }
        check_shape(
            images.count,
            images.rows,
            images.cols,
            images.pixels.len(),
            labels.labels.len(),
        )?;
        LabeledImageSet::from_parts(
            images.count,
            images.rows,
            images.cols,
            images.pixels,
            labels.labels,
        )
    }

    /// Starts an incremental build of `count` samples of `rows × cols` pixels.
    pub fn builder(count: usize, rows: usize, cols: usize) -> LabeledImageSetBuilder {
        LabeledImageSetBuilder::new(count, rows, cols)
    }

    fn from_parts(count: usize, rows: usize, cols: usize, pixels: Vec<u8>, labels: Vec<u8>) -> Result<Self> {
        let index = LabelIndex::build(&labels)?;
        Ok(LabeledImageSet::assemble(count, rows, cols, pixels, labels, index))
    }

    /// Final step shared by eager and incremental construction; the caller has
    /// already validated shapes and built `index`.
    pub(crate) fn assemble(
        count: usize,
        rows: usize,
        cols: usize,
        pixels: Vec<u8>,
        labels: Vec<u8>,
        index: LabelIndex,
    ) -> Self {
        log::debug!("indexed {} samples of {}x{}: {:?}", count, rows, cols, index.counts());
        LabeledImageSet {
            count,
            rows,
            cols,
            pixels,
            labels,
            index,
            cursor: Cursor::BeforeStart,
            pool: None,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    /// Replaces the random source with one seeded from `seed`.
    pub fn with_seed(self, seed: u64) -> Self {
        self.reseed(seed);
        self
    }

    pub fn reseed(&self, seed: u64) {
        *self.rng.lock().unwrap_or_else(|e| e.into_inner()) = StdRng::seed_from_u64(seed);
    }

    /// Runs the normalization views on a dedicated pool of `threads` workers
    /// instead of rayon's global pool (which is sized to the host's CPUs).
    pub fn with_parallelism(mut self, threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new().num_threads(threads).build()?;
        self.pool = Some(Arc::new(pool));
        Ok(self)
    }

    // -----------------------------------------------------------------------
    // Shape
    // -----------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Pixels per image (`rows * cols`).
    pub fn image_size(&self) -> usize {
        self.rows * self.cols
    }

    /// The whole label buffer, one class byte per sample.
    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    /// Number of samples in class `label`.
    pub fn class_len(&self, label: impl Into<u8>) -> Result<usize> {
        Ok(self.index.class(label.into())?.len())
    }

    /// Per-class sample counts, indexed by class value.
    pub fn class_counts(&self) -> [usize; NUM_CLASSES] {
        self.index.counts()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Borrowed view of image `i`.
    pub fn image(&self, i: usize) -> Result<&[u8]> {
        self.check_global(i)?;
        let size = self.image_size();
        Ok(&self.pixels[i * size..(i + 1) * size])
    }

    /// A fresh copy of the `rows * cols` bytes of image `i`.
    pub fn sample_by_global_index(&self, i: usize) -> Result<Vec<u8>> {
        self.image(i).map(<[u8]>::to_vec)
    }

    /// A fresh copy of the `local`-th image of class `label`.
    pub fn sample_by_label(&self, label: impl Into<u8>, local: usize) -> Result<Vec<u8>> {
        let global = self.global_index_of(label, local)?;
        self.sample_by_global_index(global)
    }

    /// Draws a sample uniformly from the whole set.
    ///
    /// Returns `(global_index, pixels)`.
    pub fn random_sample(&self) -> Result<(usize, Vec<u8>)> {
        if self.count == 0 {
            return Err(MnistError::EmptyDataset);
        }
        let i = self.draw(self.count);
        Ok((i, self.sample_by_global_index(i)?))
    }

    /// Draws a sample uniformly from class `label`.
    ///
    /// Returns `(local_index, pixels)`; `global_index_of` maps the local
    /// index back into the whole set.
    pub fn random_sample_for_label(&self, label: impl Into<u8>) -> Result<(usize, Vec<u8>)> {
        let label = class_label(label.into())?;
        let members = self.index.class(label.into())?;
        if members.is_empty() {
            return Err(MnistError::EmptyClass { label });
        }
        let local = self.draw(members.len());
        Ok((local, self.sample_by_global_index(members[local])?))
    }

    pub fn label_of(&self, i: usize) -> Result<u8> {
        self.check_global(i)?;
        Ok(self.labels[i])
    }

    /// Maps a position within class `label` to a position in the whole set.
    pub fn global_index_of(&self, label: impl Into<u8>, local: usize) -> Result<usize> {
        self.index.global(label.into(), local)
    }

    /// Iterates `(label, pixels)` in stream order without touching the cursor.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &[u8])> + '_ {
        let size = self.image_size();
        (0..self.count).map(move |i| (self.labels[i], &self.pixels[i * size..(i + 1) * size]))
    }

    fn draw(&self, upper: usize) -> usize {
        self.rng
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .gen_range(0..upper)
    }

    pub(crate) fn check_global(&self, i: usize) -> Result<()> {
        if i >= self.count {
            return Err(MnistError::IndexOutOfRange {
                what: "sample",
                index: i,
                len: self.count,
            });
        }
        Ok(())
    }
}

/// Pixels per image, or `ShapeMismatch` when `rows * cols` does not fit in
/// `usize`. Checked on its own so an empty set cannot hide an overflow.
pub(crate) fn checked_image_size(rows: usize, cols: usize) -> Result<usize> {
    rows.checked_mul(cols).ok_or(MnistError::ShapeMismatch {
        what: "image size",
        expected: usize::MAX,
        actual: rows,
    })
}

pub(crate) fn check_shape(count: usize, rows: usize, cols: usize, pixels: usize, labels: usize) -> Result<()> {
    let expected = count
        .checked_mul(checked_image_size(rows, cols)?)
        .unwrap_or(usize::MAX);
    if pixels != expected {
        return Err(MnistError::ShapeMismatch {
            what: "pixel buffer",
            expected,
            actual: pixels,
        });
    }
    if labels != count {
        return Err(MnistError::ShapeMismatch {
            what: "label buffer",
            expected: count,
            actual: labels,
        });
    }
    Ok(())
}

impl fmt::Debug for LabeledImageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabeledImageSet")
            .field("count", &self.count)
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("class_counts", &self.index.counts())
            .field("cursor", &self.cursor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::dataset::label::Label;

    fn two_sample_set() -> LabeledImageSet {
        LabeledImageSet::new(2, 2, 2, &[10, 20, 30, 40, 50, 60, 70, 80], &[3, 7]).unwrap()
    }

    #[test]
    fn test_new_copies_samples() {
        let set = two_sample_set();
        assert_eq!(set.len(), 2);
        assert_eq!(set.image_size(), 4);
        assert_eq!(set.label_of(0).unwrap(), 3);
        assert_eq!(set.label_of(1).unwrap(), 7);
        assert_eq!(set.sample_by_global_index(0).unwrap(), vec![10, 20, 30, 40]);
        assert_eq!(set.sample_by_global_index(1).unwrap(), vec![50, 60, 70, 80]);
    }

    #[test]
    fn test_pixel_buffer_one_short_is_shape_mismatch() {
        let err = LabeledImageSet::new(2, 2, 2, &[0; 7], &[0, 1]).unwrap_err();
        assert!(matches!(
            err,
            MnistError::ShapeMismatch { what: "pixel buffer", expected: 8, actual: 7 }
        ));
    }

    #[test]
    fn test_overflowing_image_size_rejected_for_empty_set() {
        assert!(matches!(
            LabeledImageSet::new(0, usize::MAX, 2, &[], &[]),
            Err(MnistError::ShapeMismatch { what: "image size", .. })
        ));
        // An empty set with a representable shape is still fine.
        let empty = LabeledImageSet::new(0, 28, 28, &[], &[]).unwrap();
        assert!(empty.normalized_pairs::<f32>().is_empty());
    }

    #[test]
    fn test_label_buffer_length_mismatch() {
        let err = LabeledImageSet::new(2, 1, 1, &[0; 2], &[0]).unwrap_err();
        assert!(matches!(err, MnistError::ShapeMismatch { what: "label buffer", .. }));
    }

    #[test]
    fn test_label_out_of_class_range_rejected() {
        let err = LabeledImageSet::new(1, 1, 1, &[0], &[11]).unwrap_err();
        assert!(matches!(err, MnistError::InvalidLabel { index: 0, value: 11 }));
    }

    #[test]
    fn test_global_index_bounds() {
        let set = two_sample_set();
        assert!(matches!(
            set.sample_by_global_index(2),
            Err(MnistError::IndexOutOfRange { index: 2, len: 2, .. })
        ));
        assert!(set.label_of(2).is_err());
    }

    #[test]
    fn test_sample_by_label_and_global_index_of() {
        let set = LabeledImageSet::new(4, 1, 2, &[1, 1, 2, 2, 3, 3, 4, 4], &[5, 1, 5, 1]).unwrap();
        assert_eq!(set.sample_by_label(5u8, 1).unwrap(), vec![3, 3]);
        assert_eq!(set.sample_by_label(Label::One, 0).unwrap(), vec![2, 2]);
        assert_eq!(set.global_index_of(Label::One, 1).unwrap(), 3);
        assert_eq!(set.class_len(5u8).unwrap(), 2);
        assert!(matches!(
            set.sample_by_label(5u8, 2),
            Err(MnistError::IndexOutOfRange { index: 2, len: 2, .. })
        ));
        assert!(matches!(
            set.sample_by_label(10u8, 0),
            Err(MnistError::IndexOutOfRange { what: "label", .. })
        ));
    }

    #[test]
    fn test_index_covers_every_sample_once() {
        let labels: Vec<u8> = (0..57usize).map(|i| ((i * 7) % 10) as u8).collect();
        let set = LabeledImageSet::new(57, 1, 1, &vec![0; 57], &labels).unwrap();
        let mut seen = HashSet::new();
        for label in Label::ALL {
            for local in 0..set.class_len(label).unwrap() {
                let global = set.global_index_of(label, local).unwrap();
                assert_eq!(set.label_of(global).unwrap(), u8::from(label));
                assert!(seen.insert(global), "sample {} indexed twice", global);
            }
        }
        assert_eq!(seen.len(), 57);
        assert_eq!(set.class_counts().iter().sum::<usize>(), 57);
    }

    #[test]
    fn test_random_sample_is_reproducible_with_seed() {
        let labels: Vec<u8> = (0..20u8).map(|i| i % 10).collect();
        let pixels: Vec<u8> = (0..20u8).collect();
        let a = LabeledImageSet::new(20, 1, 1, &pixels, &labels).unwrap().with_seed(42);
        let b = LabeledImageSet::new(20, 1, 1, &pixels, &labels).unwrap().with_seed(42);
        for _ in 0..10 {
            let (ia, pa) = a.random_sample().unwrap();
            let (ib, pb) = b.random_sample().unwrap();
            assert_eq!(ia, ib);
            assert_eq!(pa, pb);
            assert_eq!(pa, vec![ia as u8]);
        }
    }

    #[test]
    fn test_random_sample_for_label_stays_in_class() {
        let labels: Vec<u8> = (0..30u8).map(|i| i % 3).collect();
        let pixels: Vec<u8> = (0..30u8).collect();
        let set = LabeledImageSet::new(30, 1, 1, &pixels, &labels).unwrap().with_seed(7);
        for _ in 0..50 {
            let (local, px) = set.random_sample_for_label(Label::Two).unwrap();
            assert!(local < 10);
            let global = set.global_index_of(Label::Two, local).unwrap();
            assert_eq!(px, vec![global as u8]);
            assert_eq!(set.label_of(global).unwrap(), 2);
        }
    }

    #[test]
    fn test_random_sample_for_empty_class() {
        let set = two_sample_set();
        assert!(matches!(
            set.random_sample_for_label(Label::Zero),
            Err(MnistError::EmptyClass { label: Label::Zero })
        ));
    }

    #[test]
    fn test_random_sample_on_empty_set() {
        let set = LabeledImageSet::new(0, 28, 28, &[], &[]).unwrap();
        assert!(set.is_empty());
        assert!(matches!(set.random_sample(), Err(MnistError::EmptyDataset)));
    }

    #[test]
    fn test_iter_yields_stream_order() {
        let set = two_sample_set();
        let items: Vec<(u8, Vec<u8>)> = set.iter().map(|(l, px)| (l, px.to_vec())).collect();
        assert_eq!(items, vec![(3, vec![10, 20, 30, 40]), (7, vec![50, 60, 70, 80])]);
    }

    #[test]
    fn test_from_decoded_count_mismatch() {
        let images = DecodedImages { magic: 0, count: 1, rows: 1, cols: 1, pixels: vec![0] };
        let labels = DecodedLabels { magic: 0, count: 2, labels: vec![0, 1] };
        assert!(matches!(
            LabeledImageSet::from_decoded(images, labels),
            Err(MnistError::CountMismatch { images: 1, labels: 2 })
        ));
    }
}
