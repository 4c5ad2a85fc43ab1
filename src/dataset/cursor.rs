use crate::dataset::set::LabeledImageSet;
use crate::error::{MnistError, Result};
use crate::normalize::{NormalizedPair, Precision};

/// Position of the sequential cursor.
///
/// `BeforeStart` is the logical position -1 that `reset` returns to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Cursor {
    BeforeStart,
    At(usize),
    Exhausted,
}

/// Restartable sequential access.
///
/// The cursor is plain `&mut self` state, so it cannot be shared between
/// threads without external synchronization. Use [`LabeledImageSet::iter`]
/// for a stateless pass.
impl LabeledImageSet {
    pub fn reset(&mut self) {
        self.cursor = Cursor::BeforeStart;
    }

    /// Moves to the next sample, returning `false` once the set is exhausted.
    pub fn advance(&mut self) -> bool {
        let next = match self.cursor {
            Cursor::BeforeStart => 0,
            Cursor::At(i) => i + 1,
            Cursor::Exhausted => return false,
        };
        if next < self.count {
            self.cursor = Cursor::At(next);
            true
        } else {
            self.cursor = Cursor::Exhausted;
            false
        }
    }

    /// Global index under the cursor.
    pub fn current_index(&self) -> Result<usize> {
        match self.cursor {
            Cursor::At(i) => Ok(i),
            Cursor::BeforeStart | Cursor::Exhausted => Err(MnistError::InvalidCursor),
        }
    }

    pub fn current_label(&self) -> Result<u8> {
        self.label_of(self.current_index()?)
    }

    pub fn current_pixels(&self) -> Result<Vec<u8>> {
        self.sample_by_global_index(self.current_index()?)
    }

    pub fn current_normalized_pair<T: Precision>(&self) -> Result<NormalizedPair<T>> {
        self.normalized_pair(self.current_index()?)
    }
}
