use crate::dataset::label::NUM_CLASSES;
use crate::error::{MnistError, Result};

/// Per-class ordered sample positions.
///
/// Entries are global indices rather than byte offsets; the byte offset of an
/// entry is `global * image_size`, which stays well defined for zero-sized
/// images. Every sample appears in exactly one class list exactly once, in
/// stream order.
#[derive(Debug, Clone, Default)]
pub(crate) struct LabelIndex {
    members: [Vec<usize>; NUM_CLASSES],
}

impl LabelIndex {
    /// Builds the index in one pass over `labels`.
    pub(crate) fn build(labels: &[u8]) -> Result<Self> {
        let mut index = LabelIndex::default();
        for (i, &label) in labels.iter().enumerate() {
            index.push(i, label)?;
        }
        for list in index.members.iter_mut() {
            list.shrink_to_fit();
        }
        Ok(index)
    }

    /// Records sample `global` under class `label`.
    pub(crate) fn push(&mut self, global: usize, label: u8) -> Result<()> {
        let list = self
            .members
            .get_mut(label as usize)
            .ok_or(MnistError::InvalidLabel {
                index: global,
                value: label,
            })?;
        list.push(global);
        Ok(())
    }

    /// The members of class `label`, or `IndexOutOfRange` for a label past 9.
    pub(crate) fn class(&self, label: u8) -> Result<&[usize]> {
        self.members
            .get(label as usize)
            .map(Vec::as_slice)
            .ok_or(MnistError::IndexOutOfRange {
                what: "label",
                index: label as usize,
                len: NUM_CLASSES,
            })
    }

    /// Global index of the `local`-th sample of class `label`.
    pub(crate) fn global(&self, label: u8, local: usize) -> Result<usize> {
        let list = self.class(label)?;
        list.get(local).copied().ok_or(MnistError::IndexOutOfRange {
            what: "class-local",
            index: local,
            len: list.len(),
        })
    }

    pub(crate) fn counts(&self) -> [usize; NUM_CLASSES] {
        let mut counts = [0; NUM_CLASSES];
        for (c, list) in counts.iter_mut().zip(self.members.iter()) {
            *c = list.len();
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_groups_members_by_class() {
        let index = LabelIndex::build(&[3, 7, 3, 0]).unwrap();
        assert_eq!(index.class(3).unwrap(), &[0, 2]);
        assert_eq!(index.class(7).unwrap(), &[1]);
        assert_eq!(index.class(0).unwrap(), &[3]);
        assert!(index.class(5).unwrap().is_empty());
        assert_eq!(index.counts().iter().sum::<usize>(), 4);
    }

    #[test]
    fn test_build_rejects_label_out_of_class_range() {
        let err = LabelIndex::build(&[1, 10]).unwrap_err();
        assert!(matches!(err, MnistError::InvalidLabel { index: 1, value: 10 }));
    }

    #[test]
    fn test_global_bounds() {
        let index = LabelIndex::build(&[2, 5, 2]).unwrap();
        assert_eq!(index.global(2, 1).unwrap(), 2);
        assert!(matches!(
            index.global(2, 2),
            Err(MnistError::IndexOutOfRange { index: 2, len: 2, .. })
        ));
        assert!(matches!(
            index.global(10, 0),
            Err(MnistError::IndexOutOfRange { what: "label", .. })
        ));
    }
}
