use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MnistError, Result};

/// Number of digit classes in an MNIST-style label stream.
pub const NUM_CLASSES: usize = 10;

/// A digit class value.
///
/// Every label-taking query accepts `impl Into<u8>`, so raw bytes and
/// `Label` values can be used interchangeably.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Label {
    Zero = 0,
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
}

impl Label {
    pub const ALL: [Label; NUM_CLASSES] = [
        Label::Zero,
        Label::One,
        Label::Two,
        Label::Three,
        Label::Four,
        Label::Five,
        Label::Six,
        Label::Seven,
        Label::Eight,
        Label::Nine,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl From<Label> for u8 {
    fn from(label: Label) -> u8 {
        label as u8
    }
}

impl TryFrom<u8> for Label {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        Label::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| format!("label {} is not a class in 0..=9", value))
    }
}

/// Converts a raw class byte for a query, mapping anything past 9 to
/// `IndexOutOfRange`.
pub(crate) fn class_label(value: u8) -> Result<Label> {
    Label::try_from(value).map_err(|_| MnistError::IndexOutOfRange {
        what: "label",
        index: value as usize,
        len: NUM_CLASSES,
    })
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}
