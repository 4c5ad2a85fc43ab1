use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{MnistError, Result, StreamKind};
use crate::idx::header::{decode_header, IdxHeader, IMAGE_HEADER_FIELDS, LABEL_HEADER_FIELDS};

/// A fully decoded image stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImages {
    pub magic: i32,
    pub count: usize,
    pub rows: usize,
    pub cols: usize,
    /// `count * rows * cols` bytes, row-major per image, images in stream order.
    pub pixels: Vec<u8>,
}

impl DecodedImages {
    pub fn image_size(&self) -> usize {
        self.rows * self.cols
    }

    /// Strict format check; the decoder itself never validates the magic.
    pub fn expect_magic(&self, expected: i32) -> Result<()> {
        check_magic(StreamKind::Images, self.magic, expected)
    }
}

/// A fully decoded label stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLabels {
    pub magic: i32,
    pub count: usize,
    /// One class byte per record.
    pub labels: Vec<u8>,
}

impl DecodedLabels {
    pub fn expect_magic(&self, expected: i32) -> Result<()> {
        check_magic(StreamKind::Labels, self.magic, expected)
    }
}

fn check_magic(stream: StreamKind, found: i32, expected: i32) -> Result<()> {
    if found != expected {
        return Err(MnistError::InvalidMagic {
            stream,
            expected,
            found,
        });
    }
    Ok(())
}

/// Decodes an image file: a 4-field header followed by `count * rows * cols`
/// pixel bytes.
///
/// The file handle lives only for the duration of this call.
pub fn decode_images(path: impl AsRef<Path>) -> Result<DecodedImages> {
    let path = path.as_ref();
    let origin = path.display().to_string();
    let file = File::open(path).map_err(|e| MnistError::io(origin.as_str(), e))?;
    read_images(BufReader::new(file), &origin)
}

/// Decodes an image stream from any reader (in-memory buffers, sockets, ...).
pub fn decode_images_from<R: Read>(reader: R) -> Result<DecodedImages> {
    read_images(reader, "image stream")
}

/// Decodes a label file: a 2-field header followed by `count` label bytes.
pub fn decode_labels(path: impl AsRef<Path>) -> Result<DecodedLabels> {
    let path = path.as_ref();
    let origin = path.display().to_string();
    let file = File::open(path).map_err(|e| MnistError::io(origin.as_str(), e))?;
    read_labels(BufReader::new(file), &origin)
}

pub fn decode_labels_from<R: Read>(reader: R) -> Result<DecodedLabels> {
    read_labels(reader, "label stream")
}

fn read_images<R: Read>(mut reader: R, origin: &str) -> Result<DecodedImages> {
    let header = decode_header(&mut reader, StreamKind::Images, IMAGE_HEADER_FIELDS, origin)?;
    let count = header.count()?;
    let rows = header.dim(0)?;
    let cols = header.dim(1)?;

    // Image size first: with a zero count an overflow would otherwise vanish.
    let image_size = rows.checked_mul(cols).ok_or(MnistError::InvalidHeader {
        stream: StreamKind::Images,
        field: "cols",
        value: i32::try_from(cols).unwrap_or(i32::MAX),
    })?;
    let payload_len = count.checked_mul(image_size).ok_or(MnistError::InvalidHeader {
        stream: StreamKind::Images,
        field: "count",
        value: header.count,
    })?;
    let pixels = read_payload(&mut reader, &header, payload_len, origin)?;

    Ok(DecodedImages {
        magic: header.magic,
        count,
        rows,
        cols,
        pixels,
    })
}

fn read_labels<R: Read>(mut reader: R, origin: &str) -> Result<DecodedLabels> {
    let header = decode_header(&mut reader, StreamKind::Labels, LABEL_HEADER_FIELDS, origin)?;
    let count = header.count()?;
    let labels = read_payload(&mut reader, &header, count, origin)?;

    Ok(DecodedLabels {
        magic: header.magic,
        count,
        labels,
    })
}

/// Reads exactly `len` payload bytes. The buffer grows with what the stream
/// actually delivers, so a bogus header cannot force a huge allocation.
fn read_payload<R: Read>(
    reader: &mut R,
    header: &IdxHeader,
    len: usize,
    origin: &str,
) -> Result<Vec<u8>> {
    let mut payload = Vec::new();
    reader
        .take(len as u64)
        .read_to_end(&mut payload)
        .map_err(|e| MnistError::io(origin, e))?;

    if payload.len() < len {
        return Err(MnistError::TruncatedStream {
            stream: header.stream,
            expected: len,
            available: payload.len(),
        });
    }
    Ok(payload)
}
