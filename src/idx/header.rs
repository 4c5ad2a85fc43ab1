use std::io::{self, Read};

use crate::error::{MnistError, Result, StreamKind};

/// Magic number of an IDX3 unsigned-byte image file (`0x00 0x00 0x08 0x03`).
pub const IDX3_UBYTE_MAGIC: i32 = 0x0000_0803;
/// Magic number of an IDX1 unsigned-byte label file (`0x00 0x00 0x08 0x01`).
pub const IDX1_UBYTE_MAGIC: i32 = 0x0000_0801;

/// Number of big-endian `i32` fields in an image stream header
/// (magic, count, rows, cols).
pub const IMAGE_HEADER_FIELDS: usize = 4;
/// Number of big-endian `i32` fields in a label stream header (magic, count).
pub const LABEL_HEADER_FIELDS: usize = 2;

/// The raw integer header at the start of an IDX stream.
///
/// Values are kept exactly as read; use [`IdxHeader::count`] and
/// [`IdxHeader::dim`] to get validated sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdxHeader {
    pub stream: StreamKind,
    pub magic: i32,
    pub count: i32,
    /// Trailing dimension fields; `[rows, cols]` for images, empty for labels.
    pub dims: Vec<i32>,
}

impl IdxHeader {
    /// Declared record count, rejected if negative.
    pub fn count(&self) -> Result<usize> {
        non_negative(self.stream, "count", self.count)
    }

    /// Declared size of dimension `i`, rejected if negative.
    ///
    /// Asking for a dimension the header was not decoded with reports
    /// `InvalidHeader` on the `dims` field, carrying the requested position.
    pub fn dim(&self, i: usize) -> Result<usize> {
        let field = match i {
            0 => "rows",
            1 => "cols",
            _ => "dim",
        };
        let value = self.dims.get(i).copied().ok_or(MnistError::InvalidHeader {
            stream: self.stream,
            field: "dims",
            value: saturating_i32(i),
        })?;
        non_negative(self.stream, field, value)
    }
}

fn non_negative(stream: StreamKind, field: &'static str, value: i32) -> Result<usize> {
    usize::try_from(value).map_err(|_| MnistError::InvalidHeader { stream, field, value })
}

fn saturating_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// Reads `fields` successive big-endian `i32` values from the start of `reader`.
///
/// The first is the magic number, the second the record count and the rest
/// are dimensions. A stream that ends inside the header is reported as
/// `TruncatedStream`; asking for fewer than the two mandatory fields is
/// `InvalidHeader` and reads nothing.
pub fn decode_header<R: Read>(
    reader: &mut R,
    stream: StreamKind,
    fields: usize,
    origin: &str,
) -> Result<IdxHeader> {
    if fields < 2 {
        return Err(MnistError::InvalidHeader {
            stream,
            field: "fields",
            value: saturating_i32(fields),
        });
    }

    let expected = fields.checked_mul(4).ok_or(MnistError::InvalidHeader {
        stream,
        field: "fields",
        value: saturating_i32(fields),
    })?;
    let mut raw = vec![0u8; expected];
    let available = read_fully(reader, &mut raw).map_err(|e| MnistError::io(origin, e))?;
    if available < expected {
        return Err(MnistError::TruncatedStream {
            stream,
            expected,
            available,
        });
    }

    let values: Vec<i32> = raw
        .chunks_exact(4)
        .map(|b| i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    let header = IdxHeader {
        stream,
        magic: values[0],
        count: values[1],
        dims: values[2..].to_vec(),
    };
    log::debug!(
        "decoded {} header from {}: magic={:#010x} count={} dims={:?}",
        stream,
        origin,
        header.magic,
        header.count,
        header.dims
    );
    Ok(header)
}

/// Fills as much of `buf` as the reader can supply, returning the number of
/// bytes read. Unlike `read_exact` the short count survives an early EOF.
fn read_fully<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
