//! Writers for the IDX layout read by [`crate::idx::decoder`].
//!
//! Header fields are written exactly as given and the payload is appended
//! verbatim, so a caller can produce deliberately truncated streams.

/// Builds an image stream: `magic | count | rows | cols | pixels`.
pub fn encode_images(magic: i32, count: i32, rows: i32, cols: i32, pixels: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(16 + pixels.len());
    for field in [magic, count, rows, cols] {
        buf.extend_from_slice(&field.to_be_bytes());
    }
    buf.extend_from_slice(pixels);
    buf
}

/// Builds a label stream: `magic | count | labels`.
pub fn encode_labels(magic: i32, count: i32, labels: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8 + labels.len());
    buf.extend_from_slice(&magic.to_be_bytes());
    buf.extend_from_slice(&count.to_be_bytes());
    buf.extend_from_slice(labels);
    buf
}
