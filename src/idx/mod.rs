pub mod decoder;
pub mod encode;
pub mod header;

pub use decoder::{
    decode_images, decode_images_from, decode_labels, decode_labels_from, DecodedImages,
    DecodedLabels,
};
pub use encode::{encode_images, encode_labels};
pub use header::{decode_header, IdxHeader, IDX1_UBYTE_MAGIC, IDX3_UBYTE_MAGIC};
