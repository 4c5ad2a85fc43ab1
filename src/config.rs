use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dataset::set::LabeledImageSet;
use crate::error::{MnistError, Result};
use crate::idx::{decode_images, decode_labels, IDX1_UBYTE_MAGIC, IDX3_UBYTE_MAGIC};

/// Where to find an image/label stream pair and how to load it.
///
/// Serialized as JSON so a dataset setup can be stored next to an
/// experiment and reloaded later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub images_path: PathBuf,
    pub labels_path: PathBuf,
    /// When set, the image stream's magic must equal this value.
    #[serde(default)]
    pub expected_image_magic: Option<i32>,
    /// When set, the label stream's magic must equal this value.
    #[serde(default)]
    pub expected_label_magic: Option<i32>,
    /// Seed for the dataset's random source; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Worker threads for the normalization views; the host's processor
    /// count when absent.
    #[serde(default)]
    pub parallelism: Option<usize>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        DatasetConfig {
            images_path: PathBuf::from("train-images-idx3-ubyte"),
            labels_path: PathBuf::from("train-labels-idx1-ubyte"),
            expected_image_magic: None,
            expected_label_magic: None,
            seed: None,
            parallelism: None,
        }
    }
}

impl DatasetConfig {
    pub fn new(images_path: impl Into<PathBuf>, labels_path: impl Into<PathBuf>) -> Self {
        DatasetConfig {
            images_path: images_path.into(),
            labels_path: labels_path.into(),
            ..DatasetConfig::default()
        }
    }

    /// Requires the standard IDX magics (`0x0803` images, `0x0801` labels).
    pub fn strict(mut self) -> Self {
        self.expected_image_magic = Some(IDX3_UBYTE_MAGIC);
        self.expected_label_magic = Some(IDX1_UBYTE_MAGIC);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }

    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| MnistError::io(path.display().to_string(), e))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<DatasetConfig> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| MnistError::io(path.display().to_string(), e))?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

impl LabeledImageSet {
    /// Decodes both streams named by `config` and builds the dataset.
    pub fn load(config: &DatasetConfig) -> Result<Self> {
        let images = decode_images(&config.images_path)?;
        let labels = decode_labels(&config.labels_path)?;

        match config.expected_image_magic {
            Some(expected) => images.expect_magic(expected)?,
            None if images.magic != IDX3_UBYTE_MAGIC => log::warn!(
                "{}: unexpected image magic {:#010x}, continuing without strict check",
                config.images_path.display(),
                images.magic
            ),
            None => {}
        }
        match config.expected_label_magic {
            Some(expected) => labels.expect_magic(expected)?,
            None if labels.magic != IDX1_UBYTE_MAGIC => log::warn!(
                "{}: unexpected label magic {:#010x}, continuing without strict check",
                config.labels_path.display(),
                labels.magic
            ),
            None => {}
        }

        let mut set = LabeledImageSet::from_decoded(images, labels)?;
        if let Some(seed) = config.seed {
            set.reseed(seed);
        }
        if let Some(threads) = config.parallelism {
            set = set.with_parallelism(threads)?;
        }

        log::info!(
            "loaded {} samples of {}x{} from {}; per class {:?}",
            set.len(),
            set.rows(),
            set.cols(),
            config.images_path.display(),
            set.class_counts()
        );
        Ok(set)
    }

    /// Loads an image/label file pair with default settings.
    pub fn open(images_path: impl Into<PathBuf>, labels_path: impl Into<PathBuf>) -> Result<Self> {
        LabeledImageSet::load(&DatasetConfig::new(images_path, labels_path))
    }
}
