use std::error::Error;
use std::path::Path;

use ferrite_mnist::idx::{encode_images, encode_labels, IDX1_UBYTE_MAGIC, IDX3_UBYTE_MAGIC};
use ferrite_mnist::{DatasetConfig, Label, LabeledImageSet};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::render::{to_ascii, to_rgba_image};
use crate::{Cli, Commands, Source};

type CmdResult = Result<(), Box<dyn Error>>;

pub fn run(cli: Cli) -> CmdResult {
    match cli.command {
        Commands::Summary => summary(&open(&cli.source)?),
        Commands::Show { index, label, local } => show(&open(&cli.source)?, index, label, local),
        Commands::Export { index, out, alpha } => export(&open(&cli.source)?, index, &out, alpha),
        Commands::Config { out, strict } => {
            let mut config = DatasetConfig::new(&cli.source.images, &cli.source.labels);
            config.seed = cli.source.seed;
            if strict {
                config = config.strict();
            }
            config.save_json(&out)?;
            println!("Config written to {}", out.display());
            Ok(())
        }
        Commands::Synth {
            out_dir,
            count,
            rows,
            cols,
        } => synth(&out_dir, count, rows, cols, cli.source.seed),
    }
}

fn open(source: &Source) -> Result<LabeledImageSet, Box<dyn Error>> {
    let mut config = match &source.config {
        Some(path) => DatasetConfig::load_json(path)?,
        None => DatasetConfig::new(&source.images, &source.labels),
    };
    if source.seed.is_some() {
        config.seed = source.seed;
    }
    Ok(LabeledImageSet::load(&config)?)
}

fn summary(set: &LabeledImageSet) -> CmdResult {
    println!("Samples:    {}", set.len());
    println!("Image size: {}x{}", set.rows(), set.cols());
    println!("{:>6}  {:>8}", "Class", "Count");
    println!("{}", "-".repeat(16));
    for (label, count) in Label::ALL.iter().zip(set.class_counts()) {
        println!("{:>6}  {:>8}", label, count);
    }
    Ok(())
}

fn show(set: &LabeledImageSet, index: Option<usize>, label: Option<u8>, local: Option<usize>) -> CmdResult {
    let (global, pixels) = match (index, label, local) {
        (Some(i), _, _) => (i, set.sample_by_global_index(i)?),
        (None, Some(l), Some(k)) => (set.global_index_of(l, k)?, set.sample_by_label(l, k)?),
        (None, Some(l), None) => {
            let (k, pixels) = set.random_sample_for_label(l)?;
            (set.global_index_of(l, k)?, pixels)
        }
        (None, None, _) => set.random_sample()?,
    };
    println!("Sample {} (label {})", global, set.label_of(global)?);
    print!("{}", to_ascii(&pixels, set.cols()));
    Ok(())
}

fn export(set: &LabeledImageSet, index: usize, out: &Path, alpha: u8) -> CmdResult {
    let pixels = set.image(index)?;
    let img = to_rgba_image(pixels, set.rows(), set.cols(), alpha)?;
    img.save(out)?;
    println!(
        "Sample {} (label {}) written to {}",
        index,
        set.label_of(index)?,
        out.display()
    );
    Ok(())
}

fn synth(out_dir: &Path, count: usize, rows: usize, cols: usize, seed: Option<u64>) -> CmdResult {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let mut pixels = vec![0u8; count * rows * cols];
    rng.fill(pixels.as_mut_slice());
    let labels: Vec<u8> = (0..count).map(|_| rng.gen_range(0..10u8)).collect();

    std::fs::create_dir_all(out_dir)?;
    let images_path = out_dir.join("train-images-idx3-ubyte");
    let labels_path = out_dir.join("train-labels-idx1-ubyte");
    std::fs::write(
        &images_path,
        encode_images(
            IDX3_UBYTE_MAGIC,
            i32::try_from(count)?,
            i32::try_from(rows)?,
            i32::try_from(cols)?,
            &pixels,
        ),
    )?;
    std::fs::write(
        &labels_path,
        encode_labels(IDX1_UBYTE_MAGIC, i32::try_from(count)?, &labels),
    )?;
    log::info!("wrote {} random samples to {}", count, out_dir.display());
    println!("Images: {}", images_path.display());
    println!("Labels: {}", labels_path.display());
    Ok(())
}
