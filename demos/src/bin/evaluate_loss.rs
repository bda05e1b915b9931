//! Loss Evaluation Example
//!
//! Builds a segmentation loss from the spec stored in a config file and runs it
//! once on random logits and labels, printing the loss and the confusion matrix
//! metrics of the random prediction.
//!
//! ## Usage
//!
//! ```bash
//! # Evaluate the spec under `loss`
//! cargo run --bin evaluate_loss -- configs/train.toml
//!
//! # Evaluate a nested spec with 6 classes on 64x64 inputs
//! cargo run --bin evaluate_loss -- configs/train.toml --key model.loss --classes 6 --size 64
//! ```

use anyhow::{ensure, Context, Result};
use banet_burn::{loss_registry, ConfigDict, ConfigLoader, ConfusionMatrix, SegmentationLoss};
use banet_demos::{create_device, get_backend_name, init_logging, SelectedBackend};
use burn::tensor::{Distribution, Int, Tensor};
use clap::Parser;
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file holding the loss spec
    file: PathBuf,

    /// Dotted key of the loss spec
    #[arg(short, long, default_value = "loss")]
    key: String,

    /// Number of classes
    #[arg(short, long, default_value_t = 6)]
    classes: usize,

    /// Height and width of the random inputs
    #[arg(short, long, default_value_t = 32)]
    size: usize,

    /// Batch size of the random inputs
    #[arg(short, long, default_value_t = 2)]
    batch_size: usize,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    ensure!(args.classes > 1, "At least two classes are required");
    ensure!(args.size > 0, "Input size must be greater than 0");
    ensure!(args.batch_size > 0, "Batch size must be greater than 0");

    let config = ConfigLoader::new()
        .load(&args.file)
        .with_context(|| format!("Failed to load config: {}", args.file.display()))?;
    let spec = config
        .get_path(&args.key)
        .with_context(|| format!("Key not found in {}: {}", args.file.display(), args.key))?
        .as_dict()
        .with_context(|| format!("'{}' is not a table", args.key))?;

    let device = create_device();
    info!("Using backend: {}", get_backend_name());

    let loss = loss_registry::<SelectedBackend>()
        .build(spec, &ConfigDict::new())
        .with_context(|| format!("Failed to build loss from '{}'", args.key))?;

    let shape = [args.batch_size, args.size, args.size];
    let logits = Tensor::<SelectedBackend, 4>::random(
        [args.batch_size, args.classes, args.size, args.size],
        Distribution::Normal(0.0, 1.0),
        &device,
    );
    let target: Tensor<SelectedBackend, 3, Int> = Tensor::<SelectedBackend, 3>::random(
        shape,
        Distribution::Uniform(0.0, args.classes as f64),
        &device,
    )
    .int()
    .clamp(0, args.classes as i64 - 1);

    let value = loss.forward(logits.clone(), target.clone()).into_scalar();
    println!("{}: {value}", spec.get_str("type").unwrap_or("loss"));

    let mut matrix = ConfusionMatrix::new(args.classes);
    matrix
        .add_logits(target, logits)
        .context("Failed to accumulate confusion matrix")?;
    println!("  Overall accuracy: {:.4}", matrix.overall_accuracy());
    println!("  Mean IoU: {:.4}", matrix.mean_iou());
    println!("  Mean F1: {:.4}", matrix.mean_f1());

    Ok(())
}
