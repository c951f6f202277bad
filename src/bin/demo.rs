use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use candle_core::Device;
use clap::Parser;
use image::Luma;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use deep_image_matting::{
    compute_mse_loss, compute_sad_loss, crop_top_left, ComposeWithTrimap, Error,
    GenerateTrimap, Image, MattingNet, NetworkConfig, PadToCanvas, SafeCrop, TrimapConfig,
    WeightedNetwork,
};

/// Predicts an alpha matte for one image and compares it with ground truth
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the image file
    #[arg(short, long, default_value = "images/0_0.png")]
    image: PathBuf,

    /// Path to the ground truth alpha file
    #[arg(short = 't', long, default_value = "images/035A4301.jpg")]
    alpha: PathBuf,

    /// Path to the matting network weights
    #[arg(long, default_value = "models/model_weights.safetensors")]
    weights: PathBuf,

    /// Directory the crops and predictions are written to
    #[arg(long, default_value = "images")]
    output_dir: PathBuf,
}

fn save_luma(image: &Image<Luma<u8>>, path: &Path) -> Result<()> {
    image
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let device = Device::cuda_if_available(0)?;
    let network = MattingNet::load(NetworkConfig::default(), &args.weights, &device)
        .with_context(|| format!("failed to load weights from {}", args.weights.display()))?;
    network.log_summary("matting network");

    info!("Start processing image: {}", args.image.display());
    let image = image::open(&args.image)
        .with_context(|| format!("failed to read {}", args.image.display()))?
        .to_rgb8();
    let alpha = image::open(&args.alpha)
        .with_context(|| format!("failed to read {}", args.alpha.display()))?
        .to_luma8();
    info!(
        image = ?image.dimensions(),
        alpha = ?alpha.dimensions(),
        "loaded inputs"
    );

    // Ground truth larger than the image is cut to the image size first.
    let (width, height) = image.dimensions();
    let alpha = image::imageops::crop_imm(&alpha, 0, 0, width, height)
        .to_image()
        .pad_to_canvas((width, height), Luma([0]))?;

    let trimap = alpha.generate_trimap(&TrimapConfig::default())?;
    // The crop window is the network's input size.
    let config = network.config();
    let crop_size = (u32::try_from(config.width())?, u32::try_from(config.height())?);
    let (x, y) = crop_top_left(&trimap, crop_size);
    info!(x, y, "crop window");

    let image = image.safe_crop(x, y, crop_size)?;
    let alpha = alpha.safe_crop(x, y, crop_size)?;
    let trimap = trimap.safe_crop(x, y, crop_size)?;

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("failed to create {}", args.output_dir.display()))?;
    let output = |name: &str| args.output_dir.join(name);
    image
        .save(output("image.png"))
        .context("failed to write cropped image")?;
    save_luma(&trimap, &output("trimap.png"))?;
    save_luma(&alpha, &output("alpha.png"))?;

    let prediction = network.predict_alpha(&image, &trimap)?;
    save_luma(&prediction, &output("out.png"))?;

    let composed = prediction.compose_with_trimap(&trimap)?;
    save_luma(&composed, &output("final.png"))?;

    match compute_mse_loss(&composed, &alpha, &trimap) {
        Ok(mse) => info!(mse, "mean squared error over unknown region"),
        Err(Error::NoUnknownPixels) => warn!("trimap has no unknown pixels, skipping MSE"),
        Err(error) => return Err(error.into()),
    }
    let sad = compute_sad_loss(&composed, &alpha, &trimap)?;
    info!(sad, "sum of absolute differences over unknown region");

    Ok(())
}
