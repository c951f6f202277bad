use std::path::PathBuf;

use anyhow::{Context, Result};
use candle_core::Device;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use deep_image_matting::{migrate, MattingNet, NetworkConfig, Vgg16, WeightedNetwork};

/// Builds matting network weights from pretrained VGG16 weights
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Pretrained VGG16 weights (safetensors, `conv<b>_<n>.weight/bias` keys)
    #[arg(long, default_value = "models/vgg16.safetensors")]
    vgg16: PathBuf,

    /// Where the migrated matting weights are written
    #[arg(long, default_value = "models/model_weights.safetensors")]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let device = Device::Cpu;

    let source = Vgg16::load(&args.vgg16, &device)
        .with_context(|| format!("failed to load {}", args.vgg16.display()))?;
    let target = MattingNet::new(NetworkConfig::default(), &device)?;

    let network = migrate(source, target).context("weight migration failed")?;
    network.log_summary("matting network");

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    network
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!("done");

    Ok(())
}
