pub mod config;
mod error;
mod matting;
pub mod model;
#[cfg(test)]
mod test_utils;
mod utils;

use image::{ImageBuffer, Pixel};

pub use error::{Error, MigrationError, ModelError, PaddingError};
pub use matting::compose::ComposeWithTrimap;
pub use matting::crop::{crop_top_left, get_crop_top_left, safe_crop, unknown_bounds, SafeCrop};
pub use matting::inter_nearest::{InterNearestResize, InterNearestResizeExt};
pub use matting::metrics::{compute_mse_loss, compute_sad_loss};
pub use matting::padding::PadToCanvas;
pub use matting::summed_area_table::SummedAreaTable;
pub use matting::trimap::{generate_trimap, GenerateTrimap, TrimapConfig};
pub use model::loss::alpha_prediction_loss;
pub use model::matting_net::{MattingNet, NetworkConfig};
pub use model::migrate::{migrate, migrate_weights};
pub use model::vgg16::Vgg16;
pub use model::WeightedNetwork;

pub type Image<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;
