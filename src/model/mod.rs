//! Networks, weight migration and the training loss.

pub mod input;
pub mod layers;
pub mod loss;
pub mod matting_net;
pub mod migrate;
pub mod vgg16;

use candle_core::Tensor;
use candle_nn::VarMap;

use layers::LayerSpec;

/// A network whose weights live in a named store
///
/// The layer ordering gives every weight a position; the store maps
/// `<layer>.weight` and `<layer>.bias` to tensors.
pub trait WeightedNetwork {
    /// Layers in reference order.
    fn layers(&self) -> &[LayerSpec];

    /// The weight store.
    fn weights(&self) -> &VarMap;

    /// Tensor stored under `name`, sharing storage with the network.
    fn weight(&self, name: &str) -> Option<Tensor> {
        let data = self.weights().data().lock().ok()?;
        data.get(name).map(|var| var.as_tensor().clone())
    }

    /// Total number of trainable scalars.
    fn parameter_count(&self) -> usize {
        self.weights()
            .all_vars()
            .iter()
            .map(|var| var.elem_count())
            .sum()
    }

    /// Logs one line per layer with its parameter count, then the total.
    fn log_summary(&self, title: &str) {
        tracing::info!("{title}");
        for (position, layer) in self.layers().iter().enumerate() {
            tracing::info!(
                "  {position:>2} {:<10} {:?} params={}",
                layer.name,
                layer.kind,
                layer.parameter_count()
            );
        }
        tracing::info!("  total params={}", self.parameter_count());
    }
}
