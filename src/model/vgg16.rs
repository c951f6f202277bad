use std::path::Path;

use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{VarBuilder, VarMap};

use super::layers::{Encoder, LayerSpec};
use super::WeightedNetwork;
use crate::error::ModelError;

/// VGG16 convolutional base with three input channels
///
/// This is the pretrained classification network weights are migrated
/// from. Only the convolutional base takes part in migration, so the
/// fully connected classifier is not built.
pub struct Vgg16 {
    weights: VarMap,
    encoder: Encoder,
}

impl Vgg16 {
    /// Input channels of the classification network.
    pub const CHANNELS: usize = 3;

    /// Builds the network with freshly initialized weights.
    pub fn new(device: &Device) -> Result<Self, ModelError> {
        let weights = VarMap::new();
        let vb = VarBuilder::from_varmap(&weights, DType::F32, device);
        let encoder = Encoder::new(Self::CHANNELS, vb)?;
        Ok(Self { weights, encoder })
    }

    /// Builds the network and overwrites every weight from a safetensors file.
    ///
    /// The file may hold more tensors than the convolutional base (for
    /// example classifier weights); those are ignored.
    pub fn load(path: impl AsRef<Path>, device: &Device) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let mut network = Self::new(device)?;
        network.weights.load(path)?;
        tracing::info!(path = %path.display(), "loaded VGG16 weights");
        Ok(network)
    }

    /// Writes every weight to a safetensors file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        self.weights.save(path)?;
        Ok(())
    }
}

impl Module for Vgg16 {
    /// Features after `pool5`, shape `(N, 512, H / 32, W / 32)`.
    fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        self.encoder.forward(xs)
    }
}

impl WeightedNetwork for Vgg16 {
    fn layers(&self) -> &[LayerSpec] {
        self.encoder.layers()
    }

    fn weights(&self) -> &VarMap {
        &self.weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_reduces_resolution_by_32() {
        let device = Device::Cpu;
        let network = Vgg16::new(&device).unwrap();

        let input = Tensor::zeros((1, 3, 64, 32), DType::F32, &device).unwrap();
        let features = network.forward(&input).unwrap();

        assert_eq!(features.dims(), &[1, 512, 2, 1]);
    }

    #[test]
    fn weights_follow_layer_names() {
        let network = Vgg16::new(&Device::Cpu).unwrap();

        let kernel = network.weight("conv1_1.weight").unwrap();
        assert_eq!(kernel.dims(), &[64, 3, 3, 3]);
        assert_eq!(network.weight("conv5_3.bias").unwrap().dims(), &[512]);
        assert!(network.weight("pool5.weight").is_none());
        assert_eq!(network.parameter_count(), 14_714_688);
    }
}
