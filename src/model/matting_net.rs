use std::path::Path;

use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{
    conv2d, conv_transpose2d, ops::sigmoid, Conv2d, Conv2dConfig, ConvTranspose2d,
    ConvTranspose2dConfig, VarBuilder, VarMap,
};
use image::{Luma, Rgb};
use imageproc::definitions::Image;

use super::input::{alpha_image_from_tensor, image_trimap_tensor};
use super::layers::{Encoder, LayerKind, LayerSpec};
use super::WeightedNetwork;
use crate::config::{CHANNELS, IMG_COLS, IMG_ROWS};
use crate::error::ModelError;

/// Total downsampling of the encoder (five 2x2 poolings).
const DOWNSAMPLING: usize = 32;

/// Input geometry of a [`MattingNet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConfig {
    height: usize,
    width: usize,
    channels: usize,
}

impl NetworkConfig {
    /// Validates and creates a configuration.
    ///
    /// # Errors
    ///
    /// * `ModelError::InvalidDimensions` - When height or width is zero or
    ///   not a multiple of 32
    /// * `ModelError::InvalidChannelCount` - When `channels` is zero
    pub fn new(height: usize, width: usize, channels: usize) -> Result<Self, ModelError> {
        let valid = |size: usize| size > 0 && size % DOWNSAMPLING == 0;
        if !valid(height) || !valid(width) {
            return Err(ModelError::InvalidDimensions { height, width });
        }
        if channels == 0 {
            return Err(ModelError::InvalidChannelCount(channels));
        }
        Ok(Self {
            height,
            width,
            channels,
        })
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn channels(&self) -> usize {
        self.channels
    }
}

impl Default for NetworkConfig {
    /// 320x320 input with colour and trimap channels.
    fn default() -> Self {
        Self {
            height: IMG_ROWS as usize,
            width: IMG_COLS as usize,
            channels: CHANNELS,
        }
    }
}

/// Decoder layers: 1x1 projection, five 2x upsampling stages, prediction.
fn decoder_layers() -> Vec<LayerSpec> {
    let upsampling = [
        ("deconv5", 512, 512),
        ("deconv4", 512, 256),
        ("deconv3", 256, 128),
        ("deconv2", 128, 64),
        ("deconv1", 64, 64),
    ];

    let mut layers = vec![LayerSpec {
        name: "deconv6".to_string(),
        kind: LayerKind::Conv {
            in_channels: 512,
            filters: 512,
            kernel_size: 1,
        },
    }];
    layers.extend(upsampling.iter().map(|&(name, in_channels, filters)| LayerSpec {
        name: name.to_string(),
        kind: LayerKind::TransposedConv {
            in_channels,
            filters,
            kernel_size: 2,
            stride: 2,
        },
    }));
    layers.push(LayerSpec {
        name: "pred".to_string(),
        kind: LayerKind::Conv {
            in_channels: 64,
            filters: 1,
            kernel_size: 5,
        },
    });
    layers
}

enum DecoderOp {
    /// Hidden convolution followed by ReLU.
    Conv(Conv2d),
    /// Upsampling followed by ReLU.
    Upsample(ConvTranspose2d),
    /// Output convolution followed by sigmoid.
    Prediction(Conv2d),
}

struct Decoder {
    ops: Vec<DecoderOp>,
}

impl Decoder {
    fn new(layers: &[LayerSpec], vb: VarBuilder) -> candle_core::Result<Self> {
        let last = layers.len().saturating_sub(1);
        let ops = layers
            .iter()
            .enumerate()
            .map(|(index, layer)| match layer.kind {
                LayerKind::Conv {
                    in_channels,
                    filters,
                    kernel_size,
                } => {
                    let config = Conv2dConfig {
                        padding: kernel_size / 2,
                        ..Default::default()
                    };
                    let conv =
                        conv2d(in_channels, filters, kernel_size, config, vb.pp(&layer.name))?;
                    Ok(if index == last {
                        DecoderOp::Prediction(conv)
                    } else {
                        DecoderOp::Conv(conv)
                    })
                }
                LayerKind::TransposedConv {
                    in_channels,
                    filters,
                    kernel_size,
                    stride,
                } => {
                    let config = ConvTranspose2dConfig {
                        stride,
                        ..Default::default()
                    };
                    conv_transpose2d(in_channels, filters, kernel_size, config, vb.pp(&layer.name))
                        .map(DecoderOp::Upsample)
                }
                LayerKind::ZeroPadding | LayerKind::MaxPool => Err(candle_core::Error::Msg(
                    format!("decoder cannot hold parameterless layer `{}`", layer.name),
                )),
            })
            .collect::<candle_core::Result<Vec<_>>>()?;
        Ok(Self { ops })
    }
}

impl Module for Decoder {
    fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        let mut xs = xs.clone();
        for op in &self.ops {
            xs = match op {
                DecoderOp::Conv(conv) => conv.forward(&xs)?.relu()?,
                DecoderOp::Upsample(deconv) => deconv.forward(&xs)?.relu()?,
                DecoderOp::Prediction(conv) => sigmoid(&conv.forward(&xs)?)?,
            };
        }
        Ok(xs)
    }
}

/// Encoder-decoder alpha matting network
///
/// The encoder is the VGG16 convolutional base with `channels` inputs; the
/// decoder upsamples back to the input resolution and predicts a single
/// alpha channel in [0, 1].
pub struct MattingNet {
    config: NetworkConfig,
    weights: VarMap,
    layers: Vec<LayerSpec>,
    encoder: Encoder,
    decoder: Decoder,
    device: Device,
}

impl MattingNet {
    /// Builds the network with freshly initialized weights.
    pub fn new(config: NetworkConfig, device: &Device) -> Result<Self, ModelError> {
        let weights = VarMap::new();
        let vb = VarBuilder::from_varmap(&weights, DType::F32, device);

        let encoder = Encoder::new(config.channels, vb.clone())?;
        let decoder_specs = decoder_layers();
        let decoder = Decoder::new(&decoder_specs, vb)?;

        let mut layers = encoder.layers().to_vec();
        layers.extend(decoder_specs);

        Ok(Self {
            config,
            weights,
            layers,
            encoder,
            decoder,
            device: device.clone(),
        })
    }

    /// Builds the network and overwrites every weight from a safetensors file.
    pub fn load(
        config: NetworkConfig,
        path: impl AsRef<Path>,
        device: &Device,
    ) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let mut network = Self::new(config, device)?;
        network.weights.load(path)?;
        tracing::info!(path = %path.display(), "loaded matting weights");
        Ok(network)
    }

    /// Writes every weight to a safetensors file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let path = path.as_ref();
        self.weights.save(path)?;
        tracing::info!(path = %path.display(), "saved matting weights");
        Ok(())
    }

    pub const fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Runs the network on an `(N, channels, height, width)` tensor.
    ///
    /// Returns alpha of shape `(N, 1, height, width)`.
    ///
    /// # Errors
    ///
    /// * `ModelError::InputShape` - When the input does not match the configuration
    pub fn forward(&self, input: &Tensor) -> Result<Tensor, ModelError> {
        let (batch, channels, height, width) = input.dims4()?;
        if (channels, height, width)
            != (self.config.channels, self.config.height, self.config.width)
        {
            return Err(ModelError::InputShape {
                expected: vec![
                    batch,
                    self.config.channels,
                    self.config.height,
                    self.config.width,
                ],
                actual: input.dims().to_vec(),
            });
        }

        let features = self.encoder.forward(input)?;
        Ok(self.decoder.forward(&features)?)
    }

    /// Predicts an 8-bit alpha mask for an image and its trimap.
    ///
    /// Both must already have the network's input size; colour and trimap
    /// are scaled to [0, 1] and the output is scaled back to 0..=255.
    pub fn predict_alpha(
        &self,
        image: &Image<Rgb<u8>>,
        trimap: &Image<Luma<u8>>,
    ) -> Result<Image<Luma<u8>>, ModelError> {
        let input = image_trimap_tensor(image, trimap, &self.device)?;
        let output = self.forward(&input)?;
        alpha_image_from_tensor(&output)
    }
}

impl WeightedNetwork for MattingNet {
    fn layers(&self) -> &[LayerSpec] {
        &self.layers
    }

    fn weights(&self) -> &VarMap {
        &self.weights
    }
}
