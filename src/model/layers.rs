//! Layer ordering shared by the classification and matting networks.
//!
//! Both networks build their encoder from [`vgg16_encoder_layers`], so a
//! position in that list names the same layer in either network. Weight
//! migration relies on this: position 1 is the first convolution and
//! positions 2 through 30 are copied one to one.

use std::ops::RangeInclusive;

use candle_core::{Module, Tensor, D};
use candle_nn::{conv2d, Conv2d, Conv2dConfig, VarBuilder};

/// Position of the first convolution in the reference ordering.
pub const FIRST_CONV_POSITION: usize = 1;

/// Positions whose weights are copied verbatim during migration.
pub const MIGRATED_POSITIONS: RangeInclusive<usize> = 2..=30;

/// Convolutions per block and filters per block of VGG16.
const VGG16_BLOCKS: [(usize, usize); 5] = [(2, 64), (2, 128), (3, 256), (3, 512), (3, 512)];

/// What a layer computes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    /// One zero pixel on every spatial border.
    ZeroPadding,
    /// Square convolution.
    Conv {
        in_channels: usize,
        filters: usize,
        kernel_size: usize,
    },
    /// Square transposed convolution.
    TransposedConv {
        in_channels: usize,
        filters: usize,
        kernel_size: usize,
        stride: usize,
    },
    /// 2x2 max pooling with stride 2.
    MaxPool,
}

/// A named entry of a network's layer ordering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSpec {
    pub name: String,
    pub kind: LayerKind,
}

impl LayerSpec {
    fn new(name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Names of this layer's tensors in the weight store, kernel first.
    pub fn weight_names(&self) -> Vec<String> {
        match self.kind {
            LayerKind::Conv { .. } | LayerKind::TransposedConv { .. } => {
                vec![format!("{}.weight", self.name), format!("{}.bias", self.name)]
            }
            LayerKind::ZeroPadding | LayerKind::MaxPool => Vec::new(),
        }
    }

    /// Number of trainable scalars in this layer.
    pub fn parameter_count(&self) -> usize {
        match self.kind {
            LayerKind::Conv {
                in_channels,
                filters,
                kernel_size,
            }
            | LayerKind::TransposedConv {
                in_channels,
                filters,
                kernel_size,
                ..
            } => in_channels * filters * kernel_size * kernel_size + filters,
            LayerKind::ZeroPadding | LayerKind::MaxPool => 0,
        }
    }
}

/// Reference ordering of the VGG16 convolutional base.
///
/// Each convolution is preceded by its zero padding layer and each block
/// ends with a pooling layer, giving 31 entries from `pad1_1` to `pool5`.
pub fn vgg16_encoder_layers(in_channels: usize) -> Vec<LayerSpec> {
    let mut layers = Vec::with_capacity(31);
    let mut channels = in_channels;

    for (block, &(convs, filters)) in VGG16_BLOCKS.iter().enumerate() {
        let block = block + 1;
        for conv in 1..=convs {
            layers.push(LayerSpec::new(
                format!("pad{block}_{conv}"),
                LayerKind::ZeroPadding,
            ));
            layers.push(LayerSpec::new(
                format!("conv{block}_{conv}"),
                LayerKind::Conv {
                    in_channels: channels,
                    filters,
                    kernel_size: 3,
                },
            ));
            channels = filters;
        }
        layers.push(LayerSpec::new(format!("pool{block}"), LayerKind::MaxPool));
    }

    layers
}

enum EncoderOp {
    Pad,
    Conv(Conv2d),
    Pool,
}

/// VGG16 convolutional base built from the reference ordering
pub struct Encoder {
    layers: Vec<LayerSpec>,
    ops: Vec<EncoderOp>,
}

impl Encoder {
    /// Builds the encoder, creating or looking up `<layer>.weight` and
    /// `<layer>.bias` for every convolution in `vb`.
    pub fn new(in_channels: usize, vb: VarBuilder) -> candle_core::Result<Self> {
        let layers = vgg16_encoder_layers(in_channels);
        let ops = layers
            .iter()
            .map(|layer| match layer.kind {
                LayerKind::ZeroPadding => Ok(EncoderOp::Pad),
                LayerKind::MaxPool => Ok(EncoderOp::Pool),
                LayerKind::Conv {
                    in_channels,
                    filters,
                    kernel_size,
                } => conv2d(
                    in_channels,
                    filters,
                    kernel_size,
                    Conv2dConfig::default(),
                    vb.pp(&layer.name),
                )
                .map(EncoderOp::Conv),
                LayerKind::TransposedConv { .. } => Err(candle_core::Error::Msg(format!(
                    "encoder cannot hold transposed convolution `{}`",
                    layer.name
                ))),
            })
            .collect::<candle_core::Result<Vec<_>>>()?;

        Ok(Self { layers, ops })
    }

    pub fn layers(&self) -> &[LayerSpec] {
        &self.layers
    }
}

impl Module for Encoder {
    fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        let mut xs = xs.clone();
        for op in &self.ops {
            xs = match op {
                EncoderOp::Pad => xs
                    .pad_with_zeros(D::Minus2, 1, 1)?
                    .pad_with_zeros(D::Minus1, 1, 1)?,
                EncoderOp::Conv(conv) => conv.forward(&xs)?.relu()?,
                EncoderOp::Pool => xs.max_pool2d(2)?,
            };
        }
        Ok(xs)
    }
}
