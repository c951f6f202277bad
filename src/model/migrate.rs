//! Weight migration from the 3-channel classification network into the
//! matting network.
//!
//! The first convolution kernel is zero-padded along its input channel axis
//! so the extra channels start with no influence; every other encoder layer
//! is copied unchanged. Decoder weights keep their initialization.

use std::collections::HashMap;

use candle_core::{Tensor, Var};

use super::layers::{LayerSpec, FIRST_CONV_POSITION, MIGRATED_POSITIONS};
use super::matting_net::MattingNet;
use super::vgg16::Vgg16;
use super::WeightedNetwork;
use crate::error::MigrationError;

/// Input channels of the kernel being padded.
const SOURCE_CHANNELS: usize = 3;

/// Migrates a pretrained VGG16 into a matting network.
///
/// The source is consumed; the target is returned with its encoder weights
/// replaced.
///
/// # Errors
///
/// Any [`MigrationError`]; the target must be discarded on error since
/// weights before the failing layer have already been written.
pub fn migrate(source: Vgg16, target: MattingNet) -> Result<MattingNet, MigrationError> {
    let copied = migrate_weights(&source, &target)?;
    tracing::info!(tensors = copied, "migrated VGG16 weights into matting network");
    Ok(target)
}

/// Copies encoder weights from `source` into `target`.
///
/// Returns the number of tensors written.
pub fn migrate_weights<S, T>(source: &S, target: &T) -> Result<usize, MigrationError>
where
    S: WeightedNetwork + ?Sized,
    T: WeightedNetwork + ?Sized,
{
    let required = *MIGRATED_POSITIONS.end();
    for layers in [source.layers(), target.layers()] {
        if layers.len() <= required {
            return Err(MigrationError::EncoderTooShort {
                available: layers.len(),
                required,
            });
        }
    }

    let first = matching_layer(source.layers(), target.layers(), FIRST_CONV_POSITION)?;
    let mut names = first.weight_names();
    let first_kernel = names[0].clone();
    for position in MIGRATED_POSITIONS {
        names.extend(matching_layer(source.layers(), target.layers(), position)?.weight_names());
    }
    let source_tensors = read_tensors(source, &names)?;

    let target_data = target
        .weights()
        .data()
        .lock()
        .map_err(|_| MigrationError::WeightStorePoisoned)?;

    let mut copied = 0;
    for name in &names {
        let source_tensor = &source_tensors[name];
        let var = target_data
            .get(name)
            .ok_or_else(|| MigrationError::MissingWeight(name.clone()))?;
        let tensor = if *name == first_kernel {
            pad_input_channels(name, source_tensor, var)?
        } else {
            check_shape(name, source_tensor, var)?;
            source_tensor.clone()
        };
        var.set(&tensor.to_device(var.device())?.to_dtype(var.dtype())?)?;
        tracing::debug!(name = %name, shape = ?tensor.dims(), "migrated tensor");
        copied += 1;
    }

    Ok(copied)
}

/// Layer at `position`, which must have the same name in both orderings.
fn matching_layer<'a>(
    source: &'a [LayerSpec],
    target: &[LayerSpec],
    position: usize,
) -> Result<&'a LayerSpec, MigrationError> {
    let (source_layer, target_layer) = (&source[position], &target[position]);
    if source_layer.name != target_layer.name {
        return Err(MigrationError::LayerMismatch {
            position,
            source_layer: source_layer.name.clone(),
            target_layer: target_layer.name.clone(),
        });
    }
    Ok(source_layer)
}

fn read_tensors<N>(
    network: &N,
    names: &[String],
) -> Result<HashMap<String, Tensor>, MigrationError>
where
    N: WeightedNetwork + ?Sized,
{
    let data = network
        .weights()
        .data()
        .lock()
        .map_err(|_| MigrationError::WeightStorePoisoned)?;
    names
        .iter()
        .map(|name| {
            data.get(name)
                .map(|var| (name.clone(), var.as_tensor().clone()))
                .ok_or_else(|| MigrationError::MissingWeight(name.clone()))
        })
        .collect()
}

fn check_shape(name: &str, source: &Tensor, target: &Var) -> Result<(), MigrationError> {
    if source.dims() != target.dims() {
        return Err(shape_mismatch(name, source, target));
    }
    Ok(())
}

fn shape_mismatch(name: &str, source: &Tensor, target: &Var) -> MigrationError {
    MigrationError::ShapeMismatch {
        name: name.to_string(),
        source_shape: source.dims().to_vec(),
        target_shape: target.dims().to_vec(),
    }
}

/// Appends zero input channels to a `(out, 3, kh, kw)` kernel so it
/// matches the target's `(out, C, kh, kw)`.
fn pad_input_channels(
    name: &str,
    source: &Tensor,
    target: &Var,
) -> Result<Tensor, MigrationError> {
    let (out_channels, in_channels, kh, kw) = source.dims4()?;
    let (target_out, target_in, target_kh, target_kw) = target.dims4()?;

    if target_in < SOURCE_CHANNELS {
        return Err(MigrationError::UnsupportedChannelCount(target_in));
    }
    let fits = in_channels == SOURCE_CHANNELS
        && (out_channels, kh, kw) == (target_out, target_kh, target_kw);
    if !fits {
        return Err(shape_mismatch(name, source, target));
    }
    if target_in == in_channels {
        return Ok(source.clone());
    }

    let zeros = Tensor::zeros(
        (out_channels, target_in - in_channels, kh, kw),
        source.dtype(),
        source.device(),
    )?;
    Ok(Tensor::cat(&[source, &zeros], 1)?)
}
