//! Conversion between images and network tensors.

use candle_core::{Device, Tensor};
use image::{Luma, Rgb};
use imageproc::definitions::Image;

use crate::error::ModelError;
use crate::utils::{denormalize_u8, normalize};

/// Stacks an RGB image and its trimap into a `(1, 4, H, W)` tensor.
///
/// Every channel is scaled from 0..=255 to [0, 1]; the trimap is the last
/// channel.
///
/// # Errors
///
/// * `ModelError::InputMismatch` - When image and trimap differ in size
pub fn image_trimap_tensor(
    image: &Image<Rgb<u8>>,
    trimap: &Image<Luma<u8>>,
    device: &Device,
) -> Result<Tensor, ModelError> {
    if image.dimensions() != trimap.dimensions() {
        return Err(ModelError::InputMismatch {
            image: image.dimensions(),
            trimap: trimap.dimensions(),
        });
    }

    let (width, height) = image.dimensions();
    let plane = width as usize * height as usize;
    let mut data = Vec::with_capacity(plane * 4);
    for channel in 0..3 {
        data.extend(image.pixels().map(|pixel| normalize(pixel[channel])));
    }
    data.extend(trimap.pixels().map(|pixel| normalize(pixel[0])));

    Ok(Tensor::from_vec(
        data,
        (1, 4, height as usize, width as usize),
        device,
    )?)
}

/// Converts a `(1, 1, H, W)` alpha tensor in [0, 1] to an 8-bit image.
///
/// # Errors
///
/// * `ModelError::OutputShape` - When the tensor holds more than one map
pub fn alpha_image_from_tensor(alpha: &Tensor) -> Result<Image<Luma<u8>>, ModelError> {
    let (batch, channels, height, width) = alpha.dims4()?;
    if batch != 1 || channels != 1 {
        return Err(ModelError::OutputShape {
            actual: alpha.dims().to_vec(),
        });
    }

    let values = alpha
        .to_dtype(candle_core::DType::F32)?
        .flatten_all()?
        .to_vec1::<f32>()?;
    let pixels: Vec<u8> = values.into_iter().map(denormalize_u8).collect();

    Image::from_raw(width as u32, height as u32, pixels).ok_or_else(|| {
        ModelError::OutputShape {
            actual: alpha.dims().to_vec(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_is_channel_planar_and_normalized() {
        let image = Image::from_fn(3, 2, |x, y| Rgb([x as u8 * 100, y as u8 * 255, 51]));
        let trimap = Image::from_fn(3, 2, |x, _| Luma([if x == 1 { 128 } else { 255 }]));

        let tensor = image_trimap_tensor(&image, &trimap, &Device::Cpu).unwrap();
        assert_eq!(tensor.dims(), &[1, 4, 2, 3]);

        let values = tensor.flatten_all().unwrap().to_vec1::<f32>().unwrap();
        let at = |c: usize, y: usize, x: usize| values[c * 6 + y * 3 + x];
        assert_eq!(at(0, 0, 2), 200.0 / 255.0);
        assert_eq!(at(1, 1, 0), 1.0);
        assert_eq!(at(2, 1, 1), 0.2);
        assert_eq!(at(3, 0, 1), 128.0 / 255.0);
        assert_eq!(at(3, 1, 2), 1.0);
    }

    #[test]
    fn input_rejects_mismatched_trimap() {
        let image: Image<Rgb<u8>> = Image::new(4, 4);
        let trimap: Image<Luma<u8>> = Image::new(4, 3);

        assert!(matches!(
            image_trimap_tensor(&image, &trimap, &Device::Cpu),
            Err(ModelError::InputMismatch { .. })
        ));
    }

    #[test]
    fn alpha_is_scaled_and_clamped() {
        let tensor =
            Tensor::from_vec(vec![0.0f32, 0.5, 1.0, 1.5], (1, 1, 2, 2), &Device::Cpu).unwrap();
        let alpha = alpha_image_from_tensor(&tensor).unwrap();

        assert_eq!(alpha.dimensions(), (2, 2));
        assert_eq!(alpha.as_raw(), &vec![0, 127, 255, 255]);
    }

    #[test]
    fn alpha_rejects_multiple_channels() {
        let tensor = Tensor::zeros((1, 2, 2, 2), candle_core::DType::F32, &Device::Cpu).unwrap();
        assert!(matches!(
            alpha_image_from_tensor(&tensor),
            Err(ModelError::OutputShape { .. })
        ));
    }
}
