//! Internal utility functions for deep-image-matting.
//!
//! This module contains validation and normalization shared by the matting
//! operations and the model input path.

use image::{GenericImageView, Primitive};

use crate::error::Error;

/// Normalizes a subpixel value to a floating-point value in the range [0, 1].
///
/// # Arguments
///
/// * `value` - The value to normalize
///
/// # Returns
///
/// The normalized value as a floating-point number between 0 and 1
#[inline]
pub fn normalize<S>(value: S) -> f32
where
    S: Into<f32> + Primitive,
{
    value.into() / S::DEFAULT_MAX_VALUE.into()
}

/// Converts a normalized value back to an 8-bit level.
///
/// Values are clamped to [0, 1] and truncated, matching a plain
/// `as u8` cast of the scaled value.
#[inline]
pub fn denormalize_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

/// Validates that an image has non-zero dimensions.
///
/// # Returns
///
/// `Ok(())` if the dimensions are valid, otherwise `Error::EmptyImage`
pub fn validate_non_empty_image<I: GenericImageView>(image: &I) -> Result<(), Error> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        Err(Error::EmptyImage)
    } else {
        Ok(())
    }
}

/// Validates that two images have matching dimensions.
///
/// # Arguments
///
/// * `expected` - The image whose dimensions are authoritative
/// * `actual` - The image that must match
///
/// # Returns
///
/// `Ok(())` if the dimensions match, otherwise `Error::DimensionMismatch`
pub fn validate_matching_dimensions<I1, I2>(expected: &I1, actual: &I2) -> Result<(), Error>
where
    I1: GenericImageView,
    I2: GenericImageView,
{
    let expected = expected.dimensions();
    let actual = actual.dimensions();
    if expected != actual {
        Err(Error::DimensionMismatch { expected, actual })
    } else {
        Ok(())
    }
}
