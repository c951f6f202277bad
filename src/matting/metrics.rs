//! Offline matting error metrics restricted to the unknown trimap region.

use image::Luma;
use imageproc::definitions::Image;

use crate::config::UNKNOWN_CODE;
use crate::error::Error;
use crate::utils::validate_matching_dimensions;

/// Sum of `error(|pred - target| / 255)` over unknown pixels, and their count.
fn accumulate_unknown<F>(
    pred: &Image<Luma<u8>>,
    target: &Image<Luma<u8>>,
    trimap: &Image<Luma<u8>>,
    error: F,
) -> Result<(f64, usize), Error>
where
    F: Fn(f64) -> f64 + Sync + Send,
{
    validate_matching_dimensions(target, pred)?;
    validate_matching_dimensions(target, trimap)?;

    let term = |(&p, &t): (&u8, &u8)| error((f64::from(p) - f64::from(t)).abs() / 255.0);

    #[cfg(feature = "rayon")]
    let totals = {
        use rayon::prelude::*;
        pred.as_raw()
            .par_iter()
            .zip(target.as_raw().par_iter())
            .zip(trimap.as_raw().par_iter())
            .filter(|(_, code)| **code == UNKNOWN_CODE)
            .map(|(pair, _)| (term(pair), 1usize))
            .reduce(|| (0.0, 0), |a, b| (a.0 + b.0, a.1 + b.1))
    };

    #[cfg(not(feature = "rayon"))]
    let totals = itertools::izip!(pred.as_raw(), target.as_raw(), trimap.as_raw())
        .filter(|(_, _, code)| **code == UNKNOWN_CODE)
        .fold((0.0, 0usize), |(sum, count), (p, t, _)| {
            (sum + term((p, t)), count + 1)
        });

    Ok(totals)
}

/// Mean squared error over the unknown region
///
/// Errors are normalized to [0, 1] before squaring, and the sum is divided
/// by the number of unknown pixels.
///
/// # Errors
///
/// * `Error::DimensionMismatch` - When the three images differ in size
/// * `Error::NoUnknownPixels` - When the trimap has no unknown pixel
pub fn compute_mse_loss(
    pred: &Image<Luma<u8>>,
    target: &Image<Luma<u8>>,
    trimap: &Image<Luma<u8>>,
) -> Result<f64, Error> {
    let (sum, unknown) = accumulate_unknown(pred, target, trimap, |e| e * e)?;
    if unknown == 0 {
        return Err(Error::NoUnknownPixels);
    }
    let loss = sum / unknown as f64;
    tracing::debug!(unknown, mse_loss = loss, "computed mse loss");
    Ok(loss)
}

/// Sum of absolute differences over the unknown region, in thousands
///
/// Errors are normalized to [0, 1]; the total is divided by 1000 as is
/// customary for SAD on matting benchmarks.
///
/// # Errors
///
/// * `Error::DimensionMismatch` - When the three images differ in size
pub fn compute_sad_loss(
    pred: &Image<Luma<u8>>,
    target: &Image<Luma<u8>>,
    trimap: &Image<Luma<u8>>,
) -> Result<f64, Error> {
    let (sum, unknown) = accumulate_unknown(pred, target, trimap, |e| e)?;
    let loss = sum / 1000.0;
    tracing::debug!(unknown, sad_loss = loss, "computed sad loss");
    Ok(loss)
}
