//! Crop window selection and zero-padded cropping.

use image::{Luma, Pixel};
use imageproc::definitions::Image;
use itertools::iproduct;

use crate::config::{CROP_SIZE, UNKNOWN_CODE};
use crate::error::Error;
use crate::matting::inter_nearest::InterNearestResizeExt;
use crate::matting::summed_area_table::SummedAreaTable;

/// Inclusive bounding box `[x1, y1, x2, y2]` of the unknown region, if any.
pub fn unknown_bounds(trimap: &Image<Luma<u8>>) -> Option<[u32; 4]> {
    let (width, height) = trimap.dimensions();
    let mut bounds = [width, height, 0, 0];
    let mut found = false;

    for (x, y, pixel) in trimap.enumerate_pixels() {
        if pixel[0] == UNKNOWN_CODE {
            update_bounds(&mut bounds, x, y);
            found = true;
        }
    }

    found.then_some(bounds)
}

fn update_bounds(bounds: &mut [u32; 4], x: u32, y: u32) {
    bounds[0] = bounds[0].min(x);
    bounds[1] = bounds[1].min(y);
    bounds[2] = bounds[2].max(x);
    bounds[3] = bounds[3].max(y);
}

/// Start of a `window`-long span centred on `[low, high]`, clamped to `[0, max_start]`.
fn centered_start(low: u32, high: u32, window: u32, max_start: u32) -> u32 {
    let center = (i64::from(low) + i64::from(high) + 1) / 2;
    let start = center - i64::from(window / 2);
    start.clamp(0, i64::from(max_start)) as u32
}

/// Top-left corner of the crop window for a trimap
///
/// The window has size `crop_size` (width, height) and never extends past
/// the image: `x + crop_width <= width` and `y + crop_height <= height`
/// whenever the image is at least as large as the window, and the
/// coordinate is 0 along any axis where it is smaller.
///
/// * When the unknown region's bounding box fits in the window, the window
///   is centred on it and therefore contains all of it.
/// * Otherwise every window position is scored by its unknown pixel count
///   and the best one is taken, preferring the centred position on ties.
/// * Without unknown pixels, the window is centred on the image.
pub fn crop_top_left(trimap: &Image<Luma<u8>>, crop_size: (u32, u32)) -> (u32, u32) {
    let (width, height) = trimap.dimensions();
    let (crop_width, crop_height) = crop_size;
    let max_x = width.saturating_sub(crop_width);
    let max_y = height.saturating_sub(crop_height);

    let Some([x1, y1, x2, y2]) = unknown_bounds(trimap) else {
        tracing::debug!("no unknown pixels, centring crop window");
        return (max_x / 2, max_y / 2);
    };

    let centered = (
        centered_start(x1, x2, crop_width, max_x),
        centered_start(y1, y2, crop_height, max_y),
    );

    let fits = x2 - x1 < crop_width && y2 - y1 < crop_height;
    let position = if fits {
        centered
    } else {
        densest_window(trimap, crop_size, centered, (max_x, max_y))
    };

    tracing::debug!(
        x = position.0,
        y = position.1,
        bounds = ?[x1, y1, x2, y2],
        "selected crop window"
    );
    position
}

fn densest_window(
    trimap: &Image<Luma<u8>>,
    (crop_width, crop_height): (u32, u32),
    initial: (u32, u32),
    (max_x, max_y): (u32, u32),
) -> (u32, u32) {
    let sat = SummedAreaTable::from_predicate(trimap, |value| value == UNKNOWN_CODE);

    let mut best = initial;
    let mut best_count = sat.window_sum(initial.0, initial.1, crop_width, crop_height);

    for y in 0..=max_y {
        for x in 0..=max_x {
            let count = sat.window_sum(x, y, crop_width, crop_height);
            if count > best_count {
                best = (x, y);
                best_count = count;
            }
        }
    }

    best
}

/// Top-left corner of the canonical 320x320 crop window.
///
/// See [`crop_top_left`].
pub fn get_crop_top_left(trimap: &Image<Luma<u8>>) -> (u32, u32) {
    crop_top_left(trimap, CROP_SIZE)
}

/// Trait for cropping with zero padding
pub trait SafeCrop<P: Pixel> {
    /// Extracts the `crop_size` (width, height) window at `(x, y)`
    ///
    /// Any part of the window outside the source is filled with zeros.
    /// When `crop_size` differs from the canonical 320x320 the padded
    /// window is resized to 320x320 with nearest-neighbour sampling, so
    /// label images keep their exact values.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidParameter` - When a crop dimension is zero
    fn safe_crop(&self, x: u32, y: u32, crop_size: (u32, u32)) -> Result<Image<P>, Error>;
}

impl<P: Pixel> SafeCrop<P> for Image<P> {
    fn safe_crop(&self, x: u32, y: u32, crop_size: (u32, u32)) -> Result<Image<P>, Error> {
        let (crop_width, crop_height) = crop_size;
        if crop_width == 0 || crop_height == 0 {
            return Err(Error::InvalidParameter(format!(
                "crop size must be non-zero, got {crop_width}x{crop_height}"
            )));
        }

        let (width, height) = self.dimensions();
        let copy_width = width.saturating_sub(x).min(crop_width);
        let copy_height = height.saturating_sub(y).min(crop_height);

        let mut window: Image<P> = Image::new(crop_width, crop_height);
        for (dy, dx) in iproduct!(0..copy_height, 0..copy_width) {
            window.put_pixel(dx, dy, *self.get_pixel(x + dx, y + dy));
        }

        if crop_size == CROP_SIZE {
            Ok(window)
        } else {
            window.resize_nearest(CROP_SIZE.0, CROP_SIZE.1)
        }
    }
}

/// Crops `mat` at `(x, y)` with zero padding.
///
/// See [`SafeCrop::safe_crop`].
pub fn safe_crop<P: Pixel>(
    mat: &Image<P>,
    x: u32,
    y: u32,
    crop_size: (u32, u32),
) -> Result<Image<P>, Error> {
    mat.safe_crop(x, y, crop_size)
}
