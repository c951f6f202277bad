use image::{GenericImageView, ImageBuffer, Pixel};
use imageproc::definitions::Image;

use crate::error::Error;

/// OpenCV INTER_NEAREST interpolation implementation.
///
/// Every destination pixel copies exactly one source pixel, so discrete
/// label images (trimaps, binary masks) keep their label set.
pub struct InterNearestResize {
    /// New width
    pub new_width: u32,
    /// New height
    pub new_height: u32,
}

impl InterNearestResize {
    /// Create a new INTER_NEAREST resizer.
    pub fn new(new_width: u32, new_height: u32) -> Result<Self, Error> {
        if new_width == 0 || new_height == 0 {
            return Err(Error::InvalidParameter(format!(
                "resize target must be non-zero, got {new_width}x{new_height}"
            )));
        }
        Ok(Self {
            new_width,
            new_height,
        })
    }

    /// Resize image using INTER_NEAREST interpolation.
    pub fn resize<I, P>(&self, src: &I) -> Result<Image<P>, Error>
    where
        I: GenericImageView<Pixel = P>,
        P: Pixel,
    {
        let (src_width, src_height) = src.dimensions();
        if src_width == 0 || src_height == 0 {
            return Err(Error::EmptyImage);
        }

        let x_table = compute_source_indices(src_width, self.new_width);
        let y_table = compute_source_indices(src_height, self.new_height);

        Ok(ImageBuffer::from_fn(self.new_width, self.new_height, |dx, dy| {
            src.get_pixel(x_table[dx as usize], y_table[dy as usize])
        }))
    }
}

/// Source index for every destination index along one axis.
///
/// `src = floor(dst * src_size / dst_size)`, computed in integers so the
/// mapping matches OpenCV without floating-point drift.
fn compute_source_indices(src_size: u32, dst_size: u32) -> Vec<u32> {
    (0..dst_size)
        .map(|dst| {
            let src = u64::from(dst) * u64::from(src_size) / u64::from(dst_size);
            (src as u32).min(src_size - 1)
        })
        .collect()
}

/// Extension trait for ImageBuffer to provide INTER_NEAREST resize.
pub trait InterNearestResizeExt<P>
where
    P: Pixel,
{
    /// Resize image using INTER_NEAREST interpolation.
    fn resize_nearest(&self, new_width: u32, new_height: u32) -> Result<Image<P>, Error>;
}

impl<P> InterNearestResizeExt<P> for Image<P>
where
    P: Pixel,
{
    fn resize_nearest(&self, new_width: u32, new_height: u32) -> Result<Image<P>, Error> {
        InterNearestResize::new(new_width, new_height)?.resize(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn compute_source_indices_matches_floor_mapping() {
        assert_eq!(compute_source_indices(4, 2), vec![0, 2]);
        assert_eq!(compute_source_indices(2, 4), vec![0, 0, 1, 1]);
        assert_eq!(compute_source_indices(3, 3), vec![0, 1, 2]);
        assert_eq!(compute_source_indices(5, 2), vec![0, 2]);
    }

    #[test]
    fn resize_nearest_upscale_repeats_pixels() {
        let src: Image<Rgb<u8>> =
            ImageBuffer::from_fn(2, 2, |x, y| Rgb([(x * 100) as u8, (y * 100) as u8, 7]));

        let result = src.resize_nearest(4, 4).unwrap();

        assert_eq!(result.dimensions(), (4, 4));
        assert_eq!(result.get_pixel(1, 1), &Rgb([0, 0, 7]));
        assert_eq!(result.get_pixel(2, 1), &Rgb([100, 0, 7]));
        assert_eq!(result.get_pixel(3, 3), &Rgb([100, 100, 7]));
    }

    #[test]
    fn resize_nearest_keeps_label_set() {
        let labels = [0u8, 128, 255];
        let src: Image<Luma<u8>> =
            ImageBuffer::from_fn(7, 5, |x, y| Luma([labels[((x + y) % 3) as usize]]));

        let result = src.resize_nearest(320, 320).unwrap();

        assert!(result.pixels().all(|p| labels.contains(&p[0])));
    }

    #[test]
    fn resize_nearest_rejects_invalid_sizes() {
        let src: Image<Luma<u8>> = Image::new(4, 4);
        assert!(src.resize_nearest(0, 4).is_err());

        let empty: Image<Luma<u8>> = Image::new(0, 4);
        assert_eq!(empty.resize_nearest(4, 4), Err(Error::EmptyImage));
    }
}
