use crate::error::PaddingError;
use image::{imageops, ImageBuffer, Pixel};

/// Canvas placement of smaller masks
///
/// Ground-truth alpha files are not always as large as the photograph they
/// belong to. Placing the mask at the top-left of an image-sized canvas keeps
/// pixel coordinates aligned; the rest of the canvas takes the fill value.
pub trait PadToCanvas<P: Pixel> {
    /// Places the image at the top-left corner of a `canvas_size` canvas
    ///
    /// # Arguments
    ///
    /// * `canvas_size` - Canvas size (width, height)
    /// * `fill` - Value for canvas pixels the image does not cover
    ///
    /// # Errors
    ///
    /// * `PaddingError::CanvasWidthTooSmall` / `PaddingError::CanvasHeightTooSmall`
    ///   when the canvas cannot hold the image
    fn pad_to_canvas(
        self,
        canvas_size: (u32, u32),
        fill: P,
    ) -> Result<ImageBuffer<P, Vec<P::Subpixel>>, PaddingError>;
}

/// Checks that a canvas can hold an image of the given size.
pub fn validate_canvas(size: (u32, u32), canvas_size: (u32, u32)) -> Result<(), PaddingError> {
    let (width, height) = size;
    let (canvas_width, canvas_height) = canvas_size;

    if canvas_width < width {
        return Err(PaddingError::CanvasWidthTooSmall {
            width,
            canvas_width,
        });
    }

    if canvas_height < height {
        return Err(PaddingError::CanvasHeightTooSmall {
            height,
            canvas_height,
        });
    }

    Ok(())
}

impl<P: Pixel> PadToCanvas<P> for ImageBuffer<P, Vec<P::Subpixel>> {
    fn pad_to_canvas(self, canvas_size: (u32, u32), fill: P) -> Result<Self, PaddingError> {
        validate_canvas(self.dimensions(), canvas_size)?;

        if self.dimensions() == canvas_size {
            return Ok(self);
        }

        let (canvas_width, canvas_height) = canvas_size;
        let mut canvas = Self::from_pixel(canvas_width, canvas_height, fill);
        imageops::overlay(&mut canvas, &self, 0, 0);
        Ok(canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::definitions::Image;

    #[test]
    fn pad_to_canvas_places_image_top_left() {
        let mask: Image<Luma<u8>> = Image::from_pixel(2, 3, Luma([200]));

        let padded = mask.pad_to_canvas((4, 5), Luma([0])).unwrap();

        assert_eq!(padded.dimensions(), (4, 5));
        assert_eq!(padded.get_pixel(0, 0), &Luma([200]));
        assert_eq!(padded.get_pixel(1, 2), &Luma([200]));
        assert_eq!(padded.get_pixel(2, 0), &Luma([0]));
        assert_eq!(padded.get_pixel(0, 3), &Luma([0]));
        assert_eq!(padded.get_pixel(3, 4), &Luma([0]));
    }

    #[test]
    fn pad_to_canvas_same_size_is_identity() {
        let mask: Image<Luma<u8>> = Image::from_fn(3, 3, |x, y| Luma([(x * 3 + y) as u8]));
        let padded = mask.clone().pad_to_canvas((3, 3), Luma([0])).unwrap();
        assert_eq!(padded, mask);
    }

    #[test]
    fn pad_to_canvas_rejects_small_canvas() {
        let mask: Image<Luma<u8>> = Image::new(10, 10);

        assert_eq!(
            mask.clone().pad_to_canvas((5, 10), Luma([0])),
            Err(PaddingError::CanvasWidthTooSmall {
                width: 10,
                canvas_width: 5
            })
        );
        assert_eq!(
            mask.pad_to_canvas((10, 9), Luma([0])),
            Err(PaddingError::CanvasHeightTooSmall {
                height: 10,
                canvas_height: 9
            })
        );
    }
}
