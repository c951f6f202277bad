use image::Luma;
use imageproc::{definitions::Image, map::map_colors2};

use crate::config::UNKNOWN_CODE;
use crate::error::Error;
use crate::utils::validate_matching_dimensions;

/// Trait providing trimap-guided composition of predicted alpha
///
/// Only the unknown region of a trimap needs a prediction; definite
/// foreground and background are already known.
pub trait ComposeWithTrimap {
    /// Replaces the unknown region of the trimap with this prediction
    ///
    /// Pixels where the trimap is 0 or 255 keep the trimap value; pixels
    /// where it is 128 take the predicted alpha.
    ///
    /// # Errors
    ///
    /// * `Error::DimensionMismatch` - When prediction and trimap sizes differ
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use deep_image_matting::{ComposeWithTrimap, Image};
    /// use image::Luma;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let prediction: Image<Luma<u8>> = Image::new(320, 320);
    /// let trimap: Image<Luma<u8>> = Image::new(320, 320);
    /// let alpha = prediction.compose_with_trimap(&trimap)?;
    /// # Ok(())
    /// # }
    /// ```
    fn compose_with_trimap(&self, trimap: &Image<Luma<u8>>) -> Result<Image<Luma<u8>>, Error>;
}

impl ComposeWithTrimap for Image<Luma<u8>> {
    fn compose_with_trimap(&self, trimap: &Image<Luma<u8>>) -> Result<Image<Luma<u8>>, Error> {
        validate_matching_dimensions(trimap, self)?;

        Ok(map_colors2(trimap, self, |Luma([code]), Luma([alpha])| {
            if code == UNKNOWN_CODE {
                Luma([alpha])
            } else {
                Luma([code])
            }
        }))
    }
}
