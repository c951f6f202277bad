use image::Luma;
use imageproc::definitions::Image;
use imageproc::distance_transform::Norm;
use imageproc::map::{map_colors, map_colors2};
use imageproc::morphology::{dilate, erode};

use crate::config::{BACKGROUND_CODE, DEFAULT_BAND_WIDTH, FOREGROUND_CODE, UNKNOWN_CODE};
use crate::error::Error;
use crate::utils::validate_non_empty_image;

/// Parameters of trimap generation
///
/// Distances are measured with the L1 norm, which is what repeated
/// dilation with a 3x3 cross-shaped structuring element produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimapConfig {
    /// Pixels within this distance of any non-background alpha pixel
    /// (and not foreground) form the unknown band.
    pub band_width: u8,
    /// Distance by which the definite foreground is shrunk before the
    /// band is drawn. Zero keeps every fully opaque pixel as foreground.
    pub foreground_erosion: u8,
}

impl Default for TrimapConfig {
    fn default() -> Self {
        Self {
            band_width: DEFAULT_BAND_WIDTH,
            foreground_erosion: 0,
        }
    }
}

impl TrimapConfig {
    /// Creates a configuration with the given band width and no erosion.
    pub const fn new(band_width: u8) -> Self {
        Self {
            band_width,
            foreground_erosion: 0,
        }
    }

    /// Sets the foreground erosion distance.
    #[must_use]
    pub const fn with_foreground_erosion(mut self, foreground_erosion: u8) -> Self {
        self.foreground_erosion = foreground_erosion;
        self
    }

    // Distance transforms saturate at 255, so 255 would mark every pixel.
    fn validate(&self) -> Result<(), Error> {
        if self.band_width == u8::MAX {
            return Err(Error::InvalidParameter(
                "band_width must be less than 255".to_string(),
            ));
        }
        if self.foreground_erosion == u8::MAX {
            return Err(Error::InvalidParameter(
                "foreground_erosion must be less than 255".to_string(),
            ));
        }
        Ok(())
    }
}

/// Trait for deriving a trimap from an alpha mask
///
/// The trimap marks definite background (0), definite foreground (255) and
/// an unknown band (128) around every partially or fully opaque region.
pub trait GenerateTrimap {
    /// Generates a trimap from this alpha mask
    ///
    /// Foreground is every pixel with alpha 255 (after optional erosion).
    /// The unknown band is the dilation of every pixel with non-zero alpha,
    /// minus the foreground. Everything else is background.
    ///
    /// # Errors
    ///
    /// * `Error::EmptyImage` - When the mask has a zero dimension
    /// * `Error::InvalidParameter` - When a distance in `config` is 255
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use deep_image_matting::{GenerateTrimap, Image, TrimapConfig};
    /// use image::Luma;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let alpha: Image<Luma<u8>> = Image::new(64, 64);
    /// let trimap = alpha.generate_trimap(&TrimapConfig::new(5))?;
    /// # Ok(())
    /// # }
    /// ```
    fn generate_trimap(&self, config: &TrimapConfig) -> Result<Image<Luma<u8>>, Error>;
}

impl GenerateTrimap for Image<Luma<u8>> {
    fn generate_trimap(&self, config: &TrimapConfig) -> Result<Image<Luma<u8>>, Error> {
        validate_non_empty_image(self)?;
        config.validate()?;

        let foreground = binarize(self, |alpha| alpha == FOREGROUND_CODE);
        let foreground = if config.foreground_erosion > 0 {
            erode(&foreground, Norm::L1, config.foreground_erosion)
        } else {
            foreground
        };

        let coverage = binarize(self, |alpha| alpha != BACKGROUND_CODE);
        // Dilating an empty mask would turn the saturated distance map into
        // a full band.
        let unknown = if coverage.pixels().any(|p| p[0] != 0) {
            dilate(&coverage, Norm::L1, config.band_width)
        } else {
            coverage
        };

        let trimap = map_colors2(&foreground, &unknown, |Luma([fg]), Luma([band])| {
            if fg != 0 {
                Luma([FOREGROUND_CODE])
            } else if band != 0 {
                Luma([UNKNOWN_CODE])
            } else {
                Luma([BACKGROUND_CODE])
            }
        });

        tracing::debug!(
            band_width = config.band_width,
            unknown = trimap.pixels().filter(|p| p[0] == UNKNOWN_CODE).count(),
            "generated trimap"
        );

        Ok(trimap)
    }
}

/// Generates a trimap with the default band width.
///
/// See [`GenerateTrimap::generate_trimap`].
pub fn generate_trimap(alpha: &Image<Luma<u8>>) -> Result<Image<Luma<u8>>, Error> {
    alpha.generate_trimap(&TrimapConfig::default())
}

fn binarize<F>(alpha: &Image<Luma<u8>>, predicate: F) -> Image<Luma<u8>>
where
    F: Fn(u8) -> bool,
{
    map_colors(alpha, |Luma([value])| {
        Luma([if predicate(value) { 255 } else { 0 }])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_square_alpha;

    #[test]
    fn single_foreground_pixel_gets_l1_band() {
        let mut alpha: Image<Luma<u8>> = Image::new(7, 7);
        alpha.put_pixel(3, 3, Luma([255]));

        let trimap = alpha.generate_trimap(&TrimapConfig::new(2)).unwrap();

        for (x, y, pixel) in trimap.enumerate_pixels() {
            let distance = (x as i32 - 3).abs() + (y as i32 - 3).abs();
            let expected = match distance {
                0 => FOREGROUND_CODE,
                1..=2 => UNKNOWN_CODE,
                _ => BACKGROUND_CODE,
            };
            assert_eq!(pixel[0], expected, "pixel ({x}, {y})");
        }
    }

    #[test]
    fn partial_alpha_is_always_unknown() {
        let mut alpha: Image<Luma<u8>> = Image::new(5, 5);
        alpha.put_pixel(2, 2, Luma([1]));
        alpha.put_pixel(0, 0, Luma([254]));

        let trimap = alpha.generate_trimap(&TrimapConfig::new(0)).unwrap();

        assert_eq!(trimap.get_pixel(2, 2), &Luma([UNKNOWN_CODE]));
        assert_eq!(trimap.get_pixel(0, 0), &Luma([UNKNOWN_CODE]));
        assert_eq!(trimap.get_pixel(1, 0), &Luma([BACKGROUND_CODE]));
    }

    #[test]
    fn uniform_masks_have_no_band() {
        let background: Image<Luma<u8>> = Image::new(6, 4);
        let trimap = generate_trimap(&background).unwrap();
        assert!(trimap.pixels().all(|p| p[0] == BACKGROUND_CODE));

        let foreground: Image<Luma<u8>> = Image::from_pixel(6, 4, Luma([255]));
        let trimap = generate_trimap(&foreground).unwrap();
        assert!(trimap.pixels().all(|p| p[0] == FOREGROUND_CODE));
    }

    #[test]
    fn foreground_erosion_moves_edge_into_band() {
        let alpha = create_square_alpha(20, 20, 5, 15);

        let plain = alpha.generate_trimap(&TrimapConfig::new(3)).unwrap();
        let eroded = alpha
            .generate_trimap(&TrimapConfig::new(3).with_foreground_erosion(1))
            .unwrap();

        assert_eq!(plain.get_pixel(5, 10), &Luma([FOREGROUND_CODE]));
        assert_eq!(eroded.get_pixel(5, 10), &Luma([UNKNOWN_CODE]));
        assert_eq!(eroded.get_pixel(10, 10), &Luma([FOREGROUND_CODE]));
        assert_eq!(plain.get_pixel(2, 10), eroded.get_pixel(2, 10));
    }

    #[test]
    fn generation_is_deterministic() {
        let alpha = create_square_alpha(32, 24, 8, 20);
        let config = TrimapConfig::new(4);

        let first = alpha.generate_trimap(&config).unwrap();
        let second = alpha.generate_trimap(&config).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn rejects_empty_mask_and_saturated_distances() {
        let empty: Image<Luma<u8>> = Image::new(0, 3);
        assert_eq!(generate_trimap(&empty), Err(Error::EmptyImage));

        let alpha: Image<Luma<u8>> = Image::new(3, 3);
        assert!(matches!(
            alpha.generate_trimap(&TrimapConfig::new(255)),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            alpha.generate_trimap(&TrimapConfig::new(1).with_foreground_erosion(255)),
            Err(Error::InvalidParameter(_))
        ));
    }
}
