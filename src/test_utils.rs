//! Test utilities for deep-image-matting
//!
//! Fixtures shared by the unit tests. Only compiled when running tests.

use image::{Luma, Rgb};
use imageproc::definitions::Image;

/// Creates an alpha mask that is fully opaque inside a square.
///
/// Pixels with both coordinates in `start..end` are 255, all others 0.
pub fn create_square_alpha(width: u32, height: u32, start: u32, end: u32) -> Image<Luma<u8>> {
    Image::from_fn(width, height, |x, y| {
        let inside = (start..end).contains(&x) && (start..end).contains(&y);
        Luma([if inside { 255 } else { 0 }])
    })
}

/// Creates an alpha mask with an opaque disc and a linear soft edge.
///
/// Alpha falls from 255 at `radius` to 0 at `radius + feather`.
pub fn create_disc_alpha(size: u32, radius: f32, feather: f32) -> Image<Luma<u8>> {
    let centre = size as f32 / 2.0;
    Image::from_fn(size, size, |x, y| {
        let distance = (x as f32 + 0.5 - centre).hypot(y as f32 + 0.5 - centre);
        let coverage = ((radius + feather - distance) / feather).clamp(0.0, 1.0);
        Luma([(coverage * 255.0).round() as u8])
    })
}

/// Creates an RGB gradient whose pixels encode their own coordinates.
pub fn create_gradient_image(width: u32, height: u32) -> Image<Rgb<u8>> {
    Image::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, (x + y) as u8]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_alpha_is_half_open() {
        let alpha = create_square_alpha(6, 6, 2, 4);

        assert_eq!(alpha.get_pixel(2, 2)[0], 255);
        assert_eq!(alpha.get_pixel(3, 3)[0], 255);
        assert_eq!(alpha.get_pixel(4, 3)[0], 0);
        assert_eq!(alpha.pixels().filter(|p| p[0] == 255).count(), 4);
    }

    #[test]
    fn disc_alpha_has_soft_edge() {
        let alpha = create_disc_alpha(40, 10.0, 4.0);

        assert_eq!(alpha.get_pixel(20, 20)[0], 255);
        assert_eq!(alpha.get_pixel(0, 0)[0], 0);
        assert!(alpha.pixels().any(|p| p[0] > 0 && p[0] < 255));
    }

    #[test]
    fn gradient_encodes_coordinates() {
        let image = create_gradient_image(5, 3);
        assert_eq!(image.get_pixel(4, 2), &Rgb([4, 2, 6]));
    }
}
