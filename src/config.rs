//! Fixed configuration shared by the library and the drivers.

/// Network input height.
pub const IMG_ROWS: u32 = 320;

/// Network input width.
pub const IMG_COLS: u32 = 320;

/// Input channels of the matting network: three colour channels plus the trimap.
pub const CHANNELS: usize = 4;

/// Canonical crop window as (width, height).
pub const CROP_SIZE: (u32, u32) = (IMG_COLS, IMG_ROWS);

/// Trimap value for definite background.
pub const BACKGROUND_CODE: u8 = 0;

/// Trimap value for the uncertainty band.
pub const UNKNOWN_CODE: u8 = 128;

/// Trimap value for definite foreground.
pub const FOREGROUND_CODE: u8 = 255;

/// Default width of the uncertainty band, in pixels of L1 distance.
pub const DEFAULT_BAND_WIDTH: u8 = 10;

/// Smoothing term of the alpha prediction loss.
pub const LOSS_EPSILON: f64 = 1e-6;
