use thiserror::Error;

/// Error type for trimap, crop and metric operations
///
/// This error type covers failures that can occur while deriving trimaps
/// from alpha masks, cropping matrices, compositing predictions and
/// evaluating them against ground truth.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Two images that must align have different dimensions
    ///
    /// This error occurs when a prediction, target and trimap
    /// (or an image and its mask) are not the same size.
    #[error("Image dimensions do not match: expected {expected:?}, actual {actual:?}")]
    DimensionMismatch {
        /// Expected dimensions (width, height)
        expected: (u32, u32),
        /// Actual dimensions (width, height)
        actual: (u32, u32),
    },

    /// The input image has a zero dimension
    #[error("Image dimensions must be non-zero")]
    EmptyImage,

    /// A metric restricted to the unknown region found no unknown pixels
    ///
    /// Returned by metrics that normalize by the unknown pixel count,
    /// where an empty unknown region would divide by zero.
    #[error("Trimap contains no unknown pixels")]
    NoUnknownPixels,

    /// Invalid parameter provided to the operation
    ///
    /// This error is returned when a parameter value is invalid
    /// or outside the acceptable range for the operation.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Error type for canvas padding operations
///
/// This error type represents failures that can occur when an image is
/// placed onto a larger canvas, typically related to size constraints.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaddingError {
    /// Canvas width is smaller than the image width
    #[error("Canvas width ({canvas_width}) must be greater than or equal to image width ({width})")]
    CanvasWidthTooSmall { width: u32, canvas_width: u32 },

    /// Canvas height is smaller than the image height
    #[error(
        "Canvas height ({canvas_height}) must be greater than or equal to image height ({height})"
    )]
    CanvasHeightTooSmall { height: u32, canvas_height: u32 },
}

/// Error type for network construction, persistence and inference
#[derive(Debug, Error)]
pub enum ModelError {
    /// Input resolution is not usable by the five pooling stages
    #[error("Invalid network dimensions {height}x{width}: both must be positive multiples of 32")]
    InvalidDimensions { height: usize, width: usize },

    /// The network must take at least one input channel
    #[error("Invalid input channel count: {0}")]
    InvalidChannelCount(usize),

    /// Image and trimap passed to inference differ in size
    #[error("Image is {image:?} but trimap is {trimap:?}")]
    InputMismatch {
        image: (u32, u32),
        trimap: (u32, u32),
    },

    /// Input tensor does not match the network configuration
    #[error("Expected input of shape {expected:?}, got {actual:?}")]
    InputShape {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Network output is not a single alpha map
    #[error("Expected output of shape (1, 1, H, W), got {actual:?}")]
    OutputShape { actual: Vec<usize> },

    /// Failure inside the tensor library
    #[error(transparent)]
    Candle(#[from] candle_core::Error),
}

/// Error type for weight migration between networks
///
/// Every variant is a configuration error: the source and target
/// networks do not describe the same encoder, so migration stops.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The target network has fewer input channels than the source kernel
    #[error("Cannot migrate a 3-channel kernel into a {0}-channel network")]
    UnsupportedChannelCount(usize),

    /// Layers at the same encoder position have different names
    #[error(
        "Layer mismatch at position {position}: source `{source_layer}`, target `{target_layer}`"
    )]
    LayerMismatch {
        position: usize,
        source_layer: String,
        target_layer: String,
    },

    /// A weight tensor has a different shape in source and target
    #[error("Shape mismatch for `{name}`: source {source_shape:?}, target {target_shape:?}")]
    ShapeMismatch {
        name: String,
        source_shape: Vec<usize>,
        target_shape: Vec<usize>,
    },

    /// The reference ordering names a weight the network does not hold
    #[error("Missing weight `{0}`")]
    MissingWeight(String),

    /// The reference ordering is shorter than the migrated range
    #[error("Encoder has {available} layers, migration needs position {required}")]
    EncoderTooShort { available: usize, required: usize },

    /// The weight store lock was poisoned by a panicking thread
    #[error("Weight store lock poisoned")]
    WeightStorePoisoned,

    /// Failure inside the tensor library
    #[error(transparent)]
    Candle(#[from] candle_core::Error),
}
