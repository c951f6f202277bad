use candle_core::{DType, Tensor};

use crate::config::{LOSS_EPSILON, UNKNOWN_CODE};

/// Alpha prediction loss over the unknown region of a trimap.
///
/// All three tensors share one shape with values in [0, 1]. A pixel is
/// unknown when its trimap value is within half a grey level of 128/255.
/// The loss is the mean over unknown pixels of `sqrt(d² + ε²)`, where `d`
/// is the prediction error, and 0 when no pixel is unknown.
pub fn alpha_prediction_loss(
    y_true: &Tensor,
    y_pred: &Tensor,
    trimap: &Tensor,
) -> candle_core::Result<Tensor> {
    let unknown = f64::from(UNKNOWN_CODE) / 255.0;
    let mask = trimap
        .affine(1.0, -unknown)?
        .abs()?
        .lt(0.5 / 255.0)?
        .to_dtype(y_pred.dtype())?;

    let difference = (y_pred - y_true)?;
    let error = (difference.sqr()? + LOSS_EPSILON * LOSS_EPSILON)?.sqrt()?;

    let total = (error * &mask)?.sum_all()?;
    let count = (mask.sum_all()? + LOSS_EPSILON)?;
    total.div(&count)?.to_dtype(DType::F32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    fn tensor(values: &[f32]) -> Tensor {
        Tensor::from_vec(values.to_vec(), (1, 1, 1, values.len()), &Device::Cpu).unwrap()
    }

    fn scalar(loss: Tensor) -> f32 {
        loss.to_scalar::<f32>().unwrap()
    }

    #[test]
    fn loss_averages_unknown_pixels() {
        let trimap = tensor(&[128.0 / 255.0, 128.0 / 255.0, 1.0, 0.0]);
        let y_true = tensor(&[0.0, 1.0, 1.0, 0.0]);
        let y_pred = tensor(&[0.5, 0.5, 0.0, 1.0]);

        let loss = scalar(alpha_prediction_loss(&y_true, &y_pred, &trimap).unwrap());
        assert!((loss - 0.5).abs() < 1e-4);
    }

    #[test]
    fn loss_is_near_zero_for_exact_prediction() {
        let trimap = tensor(&[128.0 / 255.0; 4]);
        let alpha = tensor(&[0.1, 0.2, 0.3, 0.4]);

        let loss = scalar(alpha_prediction_loss(&alpha, &alpha, &trimap).unwrap());
        assert!(loss.abs() < 1e-5);
    }

    #[test]
    fn loss_is_zero_without_unknown_pixels() {
        let trimap = tensor(&[0.0, 1.0, 0.0, 1.0]);
        let y_true = tensor(&[0.0, 1.0, 0.0, 1.0]);
        let y_pred = tensor(&[1.0, 0.0, 1.0, 0.0]);

        let loss = scalar(alpha_prediction_loss(&y_true, &y_pred, &trimap).unwrap());
        assert_eq!(loss, 0.0);
    }

    #[test]
    fn neighbouring_grey_levels_are_not_unknown() {
        let trimap = tensor(&[127.0 / 255.0, 129.0 / 255.0]);
        let y_true = tensor(&[0.0, 0.0]);
        let y_pred = tensor(&[1.0, 1.0]);

        let loss = scalar(alpha_prediction_loss(&y_true, &y_pred, &trimap).unwrap());
        assert_eq!(loss, 0.0);
    }
}
