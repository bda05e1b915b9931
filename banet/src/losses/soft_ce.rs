//! Label-smoothed cross-entropy for dense multiclass segmentation.

use burn::{
    prelude::*,
    tensor::{activation::log_softmax, backend::Backend, Int, Tensor},
};
use burn_extra_ops::label_smoothed_nll;

use super::SegmentationLoss;

/// Configuration for Soft Cross-Entropy Loss.
#[derive(Config, Debug)]
pub struct SoftCrossEntropyLossConfig {
    /// Label smoothing factor in `[0, 1)`.
    #[config(default = 0.0)]
    pub smooth_factor: f32,
    /// Label value excluded from the loss.
    #[config(default = "None")]
    pub ignore_index: Option<usize>,
}

/// Cross-entropy over the class axis with label smoothing.
///
/// Expects raw logits `[N, C, H, W]` and integer labels `[N, H, W]`.
#[derive(Module, Debug)]
pub struct SoftCrossEntropyLoss<B: Backend> {
    pub smooth_factor: f32,
    pub ignore_index: Option<usize>,
    _phantom: std::marker::PhantomData<B>,
}

impl SoftCrossEntropyLossConfig {
    /// Initialize a new soft cross-entropy loss with the given configuration.
    pub const fn init<B: Backend>(&self) -> SoftCrossEntropyLoss<B> {
        SoftCrossEntropyLoss {
            smooth_factor: self.smooth_factor,
            ignore_index: self.ignore_index,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<B: Backend> Default for SoftCrossEntropyLoss<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> SoftCrossEntropyLoss<B> {
    /// Create a new soft cross-entropy loss with default configuration.
    pub fn new() -> Self {
        SoftCrossEntropyLossConfig::new().init()
    }

    /// Calculate the label-smoothed cross-entropy.
    ///
    /// # Arguments
    /// * `pred` - Predicted logits with shape [N, C, H, W]
    /// * `target` - Ground truth labels with shape [N, H, W]
    ///
    /// # Returns
    /// Loss tensor
    pub fn forward(&self, pred: Tensor<B, 4>, target: Tensor<B, 3, Int>) -> Tensor<B, 1> {
        assert_label_shape(&pred, &target);

        let lprobs = log_softmax(pred, 1);
        label_smoothed_nll(lprobs, target, self.smooth_factor, self.ignore_index)
    }
}

impl<B: Backend> SegmentationLoss<B> for SoftCrossEntropyLoss<B> {
    fn forward(&self, pred: Tensor<B, 4>, target: Tensor<B, 3, Int>) -> Tensor<B, 1> {
        Self::forward(self, pred, target)
    }
}

/// Checks that `[N, C, H, W]` predictions line up with `[N, H, W]` labels.
pub(crate) fn assert_label_shape<B: Backend>(pred: &Tensor<B, 4>, target: &Tensor<B, 3, Int>) {
    let [n, _, h, w] = pred.dims();
    assert_eq!(
        [n, h, w],
        target.dims(),
        "Prediction and target must share batch and spatial dims. Got pred: {:?}, target: {:?}",
        pred.dims(),
        target.dims()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_soft_ce_creation() {
        let loss = SoftCrossEntropyLoss::<TestBackend>::new();
        assert_eq!(loss.smooth_factor, 0.0);
        assert_eq!(loss.ignore_index, None);
    }

    #[test]
    fn test_soft_ce_uniform_logits() {
        let device = Default::default();
        let loss = SoftCrossEntropyLossConfig::new()
            .with_smooth_factor(0.05)
            .init::<TestBackend>();

        let pred = Tensor::<TestBackend, 4>::zeros([2, 4, 3, 3], &device);
        let target = Tensor::<TestBackend, 3, Int>::zeros([2, 3, 3], &device);

        // every class has probability 1/C, so both terms equal ln(C)
        let value = loss.forward(pred, target).into_scalar();
        assert!((value - 4.0_f32.ln()).abs() < 1e-5);
    }

    #[test]
    fn test_soft_ce_confident_prediction_is_lower() {
        let device = Default::default();
        let loss = SoftCrossEntropyLoss::<TestBackend>::new();
        let target = Tensor::<TestBackend, 3, Int>::from_ints([[[0, 1]]], &device);

        let right =
            Tensor::<TestBackend, 4>::from_floats([[[[5.0, -5.0]], [[-5.0, 5.0]]]], &device);
        let wrong = right.clone().neg();

        let right = loss.forward(right, target.clone()).into_scalar();
        let wrong = loss.forward(wrong, target).into_scalar();
        assert!(right < 0.01, "Confident correct prediction should be near zero");
        assert!(wrong > right);
    }

    #[test]
    fn test_soft_ce_ignored_pixels_count_as_zero() {
        let device = Default::default();
        let loss = SoftCrossEntropyLossConfig::new()
            .with_ignore_index(Some(255))
            .init::<TestBackend>();

        let pred = Tensor::<TestBackend, 4>::from_floats([[[[1.0, 3.0]], [[2.0, -1.0]]]], &device);
        let single = pred.clone().slice([0..1, 0..2, 0..1, 0..1]);

        let with_ignored = loss
            .forward(pred, Tensor::from_ints([[[1, 255]]], &device))
            .into_scalar();
        let only_first = loss
            .forward(single, Tensor::from_ints([[[1]]], &device))
            .into_scalar();

        // mean reduction still divides by both pixels
        assert!((with_ignored - only_first / 2.0).abs() < 1e-6);
    }

    #[test]
    #[should_panic(expected = "Prediction and target must share batch and spatial dims")]
    fn test_soft_ce_shape_mismatch() {
        let device = Default::default();
        let loss = SoftCrossEntropyLoss::<TestBackend>::new();

        let pred = Tensor::<TestBackend, 4>::zeros([1, 2, 4, 4], &device);
        let target = Tensor::<TestBackend, 3, Int>::zeros([1, 2, 2], &device);
        let _ = loss.forward(pred, target);
    }
}
