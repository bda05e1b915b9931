//! BANet training loss: soft cross-entropy plus Dice.
//!
//! Both terms use a smoothing of `0.05`, share the ignore index and are summed
//! with unit weights. The loss is the same in training and evaluation.

use burn::{
    prelude::*,
    tensor::{backend::Backend, Int, Tensor},
};

use super::{
    dice::DiceLossConfig, joint::JointLoss, soft_ce::SoftCrossEntropyLossConfig,
    SegmentationLoss,
};

/// Smoothing applied to both the cross-entropy and the Dice term.
pub const BANET_SMOOTHING: f32 = 0.05;

/// Configuration for BANet Loss.
#[derive(Config, Debug)]
pub struct BANetLossConfig {
    /// Label value excluded from both terms.
    #[config(default = "Some(255)")]
    pub ignore_index: Option<usize>,
}

/// Composite loss used to train BANet.
#[derive(Module, Debug)]
pub struct BANetLoss<B: Backend> {
    pub joint: JointLoss<B>,
}

impl BANetLossConfig {
    /// Initialize a new BANet loss with the given configuration.
    pub fn init<B: Backend>(&self) -> BANetLoss<B> {
        let ce = SoftCrossEntropyLossConfig::new()
            .with_smooth_factor(BANET_SMOOTHING)
            .with_ignore_index(self.ignore_index)
            .init();
        let dice = DiceLossConfig::new()
            .with_smooth(BANET_SMOOTHING)
            .with_ignore_index(self.ignore_index)
            .init();

        BANetLoss {
            joint: JointLoss::new(ce, dice, 1.0, 1.0),
        }
    }
}

impl<B: Backend> Default for BANetLoss<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> BANetLoss<B> {
    /// Create a new BANet loss ignoring label `255`.
    pub fn new() -> Self {
        BANetLossConfig::new().init()
    }

    /// Calculate the BANet loss.
    ///
    /// # Arguments
    /// * `pred` - Predicted logits with shape [N, C, H, W]
    /// * `target` - Ground truth labels with shape [N, H, W]
    ///
    /// # Returns
    /// Loss tensor
    pub fn forward(&self, pred: Tensor<B, 4>, target: Tensor<B, 3, Int>) -> Tensor<B, 1> {
        self.joint.forward(pred, target)
    }
}

impl<B: Backend> SegmentationLoss<B> for BANetLoss<B> {
    fn forward(&self, pred: Tensor<B, 4>, target: Tensor<B, 3, Int>) -> Tensor<B, 1> {
        Self::forward(self, pred, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Distribution;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_banet_loss_creation() {
        let loss = BANetLoss::<TestBackend>::new();

        assert_eq!(loss.joint.first.smooth_factor, BANET_SMOOTHING);
        assert_eq!(loss.joint.second.smooth, BANET_SMOOTHING);
        assert_eq!(loss.joint.first.ignore_index, Some(255));
        assert_eq!(loss.joint.second.ignore_index, Some(255));
        assert_eq!(loss.joint.first_weight, 1.0);
        assert_eq!(loss.joint.second_weight, 1.0);
    }

    #[derive(Module, Debug)]
    struct SegmentationHead<B: Backend> {
        loss: BANetLoss<B>,
    }

    #[test]
    fn test_banet_loss_is_a_parameter_free_module() {
        let device = Default::default();
        let head = SegmentationHead {
            loss: BANetLoss::<TestBackend>::new(),
        };
        let copy = head.clone();

        assert_eq!(head.num_params(), 0);

        let pred = Tensor::<TestBackend, 4>::zeros([1, 2, 1, 2], &device);
        let target = Tensor::<TestBackend, 3, Int>::from_ints([[[0, 1]]], &device);
        let value = copy.loss.forward(pred.clone(), target.clone()).into_scalar();
        assert_eq!(value, head.loss.forward(pred, target).into_scalar());
    }

    #[test]
    fn test_banet_loss_is_sum_of_components() {
        let device = Default::default();
        let loss = BANetLoss::<TestBackend>::new();

        let pred = Tensor::<TestBackend, 4>::random(
            [2, 3, 4, 4],
            Distribution::Normal(0.0, 1.0),
            &device,
        );
        let target = Tensor::<TestBackend, 3, Int>::from_ints(
            [
                [[0, 1, 2, 255], [1, 1, 2, 0], [2, 2, 0, 1], [0, 0, 1, 2]],
                [[2, 1, 0, 0], [255, 255, 1, 2], [0, 1, 2, 2], [1, 0, 0, 1]],
            ],
            &device,
        );

        let ce = SoftCrossEntropyLossConfig::new()
            .with_smooth_factor(0.05)
            .with_ignore_index(Some(255))
            .init::<TestBackend>()
            .forward(pred.clone(), target.clone())
            .into_scalar();
        let dice = DiceLossConfig::new()
            .with_smooth(0.05)
            .with_ignore_index(Some(255))
            .init::<TestBackend>()
            .forward(pred.clone(), target.clone())
            .into_scalar();
        let total = loss.forward(pred, target).into_scalar();

        assert!((total - (ce + dice)).abs() < 1e-5);
    }

    #[test]
    fn test_banet_loss_prefers_correct_predictions() {
        let device = Default::default();
        let loss = BANetLoss::<TestBackend>::new();
        let target = Tensor::<TestBackend, 3, Int>::from_ints([[[0, 1], [1, 0]]], &device);

        let right = Tensor::<TestBackend, 4>::from_floats(
            [[[[8.0, -8.0], [-8.0, 8.0]], [[-8.0, 8.0], [8.0, -8.0]]]],
            &device,
        );
        let wrong = right.clone().neg();

        let right = loss.forward(right, target.clone()).into_scalar();
        let wrong = loss.forward(wrong, target).into_scalar();
        assert!(right < wrong);
        assert!(right >= 0.0);
    }
}
