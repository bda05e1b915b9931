//! Weighted sum of the cross-entropy and Dice terms.

use burn::{
    prelude::*,
    tensor::{backend::Backend, Int, Tensor},
};

use super::{dice::DiceLoss, soft_ce::SoftCrossEntropyLoss, SegmentationLoss};

/// Configuration for Joint Loss weights.
#[derive(Config, Debug)]
pub struct JointLossConfig {
    #[config(default = 1.0)]
    pub first_weight: f32,
    #[config(default = 1.0)]
    pub second_weight: f32,
}

/// Combines soft cross-entropy and Dice as
/// `first * first_weight + second * second_weight`.
#[derive(Module, Debug)]
pub struct JointLoss<B: Backend> {
    pub first: SoftCrossEntropyLoss<B>,
    pub second: DiceLoss<B>,
    pub first_weight: f32,
    pub second_weight: f32,
}

impl JointLossConfig {
    /// Initialize a joint loss around the two given losses.
    pub fn init<B: Backend>(
        &self,
        first: SoftCrossEntropyLoss<B>,
        second: DiceLoss<B>,
    ) -> JointLoss<B> {
        JointLoss {
            first,
            second,
            first_weight: self.first_weight,
            second_weight: self.second_weight,
        }
    }
}

impl<B: Backend> JointLoss<B> {
    /// Create a joint loss with explicit weights.
    pub fn new(
        first: SoftCrossEntropyLoss<B>,
        second: DiceLoss<B>,
        first_weight: f32,
        second_weight: f32,
    ) -> Self {
        JointLossConfig::new()
            .with_first_weight(first_weight)
            .with_second_weight(second_weight)
            .init(first, second)
    }

    /// Calculate both weighted components separately.
    ///
    /// # Returns
    /// A tuple of (weighted first loss, weighted second loss)
    pub fn forward_components(
        &self,
        pred: Tensor<B, 4>,
        target: Tensor<B, 3, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 1>) {
        let first = self.first.forward(pred.clone(), target.clone()) * self.first_weight;
        let second = self.second.forward(pred, target) * self.second_weight;
        (first, second)
    }

    /// Calculate the weighted sum of both losses.
    pub fn forward(&self, pred: Tensor<B, 4>, target: Tensor<B, 3, Int>) -> Tensor<B, 1> {
        let (first, second) = self.forward_components(pred, target);
        first + second
    }
}

impl<B: Backend> SegmentationLoss<B> for JointLoss<B> {
    fn forward(&self, pred: Tensor<B, 4>, target: Tensor<B, 3, Int>) -> Tensor<B, 1> {
        Self::forward(self, pred, target)
    }
}
