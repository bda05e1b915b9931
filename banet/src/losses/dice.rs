//! Multiclass soft Dice loss.

use burn::{
    prelude::*,
    tensor::{activation::softmax, backend::Backend, Int, Tensor},
};
use burn_extra_ops::LabelTensorOps;

use super::{soft_ce::assert_label_shape, SegmentationLoss};

/// Configuration for Dice Loss.
#[derive(Config, Debug)]
pub struct DiceLossConfig {
    /// Smoothness constant added to numerator and denominator.
    #[config(default = 0.0)]
    pub smooth: f32,
    /// Label value excluded from the loss.
    #[config(default = "None")]
    pub ignore_index: Option<usize>,
    /// Lower bound for the denominator.
    #[config(default = 1e-7)]
    pub eps: f32,
    /// Use `-ln(dice)` instead of `1 - dice`.
    #[config(default = false)]
    pub log_loss: bool,
}

/// Soft Dice loss computed from logits, one score per class.
///
/// Classes that do not occur in the target contribute zero; the per-class
/// losses are averaged over all classes.
#[derive(Module, Debug)]
pub struct DiceLoss<B: Backend> {
    pub smooth: f32,
    pub ignore_index: Option<usize>,
    pub eps: f32,
    pub log_loss: bool,
    _phantom: std::marker::PhantomData<B>,
}

impl DiceLossConfig {
    /// Initialize a new Dice loss with the given configuration.
    pub const fn init<B: Backend>(&self) -> DiceLoss<B> {
        DiceLoss {
            smooth: self.smooth,
            ignore_index: self.ignore_index,
            eps: self.eps,
            log_loss: self.log_loss,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<B: Backend> Default for DiceLoss<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> DiceLoss<B> {
    /// Create a new Dice loss with default configuration.
    pub fn new() -> Self {
        DiceLossConfig::new().init()
    }

    /// Calculate the multiclass Dice loss.
    ///
    /// # Arguments
    /// * `pred` - Predicted logits with shape [N, C, H, W]
    /// * `target` - Ground truth labels with shape [N, H, W]
    ///
    /// # Returns
    /// Dice loss tensor
    pub fn forward(&self, pred: Tensor<B, 4>, target: Tensor<B, 3, Int>) -> Tensor<B, 1> {
        assert_label_shape(&pred, &target);
        let [n, c, h, w] = pred.dims();

        let mut probs = softmax(pred, 1).reshape([n, c, h * w]);
        let (labels, ignored) = target.reshape([n, h * w]).mask_ignored(self.ignore_index);
        let mut one_hot = labels.one_hot_channels(c);

        if let Some(ignored) = ignored {
            let keep = ignored
                .bool_not()
                .float()
                .unsqueeze_dim::<3>(1)
                .expand([n, c, h * w]);
            probs = probs * keep.clone();
            one_hot = one_hot * keep;
        }

        let intersection = sum_per_class(probs.clone() * one_hot.clone(), c);
        let cardinality = sum_per_class(probs + one_hot.clone(), c);
        let present = sum_per_class(one_hot, c).greater_elem(0.0).float();

        let scores = (intersection.mul_scalar(2.0).add_scalar(self.smooth))
            / cardinality.add_scalar(self.smooth).clamp_min(self.eps);
        let loss = if self.log_loss {
            scores.clamp_min(self.eps).log().neg()
        } else {
            scores.neg().add_scalar(1.0)
        };

        (loss * present).mean()
    }
}

/// Sums a `[N, C, L]` tensor over batch and pixels, giving `[C]`.
fn sum_per_class<B: Backend>(tensor: Tensor<B, 3>, num_classes: usize) -> Tensor<B, 1> {
    tensor.sum_dim(2).sum_dim(0).reshape([num_classes])
}

impl<B: Backend> SegmentationLoss<B> for DiceLoss<B> {
    fn forward(&self, pred: Tensor<B, 4>, target: Tensor<B, 3, Int>) -> Tensor<B, 1> {
        Self::forward(self, pred, target)
    }
}
