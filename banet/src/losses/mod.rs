//! Loss functions for BANet training.
//!
//! This module implements the segmentation losses used to train BANet:
//! a label-smoothed cross-entropy, a multiclass Dice loss, a weighted
//! combination of two losses, and the BANet loss built from them.

pub mod banet_loss;
pub mod dice;
pub mod joint;
pub mod soft_ce;

// Re-export loss functions and their configs
pub use banet_loss::{BANetLoss, BANetLossConfig, BANET_SMOOTHING};
pub use dice::{DiceLoss, DiceLossConfig};
pub use joint::{JointLoss, JointLossConfig};
pub use soft_ce::{SoftCrossEntropyLoss, SoftCrossEntropyLossConfig};

use burn::tensor::{backend::Backend, Int, Tensor};

use crate::registry::Registry;

/// A loss over dense multiclass predictions.
pub trait SegmentationLoss<B: Backend> {
    /// Compute the loss of `[N, C, H, W]` logits against `[N, H, W]` labels.
    fn forward(&self, pred: Tensor<B, 4>, target: Tensor<B, 3, Int>) -> Tensor<B, 1>;
}

impl<B: Backend, L: SegmentationLoss<B> + ?Sized> SegmentationLoss<B> for Box<L> {
    fn forward(&self, pred: Tensor<B, 4>, target: Tensor<B, 3, Int>) -> Tensor<B, 1> {
        (**self).forward(pred, target)
    }
}

/// A boxed loss as produced by [`loss_registry`].
pub type DynSegmentationLoss<B> = Box<dyn SegmentationLoss<B>>;

/// A registry of every loss in this module, keyed by type name.
///
/// Arguments are merged over the loss's default config before decoding, so a
/// spec such as `{ type = "DiceLoss", smooth = 0.05, ignore_index = 255 }`
/// builds a [`DiceLoss`] with the remaining fields at their defaults.
pub fn loss_registry<B: Backend>() -> Registry<DynSegmentationLoss<B>> {
    let mut registry = Registry::new();
    registry
        .register_config(
            "SoftCrossEntropyLoss",
            SoftCrossEntropyLossConfig::new(),
            |config: SoftCrossEntropyLossConfig| {
                Box::new(config.init::<B>()) as DynSegmentationLoss<B>
            },
        )
        .register_config(
            "DiceLoss",
            DiceLossConfig::new(),
            |config: DiceLossConfig| Box::new(config.init::<B>()) as DynSegmentationLoss<B>,
        )
        .register_config(
            "BANetLoss",
            BANetLossConfig::new(),
            |config: BANetLossConfig| Box::new(config.init::<B>()) as DynSegmentationLoss<B>,
        );
    registry
}
