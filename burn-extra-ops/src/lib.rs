//! Additional operations for the Burn deep learning framework
//!
//! This crate provides label-map operations that segmentation losses need but
//! that are not yet available in the core Burn framework.

use burn::prelude::*;

mod ignore;
mod label_smoothing;
mod one_hot;

// Convenient re-exports
pub use ignore::{ignore_mask, mask_ignored};
pub use label_smoothing::label_smoothed_nll;
pub use one_hot::one_hot_channels;

/// Additional operations for dense integer label maps
pub trait LabelTensorOps<B: Backend> {
    /// Encode the `[N, L]` labels as `[N, C, L]` one-hot channels
    fn one_hot_channels(self, num_classes: usize) -> Tensor<B, 3>;

    /// Replace `ignore_index` labels with class `0`, returning the ignore mask
    fn mask_ignored(self, ignore_index: Option<usize>) -> (Self, Option<Tensor<B, 2, Bool>>)
    where
        Self: Sized;
}

impl<B: Backend> LabelTensorOps<B> for Tensor<B, 2, Int> {
    fn one_hot_channels(self, num_classes: usize) -> Tensor<B, 3> {
        one_hot::one_hot_channels(self, num_classes)
    }

    fn mask_ignored(self, ignore_index: Option<usize>) -> (Self, Option<Tensor<B, 2, Bool>>) {
        ignore::mask_ignored(self, ignore_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_label_tensor_ops() {
        let device = Default::default();
        let labels = Tensor::<TestBackend, 2, Int>::from_ints([[1, 255, 0]], &device);

        let (labels, mask) = labels.mask_ignored(Some(255));
        let encoded = labels.one_hot_channels(2);

        assert!(mask.is_some());
        assert_eq!(encoded.dims(), [1, 2, 3]);
        // the ignored pixel was zeroed, so it lands in class 0
        assert_eq!(encoded.sum().into_scalar(), 3.0);
    }
}
