//! One-hot encoding of flattened label maps.

use burn::prelude::*;

/// Encodes `[N, L]` integer labels into a `[N, C, L]` float tensor.
///
/// Labels outside `0..num_classes` produce an all-zero column.
pub fn one_hot_channels<B: Backend>(
    target: Tensor<B, 2, Int>,
    num_classes: usize,
) -> Tensor<B, 3> {
    let [n, l] = target.dims();
    let device = target.device();

    let classes = Tensor::<B, 1, Int>::arange(0..num_classes as i64, &device)
        .reshape([1, num_classes, 1])
        .expand([n, num_classes, l]);
    let labels = target.unsqueeze_dim::<3>(1).expand([n, num_classes, l]);

    labels.equal(classes).float()
}
