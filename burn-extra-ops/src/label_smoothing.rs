//! Label-smoothed negative log-likelihood.

use burn::prelude::*;

use crate::ignore::mask_ignored;

/// Computes the label-smoothed NLL of `[N, C, H, W]` log-probabilities against
/// `[N, H, W]` integer labels, reduced by mean over every pixel.
///
/// `loss = (1 - epsilon) * nll + (epsilon / C) * smooth`, where `smooth` is the
/// negated sum of log-probabilities over the class axis. Pixels labelled with
/// `ignore_index` contribute zero to both terms but still count in the mean.
pub fn label_smoothed_nll<B: Backend>(
    lprobs: Tensor<B, 4>,
    target: Tensor<B, 3, Int>,
    epsilon: f32,
    ignore_index: Option<usize>,
) -> Tensor<B, 1> {
    let [_, num_classes, _, _] = lprobs.dims();
    let (target, pad_mask) = mask_ignored(target, ignore_index);

    let mut nll = lprobs
        .clone()
        .gather(1, target.unsqueeze_dim::<4>(1))
        .neg()
        .squeeze::<3>(1);
    let mut smooth = lprobs.sum_dim(1).neg().squeeze::<3>(1);

    if let Some(mask) = pad_mask {
        nll = nll.mask_fill(mask.clone(), 0.0);
        smooth = smooth.mask_fill(mask, 0.0);
    }

    let eps_i = epsilon / num_classes as f32;
    nll.mean().mul_scalar(1.0 - epsilon) + smooth.mean().mul_scalar(eps_i)
}
