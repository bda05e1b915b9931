//! Ignore-index masking for dense label maps.

use burn::prelude::*;

/// Returns a boolean mask that is `true` wherever `target` equals `ignore_index`.
pub fn ignore_mask<B: Backend, const D: usize>(
    target: Tensor<B, D, Int>,
    ignore_index: usize,
) -> Tensor<B, D, Bool> {
    target.equal_elem(ignore_index as i64)
}

/// Replaces ignored labels with class `0` so they can be used as gather indices.
///
/// Returns the sanitized labels together with the ignore mask, or `None` for the
/// mask when no ignore index is configured.
pub fn mask_ignored<B: Backend, const D: usize>(
    target: Tensor<B, D, Int>,
    ignore_index: Option<usize>,
) -> (Tensor<B, D, Int>, Option<Tensor<B, D, Bool>>) {
    match ignore_index {
        Some(index) => {
            let mask = ignore_mask(target.clone(), index);
            (target.mask_fill(mask.clone(), 0), Some(mask))
        }
        None => (target, None),
    }
}
