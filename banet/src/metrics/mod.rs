//! Metrics for BANet evaluation.
//!
//! This module implements the evaluation metrics used for multiclass
//! segmentation, built around a pixel confusion matrix.

pub mod confusion;

pub use confusion::ConfusionMatrix;
