//! Confusion matrix for multiclass segmentation evaluation.
//!
//! Pixels whose ground truth lies outside `0..num_class` are skipped, so the
//! ignore label never reaches the matrix. Rows are ground truth classes and
//! columns are predicted classes.

use burn::tensor::{backend::Backend, Int, Tensor};

use crate::error::{BANetError, BANetResult};

/// Accumulated pixel counts for `num_class` classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    num_class: usize,
    counts: Vec<u64>,
}

impl ConfusionMatrix {
    pub fn new(num_class: usize) -> Self {
        Self {
            num_class,
            counts: vec![0; num_class * num_class],
        }
    }

    pub const fn num_class(&self) -> usize {
        self.num_class
    }

    /// Count of pixels with ground truth `gt` predicted as `pred`, or `None`
    /// when either class is outside `0..num_class`.
    pub fn get(&self, gt: usize, pred: usize) -> Option<u64> {
        (gt < self.num_class && pred < self.num_class).then(|| self.count(gt, pred))
    }

    fn count(&self, gt: usize, pred: usize) -> u64 {
        self.counts[gt * self.num_class + pred]
    }

    /// The matrix as rows of ground truth classes.
    pub fn matrix(&self) -> Vec<Vec<u64>> {
        self.counts
            .chunks(self.num_class.max(1))
            .map(<[u64]>::to_vec)
            .collect()
    }

    /// Total number of counted pixels.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn reset(&mut self) {
        self.counts.iter_mut().for_each(|count| *count = 0);
    }

    /// Accumulate a batch of flattened labels.
    ///
    /// Pixels with a ground truth outside `0..num_class` are skipped, as are
    /// predictions outside that range.
    pub fn add_batch(&mut self, gt: &[i64], pred: &[i64]) -> BANetResult<()> {
        if gt.len() != pred.len() {
            return Err(BANetError::ShapeMismatch {
                expected: format!("{} predictions", gt.len()),
                actual: format!("{} predictions", pred.len()),
            });
        }

        let n = self.num_class as i64;
        for (&g, &p) in gt.iter().zip(pred) {
            if (0..n).contains(&g) && (0..n).contains(&p) {
                self.counts[(n * g + p) as usize] += 1;
            }
        }
        Ok(())
    }

    /// Accumulate integer label tensors of any matching shape.
    pub fn add_tensors<B: Backend, const D: usize>(
        &mut self,
        gt: Tensor<B, D, Int>,
        pred: Tensor<B, D, Int>,
    ) -> BANetResult<()> {
        if gt.dims() != pred.dims() {
            return Err(BANetError::ShapeMismatch {
                expected: format!("{:?}", gt.dims()),
                actual: format!("{:?}", pred.dims()),
            });
        }

        let gt = labels_to_vec(gt)?;
        let pred = labels_to_vec(pred)?;
        self.add_batch(&gt, &pred)
    }

    /// Accumulate `[N, C, H, W]` logits by taking the arg-max class per pixel.
    pub fn add_logits<B: Backend>(
        &mut self,
        gt: Tensor<B, 3, Int>,
        logits: Tensor<B, 4>,
    ) -> BANetResult<()> {
        let pred = logits.argmax(1).squeeze::<3>(1);
        self.add_tensors(gt, pred)
    }

    /// Fraction of counted pixels on the diagonal.
    pub fn overall_accuracy(&self) -> f64 {
        ratio(self.diagonal().iter().sum(), self.total())
    }

    /// Per-class intersection over union; `0.0` for classes never seen.
    pub fn per_class_iou(&self) -> Vec<f64> {
        (0..self.num_class)
            .map(|class| {
                let tp = self.count(class, class);
                ratio(tp, self.row_sum(class) + self.col_sum(class) - tp)
            })
            .collect()
    }

    /// Mean IoU over classes that occur in the ground truth or predictions.
    pub fn mean_iou(&self) -> f64 {
        self.mean_over_seen(&self.per_class_iou())
    }

    /// Per-class precision; `0.0` for classes never predicted.
    pub fn precision(&self) -> Vec<f64> {
        (0..self.num_class)
            .map(|class| ratio(self.count(class, class), self.col_sum(class)))
            .collect()
    }

    /// Per-class recall; `0.0` for classes absent from the ground truth.
    pub fn recall(&self) -> Vec<f64> {
        (0..self.num_class)
            .map(|class| ratio(self.count(class, class), self.row_sum(class)))
            .collect()
    }

    /// Per-class F1 score.
    pub fn f1(&self) -> Vec<f64> {
        self.precision()
            .into_iter()
            .zip(self.recall())
            .map(|(p, r)| if p + r > 0.0 { 2.0 * p * r / (p + r) } else { 0.0 })
            .collect()
    }

    /// Mean F1 over classes that occur in the ground truth or predictions.
    pub fn mean_f1(&self) -> f64 {
        self.mean_over_seen(&self.f1())
    }

    fn diagonal(&self) -> Vec<u64> {
        (0..self.num_class).map(|class| self.count(class, class)).collect()
    }

    fn row_sum(&self, class: usize) -> u64 {
        (0..self.num_class).map(|pred| self.count(class, pred)).sum()
    }

    fn col_sum(&self, class: usize) -> u64 {
        (0..self.num_class).map(|gt| self.count(gt, class)).sum()
    }

    fn mean_over_seen(&self, values: &[f64]) -> f64 {
        let seen: Vec<f64> = (0..self.num_class)
            .filter(|&class| self.row_sum(class) + self.col_sum(class) > 0)
            .map(|class| values[class])
            .collect();
        if seen.is_empty() {
            0.0
        } else {
            seen.iter().sum::<f64>() / seen.len() as f64
        }
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn labels_to_vec<B: Backend, const D: usize>(
    labels: Tensor<B, D, Int>,
) -> BANetResult<Vec<i64>> {
    labels
        .into_data()
        .convert::<i64>()
        .to_vec::<i64>()
        .map_err(|err| BANetError::TensorOperationFailed {
            operation: format!("reading label tensor: {err:?}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    const GT: [i64; 9] = [0, 2, 1, 1, 2, 1, 1, 0, 1];
    const PRED: [i64; 9] = [0, 1, 1, 2, 0, 1, 1, 1, 1];

    fn filled() -> ConfusionMatrix {
        let mut matrix = ConfusionMatrix::new(3);
        matrix.add_batch(&GT, &PRED).unwrap();
        matrix
    }

    #[test]
    fn test_confusion_matrix_counts() {
        let matrix = filled();

        assert_eq!(
            matrix.matrix(),
            vec![vec![1, 1, 0], vec![0, 4, 1], vec![1, 1, 0]]
        );
        assert_eq!(matrix.total(), 9);
    }

    #[test]
    fn test_confusion_matrix_skips_invalid_ground_truth() {
        let mut matrix = ConfusionMatrix::new(3);
        matrix.add_batch(&[0, -1, 255, 2], &[0, 1, 1, 2]).unwrap();

        assert_eq!(matrix.total(), 2);
        assert_eq!(matrix.get(0, 0), Some(1));
        assert_eq!(matrix.get(2, 2), Some(1));
    }

    #[test]
    fn test_confusion_matrix_get_out_of_range() {
        let matrix = filled();

        assert_eq!(matrix.get(1, 1), Some(4));
        assert_eq!(matrix.get(3, 0), None);
        assert_eq!(matrix.get(0, 3), None);
    }

    #[test]
    fn test_confusion_matrix_scores() {
        let matrix = filled();

        assert!((matrix.overall_accuracy() - 5.0 / 9.0).abs() < 1e-12);

        let iou = matrix.per_class_iou();
        assert!((iou[0] - 1.0 / 3.0).abs() < 1e-12);
        assert!((iou[1] - 4.0 / 7.0).abs() < 1e-12);
        assert_eq!(iou[2], 0.0);
        assert!((matrix.mean_iou() - (1.0 / 3.0 + 4.0 / 7.0) / 3.0).abs() < 1e-12);

        let recall = matrix.recall();
        assert!((recall[1] - 0.8).abs() < 1e-12);
        let precision = matrix.precision();
        assert!((precision[1] - 4.0 / 6.0).abs() < 1e-12);
        assert_eq!(matrix.f1()[2], 0.0);
    }

    #[test]
    fn test_confusion_matrix_unseen_classes_are_excluded_from_means() {
        let mut matrix = ConfusionMatrix::new(4);
        matrix.add_batch(&[0, 1], &[0, 1]).unwrap();

        assert_eq!(matrix.mean_iou(), 1.0);
        assert_eq!(matrix.mean_f1(), 1.0);
    }

    #[test]
    fn test_confusion_matrix_length_mismatch() {
        let mut matrix = ConfusionMatrix::new(2);

        assert!(matches!(
            matrix.add_batch(&[0, 1], &[0]),
            Err(BANetError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_confusion_matrix_from_tensors() {
        let device = Default::default();
        let gt =
            Tensor::<TestBackend, 2, Int>::from_ints([[0, 2, 1], [1, 2, 1], [1, 0, 1]], &device);
        let pred =
            Tensor::<TestBackend, 2, Int>::from_ints([[0, 1, 1], [2, 0, 1], [1, 1, 1]], &device);

        let mut matrix = ConfusionMatrix::new(3);
        matrix.add_tensors(gt, pred).unwrap();

        assert_eq!(matrix, filled());
    }

    #[test]
    fn test_confusion_matrix_from_logits() {
        let device = Default::default();
        let gt = Tensor::<TestBackend, 3, Int>::from_ints([[[0, 1]]], &device);
        let logits =
            Tensor::<TestBackend, 4>::from_floats([[[[3.0, 0.0]], [[1.0, 2.0]]]], &device);

        let mut matrix = ConfusionMatrix::new(2);
        matrix.add_logits(gt, logits).unwrap();

        assert_eq!(matrix.overall_accuracy(), 1.0);
    }

    #[test]
    fn test_confusion_matrix_reset() {
        let mut matrix = filled();
        matrix.reset();

        assert_eq!(matrix.total(), 0);
        assert_eq!(matrix.overall_accuracy(), 0.0);
    }
}
