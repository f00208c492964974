use std::num::NonZeroUsize;

use ndarray::{Array1, Array2, Axis};
use rand::{seq::SliceRandom, Rng};

use crate::{Result, SdaErr};

/// An in-memory dataset: one example per row and, optionally, one class label per example.
#[derive(Debug, Clone)]
pub struct Dataset {
    x: Array2<f32>,
    labels: Option<Array1<usize>>,
    order: Vec<usize>,
}

/// A minibatch copied out of a `Dataset`.
#[derive(Debug, Clone)]
pub struct Batch {
    pub x: Array2<f32>,
    pub y: Option<Array1<usize>>,
}

impl Dataset {
    /// Creates a new labeled `Dataset`.
    ///
    /// # Arguments
    /// * `x` - The features, one example per row.
    /// * `labels` - The class of every example.
    ///
    /// # Returns
    /// A new dataset, `EmptyDataset` if `x` has no rows or `ShapeMismatch` if there isn't exactly
    /// one label per row.
    pub fn new(x: Array2<f32>, labels: Array1<usize>) -> Result<Self> {
        if labels.len() != x.nrows() {
            return Err(SdaErr::ShapeMismatch {
                what: "labels",
                got: labels.len(),
                expected: x.nrows(),
            });
        }

        Self::build(x, Some(labels))
    }

    /// Creates a new `Dataset` without labels, enough for pretraining.
    pub fn unlabeled(x: Array2<f32>) -> Result<Self> {
        Self::build(x, None)
    }

    fn build(x: Array2<f32>, labels: Option<Array1<usize>>) -> Result<Self> {
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(SdaErr::EmptyDataset);
        }

        let order = (0..x.nrows()).collect();
        Ok(Self { x, labels, order })
    }

    pub fn len(&self) -> usize {
        self.x.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    pub fn features(&self) -> &Array2<f32> {
        &self.x
    }

    pub fn labels(&self) -> Option<&Array1<usize>> {
        self.labels.as_ref()
    }

    pub fn is_labeled(&self) -> bool {
        self.labels.is_some()
    }

    /// Randomizes the order in which `batches` yields the examples. The data itself is not moved.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.order.shuffle(rng);
    }

    /// Iterates the dataset in minibatches of `batch_size` examples following the current order.
    ///
    /// The last batch holds the remaining examples and may be smaller.
    pub fn batches(&self, batch_size: NonZeroUsize) -> impl Iterator<Item = Batch> + '_ {
        self.order.chunks(batch_size.get()).map(|rows| Batch {
            x: self.x.select(Axis(0), rows),
            y: self.labels.as_ref().map(|labels| labels.select(Axis(0), rows)),
        })
    }
}

impl Batch {
    pub fn len(&self) -> usize {
        self.x.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::{rngs::StdRng, SeedableRng};

    fn batch_size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn dataset() -> Dataset {
        let x = array![[0., 0.], [1., 1.], [2., 2.], [3., 3.], [4., 4.]];
        Dataset::new(x, array![0, 1, 0, 1, 0]).unwrap()
    }

    #[test]
    fn empty_and_misaligned_datasets_are_rejected() {
        assert!(matches!(
            Dataset::unlabeled(Array2::zeros((0, 3))),
            Err(SdaErr::EmptyDataset)
        ));
        assert!(matches!(
            Dataset::new(Array2::zeros((3, 2)), array![0, 1]),
            Err(SdaErr::ShapeMismatch { what: "labels", got: 2, expected: 3 })
        ));
    }

    #[test]
    fn batches_follow_the_rows_and_keep_the_remainder() {
        let ds = dataset();
        let batches: Vec<_> = ds.batches(batch_size(2)).collect();

        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].x, array![[0., 0.], [1., 1.]]);
        assert_eq!(batches[1].y, Some(array![0, 1]));
        assert_eq!(batches[2].len(), 1);
        assert_eq!(batches[2].x, array![[4., 4.]]);
    }

    #[test]
    fn unlabeled_batches_have_no_labels() {
        let ds = Dataset::unlabeled(array![[1., 0.], [0., 1.]]).unwrap();
        assert!(!ds.is_labeled());
        assert!(ds.batches(batch_size(1)).all(|b| b.y.is_none()));
    }

    #[test]
    fn shuffle_keeps_features_and_labels_together() {
        let mut ds = dataset();
        ds.shuffle(&mut StdRng::seed_from_u64(1));

        let mut seen = Vec::new();
        for batch in ds.batches(batch_size(2)) {
            let y = batch.y.unwrap();
            for (row, &label) in batch.x.rows().into_iter().zip(y.iter()) {
                assert_eq!(label, row[0] as usize % 2);
                seen.push(row[0] as usize);
            }
        }

        seen.sort();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert_eq!(ds.features()[[3, 0]], 3.);
    }
}
