// ============================================================
// Layer 4 — Classification Batcher
// ============================================================
// Implements Burn's Batcher trait to stack EncodedExamples into
// device tensors.
//
//   Input:  Vec of N EncodedExamples, each with sequences of length S
//   Output: ClassificationBatch with tensors of shape [N, S] and [N]
//
// All examples of a split were padded to the same length by the
// encoder, so stacking is a flatten followed by a reshape.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::EncodedExample;

// ─── ClassificationBatch ─────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct ClassificationBatch<B: Backend> {
    /// Token ID sequences — shape: [batch_size, seq_len]
    pub input_ids: Tensor<B, 2, Int>,

    /// 1 = real token, 0 = padding — shape: [batch_size, seq_len]
    pub attention_mask: Tensor<B, 2, Int>,

    /// Integer class per example — shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

// ─── ClassificationBatcher ───────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct ClassificationBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ClassificationBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<EncodedExample, ClassificationBatch<B>> for ClassificationBatcher<B> {
    fn batch(&self, items: Vec<EncodedExample>) -> ClassificationBatch<B> {
        let batch_size = items.len();
        let seq_len    = items.first().map(|e| e.input_ids.len()).unwrap_or(0);

        // Burn Int tensors are built from i32
        let input_flat: Vec<i32> = items
            .iter()
            .flat_map(|e| e.input_ids.iter().map(|&x| x as i32))
            .collect();

        let mask_flat: Vec<i32> = items
            .iter()
            .flat_map(|e| e.attention_mask.iter().map(|&x| x as i32))
            .collect();

        let labels: Vec<i32> = items.iter().map(|e| e.label as i32).collect();

        let input_ids = Tensor::<B, 1, Int>::from_ints(
            input_flat.as_slice(), &self.device
        ).reshape([batch_size, seq_len]);

        let attention_mask = Tensor::<B, 1, Int>::from_ints(
            mask_flat.as_slice(), &self.device
        ).reshape([batch_size, seq_len]);

        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        ClassificationBatch { input_ids, attention_mask, labels }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shapes_and_values() {
        let device  = Default::default();
        let batcher = ClassificationBatcher::<NdArray>::new(device);

        let items = vec![
            EncodedExample { input_ids: vec![7, 8, 9], attention_mask: vec![1, 1, 1], label: 5 },
            EncodedExample { input_ids: vec![4, 0, 0], attention_mask: vec![1, 0, 0], label: 1 },
        ];

        let batch = batcher.batch(items);

        assert_eq!(batch.input_ids.dims(), [2, 3]);
        assert_eq!(batch.attention_mask.dims(), [2, 3]);
        assert_eq!(batch.labels.dims(), [2]);

        let labels: Vec<i64> = batch.labels.into_data().convert::<i64>().to_vec().unwrap();
        assert_eq!(labels, vec![5, 1]);

        let mask_sum: i64 = batch.attention_mask.sum().into_scalar().elem::<i64>();
        assert_eq!(mask_sum, 4);
    }
}
