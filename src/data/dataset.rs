use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One tokenised, padded example with its integer class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedExample {
    pub input_ids:      Vec<u32>,
    pub attention_mask: Vec<u32>,
    pub label:          usize,
}

pub struct ClassificationDataset {
    examples: Vec<EncodedExample>,
}

impl ClassificationDataset {
    pub fn new(examples: Vec<EncodedExample>) -> Self { Self { examples } }
}

impl Dataset<EncodedExample> for ClassificationDataset {
    fn get(&self, index: usize) -> Option<EncodedExample> {
        self.examples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.examples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_len() {
        let ex = EncodedExample { input_ids: vec![5, 6, 0], attention_mask: vec![1, 1, 0], label: 2 };
        let ds = ClassificationDataset::new(vec![ex.clone()]);

        assert_eq!(ds.len(), 1);
        assert_eq!(ds.get(0), Some(ex));
        assert_eq!(ds.get(1), None);
    }
}
