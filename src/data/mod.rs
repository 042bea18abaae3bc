// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from the raw CSV to tensor batches.
//
//   autoirt.csv
//       │
//       ▼
//   CsvExampleLoader     → reads `element,label` rows
//       │
//       ▼
//   split_dataset        → seeded train / validation / test split
//       │
//       ▼
//   encode_examples      → token ids + attention mask, padded
//       │
//       ▼
//   ClassificationDataset → implements Burn's Dataset trait
//       │
//       ▼
//   ClassificationBatcher → stacks examples into tensor batches
//       │
//       ▼
//   DataLoader            → feeds batches to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads the labelled CSV dataset
pub mod loader;

/// Seeded train/validation/test split
pub mod splitter;

/// Tokenisation with truncation and padding
pub mod encoder;

/// Implements Burn's Dataset trait for encoded examples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
