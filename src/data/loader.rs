// ============================================================
// Layer 4 — CSV Example Loader
// ============================================================
// Loads the labelled bug-report dataset from a CSV file.
//
// Expected layout (column order does not matter, extra columns
// such as a pandas index are ignored):
//
//   element,label
//   "Steps: open the app, click save",reproduce
//   "Crash on save",describe
//   ...
//
// Every label must be one of the six section categories. A
// single unknown label aborts the load with the offending row
// number, so a corrupt dataset can never be trained on.
//
// Reference: csv crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use std::{fs::File, io::Read, path::PathBuf};

use crate::domain::example::LabeledExample;
use crate::domain::label::SectionLabel;
use crate::domain::traits::ExampleSource;

/// Header of the text column
pub const TEXT_COLUMN: &str = "element";
/// Header of the label column
pub const LABEL_COLUMN: &str = "label";

/// Reads `element,label` rows from a CSV file.
/// Implements the ExampleSource trait from Layer 3.
pub struct CsvExampleLoader {
    path: PathBuf,
}

impl CsvExampleLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ExampleSource for CsvExampleLoader {
    fn load_all(&self) -> Result<Vec<LabeledExample>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Cannot open dataset '{}'", self.path.display()))?;

        let examples = read_examples(file)
            .with_context(|| format!("Invalid dataset '{}'", self.path.display()))?;

        tracing::info!(
            "Loaded {} labelled examples from '{}'",
            examples.len(),
            self.path.display()
        );
        Ok(examples)
    }
}

/// Parse labelled examples from any CSV byte stream.
pub fn read_examples<R: Read>(input: R) -> Result<Vec<LabeledExample>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(input);

    let headers = reader.headers().context("Cannot read CSV header")?.clone();
    let text_col  = column_index(&headers, TEXT_COLUMN)?;
    let label_col = column_index(&headers, LABEL_COLUMN)?;

    let mut examples = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Malformed CSV row {row}"))?;

        // Records shorter than the header are rejected by the csv
        // reader, so both columns are present from here on
        let text      = record.get(text_col).unwrap_or_default();
        let raw_label = record.get(label_col).unwrap_or_default();

        let label: SectionLabel = raw_label
            .parse()
            .with_context(|| format!("Row {row} has an invalid label"))?;

        examples.push(LabeledExample::new(row, text, label));
    }

    Ok(examples)
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    match headers.iter().position(|h| h == name) {
        Some(i) => Ok(i),
        None => bail!(
            "Missing required column '{}' (found: {})",
            name,
            headers.iter().collect::<Vec<_>>().join(", ")
        ),
    }
}
