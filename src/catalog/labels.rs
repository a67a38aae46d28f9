//! Occurrence counts of list-valued catalog fields.

use std::collections::HashMap;

use serde_json::Value;

use super::entry::dataset_list;
use super::CatalogError;
use crate::coerce::coerce_labels;

/// Count every label found under `key` across all datasets.
///
/// Pairs are sorted by count, highest first; equal counts keep the order in
/// which the label was first seen. Datasets without `key` are skipped and a
/// scalar value counts as one label.
pub fn count_nested_labels(
    raw_catalog: &Value,
    key: &str,
) -> Result<Vec<(String, usize)>, CatalogError> {
    let datasets = dataset_list(raw_catalog)?;

    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for dataset in datasets {
        for label in coerce_labels(dataset.get(key)) {
            match positions.get(&label) {
                Some(&pos) => counts[pos].1 += 1,
                None => {
                    positions.insert(label.clone(), counts.len());
                    counts.push((label, 1));
                }
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(counts)
}
