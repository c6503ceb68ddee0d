//! Baseline derivation from a reference dataset (CSV with a header row).
//!
//! For each requested column the numeric cells are collected and reduced to
//! mean, median and sample standard deviation. Blank or non-numeric cells are
//! skipped individually; the row itself still counts for the other columns.

use statrs::statistics::{Data, Median, Statistics};
use std::path::Path;
use tracing::{info, warn};

use super::{BaselineError, BaselineStats, DefaultMode, FeatureStats};
use crate::types::{is_recognized, Subsystem};

/// Split a CSV line respecting quoted fields (handles commas inside quotes).
fn csv_split(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

/// Reduce a column to its reference statistics.
fn column_stats(name: &str, values: Vec<f64>) -> Result<FeatureStats, BaselineError> {
    if values.is_empty() {
        return Err(BaselineError::Reference(format!(
            "column '{name}' has no numeric values"
        )));
    }
    let mean = values.iter().mean();
    // Sample std is NaN for a single value; treat as no spread.
    let std = if values.len() > 1 { values.iter().std_dev() } else { 0.0 };
    let median = Data::new(values).median();
    Ok(FeatureStats::new(name, mean, Some(median), std))
}

/// Derive a baseline table for `subsystem` from the CSV at `path`.
///
/// `features` fixes both the selected columns and their order in the table.
pub fn derive_from_csv(
    path: &Path,
    subsystem: Subsystem,
    features: &[String],
    mode: DefaultMode,
) -> Result<BaselineStats, BaselineError> {
    if let Some(unknown) = features.iter().find(|f| !is_recognized(f)) {
        return Err(BaselineError::UnknownFeature(unknown.clone()));
    }

    let contents =
        std::fs::read_to_string(path).map_err(|e| BaselineError::Io(path.to_path_buf(), e))?;
    let mut lines = contents.lines().filter(|l| !l.trim().is_empty());

    let header: Vec<String> = lines
        .next()
        .map(csv_split)
        .ok_or_else(|| BaselineError::Reference(format!("{} is empty", path.display())))?
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut columns: Vec<(usize, Vec<f64>)> = Vec::with_capacity(features.len());
    for feature in features {
        let idx = header.iter().position(|h| h == feature).ok_or_else(|| {
            BaselineError::Reference(format!("column '{feature}' not found in {}", path.display()))
        })?;
        columns.push((idx, Vec::new()));
    }

    let mut rows = 0usize;
    let mut skipped_cells = 0usize;
    for line in lines {
        rows += 1;
        let cells = csv_split(line);
        for (idx, values) in &mut columns {
            match cells.get(*idx).and_then(|c| c.trim().parse::<f64>().ok()) {
                Some(v) if v.is_finite() => values.push(v),
                _ => skipped_cells += 1,
            }
        }
    }

    if skipped_cells > 0 {
        warn!(skipped_cells, "Skipped blank or non-numeric cells in reference dataset");
    }

    let stats = features
        .iter()
        .zip(columns)
        .map(|(name, (_, values))| column_stats(name, values))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        path = %path.display(),
        %subsystem,
        rows,
        features = stats.len(),
        "Derived baseline from reference dataset"
    );
    BaselineStats::new(subsystem, mode, stats)
}
