//! Column-wise preprocessing pipeline exported from the training notebook.
//!
//! Numeric steps optionally apply `log1p` and then standard scaling.
//! Categorical steps one-hot encode against the fitted category list; an
//! unseen category encodes as all zeros. Input columns not referenced by a
//! step are dropped. Output order: numeric steps, then categorical steps.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use super::{read_json, Preprocessor};
use crate::error::{AppError, Result};
use crate::types::{CanonicalRecord, Cell, FeatureVector};

#[derive(Debug, Clone, Deserialize)]
pub struct NumericStep {
    pub column: String,
    #[serde(default)]
    pub log1p: bool,
    #[serde(default)]
    pub center: f64,
    #[serde(default = "unit_scale")]
    pub scale: f64,
}

fn unit_scale() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoricalStep {
    pub column: String,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FittedPipeline {
    /// Columns the pipeline was fitted on, in order.
    pub input_columns: Vec<String>,
    #[serde(default)]
    pub numeric: Vec<NumericStep>,
    #[serde(default)]
    pub categorical: Vec<CategoricalStep>,
}

impl FittedPipeline {
    pub fn load(path: &Path) -> Result<Self> {
        let pipeline: Self = read_json(path)?;
        pipeline.check().map_err(|reason| AppError::ArtifactLoad {
            path: path.display().to_string(),
            reason,
        })?;
        Ok(pipeline)
    }

    #[cfg(test)]
    pub fn from_json_str(data: &str) -> Result<Self> {
        let pipeline: Self = serde_json::from_str(data)?;
        pipeline.check().map_err(|reason| AppError::ArtifactLoad {
            path: "<inline>".to_string(),
            reason,
        })?;
        Ok(pipeline)
    }

    /// Internal consistency of the exported artifact.
    fn check(&self) -> std::result::Result<(), String> {
        if self.input_columns.is_empty() {
            return Err("input_columns is empty".to_string());
        }
        let mut seen = HashSet::new();
        for col in &self.input_columns {
            if !seen.insert(col.as_str()) {
                return Err(format!("duplicate input column '{col}'"));
            }
        }
        for step in &self.numeric {
            if !seen.contains(step.column.as_str()) {
                return Err(format!("numeric step references unknown column '{}'", step.column));
            }
            if !step.center.is_finite() || !step.scale.is_finite() || step.scale == 0.0 {
                return Err(format!("numeric step '{}' has an invalid scale", step.column));
            }
        }
        for step in &self.categorical {
            if !seen.contains(step.column.as_str()) {
                return Err(format!(
                    "categorical step references unknown column '{}'",
                    step.column
                ));
            }
            if step.categories.is_empty() {
                return Err(format!("categorical step '{}' has no categories", step.column));
            }
        }
        Ok(())
    }

    /// Output feature names, `column` for numeric and `column_category` for one-hot.
    pub fn feature_names(&self) -> Vec<String> {
        let numeric = self.numeric.iter().map(|s| s.column.clone());
        let onehot = self
            .categorical
            .iter()
            .flat_map(|s| s.categories.iter().map(move |c| format!("{}_{c}", s.column)));
        numeric.chain(onehot).collect()
    }
}

fn lookup<'a>(cols: &[(&'static str, Cell<'a>)], column: &str) -> Result<Cell<'a>> {
    cols.iter()
        .find(|(n, _)| *n == column)
        .map(|(_, c)| *c)
        .ok_or_else(|| AppError::Transform(format!("missing column '{column}'")))
}

impl Preprocessor for FittedPipeline {
    fn transform(&self, record: &CanonicalRecord) -> Result<FeatureVector> {
        let cols = record.columns();
        if cols.len() != self.input_columns.len() {
            return Err(AppError::Transform(format!(
                "record has {} columns, pipeline was fitted on {}",
                cols.len(),
                self.input_columns.len()
            )));
        }
        for (i, ((name, _), fitted)) in cols.iter().zip(&self.input_columns).enumerate() {
            if *name != fitted.as_str() {
                return Err(AppError::Transform(format!(
                    "column mismatch at position {i}: expected '{fitted}', got '{name}'"
                )));
            }
        }

        let mut out = Vec::with_capacity(self.num_features());
        for step in &self.numeric {
            let raw = match lookup(&cols, &step.column)? {
                Cell::Number(v) if v.is_finite() => v,
                Cell::Number(v) => {
                    return Err(AppError::Transform(format!(
                        "{}: non-finite value {v}",
                        step.column
                    )))
                }
                Cell::Text(t) => t.trim().parse::<f64>().map_err(|_| {
                    AppError::Transform(format!("{}: could not convert '{t}' to float", step.column))
                })?,
            };
            let v = if step.log1p {
                if raw <= -1.0 {
                    return Err(AppError::Transform(format!(
                        "{}: log1p undefined for {raw}",
                        step.column
                    )));
                }
                raw.ln_1p()
            } else {
                raw
            };
            out.push((v - step.center) / step.scale);
        }

        for step in &self.categorical {
            let value = match lookup(&cols, &step.column)? {
                Cell::Text(t) => t.to_string(),
                Cell::Number(n) => n.to_string(),
            };
            out.extend(
                step.categories
                    .iter()
                    .map(|c| if *c == value { 1.0 } else { 0.0 }),
            );
        }

        Ok(FeatureVector(out))
    }

    fn num_features(&self) -> usize {
        self.numeric.len() + self.categorical.iter().map(|s| s.categories.len()).sum::<usize>()
    }
}
