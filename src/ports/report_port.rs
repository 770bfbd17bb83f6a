//! Report generation port trait.

use crate::domain::error::FortunaError;
use crate::domain::metrics::ComparisonRow;
use std::path::Path;

/// Port for writing the predicted-vs-actual comparison artifact.
pub trait ReportPort {
    fn write_comparison(&self, path: &Path, rows: &[ComparisonRow]) -> Result<(), FortunaError>;
}
