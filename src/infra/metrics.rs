// ============================================================
// Layer 6 - Metrics Logger
// ============================================================
// Appends one row per evaluation run to a CSV file so runs
// against successive federated rounds can be compared later.
//
// Output file: <metrics_dir>/eval_metrics.csv
//
//   checkpoint,split,samples,correct,accuracy,mean_loss
//   trained_model.pt,test,10000,9812,0.981200,0.061734

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

use crate::domain::split::Split;
use crate::ml::evaluator::EvalReport;

const HEADER: &str = "checkpoint,split,samples,correct,accuracy,mean_loss";

pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the directory and the CSV header if they don't exist yet.
    /// An existing file is appended to.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create metrics directory '{}'", dir.display()))?;

        let csv_path = dir.join("eval_metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "{HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, checkpoint: &str, split: Split, report: &EvalReport) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        // Commas in the path would break the column layout
        let checkpoint = checkpoint.replace(',', "_");
        writeln!(
            f,
            "{},{},{},{},{:.6},{:.6}",
            checkpoint,
            split,
            report.samples,
            report.correct,
            report.accuracy(),
            report.mean_loss,
        )?;

        tracing::debug!(
            "Logged metrics for '{}': accuracy={:.4}",
            checkpoint,
            report.accuracy()
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn report() -> EvalReport {
        EvalReport { samples: 4, correct: 3, mean_loss: 0.5 }
    }

    #[test]
    fn test_header_written_once_and_rows_appended() {
        let tmp = TempDir::new().unwrap();

        let logger = MetricsLogger::new(tmp.path().join("metrics")).unwrap();
        logger.log("trained_model.pt", Split::Test, &report()).unwrap();

        // A second logger on the same directory keeps the existing rows
        let again = MetricsLogger::new(tmp.path().join("metrics")).unwrap();
        again.log("round_2.pt", Split::Train, &report()).unwrap();

        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines[1], "trained_model.pt,test,4,3,0.750000,0.500000");
        assert!(lines[2].starts_with("round_2.pt,train,"));
    }

    #[test]
    fn test_commas_in_checkpoint_name_are_replaced() {
        let tmp    = TempDir::new().unwrap();
        let logger = MetricsLogger::new(tmp.path()).unwrap();
        logger.log("a,b.pt", Split::Test, &report()).unwrap();

        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        assert!(csv.lines().nth(1).unwrap().starts_with("a_b.pt,test,"));
    }
}
