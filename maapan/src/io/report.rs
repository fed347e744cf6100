//! Tabular result report.
//!
//! One CSV row per evaluated map: the reconstruction columns followed by the
//! mesh columns, in a fixed order.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{EvalError, Stage};
use crate::evaluation::{MeshReport, ReconstructionReport};

/// Report header.
pub const HEADER: [&str; 12] = [
    "MeanGTError [m]",
    "StdGTError [m]",
    "GTRMSE [m]",
    "TotalPoints [1]",
    "UnknownPoints [1]",
    "TruncatedPoints [1]",
    "GTInliers [1]",
    "MeanMapError [m]",
    "StdMapError [m]",
    "MapRMSE[m]",
    "MapInliers[1]",
    "MapOutliers[1]",
];

/// Reconstruction fields of one row, in header order.
pub fn reconstruction_fields(report: &ReconstructionReport) -> [String; 7] {
    [
        report.stats.mean.to_string(),
        report.stats.stddev.to_string(),
        report.stats.rmse.to_string(),
        report.total_points.to_string(),
        report.unknown_points.to_string(),
        report.truncated_points.to_string(),
        report.inliers.to_string(),
    ]
}

/// Mesh fields of one row, in header order.
pub fn mesh_fields(report: &MeshReport) -> [String; 5] {
    [
        report.stats.mean.to_string(),
        report.stats.stddev.to_string(),
        report.stats.rmse.to_string(),
        report.inliers.to_string(),
        report.outliers.to_string(),
    ]
}

/// Appends result rows to a CSV sink, flushing after every row.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
    path: PathBuf,
}

impl ReportWriter<File> {
    /// Create (or truncate) a report file and write the header.
    pub fn create(path: &Path) -> Result<Self, EvalError> {
        let file = File::create(path).map_err(|source| EvalError::Io {
            stage: Stage::Report,
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_path(file, path.to_path_buf())
    }
}

impl<W: Write> ReportWriter<W> {
    /// Write the header to an arbitrary sink.
    pub fn from_writer(sink: W) -> Result<Self, EvalError> {
        Self::with_path(sink, PathBuf::from("<report>"))
    }

    fn with_path(sink: W, path: PathBuf) -> Result<Self, EvalError> {
        let mut report = Self {
            writer: csv::Writer::from_writer(sink),
            path,
        };
        report.write_record(HEADER.iter().copied())?;
        Ok(report)
    }

    /// Append one row.
    pub fn append(&mut self, reconstruction: &ReconstructionReport, mesh: &MeshReport) -> Result<(), EvalError> {
        let fields = reconstruction_fields(reconstruction);
        let mesh = mesh_fields(mesh);
        self.write_record(fields.iter().chain(mesh.iter()).map(String::as_str))
    }

    fn write_record<'a>(&mut self, record: impl Iterator<Item = &'a str>) -> Result<(), EvalError> {
        self.writer
            .write_record(record)
            .and_then(|()| self.writer.flush().map_err(csv::Error::from))
            .map_err(|e| EvalError::Io {
                stage: Stage::Report,
                path: self.path.clone(),
                source: e.into(),
            })
    }

    /// Flush and return the sink.
    pub fn into_inner(self) -> Result<W, EvalError> {
        let path = self.path;
        self.writer.into_inner().map_err(|e| EvalError::Io {
            stage: Stage::Report,
            path,
            source: std::io::Error::new(e.error().kind(), e.error().to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::ErrorStatistics;

    #[test]
    fn test_header_and_row() {
        let reconstruction = ReconstructionReport {
            stats: ErrorStatistics {
                count: 3,
                mean: 0.05,
                stddev: 0.0,
                rmse: 0.05,
                min: 0.05,
                max: 0.05,
            },
            total_points: 3,
            inliers: 3,
            complete: true,
            ..Default::default()
        };
        let mesh = MeshReport {
            stats: ErrorStatistics::from_samples(&[0.5, 0.5]),
            inliers: 0,
            outliers: 2,
            complete: true,
        };

        let mut report = ReportWriter::from_writer(Vec::new()).unwrap();
        report.append(&reconstruction, &mesh).unwrap();
        let text = String::from_utf8(report.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("MeanGTError [m],StdGTError [m],GTRMSE [m],TotalPoints [1]"));
        assert!(lines[0].ends_with("MapRMSE[m],MapInliers[1],MapOutliers[1]"));
        assert_eq!(lines[1], "0.05,0,0.05,3,0,0,3,0.5,0,0.5,0,2");
    }
}
