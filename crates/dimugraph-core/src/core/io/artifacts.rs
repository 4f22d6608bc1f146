use crate::core::metrics::roc::RocCurve;
use crate::core::models::ids::NodeKind;
use crate::core::models::label::ClassLabel;
use crate::core::models::split::Split;
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Run metadata file, `{"num_classes", "m_num_features", "j_num_features", ...}`.
pub const METADATA_FILE: &str = "json_data.json";
/// Persisted area under the test-split ROC curve, `{"auroc": ...}`.
pub const ROC_AREA_FILE: &str = "roc_area.json";
/// Persisted ROC points, `Threshold,Fpr,Tpr`.
pub const ROC_CURVE_FILE: &str = "roc_curve.csv";
/// Per-node scores with split assignments, `NodeType,Id,SigBg,Score,Split`.
pub const PREDICTIONS_FILE: &str = "predictions.csv";
/// Training history, `Epoch,Loss,ValAccuracy`.
pub const HISTORY_FILE: &str = "history.csv";
/// Serialized classifier parameters.
pub const MODEL_FILE: &str = "model.json";
/// Subdirectory holding the six dataset tables and normalization statistics.
pub const DATASET_DIR: &str = "csvs";

/// Errors from persisting or loading run artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("JSON error for '{path}': {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("CSV error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
}

/// Shape of the trained run, persisted as [`METADATA_FILE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub num_classes: usize,
    pub m_num_features: usize,
    pub j_num_features: usize,
    pub normalized: bool,
    pub jets: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct RocArea {
    auroc: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RocPoint {
    threshold: f64,
    fpr: f64,
    tpr: f64,
}

/// One node's classifier output, as written to [`PREDICTIONS_FILE`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PredictionRow {
    pub node_type: NodeKind,
    pub id: u32,
    pub sig_bg: ClassLabel,
    pub score: f64,
    pub split: Split,
}

/// One epoch of training, as written to [`HISTORY_FILE`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EpochRecord {
    pub epoch: usize,
    pub loss: f64,
    pub val_accuracy: Option<f64>,
}

/// One training run's output directory.
///
/// A run directory holds the dataset the run trained on (under
/// [`DATASET_DIR`]) next to every artifact the run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunDirectory {
    root: PathBuf,
}

impl RunDirectory {
    /// Creates a run directory under `parent`, timestamping the name when
    /// none is given.
    pub fn create(parent: &Path, name: Option<&str>) -> Result<Self, ArtifactError> {
        let dir_name = match name {
            Some(name) => name.to_string(),
            None => format!("run_{}", Local::now().format("%m_%d_%y__%H_%M_%S")),
        };
        let root = parent.join(dir_name);
        std::fs::create_dir_all(&root).map_err(|e| ArtifactError::Io {
            path: root.to_string_lossy().to_string(),
            source: e,
        })?;
        Ok(Self { root })
    }

    /// Wraps an existing run directory without touching the filesystem.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// A short display name for the run: the directory's file name.
    pub fn name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.root.to_string_lossy().to_string())
    }

    /// Where this run's dataset tables and normalization statistics live.
    pub fn dataset_dir(&self) -> PathBuf {
        self.root.join(DATASET_DIR)
    }

    pub fn save_metadata(&self, metadata: &RunMetadata) -> Result<(), ArtifactError> {
        self.write_json(METADATA_FILE, metadata)
    }

    pub fn load_metadata(&self) -> Result<RunMetadata, ArtifactError> {
        self.read_json(METADATA_FILE)
    }

    /// Persists the ROC curve and its area as two artifacts.
    pub fn save_roc(&self, curve: &RocCurve, auroc: f64) -> Result<(), ArtifactError> {
        self.write_json(ROC_AREA_FILE, &RocArea { auroc })?;

        let path = self.root.join(ROC_CURVE_FILE);
        let mut writer = csv::Writer::from_path(&path).map_err(|e| ArtifactError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        for i in 0..curve.len() {
            writer
                .serialize(RocPoint {
                    threshold: curve.thresholds[i],
                    fpr: curve.fpr[i],
                    tpr: curve.tpr[i],
                })
                .map_err(|e| ArtifactError::Csv {
                    path: path.to_string_lossy().to_string(),
                    source: e,
                })?;
        }
        writer.flush().map_err(|e| ArtifactError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    pub fn load_roc_area(&self) -> Result<f64, ArtifactError> {
        let area: RocArea = self.read_json(ROC_AREA_FILE)?;
        Ok(area.auroc)
    }

    pub fn save_predictions(&self, rows: &[PredictionRow]) -> Result<(), ArtifactError> {
        self.write_csv(PREDICTIONS_FILE, rows)
    }

    pub fn save_history(&self, epochs: &[EpochRecord]) -> Result<(), ArtifactError> {
        self.write_csv(HISTORY_FILE, epochs)
    }

    /// Serializes classifier parameters as JSON.
    pub fn save_model<M: Serialize>(&self, model: &M) -> Result<(), ArtifactError> {
        self.write_json(MODEL_FILE, model)
    }

    pub fn load_model<M: DeserializeOwned>(&self) -> Result<M, ArtifactError> {
        self.read_json(MODEL_FILE)
    }

    fn write_json<T: Serialize>(&self, file: &str, value: &T) -> Result<(), ArtifactError> {
        let path = self.root.join(file);
        let handle = File::create(&path).map_err(|e| ArtifactError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(handle), value).map_err(|e| {
            ArtifactError::Json {
                path: path.to_string_lossy().to_string(),
                source: e,
            }
        })
    }

    fn read_json<T: DeserializeOwned>(&self, file: &str) -> Result<T, ArtifactError> {
        let path = self.root.join(file);
        let handle = File::open(&path).map_err(|e| ArtifactError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        serde_json::from_reader(BufReader::new(handle)).map_err(|e| ArtifactError::Json {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    fn write_csv<T: Serialize>(&self, file: &str, rows: &[T]) -> Result<(), ArtifactError> {
        let path = self.root.join(file);
        let csv_err = |e: csv::Error| ArtifactError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        };
        let mut writer = csv::Writer::from_path(&path).map_err(csv_err)?;
        for row in rows {
            writer.serialize(row).map_err(csv_err)?;
        }
        writer.flush().map_err(|e| ArtifactError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }
}
