use crate::core::models::ids::NodeKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use thiserror::Error;

/// File name of a node kind's persisted normalization statistics.
pub fn stats_file(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Muon => "normalization_data.json",
        NodeKind::Jet => "normalization_data_jets.json",
    }
}

/// Errors from persisting or loading normalization statistics.
#[derive(Debug, Error)]
pub enum StatsError {
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
}

/// Per-column mean and standard deviation of one feature column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    pub mean: f64,
    pub sdev: f64,
}

/// The normalization statistics of one node table, keyed by field key.
///
/// Persisted as a JSON object of `{"mean": m, "sdev": s}` entries so the
/// statistics a dataset was normalized with can be re-applied to later data.
/// Keys are kept sorted for a stable file layout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizationStats(BTreeMap<String, FieldStats>);

impl NormalizationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, mean: f64, sdev: f64) {
        self.0.insert(key.into(), FieldStats { mean, sdev });
    }

    pub fn get(&self, key: &str) -> Option<&FieldStats> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldStats)> {
        self.0.iter().map(|(key, stats)| (key.as_str(), stats))
    }

    /// Writes the statistics as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), StatsError> {
        let file = File::create(path).map_err(|e| StatsError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self).map_err(|e| StatsError::Json {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    /// Loads statistics written by [`NormalizationStats::save`].
    pub fn load(path: &Path) -> Result<Self, StatsError> {
        let file = File::open(path).map_err(|e| StatsError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| StatsError::Json {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn stats_round_trip_through_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(stats_file(NodeKind::Muon));

        let mut stats = NormalizationStats::new();
        stats.insert("muons.pt", 40.25, 12.5);
        stats.insert("muons.eta", -0.02, 1.4);
        stats.save(&path).unwrap();

        let loaded = NormalizationStats::load(&path).unwrap();
        assert_eq!(loaded, stats);
        assert_eq!(loaded.get("muons.pt").unwrap().mean, 40.25);
    }

    #[test]
    fn files_hold_one_object_per_field_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(stats_file(NodeKind::Jet));

        let mut stats = NormalizationStats::new();
        stats.insert("jets.pt", 55.0, 20.0);
        stats.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"jets.pt\""));
        assert!(text.contains("\"mean\""));
        assert!(text.contains("\"sdev\""));
    }

    #[test]
    fn missing_files_surface_as_io_errors() {
        let dir = tempdir().unwrap();
        let err = NormalizationStats::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, StatsError::Io { .. }));
    }

    #[test]
    fn malformed_json_surfaces_with_the_file_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{\"muons.pt\": [1, 2]}").unwrap();

        let err = NormalizationStats::load(&path).unwrap_err();
        match err {
            StatsError::Json { path: p, .. } => assert!(p.ends_with("broken.json")),
            other => panic!("expected a Json error, got {other:?}"),
        }
    }

    #[test]
    fn node_kinds_map_to_their_stats_files() {
        assert_eq!(stats_file(NodeKind::Muon), "normalization_data.json");
        assert_eq!(stats_file(NodeKind::Jet), "normalization_data_jets.json");
    }
}
