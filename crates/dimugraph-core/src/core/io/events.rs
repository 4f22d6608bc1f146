use super::traits::EventFile;
use crate::core::models::event::EventRecord;
use crate::core::models::label::ClassLabel;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::{self, BufRead};
use thiserror::Error;

/// Errors from reading an event stream.
#[derive(Debug, Error)]
pub enum EventReadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed event on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

// A branch value on the wire: event scalars are bare numbers, per-object
// branches are arrays.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawField {
    Scalar(f64),
    Array(Vec<f64>),
}

impl RawField {
    fn into_values(self) -> Vec<f64> {
        match self {
            RawField::Scalar(value) => vec![value],
            RawField::Array(values) => values,
        }
    }
}

/// JSON-lines event input: one JSON object per line, each key a dotted
/// branch name mapping to a number or an array of numbers.
///
/// This is the bundled stand-in for the detector-format reader; any source
/// that implements [`EventFile`] can feed the pipeline. Blank lines are
/// skipped; parse errors carry the 1-based line number.
pub struct JsonlEvents;

impl EventFile for JsonlEvents {
    type Error = EventReadError;

    fn read_from(
        reader: &mut impl BufRead,
        label: ClassLabel,
    ) -> Result<Vec<EventRecord>, Self::Error> {
        let mut events = Vec::new();
        for (idx, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let raw: BTreeMap<String, RawField> =
                serde_json::from_str(trimmed).map_err(|source| EventReadError::Json {
                    line: idx + 1,
                    source,
                })?;
            let fields = raw
                .into_iter()
                .map(|(key, value)| (key, value.into_values()))
                .collect();
            events.push(EventRecord::new(label, fields));
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TWO_EVENTS: &str = r#"{"muons.pt": [41.2, 38.7], "muPairs.dR": [0.7], "nJets": 0}

{"muons.pt": [25.0, 31.4], "muPairs.dR": [1.2], "nJets": 1, "jets.pt": [55.3]}
"#;

    #[test]
    fn events_parse_with_scalars_widened_to_arrays() {
        let mut reader = TWO_EVENTS.as_bytes();
        let events = JsonlEvents::read_from(&mut reader, ClassLabel::Signal).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].label(), ClassLabel::Signal);
        assert_eq!(events[0].field("muons.pt"), Some(&[41.2, 38.7][..]));
        assert_eq!(events[0].field("nJets"), Some(&[0.0][..]));
        assert_eq!(events[1].field("jets.pt"), Some(&[55.3][..]));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let mut reader = "\n\n{\"muons.pt\": [1.0, 2.0]}\n\n".as_bytes();
        let events = JsonlEvents::read_from(&mut reader, ClassLabel::Background).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].label(), ClassLabel::Background);
    }

    #[test]
    fn malformed_lines_report_their_line_number() {
        let mut reader = "{\"muons.pt\": [1.0]}\nnot json\n".as_bytes();
        let err = JsonlEvents::read_from(&mut reader, ClassLabel::Signal).unwrap_err();
        match err {
            EventReadError::Json { line, .. } => assert_eq!(line, 2),
            other => panic!("expected a Json error, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        let mut reader = "{\"muons.pt\": \"fast\"}\n".as_bytes();
        assert!(matches!(
            JsonlEvents::read_from(&mut reader, ClassLabel::Signal),
            Err(EventReadError::Json { line: 1, .. })
        ));
    }

    #[test]
    fn events_load_from_a_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signal.jsonl");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{TWO_EVENTS}").unwrap();

        let events = JsonlEvents::read_from_path(&path, ClassLabel::Signal).unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn missing_files_surface_as_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err =
            JsonlEvents::read_from_path(dir.path().join("absent.jsonl"), ClassLabel::Signal)
                .unwrap_err();
        assert!(matches!(err, EventReadError::Io(_)));
    }
}
