use crate::core::models::event::EventRecord;
use crate::core::models::label::ClassLabel;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Defines the interface to an external event source.
///
/// The pipeline does not read detector files itself; it consumes any source
/// that can produce per-event arrays of numeric fields. Implementors handle
/// format-specific parsing and stamp every produced record with the class
/// label of the source it came from (event files are homogeneous: one file
/// of signal events, one of background events).
pub trait EventFile {
    /// The error type for read operations.
    type Error: Error + From<io::Error>;

    /// Reads all events from a buffered reader, labeling each with `label`.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(
        reader: &mut impl BufRead,
        label: ClassLabel,
    ) -> Result<Vec<EventRecord>, Self::Error>;

    /// Reads all events from a file path, labeling each with `label`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(
        path: P,
        label: ClassLabel,
    ) -> Result<Vec<EventRecord>, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader, label)
    }
}
