use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Represents the physics class assigned to an event and inherited by every
/// node instantiated from it.
///
/// The class index is fixed so that persisted datasets, classifier score
/// columns, and metrics always agree on the column order regardless of the
/// order in which classes appear in the input: background is class `0` and
/// signal is class `1` (the positive class).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClassLabel {
    /// A background event (class index 0).
    Background,
    /// A signal event (class index 1, the positive class).
    Signal,
}

impl ClassLabel {
    /// The number of event classes handled by the pipeline.
    pub const NUM_CLASSES: usize = 2;

    /// Returns the stable class index used for score columns and one-hot
    /// targets.
    pub fn index(self) -> usize {
        match self {
            ClassLabel::Background => 0,
            ClassLabel::Signal => 1,
        }
    }

    /// Converts a class index back into a label, if the index is in range.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(ClassLabel::Background),
            1 => Some(ClassLabel::Signal),
            _ => None,
        }
    }

    /// Returns the canonical string form used in the member tables' `SigBg`
    /// column.
    pub fn as_str(self) -> &'static str {
        match self {
            ClassLabel::Background => "Background",
            ClassLabel::Signal => "Signal",
        }
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassLabel {
    type Err = ();

    /// Parses the canonical `SigBg` column strings back into a label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Signal" => Ok(ClassLabel::Signal),
            "Background" => Ok(ClassLabel::Background),
            _ => Err(()),
        }
    }
}
