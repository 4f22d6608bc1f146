use super::label::ClassLabel;
use std::collections::BTreeMap;

/// One row of raw detector output: a class label plus named numeric fields
/// (momentum, charge, angle, mass, dR separation) stored as per-object
/// arrays.
///
/// Field keys are dotted branch names (`"muons.pt"`, `"muPairs.mass"`,
/// `"jets.eta"`); the array length of a field depends on its family — two
/// entries for per-muon branches of a dimuon event, one for per-pair
/// branches, one per jet for jet branches, and one for per-event scalars
/// such as `"nJets"`.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    label: ClassLabel,
    fields: BTreeMap<String, Vec<f64>>,
}

impl EventRecord {
    /// Creates a record from a label and its raw field arrays.
    pub fn new(label: ClassLabel, fields: BTreeMap<String, Vec<f64>>) -> Self {
        Self { label, fields }
    }

    /// The signal/background class inherited by every node built from this
    /// event.
    pub fn label(&self) -> ClassLabel {
        self.label
    }

    /// Returns a field's value array, or `None` when the branch is absent.
    pub fn field(&self, key: &str) -> Option<&[f64]> {
        self.fields.get(key).map(Vec::as_slice)
    }

    /// Number of values recorded for a field; zero when the branch is absent.
    pub fn field_len(&self, key: &str) -> usize {
        self.fields.get(key).map_or(0, Vec::len)
    }

    /// Returns the value at `slot` of a field.
    pub fn value_at(&self, key: &str, slot: usize) -> Option<f64> {
        self.field(key).and_then(|values| values.get(slot)).copied()
    }

    /// Returns the value at `slot`, falling back to the field's first entry
    /// when the array is shorter.
    ///
    /// This is how per-pair branches (one entry per event) are shared across
    /// both muon slots of a dimuon event. `None` only when the field is
    /// absent or entirely empty.
    pub fn value_at_or_first(&self, key: &str, slot: usize) -> Option<f64> {
        let values = self.field(key)?;
        values.get(slot).or_else(|| values.first()).copied()
    }
}
