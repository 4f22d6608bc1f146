use phf::{Map, phf_map};
use thiserror::Error;

/// Families of detector branches.
///
/// The family determines how many values a branch carries per event and how
/// a value is assigned to a node slot during assembly: per-muon branches
/// have one entry per reconstructed muon, per-pair branches one entry per
/// muon pair (shared by both muons), per-jet branches one entry per jet, and
/// event scalars a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldFamily {
    Muon,
    MuonPair,
    Jet,
    EventScalar,
}

/// The branch used to probe an event's muon multiplicity.
pub const MUON_MULTIPLICITY_BRANCH: &str = "muons.pt";

/// The branch carrying the muon pair's angular separation, used as the edge
/// weight for every edge of the event.
pub const PAIR_SEPARATION_BRANCH: &str = "muPairs.dR";

/// The event scalar giving the number of reconstructed jets.
pub const JET_MULTIPLICITY_BRANCH: &str = "nJets";

/// Default muon node feature selection.
pub const DEFAULT_MUON_FIELDS: [&str; 7] = [
    "muons.pt",
    "muons.charge",
    "muons.eta",
    "muons.phi",
    "muPairs.mass",
    "muPairs.pt",
    "muPairs.eta",
];

/// Default jet node feature selection.
pub const DEFAULT_JET_FIELDS: [&str; 5] = [
    "jets.pt",
    "jets.mass",
    "jets.charge",
    "jets.eta",
    "jets.phi",
];

static KNOWN_BRANCHES: Map<&'static str, FieldFamily> = phf_map! {
    "muons.pt" => FieldFamily::Muon,
    "muons.eta" => FieldFamily::Muon,
    "muons.phi" => FieldFamily::Muon,
    "muons.charge" => FieldFamily::Muon,
    "muons.mass" => FieldFamily::Muon,
    "muons.relIso" => FieldFamily::Muon,
    "muPairs.mass" => FieldFamily::MuonPair,
    "muPairs.pt" => FieldFamily::MuonPair,
    "muPairs.eta" => FieldFamily::MuonPair,
    "muPairs.phi" => FieldFamily::MuonPair,
    "muPairs.dR" => FieldFamily::MuonPair,
    "muPairs.dEta" => FieldFamily::MuonPair,
    "muPairs.dPhi" => FieldFamily::MuonPair,
    "jets.pt" => FieldFamily::Jet,
    "jets.eta" => FieldFamily::Jet,
    "jets.phi" => FieldFamily::Jet,
    "jets.mass" => FieldFamily::Jet,
    "jets.charge" => FieldFamily::Jet,
    "nJets" => FieldFamily::EventScalar,
    "nMuons" => FieldFamily::EventScalar,
    "nVertices" => FieldFamily::EventScalar,
};

/// Error returned when a configured field key cannot be assigned to a branch
/// family.
#[derive(Debug, Error, PartialEq)]
#[error("field key '{key}' does not belong to any known branch family")]
pub struct UnknownFieldError {
    pub key: String,
}

/// Resolves a dotted field key to its branch family.
///
/// Cataloged branches resolve directly; uncataloged keys resolve by their
/// object prefix (`muons.`, `muPairs.`, `jets.`) so analyses can select
/// branches the catalog does not list. Keys with no recognizable family are
/// rejected, which surfaces selection typos at configuration time instead of
/// as missing fields during assembly.
pub fn resolve_family(key: &str) -> Result<FieldFamily, UnknownFieldError> {
    let key = key.trim();
    if let Some(&family) = KNOWN_BRANCHES.get(key) {
        return Ok(family);
    }
    if let Some(prefix) = key.split('.').next()
        && key.contains('.')
    {
        match prefix {
            "muons" => return Ok(FieldFamily::Muon),
            "muPairs" => return Ok(FieldFamily::MuonPair),
            "jets" => return Ok(FieldFamily::Jet),
            _ => {}
        }
    }
    Err(UnknownFieldError {
        key: key.to_string(),
    })
}

/// The default muon feature keys as owned strings.
pub fn default_muon_fields() -> Vec<String> {
    DEFAULT_MUON_FIELDS.iter().map(|k| k.to_string()).collect()
}

/// The default jet feature keys as owned strings.
pub fn default_jet_fields() -> Vec<String> {
    DEFAULT_JET_FIELDS.iter().map(|k| k.to_string()).collect()
}
