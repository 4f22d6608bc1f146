//! Static knowledge about detector branches.
//!
//! Field keys are dotted branch names whose prefix identifies the detector
//! object family. The catalog maps known branches to their families, resolves
//! uncataloged keys by prefix, and carries the default feature selections
//! used when an analysis does not pick its own.

pub mod catalog;
