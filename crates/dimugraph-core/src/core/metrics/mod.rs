//! Discrimination metrics for binary node classification.
//!
//! Signal is always the positive class. The ROC sweep and the rank-based
//! area estimate are independent implementations of the same quantity.

pub mod roc;
