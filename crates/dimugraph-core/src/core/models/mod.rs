//! # Core Models Module
//!
//! This module contains the fundamental data structures used to represent
//! collision events and the heterogeneous graph assembled from them,
//! providing the foundation for the rest of the pipeline.
//!
//! ## Overview
//!
//! The models module defines the core abstractions for the dataset: raw
//! event records, typed node identifiers, per-type node feature tables, and
//! typed weighted edge tables. These models are designed to:
//!
//! - **Represent one run's graph** - all typed node and edge tables of a
//!   single in-memory graph
//! - **Keep ids dense** - node ids are zero-based row indices per type, so an
//!   id is simultaneously a table row and a persisted integer
//! - **Maintain type safety** - muon and jet ids are distinct types, and each
//!   relation kind knows which tables its endpoints index into
//!
//! ## Key Components
//!
//! - [`event`] - Raw per-event records of named numeric field arrays
//! - [`label`] - The signal/background class with stable class indices
//! - [`ids`] - Dense typed node ids, node kinds, and relation kinds
//! - [`features`] - Per-type node tables (labels + feature matrix)
//! - [`graph`] - The assembled heterogeneous graph and its validation
//! - [`split`] - Train/validation/test assignments per node table
//! - [`builder`] - Incremental graph construction with fresh-id bookkeeping

pub mod builder;
pub mod event;
pub mod features;
pub mod graph;
pub mod ids;
pub mod label;
pub mod split;
