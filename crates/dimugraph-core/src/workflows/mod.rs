//! # Workflows Module
//!
//! This module provides high-level workflow implementations that orchestrate complete
//! classification pipelines for dimuon collision events in DimuGraph.
//!
//! ## Overview
//!
//! Workflows are the top-level entry points for users of DimuGraph. They encapsulate
//! whole pipelines, from raw event files through persisted run artifacts. Each
//! workflow handles dataset assembly, progress reporting, and artifact persistence,
//! providing a clean and simple API on top of the individual engine tasks.
//!
//! ## Architecture
//!
//! The module is organized around the pipeline's entry points:
//!
//! - **Build Workflow** ([`build`]) - Dataset assembly and normalization, persisted
//!   as member and interaction tables without training a model.
//! - **Train Workflow** ([`train`]) - The complete pipeline including partitioning,
//!   classifier training, evaluation, and run-directory persistence.
//! - **Compare Workflow** ([`compare`]) - Ranking of finished runs by their
//!   persisted ROC area.
//!
//! ## Key Capabilities
//!
//! - **End-to-end classification** from event files to a scored, persisted model
//! - **Self-describing run directories** holding the dataset next to every artifact
//! - **Progress monitoring** with detailed phase and task reporting
//! - **Deterministic runs** through explicit split and initialization seeds
//! - **Error handling** with comprehensive diagnostic information

pub mod build;
pub mod compare;
pub mod train;
