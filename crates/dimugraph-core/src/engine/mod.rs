//! # Engine Module
//!
//! This module implements the training engine for dimuon event classification
//! in DimuGraph, providing the computational framework for dataset assembly
//! and graph neural network optimization workflows.
//!
//! ## Overview
//!
//! The engine module orchestrates the complete pipeline from raw event files
//! to a scored classifier. It manages pipeline configuration, coordinates the
//! computational tasks, tracks training history, and reports progress to the
//! caller while each stage runs.
//!
//! ## Architecture
//!
//! The module is organized into specialized submodules that handle different
//! aspects of the pipeline:
//!
//! - **Configuration** ([`config`]) - Event sources, field selections, split fractions, and training hyperparameters
//! - **State Tracking** ([`state`]) - Per-epoch training history and summary statistics
//! - **Progress Monitoring** ([`progress`]) - Progress reporting and user feedback mechanisms
//! - **Error Handling** ([`error`]) - Engine-specific error types and error propagation
//! - **Tasks** ([`tasks`]) - Assembly, normalization, partitioning, training, and evaluation stages
//!
//! ## Key Capabilities
//!
//! - **Trait-based event input** so any flat per-event file format can feed the pipeline
//! - **Parallel computation** for per-column normalization statistics
//! - **Deterministic runs** through explicit seeds for splitting and initialization
//! - **Progress monitoring** with per-epoch loss and validation reporting
//! - **Comprehensive error handling** with detailed diagnostic information

pub mod config;
pub mod error;
pub mod progress;
pub mod state;
pub mod tasks;
