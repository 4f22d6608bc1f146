//! Provides input/output functionality for event sources and run artifacts.
//!
//! This module contains implementations for reading labeled collision event
//! files, persisting assembled graphs as member and interaction tables, and
//! reading and writing the statistics and evaluation artifacts a training run
//! produces. It provides a unified trait-based interface for event sources so
//! alternative file formats can feed the same assembly pipeline.

pub mod artifacts;
pub mod events;
pub mod stats;
pub mod tables;
pub mod traits;
