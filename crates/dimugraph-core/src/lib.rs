//! # DimuGraph Core Library
//!
//! A library for binary classification of dimuon collision events, turning flat
//! per-event records into a heterogeneous muon/jet graph and training a relational
//! graph convolutional network over it.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a clear separation of concerns,
//! making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models (`EventGraph`),
//!   pure mathematical building blocks of the classifier (`net`, `metrics`), and I/O utilities.
//!
//! - **[`engine`]: The Logic Core.** This stateful layer orchestrates the pipeline.
//!   It includes the configuration and progress types, per-epoch training state, and
//!   the implementation of the pipeline stages (e.g., `assemble`, `partition`, `train`).
//!
//! - **[`workflows`]: The Public API.** This is the highest-level, user-facing layer. It ties the
//!   `engine` and `core` together to execute complete procedures, such as training a
//!   classifier end to end. It provides a simple and powerful entry point for end-users of the library.

pub mod core;
pub mod engine;
pub mod workflows;
