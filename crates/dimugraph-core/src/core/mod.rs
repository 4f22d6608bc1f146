//! # Core Module
//!
//! This module provides the fundamental building blocks and algorithms for
//! graph-based dimuon event classification in DimuGraph, serving as the
//! computational core of the library.
//!
//! ## Overview
//!
//! The core module implements the essential data structures, algorithms, and
//! utilities required for turning flat per-event collision records into a
//! heterogeneous graph and classifying its nodes. It provides a complete
//! framework for representing typed node and edge tables, persisting them as
//! datasets, and scoring nodes with a graph neural network.
//!
//! ## Architecture
//!
//! The module is organized into specialized submodules that handle different
//! aspects of the pipeline:
//!
//! - **Graph Representation** ([`models`]) - Data structures for labels, node ids, feature tables, and the event graph
//! - **Branch Catalog** ([`fields`]) - Known event-record branches and the default feature selections
//! - **File I/O** ([`io`]) - Reading event sources and persisting datasets, statistics, and run artifacts
//! - **Evaluation** ([`metrics`]) - ROC curves, area under the curve, and accuracy
//! - **Neural Network** ([`net`]) - Relation propagation, optimization, and the node classifier
//!
//! ## Key Capabilities
//!
//! - **Heterogeneous graph representation** with dense zero-based per-type ids
//! - **Typed directed relations** weighted by the parent event's muon-pair separation
//! - **Dataset persistence** as plain member and interaction tables
//! - **Feature normalization statistics** computed once and reusable at inference
//! - **Threshold-free discrimination metrics** for binary signal/background scoring
//! - **Pluggable classification** behind a small trait so other models can drive the same pipeline

pub mod fields;
pub mod io;
pub mod metrics;
pub mod models;
pub mod net;
