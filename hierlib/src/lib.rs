//! # HierLib
//!
//! Hierlib is a library for simulating multi-level set-associative cache
//! hierarchies
//!
//! It models a fixed L1→L2→L3→memory chain with configurable geometry and a
//! pluggable LRU/FIFO replacement policy per level, and reports hit/miss
//! statistics together with a simulated and formula-based AMAT estimate
//!
//! The engine is purely in-memory and single-threaded; trace and
//! configuration acquisition live at the edges (the `io` module and the
//! `hiersim` binary) and never reach it as malformed values

/// Contains pure helpers for decomposing addresses into tag/index/offset
pub mod address;

/// Contains the implementation of a single set-associative cache level
pub mod cache;

/// Contains definitions for the JSON configuration format, plus the error and
/// diagnostic taxonomy raised while validating it
pub mod config;

/// Contains trace-file reading and address-literal parsing
pub mod io;

/// Contains the hierarchy used to simulate an address trace against a chain
/// of cache levels
pub mod simulator;


/// Contains utilities for running tests and benchmarks.
pub mod util;
