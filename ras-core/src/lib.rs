#![warn(missing_docs)]
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

/// Core domain models for the reverse auction engine.
///
/// Besides the data structures, this module holds the pure engine logic:
/// submission validation, the ranking engine, the visibility projector and
/// the lifecycle checks. None of it performs I/O, so every rule can be tested
/// without a store.
pub mod models;

/// Interface traits for the reverse auction engine.
///
/// This module contains the "ports" in the hexagonal architecture pattern.
/// Storage adapters implement the repository traits; an embedding
/// application implements [`ports::Application`] to supply identity, ids and
/// the clock.
pub mod ports;
