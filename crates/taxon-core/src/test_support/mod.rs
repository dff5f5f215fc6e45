//! Test doubles shared by unit and integration tests
//!
//! Enabled under `cfg(test)` and by the `test-utils` feature so other
//! crates' tests can use them.

pub mod mocks;

pub use mocks::{MockEmbedder, MockTaxonomyStore};
