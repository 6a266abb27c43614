//! Shared test utilities for the heatmap-tiles workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Deterministic point generators
//! - Standard boxes and render configurations
//! - Temporary points files for the configurator
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::*;
pub use generators::*;

/// Assert two floats are within `eps` of each other.
#[macro_export]
macro_rules! assert_close {
    ($left:expr, $right:expr, $eps:expr) => {{
        let (l, r, e) = ($left as f64, $right as f64, $eps as f64);
        assert!(
            (l - r).abs() <= e,
            "assertion failed: |{} - {}| = {} > {}",
            l,
            r,
            (l - r).abs(),
            e
        );
    }};
}
