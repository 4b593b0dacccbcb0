//! Utility functions and helpers.

pub mod sigv4;
