//! CLI command implementations.

pub mod check;
pub mod common;
pub mod phonemize;
pub mod resolve;
pub mod tables;
