//! Occupation automation probabilities by country: loading, lookup,
//! statistics and export. The desktop dashboard lives in the binary.

pub mod config;
pub mod data;
pub mod error;
pub mod export;
