//! Résumé relevance scoring: matches candidate documents against a job description
//! and returns a comparable score, a verdict, and a matched/missing breakdown.
//!
//! The scoring core lives in [`analysis`]; [`embedding`] holds the provider seam.
//! The remaining modules make up the HTTP host.

pub mod analysis;
pub mod config;
pub mod embedding;
pub mod errors;
pub mod routes;
pub mod state;
