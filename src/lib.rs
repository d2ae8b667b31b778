//! ARENA: prediction market, portfolio risk and rank engines.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point. Every engine is a pure function of its
//! inputs and is safe to share across threads.

pub mod config;
pub mod types;
pub mod market;
pub mod risk;
pub mod rank;
