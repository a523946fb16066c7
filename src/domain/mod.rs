//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `forces` - The five forces, responses, mappings, lexicons and options
//! - `analysis` - Pure domain services that turn responses into an analysis

pub mod analysis;
pub mod forces;
pub mod foundation;
