//! JTBD Forces - Jobs-to-be-Done forces analysis for survey responses
//!
//! This crate turns survey answers into a strength score for each of the
//! five forces (demographic, pain of the old, pull of the new, anchors to
//! the old, anxiety of the new), weighs them against each other and derives
//! prioritized recommendations.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
