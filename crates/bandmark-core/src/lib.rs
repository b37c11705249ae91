//! bandmark-core: answer matching, scoring, and band conversion for IELTS practice tests.
//!
//! This crate defines the answer-key data model, the normalization and
//! matching rules, the band tables, and the timed test session that the
//! bandmark CLI builds on.

pub mod band;
pub mod config;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod record;
pub mod report;
pub mod results;
pub mod scorer;
pub mod session;
pub mod statistics;
