//! docsort - distributed document classification pipeline.
//!
//! Accepts file uploads over HTTP, enqueues them for content-based
//! classification, and reports results asynchronously through a
//! shared broker. See `SPEC_FULL.md` for the full component contract.

pub mod api;
pub mod broker;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod task;
pub mod scaling;
pub mod worker;
