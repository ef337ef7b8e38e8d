//! # MAGIC Incubator Backend
//!
//! Lifecycle engine and REST backend for a startup incubator.
//!
//! A startup registers, pitches to the Startup Mentoring Committee (SMC)
//! through stages S0 → S1 → S2 → S3 (or moves to One-on-One mentoring), and
//! finally leaves the pipeline as Onboarded → Graduated, or Rejected.
//!
//! ## Architecture
//!
//! - [`models`]: Records (startups, SMC schedules, One-on-One sessions, settings)
//! - [`lifecycle`]: Pure state machine; every rule lives here
//! - [`db`]: Repository traits, in-memory and JSON-file stores, service layer
//! - [`http`]: Axum-based HTTP server and request handlers
//!

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod db;
pub mod lifecycle;
pub mod models;

#[cfg(feature = "http-server")]
pub mod http;
