//! HTTP server module for the incubator backend.
//!
//! This module provides an axum-based HTTP server that exposes the lifecycle
//! engine as a REST API. Handlers are thin: they parse requests, call the
//! service layer and map errors onto status codes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Request parsing and validation                         │
//! │  - JSON serialization/deserialization                     │
//! │  - CORS, compression, error handling                      │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Service Layer (db/services.rs)                           │
//! │  - load → lifecycle operation → store                     │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Repository Layer (db/)                                   │
//! │  - LocalRepository / JsonFileRepository                   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! | Outcome                                   | Status |
//! |-------------------------------------------|--------|
//! | success                                   | 200 / 201 on create |
//! | validation, conflict, slot, stage, status | 400    |
//! | malformed JSON body                       | 400    |
//! | unknown id                                | 404    |
//! | store failure                             | 500    |

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::{ApiError, AppError};
pub use router::create_router;
pub use state::AppState;
