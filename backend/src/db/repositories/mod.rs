//! Repository implementations module.
//!
//! - `local`: In-memory implementation for unit testing and local development
//! - `json_file`: Single JSON document on disk, loaded into a local store
#[cfg(feature = "json-repo")]
pub mod json_file;
pub mod local;

#[cfg(feature = "json-repo")]
pub use json_file::JsonFileRepository;
pub use local::{LocalRepository, StoreSnapshot};
