//! Repository implementations module.
//!
//! This module contains the implementations of the `TimetableRepository` trait:
//! - `local`: In-memory implementation for unit testing and local development
//! - `file`: JSON files in a data directory, for single-node deployments
pub mod file;
pub mod local;

pub use file::FileRepository;
pub use local::LocalRepository;
