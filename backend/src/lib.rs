//! # Timetable Rust Backend
//!
//! School timetable generation and editing service.
//!
//! Staff members are registered with the classes they may teach. An external
//! generator proposes weekly timetables for a set of classes; the backend
//! reconciles whatever comes back into a complete, well-shaped timetable per
//! requested class, falls back to empty grids where the generator failed,
//! and lets users edit individual slots afterwards.
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`models`]: Staff registry, timetable grids and generation parameters
//! - [`engine`]: Request building, response reconciliation, slot editing and
//!   staff identity resolution (pure, no I/O apart from the generator client)
//! - [`db`]: Repository trait and its in-memory and file-backed implementations
//! - [`services`]: Orchestration, single-flight generation and diagnostics
//! - [`config`]: TOML configuration with environment overrides
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! ## Identity
//!
//! Staff have a stable [`StaffId`](models::StaffId). Generator requests and
//! grids refer to staff by their position in the registry at generation time;
//! [`engine::resolve`] accepts either form.

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod config;
pub mod db;
pub mod engine;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
