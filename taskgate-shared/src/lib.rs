//! # TaskGate Shared Library
//!
//! This crate contains the authentication core and data layer used by the
//! TaskGate API server.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, session tokens and the access gate
//! - `db`: Connection pool and migrations
//! - `models`: Users (credential store) and tasks

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the TaskGate shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
