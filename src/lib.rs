//! Operator tooling for bootstrapping a TUF repository service.
//!
//! The crate drives the "key ceremony": the interactive process by which an
//! operator assembles signing-key material and role policy for a software
//! update metadata repository, submits the resulting root-of-trust
//! configuration to the repository service, and tracks the asynchronous
//! server-side task that applies it.
//!
//! # Modules
//!
//! - [`keys`] - signing-key loading and duplicate detection
//! - [`prompt`] - injected prompt collaborator (terminal or scripted)
//! - [`api`] - HTTP client for the bootstrap and task endpoints
//! - [`ceremony`] - the ceremony controller, role builder, and payload
//! - [`error`] - crate-wide error type with operator-facing messages

#![forbid(unsafe_code)]

pub mod api;
pub mod ceremony;
pub mod error;
pub mod keys;
pub mod prompt;

pub use error::{Error, Result};
