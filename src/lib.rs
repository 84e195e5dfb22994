//! Tcpload - turn recorded HTTP proxy captures into FunkLoad test scripts
//!
//! The pipeline reads a capture directory, parses every request/response
//! pair, drops browser-driven noise and renders the remaining user actions
//! as replay instructions.

#![deny(unsafe_code)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::cargo)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::multiple_crate_versions
)]

pub mod capture;
pub mod config;
pub mod error;
pub mod filter;
pub mod message;
pub mod params;
pub mod pipeline;
pub mod script;

pub use error::{RecorderError, Result};
pub use pipeline::Recorder;
