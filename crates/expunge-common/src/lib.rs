//! Common utilities for expunge
//!
//! This crate provides the error type shared by the library and the CLI.

pub mod error;

pub use error::{ErrorKind, ExpungeError, Result};
