//! Foundation types for psh.
//!
//! This crate holds the pieces every other psh crate shares: the error
//! enum, configuration and persisted settings, and the two collaborator
//! traits the interpreter core is written against (`Clock` and `BlobStore`).

pub mod clock;
pub mod config;
pub mod error;
pub mod storage;
