//! # mfsort Core Library
//!
//! This library contains the identification-and-placement pipeline used by the mfsort binary.
//! It provides the fingerprinting wrapper around Chromaprint's `fpcalc`, the AcoustID and
//! MusicBrainz lookups, the per-file placement engine and the batch scheduler that drives it.

pub mod acoustid;
pub mod audio;
pub mod batch;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod metadata;
pub mod musicbrainz;
pub mod placement;
pub mod progress;
pub mod rate_limit;
pub mod utils;

#[cfg(test)]
mod test_server;

/// User agent prefix shared by the HTTP clients
pub const APP_NAME: &str = "mfsort";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
