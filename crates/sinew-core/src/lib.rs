//! Sinew Core - Foundational types for the Sinew animation runtime
//!
//! This crate provides the types that all other Sinew crates depend on:
//! - `Color` - RGBA color used by debug drawing
//! - Error types and Result alias

mod error;
mod types;

pub use error::{Result, SinewError};
pub use types::Color;
