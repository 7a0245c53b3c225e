//! Sushi Core Library
//!
//! Error type and the repository port every storage backend implements.

// Re-export pure types from sushi-types
pub use sushi_types::*;

pub mod error;
pub mod ports;

pub use error::{Result, SushiError};
pub use ports::SushiRepository;
