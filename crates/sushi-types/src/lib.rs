//! Sushi Types - Pure type definitions for the sushi catalog
//!
//! This crate contains only pure data types with no async runtime or storage
//! dependencies, so every backend and the HTTP layer share one record shape.

pub mod sushi;

pub use sushi::*;
