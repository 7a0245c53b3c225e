//! HTTP handlers

pub mod sushi;
