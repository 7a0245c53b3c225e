//! Request extractors

pub mod sushi_id;

pub use sushi_id::SushiId;
