//! Business logic services
//!
//! One service per use case, each a thin adapter over the shared repository.

pub mod adding;
pub mod getting;
pub mod modifying;
pub mod removing;

pub use adding::AddingService;
pub use getting::GettingService;
pub use modifying::ModifyingService;
pub use removing::RemovingService;
