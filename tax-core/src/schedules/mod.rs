//! Versioned rate schedule storage.

pub mod memory;
pub mod repository;

pub use memory::InMemoryRateScheduleRepository;
pub use repository::{RateScheduleRepository, RepositoryError};
