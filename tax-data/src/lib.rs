//! CSV loading and batch execution for the tax engine.

pub mod batch;
pub mod input_loader;
pub mod loader;

pub use batch::{BatchError, BatchOutcome, RejectedInput, run_batch};
pub use input_loader::InputLoadError;
pub use loader::{RateScheduleLoader, RateScheduleLoaderError};
