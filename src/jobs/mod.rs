//! Job processing module.

mod processor;
mod store;

pub use processor::JobProcessor;
pub use store::{spawn_cleanup, JobRecord, JobStore};
