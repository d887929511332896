//! Parallel execution of independent attribute jobs.
//!
//! - [`Job`] - One unit of work reporting success or failure
//! - [`JobRunner`] - Capability that runs a batch concurrently
//! - [`RayonJobRunner`] - Runner on a dedicated rayon pool
//! - [`AttributeScheduler`] - Chooses parallel or sequential execution

mod runner;
mod scheduler;

pub use runner::{Job, JobPoolConfig, JobRunner, RayonJobRunner};
pub use scheduler::AttributeScheduler;
