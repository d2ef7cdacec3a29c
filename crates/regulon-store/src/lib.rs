//! Client-resident state for Regulon.
//!
//! Owns the collections of networks and workflows, bridges them to the
//! remote persistence/execution boundary, and reconciles workflow state
//! against the remote service on a timer. Rendering surfaces consume
//! the read selectors and command methods exposed here; everything
//! returns either a new state snapshot or a typed failure.

pub mod networks;
pub mod scheduler;
pub mod session;
pub mod workflows;

#[cfg(test)]
mod testing;

pub use networks::NetworkRepository;
pub use scheduler::{PollHandle, Scheduler, TickFn, TokioScheduler};
pub use session::Session;
pub use workflows::{PollOutcome, WorkflowRepository, WorkflowSpec};
