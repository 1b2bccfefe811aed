//! Task submission and status polling

pub mod progress;
pub mod state;
pub mod task_poller;

pub use progress::{Step, step_for};
pub use state::{PollerPhase, PollerSnapshot};
pub use task_poller::TaskPoller;
