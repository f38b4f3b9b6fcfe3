//! Supervision of locally running chain node processes.
//!
//! A [`Supervisor`] owns the per-chain runtime config and state, starts and
//! stops node processes, runs one poller task per launched chain, and
//! registers dependent chains with the root chain before launching them.

pub mod activation;
pub mod chain;
pub mod error;
pub mod notify;
pub mod poller;
pub mod process;
pub mod state;
pub mod supervisor;

pub use activation::{ActivationCoordinator, ActivationOutcome};
pub use error::{LaunchError, StopError};
pub use notify::{NoopRefresh, RefreshHook};
pub use process::{LaunchCommand, OsProcessControl, ProcessControl, Termination};
pub use state::{ChainState, LifecycleState};
pub use supervisor::{Supervisor, SupervisorOptions};
