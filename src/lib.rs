//! Scheduled failover automation for Pacemaker-managed HA database
//! clusters.
//!
//! Each invocation interprets one status snapshot from the cluster
//! resource manager, decides whether the calendar calls for a failover or
//! failback, drives the manager's commands when it does, and reports the
//! outcome by email.

pub mod config;
pub mod models;
pub mod services;
pub mod utils;

pub use config::AppConfig;
pub use models::{ClusterKind, ClusterStatus};
pub use services::{Decision, EmailNotifier, FailoverEngine, SystemCommandRunner};
pub use utils::{FailoverError, FailoverResult};
