//! Error types and handling
//!
//! Every failure the tool can hit is represented here. All of them are fatal
//! for the current run: the binary boundary sends a best-effort notification
//! and exits with a nonzero status. Nothing is retried.

use thiserror::Error;

/// A cluster health violation found while evaluating a status snapshot.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HealthError {
    /// A cluster node is offline, in standby, in maintenance, pending,
    /// unclean, or shutting down.
    #[error("node {name} is in an unhealthy state")]
    UnhealthyNode { name: String },

    /// A resource is inactive, blocked, and failed at the same time.
    #[error("resource {name} is not in a healthy state")]
    UnhealthyResource { name: String },
}

/// Failure to determine the cluster's current primary node.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocatorError {
    /// No node matched the locator strategy.
    #[error("unable to find the primary node in the cluster, check the cluster's health")]
    PrimaryNotFound,

    /// More than one node matched the attribute-based strategy.
    #[error("multiple nodes report the primary role: {}", nodes.join(", "))]
    AmbiguousPrimary { nodes: Vec<String> },
}

/// Top-level error taxonomy for a failover run.
#[derive(Debug, Error)]
pub enum FailoverError {
    /// Missing or invalid configuration, detected before any cluster
    /// interaction.
    #[error("configuration error: {0}")]
    Config(String),

    /// The cluster status report could not be parsed.
    #[error("failed to parse cluster status: {0}")]
    Parse(String),

    /// The cluster failed a health check.
    #[error(transparent)]
    Health(#[from] HealthError),

    /// The primary node could not be determined.
    #[error(transparent)]
    Locator(#[from] LocatorError),

    /// A location constraint survived the clear step of a group move.
    /// Automatic placement stays disabled until it is removed by hand.
    #[error(
        "failed to clear location constraints:\n{output}\n\n\
         Log in to one of the cluster nodes and run `{clear_command}` manually \
         to remove the remaining constraints"
    )]
    ConstraintResidual { output: String, clear_command: String },

    /// An external command was not found, exited nonzero, or hung past its
    /// timeout.
    #[error("command `{command}` failed: {reason}")]
    ExternalTool { command: String, reason: String },

    /// Outbound notification could not be delivered.
    #[error("SMTP error: {0}")]
    Smtp(String),
}

/// Result type alias used throughout the crate.
pub type FailoverResult<T> = Result<T, FailoverError>;
