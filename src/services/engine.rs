//! Failover decision engine
//!
//! One run per process invocation: work out whether today calls for a
//! failover or a failback, drive the cluster manager if it does, and hand a
//! report (or a failure with the last-known snapshot) back to the caller.
//! The engine itself never notifies or exits; that is the binary's job.
//!
//! Schedule policy: on the first occurrence of the target weekday in the
//! month, the primary role is moved away from its expected node for the
//! maintenance window; on any later occurrence of that weekday it is moved
//! back if it is still away. Any other day is a no-op.

use std::fmt;
use std::time::Duration;

use chrono::{NaiveDate, Weekday};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::models::{ClusterKind, ClusterStatus};
use crate::services::calendar;
use crate::services::command::CommandRunner;
use crate::services::health::evaluate_cluster_health;
use crate::services::locator::locate_primary;
use crate::services::parser::parse_status;
use crate::utils::{FailoverError, FailoverResult};

/// What the engine decided to do for this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    NoAction,
    Failover,
    Failback,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Decision::NoAction => "no-action",
            Decision::Failover => "failover",
            Decision::Failback => "failback",
        };
        f.write_str(label)
    }
}

/// Outcome of a completed run.
#[derive(Debug)]
pub struct RunReport {
    pub decision: Decision,
    /// Primary node after the run (post-action when an action was taken).
    pub primary: Option<String>,
    /// Snapshot backing the report, when one was taken.
    pub status: Option<ClusterStatus>,
}

impl RunReport {
    fn no_action() -> Self {
        Self {
            decision: Decision::NoAction,
            primary: None,
            status: None,
        }
    }
}

/// A failed run, carrying the last snapshot taken before the failure so
/// the notification can include cluster context.
#[derive(Debug)]
pub struct RunFailure {
    pub error: FailoverError,
    pub status: Option<ClusterStatus>,
}

/// Engine inputs, resolved from configuration before the run starts.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// The node that should normally hold the primary role.
    pub expected_primary_node: String,
    /// Weekday the failover/failback schedule runs on.
    pub target_weekday: Weekday,
    /// Skip the calendar entirely and act now. Health checks still apply.
    pub override_schedule: bool,
    /// Command producing the XML status report.
    pub status_command: String,
    /// Interval between re-queries while waiting on cluster propagation.
    pub poll_interval: Duration,
    /// Upper bound on each propagation wait.
    pub settle_timeout: Duration,
}

/// Drives one failover decision run against a cluster of the given kind.
pub struct FailoverEngine<'a> {
    settings: EngineSettings,
    kind: ClusterKind,
    runner: &'a dyn CommandRunner,
}

impl<'a> FailoverEngine<'a> {
    pub fn new(settings: EngineSettings, kind: ClusterKind, runner: &'a dyn CommandRunner) -> Self {
        Self {
            settings,
            kind,
            runner,
        }
    }

    /// Perform one decision run for the given date.
    pub async fn run(&self, today: NaiveDate) -> Result<RunReport, RunFailure> {
        if self.settings.override_schedule {
            info!("override enabled, skipping schedule evaluation");
            let (status, primary) = self.checked_snapshot().await?;
            self.perform_action(&primary).await.map_err(|error| RunFailure {
                error,
                status: Some(status),
            })?;
            let (status, primary) = self.checked_snapshot().await?;
            return Ok(RunReport {
                decision: Decision::Failover,
                primary: Some(primary),
                status: Some(status),
            });
        }

        let (occurrence, weekday) = calendar::describe(today);
        if weekday != self.settings.target_weekday {
            debug!(
                %weekday,
                target = %self.settings.target_weekday,
                "not a scheduled day, nothing to do"
            );
            return Ok(RunReport::no_action());
        }

        let (status, primary) = self.checked_snapshot().await?;
        let decision = decide(occurrence, &primary, &self.settings.expected_primary_node);

        info!(
            occurrence,
            %weekday,
            current_primary = %primary,
            expected_primary = %self.settings.expected_primary_node,
            %decision,
            "schedule evaluated"
        );

        if decision == Decision::NoAction {
            return Ok(RunReport {
                decision,
                primary: Some(primary),
                status: Some(status),
            });
        }

        self.perform_action(&primary).await.map_err(|error| RunFailure {
            error,
            status: Some(status),
        })?;

        let (status, primary) = self.checked_snapshot().await?;
        info!(new_primary = %primary, "post-action health check passed");

        Ok(RunReport {
            decision,
            primary: Some(primary),
            status: Some(status),
        })
    }

    /// Fetch a fresh snapshot, evaluate its health, and locate the current
    /// primary. Failures carry whatever snapshot was available.
    async fn checked_snapshot(&self) -> Result<(ClusterStatus, String), RunFailure> {
        let status = self.fetch_status().await.map_err(|error| RunFailure {
            error,
            status: None,
        })?;

        if let Err(violation) = evaluate_cluster_health(&status) {
            return Err(RunFailure {
                error: violation.into(),
                status: Some(status),
            });
        }

        match locate_primary(&status, &self.kind) {
            Ok(primary) => Ok((status, primary)),
            Err(e) => Err(RunFailure {
                error: e.into(),
                status: Some(status),
            }),
        }
    }

    async fn fetch_status(&self) -> FailoverResult<ClusterStatus> {
        let output = self.runner.run(&self.settings.status_command).await?;
        parse_status(&output.stdout)
    }

    /// Run the cluster-kind-specific role swap.
    async fn perform_action(&self, current_primary: &str) -> FailoverResult<()> {
        match &self.kind {
            ClusterKind::AttributeBased {
                switchover_command, ..
            } => {
                info!(command = %switchover_command, "running switchover");
                self.runner.run(switchover_command).await?;
                Ok(())
            }
            ClusterKind::GroupBased { group_name } => {
                self.run_group_protocol(group_name, current_primary).await
            }
        }
    }

    /// Group-based role swap: move the group, wait for the move to settle,
    /// clear the location constraint the move created, and verify nothing
    /// is left pinning the group.
    async fn run_group_protocol(
        &self,
        group_name: &str,
        pre_primary: &str,
    ) -> FailoverResult<()> {
        let move_command = ClusterKind::move_command(group_name);
        info!(command = %move_command, "moving resource group");
        self.runner.run(&move_command).await?;

        self.wait_for_move(pre_primary).await;

        let clear_command = ClusterKind::clear_command(group_name);
        info!(command = %clear_command, "clearing location constraints");
        self.runner.run(&clear_command).await?;

        self.verify_constraints_cleared(&clear_command).await
    }

    /// Re-query the cluster until the group reports a new primary or the
    /// settle window runs out. Mid-move snapshots can be transiently
    /// unparsable or primary-less; those are re-polled, not fatal. Running
    /// out of the window is not fatal either: the constraint verification
    /// that follows is the authoritative check.
    async fn wait_for_move(&self, pre_primary: &str) {
        let deadline = Instant::now() + self.settings.settle_timeout;

        loop {
            sleep(self.settings.poll_interval).await;

            let located = match self.fetch_status().await {
                Ok(status) => locate_primary(&status, &self.kind).map_err(FailoverError::from),
                Err(e) => Err(e),
            };

            match located {
                Ok(primary) if primary != pre_primary => {
                    info!(new_primary = %primary, "resource group move settled");
                    return;
                }
                Ok(_) => debug!(node = %pre_primary, "resource group still on the old node"),
                Err(e) => debug!(error = %e, "status re-query failed while the move propagates"),
            }

            if Instant::now() >= deadline {
                warn!(
                    timeout_secs = self.settings.settle_timeout.as_secs(),
                    "resource group move did not settle within the window, continuing to constraint cleanup"
                );
                return;
            }
        }
    }

    /// Confirm the clear step actually removed the location constraint,
    /// re-checking on the poll interval until the settle window runs out.
    /// A residual constraint keeps the group pinned and needs a human.
    async fn verify_constraints_cleared(&self, clear_command: &str) -> FailoverResult<()> {
        let deadline = Instant::now() + self.settings.settle_timeout;

        loop {
            let output = self.runner.run(ClusterKind::CONSTRAINT_QUERY).await?;
            if !output.stdout.contains("Node:") {
                info!("location constraints cleared");
                return Ok(());
            }

            if Instant::now() >= deadline {
                return Err(FailoverError::ConstraintResidual {
                    output: output.stdout,
                    clear_command: clear_command.to_string(),
                });
            }

            debug!("location constraints still present, re-checking");
            sleep(self.settings.poll_interval).await;
        }
    }
}

/// The calendar-and-primary decision rule.
///
/// First occurrence of the target weekday: fail over only when the primary
/// is where it is expected to be. Later occurrences: fail back only when it
/// is not.
fn decide(occurrence: u32, current_primary: &str, expected_primary: &str) -> Decision {
    if occurrence == 1 {
        if current_primary == expected_primary {
            Decision::Failover
        } else {
            Decision::NoAction
        }
    } else if current_primary != expected_primary {
        Decision::Failback
    } else {
        Decision::NoAction
    }
}
