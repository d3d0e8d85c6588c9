//! Configuration management
//!
//! YAML-based configuration with support for:
//! - Environment variable overrides
//! - Multiple configuration file locations
//! - Default values for all settings except the target primary node
//!
//! The target primary node is deliberately not defaulted: acting against
//! the wrong node is worse than refusing to run.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::models::ClusterKind;
use crate::services::engine::EngineSettings;
use crate::utils::{FailoverError, FailoverResult};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Node expected to hold the primary role outside maintenance windows.
    /// Required for failover runs.
    #[serde(default)]
    pub target_primary_node: String,

    /// Weekday the failover/failback schedule runs on.
    #[serde(default = "default_what_day")]
    pub what_day: String,

    /// Cluster topology and the commands tied to it.
    #[serde(default)]
    pub cluster: ClusterConfig,

    /// Outbound notification settings.
    #[serde(default)]
    pub email: EmailSettings,

    /// Command producing the XML status report.
    #[serde(default = "default_status_command")]
    pub status_command: String,

    /// Propagation-wait tuning for group moves.
    #[serde(default)]
    pub settle: SettleConfig,

    /// Upper bound on any single external command.
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Cluster topology selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfig {
    #[serde(default)]
    pub kind: ClusterKindName,

    /// Resource group identifying the primary (group-based clusters).
    #[serde(default)]
    pub group_name: Option<String>,

    /// Node attribute identifying the primary (attribute-based clusters).
    #[serde(default = "default_attribute_name")]
    pub attribute_name: String,
    #[serde(default = "default_attribute_value")]
    pub attribute_value: String,

    /// Switchover command for attribute-based clusters.
    #[serde(default = "default_switchover_command")]
    pub switchover_command: String,
}

/// Named cluster kind as written in the configuration file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterKindName {
    Group,
    #[default]
    Attribute,
}

/// SMTP notification settings. All of `from`, `to`, `smtpHost`, and
/// `smtpPort` must be present for notifications to be sent; otherwise the
/// run logs a warning and continues without email.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSettings {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Vec<String>,
    #[serde(default)]
    pub smtp_host: Option<String>,
    #[serde(default)]
    pub smtp_port: Option<u16>,
    #[serde(default = "default_subject")]
    pub subject: String,
}

impl EmailSettings {
    pub fn is_complete(&self) -> bool {
        self.from.is_some() && !self.to.is_empty() && self.smtp_host.is_some() && self.smtp_port.is_some()
    }
}

/// Bounded-poll tuning for waiting out cluster propagation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_settle_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_what_day() -> String {
    "Sunday".to_string()
}

fn default_status_command() -> String {
    "crm_mon -fA1 --as-xml".to_string()
}

fn default_attribute_name() -> String {
    "pgsql-status".to_string()
}

fn default_attribute_value() -> String {
    "PRI".to_string()
}

fn default_switchover_command() -> String {
    "yes | pg-rex_switchover".to_string()
}

fn default_subject() -> String {
    "Cluster failover report".to_string()
}

fn default_poll_interval() -> u64 {
    5
}

fn default_settle_timeout() -> u64 {
    60
}

fn default_command_timeout() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            target_primary_node: String::new(),
            what_day: default_what_day(),
            cluster: ClusterConfig::default(),
            email: EmailSettings::default(),
            status_command: default_status_command(),
            settle: SettleConfig::default(),
            command_timeout_secs: default_command_timeout(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            kind: ClusterKindName::default(),
            group_name: None,
            attribute_name: default_attribute_name(),
            attribute_value: default_attribute_value(),
            switchover_command: default_switchover_command(),
        }
    }
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            from: None,
            to: Vec::new(),
            smtp_host: None,
            smtp_port: None,
            subject: default_subject(),
        }
    }
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            timeout_secs: default_settle_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables.
    ///
    /// Sources, later overriding earlier: defaults, the configuration file
    /// (explicit path, `PACEMON_CONFIG`, or the first standard location
    /// that exists), environment variables.
    pub fn load(explicit_path: Option<&Path>) -> FailoverResult<Self> {
        let _ = dotenvy::dotenv();

        let config_path = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("PACEMON_CONFIG").map(PathBuf::from).ok())
            .or_else(Self::find_config_file);

        let mut config = if let Some(ref path) = config_path {
            let contents = std::fs::read_to_string(path).map_err(|e| {
                FailoverError::Config(format!(
                    "failed to read config file {}: {e}",
                    path.display()
                ))
            })?;
            serde_norway::from_str(&contents).map_err(|e| {
                FailoverError::Config(format!(
                    "failed to parse config file {}: {e}",
                    path.display()
                ))
            })?
        } else {
            AppConfig::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file in standard locations.
    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            PathBuf::from("failover.yaml"),
            PathBuf::from("config/failover.yaml"),
            PathBuf::from("/etc/pacemon-failover/failover.yaml"),
            dirs::config_dir()
                .map(|p| p.join("pacemon-failover/failover.yaml"))
                .unwrap_or_default(),
        ];

        paths.into_iter().find(|p| p.exists())
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(node) = std::env::var("PACEMON_TARGET_PRIMARY_NODE") {
            self.target_primary_node = node;
        }
        if let Ok(day) = std::env::var("PACEMON_WHAT_DAY") {
            self.what_day = day;
        }
        if let Ok(host) = std::env::var("PACEMON_SMTP_HOST") {
            self.email.smtp_host = Some(host);
        }
        if let Ok(port) = std::env::var("PACEMON_SMTP_PORT") {
            if let Ok(p) = port.parse() {
                self.email.smtp_port = Some(p);
            }
        }
        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Reject configurations that could never run. The target primary node
    /// is only required for failover runs and is checked in
    /// [`AppConfig::engine_settings`].
    pub fn validate(&self) -> FailoverResult<()> {
        self.target_weekday()?;
        self.cluster_kind()?;
        Ok(())
    }

    /// The configured weekday, parsed case-insensitively.
    pub fn target_weekday(&self) -> FailoverResult<Weekday> {
        Weekday::from_str(&self.what_day).map_err(|_| {
            FailoverError::Config(format!(
                "`whatDay` is not a recognized weekday name: {}",
                self.what_day
            ))
        })
    }

    /// The configured cluster kind with its strategy parameters.
    pub fn cluster_kind(&self) -> FailoverResult<ClusterKind> {
        match self.cluster.kind {
            ClusterKindName::Group => {
                let group_name = self
                    .cluster
                    .group_name
                    .clone()
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| {
                        FailoverError::Config(
                            "`cluster.groupName` is required for group-based clusters".to_string(),
                        )
                    })?;
                Ok(ClusterKind::GroupBased { group_name })
            }
            ClusterKindName::Attribute => Ok(ClusterKind::AttributeBased {
                attribute_name: self.cluster.attribute_name.clone(),
                attribute_value: self.cluster.attribute_value.clone(),
                switchover_command: self.cluster.switchover_command.clone(),
            }),
        }
    }

    /// Resolve the engine inputs for a failover run. Fails pre-flight when
    /// the target primary node is not configured.
    pub fn engine_settings(&self, override_schedule: bool) -> FailoverResult<EngineSettings> {
        if self.target_primary_node.is_empty() {
            return Err(FailoverError::Config(
                "`targetPrimaryNode` is not set in the configuration".to_string(),
            ));
        }

        Ok(EngineSettings {
            expected_primary_node: self.target_primary_node.clone(),
            target_weekday: self.target_weekday()?,
            override_schedule,
            status_command: self.status_command.clone(),
            poll_interval: Duration::from_secs(self.settle.poll_interval_secs),
            settle_timeout: Duration::from_secs(self.settle.timeout_secs),
        })
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}
