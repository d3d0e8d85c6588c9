//! Business logic services

pub mod calendar;
pub mod command;
pub mod engine;
pub mod health;
pub mod locator;
pub mod notifier;
pub mod parser;

pub use command::{CommandOutput, CommandRunner, SystemCommandRunner};
pub use engine::{Decision, EngineSettings, FailoverEngine, RunFailure, RunReport};
pub use notifier::EmailNotifier;
