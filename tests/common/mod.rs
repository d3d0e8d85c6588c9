//! Shared test support: a scripted command runner and status fixtures.

pub mod fixtures;

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use pacemon_failover::services::{CommandOutput, CommandRunner};
use pacemon_failover::{FailoverError, FailoverResult};

/// Command runner that replays scripted stdout per command and records
/// every invocation. Commands without a script fail the way a broken
/// external tool would.
#[derive(Default)]
pub struct MockRunner {
    responses: Mutex<HashMap<String, VecDeque<String>>>,
    calls: Mutex<Vec<String>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer `command` with `stdout`.
    pub fn respond(self, command: &str, stdout: &str) -> Self {
        self.respond_sequence(command, &[stdout])
    }

    /// Answer `command` with each output in turn; the last one repeats.
    pub fn respond_sequence(self, command: &str, outputs: &[&str]) -> Self {
        {
            let mut responses = self.responses.lock().expect("responses lock");
            responses.insert(
                command.to_string(),
                outputs.iter().map(|s| s.to_string()).collect(),
            );
        }
        self
    }

    /// Every command run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn count_calls(&self, command: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == command).count()
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, command: &str) -> FailoverResult<CommandOutput> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(command.to_string());

        let mut responses = self.responses.lock().expect("responses lock");
        let queue = responses
            .get_mut(command)
            .ok_or_else(|| FailoverError::ExternalTool {
                command: command.to_string(),
                reason: "unexpected command in test".to_string(),
            })?;

        let stdout = if queue.len() > 1 {
            queue.pop_front().unwrap_or_default()
        } else {
            queue.front().cloned().unwrap_or_default()
        };

        Ok(CommandOutput {
            stdout,
            stderr: String::new(),
            exit_code: Some(0),
        })
    }
}
