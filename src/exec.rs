//! External command execution
//!
//! Single subprocess per call, captured output, exit codes surfaced
//! through the crate error so callers can treat sentinel codes as
//! domain states.

use crate::error::{HostctlError, HostctlResult};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// A single external command call: program, arguments, optional stdin
/// payload and an optional shell wrap.
#[derive(Debug, Clone)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    stdin: Option<Vec<u8>>,
    shell_wrap: bool,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
            shell_wrap: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Bytes delivered to the child on stdin.
    pub fn stdin(mut self, payload: Vec<u8>) -> Self {
        self.stdin = Some(payload);
        self
    }

    /// Run through `bash --norc -c` so shell operators in arguments are
    /// honored. Arguments are quoted individually when rendered.
    pub fn shell_wrap(mut self, enabled: bool) -> Self {
        self.shell_wrap = enabled;
        self
    }

    /// Command line as rendered for logs and error messages.
    pub fn render(&self) -> String {
        if self.args.is_empty() {
            return self.program.clone();
        }
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&shell_quote(arg));
        }
        line
    }
}

/// Quote a single argument for a POSIX shell.
fn shell_quote(arg: &str) -> String {
    if !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_@%+=:,./-".contains(c))
    {
        return arg.to_string();
    }
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('\'');
    for c in arg.chars() {
        if c == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('\'');
    quoted
}

/// Executes invocations and returns captured stdout.
///
/// The production implementation spawns real subprocesses; tests inject
/// scripted implementations to drive the domain clients.
#[async_trait]
pub trait Invoker: Send + Sync {
    async fn invoke(&self, call: &Invocation) -> HostctlResult<Vec<u8>>;
}

/// Subprocess-spawning invoker. The child inherits the parent
/// environment; the call blocks until the child exits. No retry, no
/// timeout.
#[derive(Debug, Default)]
pub struct ShellInvoker;

impl ShellInvoker {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Invoker for ShellInvoker {
    async fn invoke(&self, call: &Invocation) -> HostctlResult<Vec<u8>> {
        if call.program.is_empty() {
            return Err(HostctlError::InvalidParameter(
                "Command cannot be empty".to_string(),
            ));
        }

        let rendered = call.render();
        debug!("Running: {}", rendered);

        let mut cmd = if call.shell_wrap {
            let mut c = Command::new("bash");
            c.arg("--norc").arg("-c").arg(&rendered);
            c
        } else {
            let mut c = Command::new(&call.program);
            c.args(&call.args);
            c
        };

        let output = if let Some(payload) = &call.stdin {
            cmd.stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());
            let mut child = cmd.spawn().map_err(|e| HostctlError::CommandFailed {
                cmd: rendered.clone(),
                code: None,
                stderr: e.to_string(),
            })?;
            if let Some(mut stdin) = child.stdin.take() {
                stdin
                    .write_all(payload)
                    .await
                    .map_err(|e| HostctlError::CommandFailed {
                        cmd: rendered.clone(),
                        code: None,
                        stderr: e.to_string(),
                    })?;
            }
            child
                .wait_with_output()
                .await
                .map_err(|e| HostctlError::CommandFailed {
                    cmd: rendered.clone(),
                    code: None,
                    stderr: e.to_string(),
                })?
        } else {
            cmd.output().await.map_err(|e| HostctlError::CommandFailed {
                cmd: rendered.clone(),
                code: None,
                stderr: e.to_string(),
            })?
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            warn!(
                "Command failed: {} (code {:?}): {}",
                rendered,
                output.status.code(),
                stderr.trim()
            );
            return Err(HostctlError::CommandFailed {
                cmd: rendered,
                code: output.status.code(),
                stderr,
            });
        }

        Ok(output.stdout)
    }
}
