// Helper-process executor implementation
// Spawns the privileged helper binary with environment allowlisting and a
// hard execution deadline.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use netshare_core::domain::error::TetherError;
use netshare_core::port::{HelperOperation, PrivilegedExecutor};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Executes privileged operations by spawning an out-of-process helper.
///
/// The helper receives one serialized [`HelperOperation`] as its single
/// argument and answers on stdout: empty output on success, a decimal
/// platform error code otherwise. Anything else (spawn failure, non-zero
/// exit, timeout, unparsable reply) counts as the helper call itself
/// failing.
pub struct HelperProcessExecutor {
    helper_path: PathBuf,
    env_allowlist: Vec<String>,
    deadline: Duration,
}

impl HelperProcessExecutor {
    /// # Arguments
    /// * `helper_path` - Privileged helper binary
    /// * `env_allowlist` - Environment variables the helper may inherit
    pub fn new(helper_path: impl Into<PathBuf>, env_allowlist: Vec<String>) -> Self {
        Self {
            helper_path: helper_path.into(),
            env_allowlist,
            deadline: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Check the helper binary exists and is executable before first use.
    #[cfg(unix)]
    pub fn preflight(&self) -> Result<(), TetherError> {
        use nix::unistd::{access, AccessFlags};
        access(&self.helper_path, AccessFlags::X_OK).map_err(|e| {
            TetherError::unsupported(format!(
                "helper binary {} not executable: {e}",
                self.helper_path.display()
            ))
        })
    }

    #[cfg(not(unix))]
    pub fn preflight(&self) -> Result<(), TetherError> {
        if self.helper_path.exists() {
            Ok(())
        } else {
            Err(TetherError::unsupported(format!(
                "helper binary {} not found",
                self.helper_path.display()
            )))
        }
    }

    fn allowed_env(&self) -> Vec<(String, String)> {
        std::env::vars()
            .filter(|(k, _)| self.env_allowlist.contains(k))
            .collect()
    }

    fn parse_reply(stdout: &[u8]) -> Result<Option<i32>, TetherError> {
        let reply = String::from_utf8_lossy(stdout);
        let reply = reply.trim();
        if reply.is_empty() {
            return Ok(None);
        }
        reply.parse::<i32>().map(Some).map_err(|_| {
            TetherError::helper_unreachable(format!("malformed helper reply: {reply:?}"))
        })
    }
}

#[async_trait]
impl PrivilegedExecutor for HelperProcessExecutor {
    async fn execute(&self, op: HelperOperation) -> Result<Option<i32>, TetherError> {
        let payload = serde_json::to_string(&op)
            .map_err(|e| TetherError::malformed(format!("helper payload: {e}")))?;

        info!(
            helper = %self.helper_path.display(),
            op = ?op,
            "dispatching privileged helper"
        );
        let started = Instant::now();

        let child = Command::new(&self.helper_path)
            .arg(&payload)
            .env_clear()
            .envs(self.allowed_env())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TetherError::helper_unreachable(format!("spawn failed: {e}")))?;

        let output = match timeout(self.deadline, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(TetherError::helper_unreachable(format!("io error: {e}")));
            }
            Err(_) => {
                return Err(TetherError::helper_unreachable(format!(
                    "timed out after {:?}",
                    self.deadline
                )));
            }
        };

        let duration_ms = started.elapsed().as_millis();
        debug!(
            duration_ms = %duration_ms,
            status = ?output.status,
            "privileged helper finished"
        );

        if !output.status.success() {
            return Err(TetherError::helper_unreachable(format!(
                "helper exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Self::parse_reply(&output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netshare_core::domain::request::TargetKind;

    #[cfg(unix)]
    fn write_helper_script(name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = std::env::temp_dir().join(format!("netshare_helper_{name}.sh"));
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn start_op() -> HelperOperation {
        HelperOperation::Start {
            target: TargetKind::Usb,
            show_ui: false,
        }
    }

    #[test]
    fn test_parse_reply() {
        assert_eq!(HelperProcessExecutor::parse_reply(b"").unwrap(), None);
        assert_eq!(HelperProcessExecutor::parse_reply(b"14\n").unwrap(), Some(14));
        assert!(HelperProcessExecutor::parse_reply(b"oops").is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_success_on_silent_exit() {
        let path = write_helper_script("ok", "exit 0");
        let executor = HelperProcessExecutor::new(&path, vec![]);

        let result = executor.execute(start_op()).await.unwrap();
        assert_eq!(result, None);

        std::fs::remove_file(path).unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_reports_structured_code() {
        let path = write_helper_script("code", "echo 14");
        let executor = HelperProcessExecutor::new(&path, vec![]);

        let result = executor.execute(start_op()).await.unwrap();
        assert_eq!(result, Some(14));

        std::fs::remove_file(path).unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_helper_unreachable() {
        let path = write_helper_script("fail", "exit 3");
        let executor = HelperProcessExecutor::new(&path, vec![]);

        let err = executor.execute(start_op()).await.unwrap_err();
        assert!(matches!(
            err.class,
            netshare_core::domain::error::ErrorClass::HelperUnreachable(_)
        ));

        std::fs::remove_file(path).unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_is_helper_unreachable() {
        let path = write_helper_script("slow", "sleep 10");
        let executor =
            HelperProcessExecutor::new(&path, vec![]).with_deadline(Duration::from_millis(100));

        let err = executor.execute(start_op()).await.unwrap_err();
        assert!(matches!(
            err.class,
            netshare_core::domain::error::ErrorClass::HelperUnreachable(_)
        ));

        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_spawn_failure_is_helper_unreachable() {
        let executor = HelperProcessExecutor::new("/nonexistent/netshare-helper", vec![]);

        let err = executor.execute(start_op()).await.unwrap_err();
        assert!(matches!(
            err.class,
            netshare_core::domain::error::ErrorClass::HelperUnreachable(_)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_preflight_rejects_missing_binary() {
        let executor = HelperProcessExecutor::new("/nonexistent/netshare-helper", vec![]);
        assert!(executor.preflight().is_err());
    }
}
