//! Shared helpers for probe implementations.
//!
//! Probes that shell out to system utilities (`ps`, `sysctl`, `sips`) go
//! through these instead of hand-rolling `Command` plumbing at every call
//! site.

use std::process::{Command, Stdio};

/// Check if a command exists by running `which`.
pub fn command_exists(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Run a subprocess command and return its stdout as a `String`.
///
/// Returns `None` if the command fails to execute or exits with a non-zero
/// status.
pub fn run_command(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_command_echo() {
        let out = run_command("echo", &["hello"]);
        assert_eq!(out.unwrap().trim(), "hello");
    }

    #[test]
    fn run_command_nonexistent() {
        assert!(run_command("/nonexistent/binary", &[]).is_none());
    }

    #[test]
    fn run_command_failing_status() {
        // `false` always exits with status 1
        assert!(run_command("false", &[]).is_none());
    }

    #[test]
    fn command_exists_true() {
        assert!(command_exists("echo"));
    }

    #[test]
    fn command_exists_false() {
        assert!(!command_exists("nonexistent_binary_xyz_12345"));
    }
}
