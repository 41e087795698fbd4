use std::env;
use std::fs;
use std::process::Command;

use thiserror::Error;

use crate::errors::SnapError;

#[derive(Debug, Error)]
pub enum CmdError {
    #[error("failed to spawn: {error}")]
    ErrSpawn { error: std::io::Error },

    #[error("exited with status {code:?}: {stderr}")]
    ErrExit { code: Option<i32>, stderr: String },

    #[error("output is not utf-8: {error}")]
    ErrOutput { error: std::string::FromUtf8Error },
}

impl CmdError {
    /// Returns stderr of a command that ran but exited non-zero
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::ErrExit { stderr, .. } => Some(stderr.as_str()),
            _ => None,
        }
    }
}

/// Runs `cmd` with `args`, discarding stdout.
pub fn exec(cmd: &str, args: &[&str]) -> Result<(), SnapError> {
    exec_output(cmd, args, &[]).map(|_| ())
}

/// Runs `cmd` with `args` and extra environment `envs`,
/// returning its stdout as string.
///
/// Non-zero exit status is an error carrying the command's stderr.
pub fn exec_output(
    cmd: &str,
    args: &[&str],
    envs: &[(&str, String)],
) -> Result<String, SnapError> {
    let cmd_str = cmd_string(cmd, args);

    let output = Command::new(cmd)
        .args(args)
        .envs(envs.iter().map(|(k, v)| (*k, v.as_str())))
        .output()
        .map_err(|error| SnapError::CmdFailed {
            error: CmdError::ErrSpawn { error },
            context: format!("command `{cmd_str}` failed to spawn"),
        })?;

    if !output.status.success() {
        return Err(SnapError::CmdFailed {
            error: CmdError::ErrExit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            },
            context: format!("command `{cmd_str}` failed"),
        });
    }

    String::from_utf8(output.stdout).map_err(|error| SnapError::CmdFailed {
        error: CmdError::ErrOutput { error },
        context: format!("command `{cmd_str}` returned bad output"),
    })
}

// Shell-quoted command line, only used in error context
fn cmd_string(cmd: &str, args: &[&str]) -> String {
    let mut words = vec![cmd];
    words.extend_from_slice(args);

    shlex::try_join(words).unwrap_or_else(|_| format!("{cmd} {}", args.join(" ")))
}

pub fn in_path(program: &str) -> bool {
    if let Ok(path) = env::var("PATH") {
        for p in path.split(':') {
            let p_str = format!("{}/{}", p, program);
            if fs::metadata(p_str).is_ok() {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_output() {
        let out = exec_output("echo", &["hello,", "world!"], &[])
            .expect("failed to execute `echo hello, world!`");
        assert_eq!(out.trim(), "hello, world!");

        let out = exec_output("sh", &["-c", "printf %s \"$SNAP_TEST\""], &[(
            "SNAP_TEST",
            "foo".to_string(),
        )])
        .expect("failed to execute sh with env");
        assert_eq!(out, "foo");
    }

    #[test]
    fn test_exec_errors() {
        match exec("sh", &["-c", "echo boom >&2; exit 3"]) {
            Err(SnapError::CmdFailed {
                error: CmdError::ErrExit { code, stderr },
                ..
            }) => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "boom");
            }
            result => panic!("unexpected result {result:?}"),
        }

        match exec("ec2-snap-no-such-program", &[]) {
            Err(SnapError::CmdFailed {
                error: CmdError::ErrSpawn { .. },
                ..
            }) => {}
            result => panic!("unexpected result {result:?}"),
        }
    }

    #[test]
    fn test_cmd_string() {
        let s = cmd_string("aws", &["ec2", "create-snapshot", "--description", "my snap"]);

        assert!(s.starts_with("aws ec2 create-snapshot --description "));
        assert!(s.contains("my snap"));
        assert_ne!(s, "aws ec2 create-snapshot --description my snap");
    }

    #[test]
    fn test_in_path() {
        assert!(in_path("sh"));
        assert!(!in_path("ec2-snap-no-such-program"));
    }
}
