//! Helpers for running the external media tools (ffmpeg, ffprobe,
//! ImageMagick) that concrete pipeline steps shell out to.

use std::ffi::OsStr;
use std::process::{ExitStatus, Stdio};
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, warn};

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Errors produced while running an external program.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed with exit code {code}: {stderr}")]
    Failed {
        program: String,
        code: i32,
        stderr: String,
    },
}

/// Apply the Windows `CREATE_NO_WINDOW` flag to child processes.
///
/// On non-Windows targets this is a no-op.
pub trait NoWindowExt {
    fn no_window(&mut self);
}

impl NoWindowExt for tokio::process::Command {
    fn no_window(&mut self) {
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            self.as_std_mut().creation_flags(CREATE_NO_WINDOW);
        }
    }
}

/// Create a `tokio::process::Command` with `CREATE_NO_WINDOW` applied on Windows.
pub fn tokio_command(program: impl AsRef<OsStr>) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new(program);
    cmd.no_window();
    cmd
}

/// Create a command that runs `script` through the platform shell.
pub fn shell_command(script: &str) -> tokio::process::Command {
    #[cfg(windows)]
    let cmd = {
        let mut c = tokio_command("cmd");
        c.args(["/C", script]);
        c
    };

    #[cfg(not(windows))]
    let cmd = {
        let mut c = tokio_command("sh");
        c.args(["-c", script]);
        c
    };

    cmd
}

/// Captured result of a finished command.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub duration_secs: f64,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

fn program_name(command: &tokio::process::Command) -> String {
    command
        .as_std()
        .get_program()
        .to_string_lossy()
        .into_owned()
}

/// Run a command to completion and capture stdout/stderr.
///
/// A non-zero exit status is not an error here; see [`run_checked`].
pub async fn run(command: &mut tokio::process::Command) -> Result<CommandOutput, CommandError> {
    let program = program_name(command);
    let start = Instant::now();

    command
        .env("LC_ALL", "C")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!(program = %program, args = ?command.as_std().get_args().collect::<Vec<_>>(), "Running command");

    let child = command.spawn().map_err(|source| CommandError::Spawn {
        program: program.clone(),
        source,
    })?;

    let output = child
        .wait_with_output()
        .await
        .map_err(|source| CommandError::Wait {
            program: program.clone(),
            source,
        })?;

    let duration_secs = start.elapsed().as_secs_f64();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    for line in stderr.lines() {
        if line.to_lowercase().contains("error") {
            warn!(program = %program, "stderr: {}", line);
        } else {
            debug!(program = %program, "stderr: {}", line);
        }
    }

    Ok(CommandOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr,
        duration_secs,
    })
}

/// Run a command and fail with [`CommandError::Failed`] on a non-zero exit status.
pub async fn run_checked(
    command: &mut tokio::process::Command,
) -> Result<CommandOutput, CommandError> {
    let output = run(command).await?;
    if !output.success() {
        return Err(CommandError::Failed {
            program: program_name(command),
            code: output.status.code().unwrap_or(-1),
            stderr: output.stderr.trim().to_string(),
        });
    }
    Ok(output)
}

/// Run `program` with stdin fed from `input`, capturing its output.
pub async fn run_with_stdin(
    command: &mut tokio::process::Command,
    input: &[u8],
) -> Result<CommandOutput, CommandError> {
    use tokio::io::AsyncWriteExt;

    let program = program_name(command);
    let start = Instant::now();

    command
        .env("LC_ALL", "C")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|source| CommandError::Spawn {
        program: program.clone(),
        source,
    })?;

    let stdin = child.stdin.take();
    let write_input = async {
        if let Some(mut stdin) = stdin {
            // A child that exits without reading stdin closes the pipe early.
            if let Err(e) = stdin.write_all(input).await {
                debug!(program = %program, "stdin closed early: {}", e);
            }
            // Dropping the handle sends EOF.
            drop(stdin);
        }
    };

    // Feed stdin while draining stdout so a streaming child never blocks on a full pipe.
    let ((), output) = tokio::join!(write_input, child.wait_with_output());
    let output = output.map_err(|source| CommandError::Wait {
        program: program.clone(),
        source,
    })?;

    Ok(CommandOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        duration_secs: start.elapsed().as_secs_f64(),
    })
}
