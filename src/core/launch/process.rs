// ─── Game Process ───
// Spawns the JVM, streams its output and waits for it to exit.

use std::collections::VecDeque;
use std::path::Path;
use std::process::Stdio;

#[cfg(target_os = "windows")]
use std::os::windows::process::CommandExt;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::classpath::path_arg;
use super::command::format_command_for_logs;
use crate::core::downloader::InstallObserver;
use crate::core::error::{LauncherError, LauncherResult};

/// Lines of output kept for the error report when the game fails.
pub const OUTPUT_TAIL_LINES: usize = 50;

/// Run `java args…` in `working_dir` until it exits.
///
/// Output lines go to the observer and to the `game` log target. A
/// non-zero exit is reported with the last [`OUTPUT_TAIL_LINES`] lines.
pub async fn run_game(
    java: &Path,
    args: &[String],
    working_dir: &Path,
    natives_dir: &Path,
    observer: &dyn InstallObserver,
) -> LauncherResult<()> {
    let mut cmd = Command::new(java);
    cmd.args(args)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(false);
    configure_native_library_env(&mut cmd, natives_dir);
    configure_platform_spawn(&mut cmd);

    info!("Launching with Java: {:?}", java);
    debug!(
        "Command (copy/paste): {}",
        format_command_for_logs(&java.to_string_lossy(), args)
    );

    let mut child = cmd.spawn().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LauncherError::JavaNotFound(java.to_path_buf()),
        _ => LauncherError::ProcessSpawn {
            program: java.to_path_buf(),
            source: e,
        },
    })?;
    observer.on_status("Game running");

    let (tx, mut rx) = mpsc::unbounded_channel();
    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(forward_lines(stdout, tx.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(forward_lines(stderr, tx.clone()));
    }
    drop(tx);

    let mut tail = VecDeque::with_capacity(OUTPUT_TAIL_LINES);
    while let Some(line) = rx.recv().await {
        info!(target: "game", "{}", line);
        observer.on_log(&line);
        if tail.len() == OUTPUT_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line);
    }

    let status = child.wait().await.map_err(|e| LauncherError::ProcessSpawn {
        program: java.to_path_buf(),
        source: e,
    })?;
    info!("Game exited with {}", status);

    if status.success() {
        Ok(())
    } else {
        Err(LauncherError::ProcessExited {
            code: status.code(),
            output: Vec::from(tail).join("\n"),
        })
    }
}

async fn forward_lines<R>(reader: R, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if tx.send(line).is_err() {
            break;
        }
    }
}

fn configure_native_library_env(cmd: &mut Command, natives_dir: &Path) {
    let native_path = path_arg(natives_dir);

    if cfg!(target_os = "windows") {
        cmd.env("PATH", append_env_path("PATH", &native_path));
    } else if cfg!(target_os = "linux") {
        cmd.env(
            "LD_LIBRARY_PATH",
            append_env_path("LD_LIBRARY_PATH", &native_path),
        );
    } else if cfg!(target_os = "macos") {
        cmd.env(
            "DYLD_LIBRARY_PATH",
            append_env_path("DYLD_LIBRARY_PATH", &native_path),
        );
    }
}

fn configure_platform_spawn(cmd: &mut Command) {
    #[cfg(target_os = "windows")]
    {
        const CREATE_NO_WINDOW: u32 = 0x0800_0000;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }
    #[cfg(not(target_os = "windows"))]
    let _ = cmd;
}

fn append_env_path(var_name: &str, value: &str) -> String {
    let separator = if cfg!(target_os = "windows") {
        ";"
    } else {
        ":"
    };
    match std::env::var(var_name) {
        Ok(existing) if !existing.trim().is_empty() => {
            format!("{}{}{}", value, separator, existing)
        }
        _ => value.to_string(),
    }
}
