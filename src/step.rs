//! Spinner-monitored steps with output captured to a log file.
//!
//! Used for package-manager installs: the command's stdout and stderr both go
//! to a per-step log, a one-line spinner runs until the process exits, and on
//! failure the tail of the log is shown.

use crate::error::{exit_code_text, Result, YtproError};
use crate::process::{MonitoredProcess, OutputMode};
use chrono::{DateTime, Local};
use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const SPINNER_FRAMES: &[&str] = &["|", "/", "-", "\\", " "];

/// Lifecycle of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Running,
    Succeeded,
    Failed,
}

/// What happened to a step that ran to completion.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub state: StepState,
    pub log_path: PathBuf,
    pub exit_code: String,
}

/// Runs install steps one after another, each with its own log file.
pub struct StepRunner<W: Write = io::Stdout> {
    log_dir: PathBuf,
    started: DateTime<Local>,
    ordinal: u32,
    interval: Duration,
    tail_len: usize,
    out: W,
    show_spinner: bool,
    state: Option<StepState>,
}

impl StepRunner<io::Stdout> {
    pub fn new(log_dir: impl Into<PathBuf>, interval: Duration, tail_len: usize) -> Self {
        Self {
            log_dir: log_dir.into(),
            started: Local::now(),
            ordinal: 0,
            interval,
            tail_len,
            out: io::stdout(),
            show_spinner: true,
            state: None,
        }
    }
}

impl<W: Write> StepRunner<W> {
    /// Runner that writes its status lines to `out` and never draws a spinner.
    pub fn with_output(log_dir: impl Into<PathBuf>, interval: Duration, tail_len: usize, out: W) -> Self {
        Self {
            log_dir: log_dir.into(),
            started: Local::now(),
            ordinal: 0,
            interval,
            tail_len,
            out,
            show_spinner: false,
            state: None,
        }
    }

    /// Path of the log for the next step.
    fn next_log_path(&mut self) -> PathBuf {
        self.ordinal += 1;
        self.log_dir.join(format!(
            "step_{}_{:02}.log",
            self.started.format("%Y%m%d-%H%M%S"),
            self.ordinal
        ))
    }

    fn spinner(&self, label: &str) -> ProgressBar {
        let target = if self.show_spinner {
            ProgressDrawTarget::stdout()
        } else {
            ProgressDrawTarget::hidden()
        };
        let pb = ProgressBar::with_draw_target(None, target);
        pb.set_style(
            ProgressStyle::default_spinner()
                .tick_strings(SPINNER_FRAMES)
                .template("{spinner} {msg}…")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(label.to_string());
        pb
    }

    /// Run one step to completion.
    ///
    /// A non-zero exit prints the failure, the log path and the log tail, then
    /// returns [`YtproError::StepFailed`]. Callers treat that as fatal.
    #[instrument(skip_all, fields(step = %label))]
    pub async fn run(&mut self, label: &str, program: &str, args: &[&str]) -> Result<StepOutcome> {
        std::fs::create_dir_all(&self.log_dir)?;
        let log_path = self.next_log_path();
        let process = MonitoredProcess::new(
            program,
            args.iter().copied(),
            OutputMode::CaptureToLog(log_path.clone()),
        );
        debug!("Running step: {} (log: {})", process.display(), log_path.display());

        let mut child = process.spawn()?;

        self.state = Some(StepState::Running);
        let mut wait = tokio::spawn(async move { child.wait().await });

        let spinner = self.spinner(label);
        let mut ticker = tokio::time::interval(self.interval);
        let joined = loop {
            tokio::select! {
                res = &mut wait => break res,
                _ = ticker.tick() => spinner.tick(),
            }
        };
        spinner.finish_and_clear();

        let status = match joined {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                self.state = Some(StepState::Failed);
                return Err(e.into());
            }
            Err(e) => {
                self.state = Some(StepState::Failed);
                return Err(YtproError::Io(io::Error::other(format!("step wait task failed: {e}"))));
            }
        };
        let exit_code = exit_code_text(&status);

        if status.success() {
            info!("Step succeeded");
            self.state = Some(StepState::Succeeded);
            writeln!(self.out, "{} {}", style("✔").green(), style(label).green())?;
            return Ok(StepOutcome {
                state: StepState::Succeeded,
                log_path,
                exit_code,
            });
        }

        warn!("Step exited with {}", exit_code);
        self.state = Some(StepState::Failed);
        let tail = tail_lines(&log_path, self.tail_len).unwrap_or_default();
        writeln!(self.out, "{} {}", style("✖").red(), style(format!("{label} failed.")).red())?;
        writeln!(self.out, "{} {}", style("See log:").dim(), log_path.display())?;
        for line in &tail {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()?;

        Err(YtproError::StepFailed {
            step: label.to_string(),
            log_path,
            code: exit_code,
        })
    }

    /// State of the most recent step, `None` before the first one.
    pub fn last_state(&self) -> Option<StepState> {
        self.state
    }

    pub fn into_output(self) -> W {
        self.out
    }
}

/// Read the last `n` lines of a file.
pub fn tail_lines(path: &Path, n: usize) -> io::Result<Vec<String>> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    Ok(lines[start..].iter().map(|l| l.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn runner(dir: &TempDir) -> StepRunner<Vec<u8>> {
        StepRunner::with_output(dir.path(), Duration::from_millis(10), 15, Vec::new())
    }

    #[test]
    fn test_tail_lines_shorter_than_limit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("short.log");
        std::fs::write(&path, "a\nb\n").unwrap();
        assert_eq!(tail_lines(&path, 15).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_tail_lines_keeps_last_n() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("long.log");
        let content: String = (1..=30).map(|i| format!("line{i}\n")).collect();
        std::fs::write(&path, content).unwrap();

        let tail = tail_lines(&path, 15).unwrap();
        assert_eq!(tail.len(), 15);
        assert_eq!(tail.first().map(String::as_str), Some("line16"));
        assert_eq!(tail.last().map(String::as_str), Some("line30"));
    }

    #[test]
    fn test_log_paths_are_unique_per_step() {
        let dir = TempDir::new().unwrap();
        let mut runner = runner(&dir);
        let first = runner.next_log_path();
        let second = runner.next_log_path();
        assert_ne!(first, second);
        assert!(first.to_string_lossy().ends_with("_01.log"));
        assert!(second.to_string_lossy().ends_with("_02.log"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_step() {
        let dir = TempDir::new().unwrap();
        let mut runner = runner(&dir);

        let outcome = runner
            .run("Saying hello", "sh", &["-c", "echo hello; echo warn >&2"])
            .await
            .unwrap();

        assert_eq!(outcome.state, StepState::Succeeded);
        assert_eq!(runner.last_state(), Some(StepState::Succeeded));
        assert_eq!(outcome.exit_code, "0");
        let log = std::fs::read_to_string(&outcome.log_path).unwrap();
        assert!(log.contains("hello"));
        assert!(log.contains("warn"));

        let printed = String::from_utf8(runner.into_output()).unwrap();
        assert!(printed.contains("Saying hello"));
        assert_eq!(printed.lines().count(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_step_reports_log_and_tail() {
        let dir = TempDir::new().unwrap();
        let mut runner = runner(&dir);

        let script = "i=1; while [ $i -le 30 ]; do echo out$i; echo err$i >&2; i=$((i+1)); done; exit 4";
        let err = runner.run("Installing things", "sh", &["-c", script]).await.unwrap_err();

        let log_path = match err {
            YtproError::StepFailed { step, log_path, code } => {
                assert_eq!(step, "Installing things");
                assert_eq!(code, "4");
                log_path
            }
            other => panic!("unexpected error: {other}"),
        };
        assert_eq!(runner.last_state(), Some(StepState::Failed));

        // Combined output in the log
        let log = std::fs::read_to_string(&log_path).unwrap();
        assert!(log.contains("out1\n"));
        assert!(log.contains("err30\n"));
        assert_eq!(log.lines().count(), 60);

        // Failure line, log path line, then at most 15 lines of tail
        let printed = String::from_utf8(runner.into_output()).unwrap();
        let lines: Vec<&str> = printed.lines().collect();
        assert!(lines[0].contains("Installing things failed."));
        assert!(lines[1].contains(&log_path.display().to_string()));
        assert_eq!(lines.len() - 2, 15);
        assert!(lines.last().unwrap().contains("30"));
    }

    #[tokio::test]
    async fn test_missing_program_is_tool_not_found() {
        let dir = TempDir::new().unwrap();
        let mut runner = runner(&dir);
        let err = runner
            .run("Nothing", "ytpro-definitely-missing-binary", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, YtproError::ToolNotFound(_)));
    }
}
