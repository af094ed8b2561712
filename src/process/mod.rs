//! Monitored external processes.
//!
//! A [`MonitoredProcess`] is started, tracked until it exits, and then dropped.
//! Only one is ever active at a time: the terminal viewport is shared and cannot
//! be multiplexed between concurrent renders.

mod lines;

pub use lines::LineReader;

use crate::error::{exit_code_text, Result, YtproError};
use std::collections::VecDeque;
use std::ffi::OsString;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use tokio::io::AsyncRead;
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

/// Number of stderr lines kept for error reporting on streaming runs.
const STDERR_TAIL_LINES: usize = 20;

/// Lines buffered between the background reader and the parser.
const LINE_BUFFER: usize = 64;

/// How a monitored process's output is consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// stdout and stderr both go to a log file.
    CaptureToLog(PathBuf),
    /// stdout and stderr are merged into one stream of lines for a parser.
    StreamToParser,
}

/// An external command together with the way its output is consumed.
#[derive(Debug, Clone)]
pub struct MonitoredProcess {
    pub program: String,
    pub args: Vec<OsString>,
    pub mode: OutputMode,
}

impl MonitoredProcess {
    pub fn new<I, S>(program: &str, args: I, mode: OutputMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            mode,
        }
    }

    /// Human-readable command line for logs.
    pub fn display(&self) -> String {
        let mut out = self.program.clone();
        for arg in &self.args {
            out.push(' ');
            out.push_str(&arg.to_string_lossy());
        }
        out
    }

    /// Start the process with its output wired according to [`OutputMode`].
    ///
    /// In log mode the log file is created (truncated) here and receives both
    /// streams; in parser mode both streams are piped.
    pub fn spawn(&self) -> Result<Child> {
        let (stdout, stderr) = match &self.mode {
            OutputMode::CaptureToLog(path) => {
                let log = File::create(path)?;
                let log_err = log.try_clone()?;
                (Stdio::from(log), Stdio::from(log_err))
            }
            OutputMode::StreamToParser => (Stdio::piped(), Stdio::piped()),
        };

        debug!("Spawning: {}", self.display());
        Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(&self.program, e))
    }
}

/// Exit information collected by the background task.
#[derive(Debug)]
pub struct ExitReport {
    pub status: ExitStatus,
    pub stderr_tail: Vec<String>,
}

/// A running process whose merged output is being drained by the caller.
///
/// The child is owned by a background task. Dropping a `StreamingChild`
/// before [`StreamingChild::finish`] aborts that task, which kills the child.
pub struct StreamingChild {
    lines: mpsc::Receiver<io::Result<String>>,
    exit: JoinHandle<io::Result<ExitReport>>,
    program: String,
}

impl StreamingChild {
    /// Next line from stdout or stderr, `None` once both have closed.
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        self.lines.recv().await.transpose()
    }

    /// Wait for the background task to collect the exit status.
    pub async fn wait(mut self) -> Result<ExitReport> {
        match (&mut self.exit).await {
            Ok(report) => Ok(report?),
            Err(join_err) => Err(YtproError::Io(io::Error::other(format!(
                "wait task for {} did not complete: {join_err}",
                self.program
            )))),
        }
    }

    /// Wait and turn a non-zero exit into [`YtproError::ProcessFailed`].
    pub async fn finish(self) -> Result<()> {
        let program = self.program.clone();
        let report = self.wait().await?;
        if report.status.success() {
            Ok(())
        } else {
            Err(YtproError::ProcessFailed {
                tool: program,
                code: exit_code_text(&report.status),
                stderr: report.stderr_tail.join("\n"),
            })
        }
    }
}

impl Drop for StreamingChild {
    fn drop(&mut self) {
        self.exit.abort();
    }
}

/// Map a spawn error, turning a missing binary into [`YtproError::ToolNotFound`].
pub fn spawn_error(program: &str, err: io::Error) -> YtproError {
    if err.kind() == io::ErrorKind::NotFound {
        YtproError::ToolNotFound(program.to_string())
    } else {
        YtproError::Io(err)
    }
}

/// Start a process in [`OutputMode::StreamToParser`] mode.
///
/// One background task reads stdout and stderr together, forwards every line
/// to [`StreamingChild::next_line`], and then waits for exit.
#[instrument(skip_all, fields(program = %process.program))]
pub fn spawn_streaming(process: &MonitoredProcess) -> Result<StreamingChild> {
    if process.mode != OutputMode::StreamToParser {
        return Err(YtproError::InvalidInput(format!(
            "{} is not set up for streaming output",
            process.program
        )));
    }

    let mut child = process.spawn()?;
    let (stdout, stderr) = match (child.stdout.take(), child.stderr.take()) {
        (Some(out), Some(err)) => (out, err),
        _ => return Err(YtproError::Io(io::Error::other("child output was not captured"))),
    };

    let (tx, rx) = mpsc::channel(LINE_BUFFER);
    let exit = tokio::spawn(async move {
        let (_, stderr_tail) = tokio::join!(
            forward_lines(stdout, tx.clone(), 0),
            forward_lines(stderr, tx, STDERR_TAIL_LINES),
        );
        let status = child.wait().await?;
        Ok(ExitReport { status, stderr_tail })
    });

    Ok(StreamingChild {
        lines: rx,
        exit,
        program: process.program.clone(),
    })
}

/// Run a streaming process to completion, handing every output line to `on_line`.
///
/// A read error before end of stream aborts the run with
/// [`YtproError::StreamRead`] and kills the child.
pub async fn run_streaming<F>(process: &MonitoredProcess, mut on_line: F) -> Result<()>
where
    F: FnMut(&str),
{
    let mut child = spawn_streaming(process)?;
    if let Err(e) = drain_lines(&mut child.lines, &mut on_line).await {
        warn!("Output stream of {} broke: {}", process.program, e);
        return Err(e);
    }
    child.finish().await
}

/// Feed received lines to `on_line` until every sender is gone.
async fn drain_lines<F>(lines: &mut mpsc::Receiver<io::Result<String>>, on_line: &mut F) -> Result<()>
where
    F: FnMut(&str),
{
    while let Some(line) = lines.recv().await {
        let line = line.map_err(YtproError::StreamRead)?;
        on_line(&line);
    }
    Ok(())
}

/// Send each line of `reader` to `tx`, keeping the last `tail_len` non-blank ones.
///
/// A read error is forwarded and ends the stream.
async fn forward_lines<R>(reader: R, tx: mpsc::Sender<io::Result<String>>, tail_len: usize) -> Vec<String>
where
    R: AsyncRead + Unpin,
{
    let mut reader = LineReader::new(reader);
    let mut tail = VecDeque::with_capacity(tail_len);

    loop {
        match reader.next_line().await {
            Ok(Some(line)) => {
                if tail_len > 0 && !line.trim().is_empty() {
                    if tail.len() == tail_len {
                        tail.pop_front();
                    }
                    tail.push_back(line.clone());
                }
                if tx.send(Ok(line)).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                let _ = tx.send(Err(e)).await;
                break;
            }
        }
    }

    tail.into()
}

/// Run a process with inherited stdio, ignoring its exit status.
pub async fn run_passthrough<I, S>(program: &str, args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let status = Command::new(program)
        .args(args)
        .status()
        .await
        .map_err(|e| spawn_error(program, e))?;
    if !status.success() {
        debug!("{} exited with {}", program, exit_code_text(&status));
    }
    Ok(())
}

/// Run a process and return its stdout, failing on non-zero exit.
pub async fn capture_stdout<I, S>(program: &str, args: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| spawn_error(program, e))?;

    if !output.status.success() {
        return Err(YtproError::ProcessFailed {
            tool: program.to_string(),
            code: exit_code_text(&output.status),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Check whether an external tool can be started.
pub async fn tool_available(name: &str) -> bool {
    // ffmpeg/ffprobe use -version (single dash), others use --version
    let version_arg = match name {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    };
    Command::new(name)
        .arg(version_arg)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn streaming(script: &str) -> MonitoredProcess {
        MonitoredProcess::new("sh", ["-c", script], OutputMode::StreamToParser)
    }

    #[test]
    fn test_display_joins_program_and_args() {
        let p = MonitoredProcess::new("ffmpeg", ["-i", "in.webm", "out.mp4"], OutputMode::StreamToParser);
        assert_eq!(p.display(), "ffmpeg -i in.webm out.mp4");
    }

    #[test]
    fn test_spawn_error_maps_not_found() {
        let err = spawn_error("yt-dlp", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, YtproError::ToolNotFound(name) if name == "yt-dlp"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_tool_not_found() {
        let p = MonitoredProcess::new(
            "ytpro-definitely-missing-binary",
            Vec::<String>::new(),
            OutputMode::StreamToParser,
        );
        let err = run_streaming(&p, |_| {}).await.unwrap_err();
        assert!(matches!(err, YtproError::ToolNotFound(_)));
    }

    #[tokio::test]
    async fn test_read_error_mid_stream_is_stream_read() {
        let reader = tokio_test::io::Builder::new()
            .read(b"10%\n20%\n")
            .read_error(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
            .build();
        let (tx, mut rx) = mpsc::channel(8);
        forward_lines(reader, tx, 0).await;

        let mut seen = Vec::new();
        let mut on_line = |line: &str| seen.push(line.to_string());
        let err = drain_lines(&mut rx, &mut on_line).await.unwrap_err();

        assert!(matches!(err, YtproError::StreamRead(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
        assert_eq!(seen, vec!["10%", "20%"]);
    }

    #[tokio::test]
    async fn test_forward_lines_keeps_non_blank_tail() {
        let reader: &'static [u8] = b"one\n\ntwo\nthree\n";
        let (tx, mut rx) = mpsc::channel(8);
        let tail = forward_lines(reader, tx, 2).await;
        assert_eq!(tail, vec!["two", "three"]);

        let mut forwarded = Vec::new();
        while let Some(line) = rx.recv().await {
            forwarded.push(line.unwrap());
        }
        assert_eq!(forwarded, vec!["one", "", "two", "three"]);
    }

    #[tokio::test]
    async fn test_spawn_streaming_needs_parser_mode() {
        let dir = TempDir::new().unwrap();
        let p = MonitoredProcess::new("sh", ["-c", "true"], OutputMode::CaptureToLog(dir.path().join("x.log")));
        assert!(matches!(spawn_streaming(&p), Err(YtproError::InvalidInput(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_log_mode_writes_both_streams_to_file() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("step.log");
        let p = MonitoredProcess::new(
            "sh",
            ["-c", "echo to-out; echo to-err >&2"],
            OutputMode::CaptureToLog(log.clone()),
        );
        let status = p.spawn().unwrap().wait().await.unwrap();
        assert!(status.success());

        let content = std::fs::read_to_string(&log).unwrap();
        assert!(content.contains("to-out"));
        assert!(content.contains("to-err"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_streaming_feeds_stdout_and_stderr_lines() {
        let p = streaming("printf 'a\\nb\\n'; echo ' 42.0%|1MiB/s|00:05|clip.mp4' >&2; printf last");
        let mut seen = Vec::new();
        run_streaming(&p, |line| seen.push(line.to_string())).await.unwrap();

        seen.sort();
        assert_eq!(seen, vec![" 42.0%|1MiB/s|00:05|clip.mp4", "a", "b", "last"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdout_order_is_preserved() {
        let p = streaming("for i in 1 2 3 4 5; do echo $i; done");
        let mut seen = Vec::new();
        run_streaming(&p, |line| seen.push(line.to_string())).await.unwrap();
        assert_eq!(seen, vec!["1", "2", "3", "4", "5"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_carries_stderr_tail() {
        let p = streaming("echo progress; echo 'ERROR: bad url' >&2; exit 3");
        let err = run_streaming(&p, |_| {}).await.unwrap_err();
        match err {
            YtproError::ProcessFailed { tool, code, stderr } => {
                assert_eq!(tool, "sh");
                assert_eq!(code, "3");
                assert_eq!(stderr, "ERROR: bad url");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_dropping_streaming_child_kills_process() {
        let mut child = spawn_streaming(&streaming("echo $$; exec sleep 30")).unwrap();
        let pid: u32 = child.next_line().await.unwrap().unwrap().trim().parse().unwrap();
        drop(child);

        // Killed processes disappear or linger only as zombies until reaped
        let stat = format!("/proc/{pid}/stat");
        let mut gone = false;
        for _ in 0..100 {
            gone = match std::fs::read_to_string(&stat) {
                Err(_) => true,
                Ok(s) => s.rsplit(')').next().map(|rest| rest.trim_start().starts_with('Z')).unwrap_or(false),
            };
            if gone {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert!(gone, "process {pid} still running");
    }

    #[tokio::test]
    async fn test_missing_tool_is_unavailable() {
        assert!(!tool_available("ytpro-definitely-missing-binary").await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_is_available() {
        assert!(tool_available("sh").await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_capture_stdout() {
        let out = capture_stdout("sh", ["-c", "echo 12.5"]).await.unwrap();
        assert_eq!(out.trim(), "12.5");
    }
}
