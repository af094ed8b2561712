//! Line-oriented reading of child process output.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Splits an async byte stream into text lines.
///
/// Lines are split on `\n`, a trailing `\r` is dropped, and invalid UTF-8 is
/// replaced rather than rejected. A final line without a terminator is still
/// returned. The reader is not rewindable: once a line is handed out it is gone.
pub struct LineReader<R> {
    inner: BufReader<R>,
    buf: Vec<u8>,
    finished: bool,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            inner: BufReader::new(reader),
            buf: Vec::with_capacity(256),
            finished: false,
        }
    }

    /// Read the next line.
    ///
    /// Returns `Ok(None)` at end of stream. A read error is returned as-is and
    /// ends the sequence; callers treat it as fatal for the process being read.
    pub async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        if self.finished {
            return Ok(None);
        }

        self.buf.clear();
        let read = match self.inner.read_until(b'\n', &mut self.buf).await {
            Ok(n) => n,
            Err(e) => {
                self.finished = true;
                return Err(e);
            }
        };

        if read == 0 {
            self.finished = true;
            return Ok(None);
        }

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
        }
        if self.buf.last() == Some(&b'\r') {
            self.buf.pop();
        }

        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(input: &'static [u8]) -> Vec<String> {
        let mut reader = LineReader::new(input);
        let mut lines = Vec::new();
        while let Some(line) = reader.next_line().await.unwrap() {
            lines.push(line);
        }
        lines
    }

    #[tokio::test]
    async fn test_splits_on_newline() {
        assert_eq!(collect(b"a\nb\n").await, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_keeps_unterminated_final_line() {
        assert_eq!(collect(b"progress=continue\nprogress=end").await, vec![
            "progress=continue",
            "progress=end"
        ]);
    }

    #[tokio::test]
    async fn test_strips_carriage_return_and_keeps_blank_lines() {
        assert_eq!(collect(b"one\r\n\r\ntwo\r\n").await, vec!["one", "", "two"]);
    }

    #[tokio::test]
    async fn test_empty_stream_yields_nothing() {
        assert!(collect(b"").await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced() {
        let lines = collect(b"caf\xff\n").await;
        assert_eq!(lines, vec!["caf\u{fffd}"]);
    }

    #[tokio::test]
    async fn test_read_error_ends_sequence() {
        let mock = tokio_test::io::Builder::new()
            .read(b"first\n")
            .read_error(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"))
            .build();
        let mut reader = LineReader::new(mock);

        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("first"));
        let err = reader.next_line().await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
        assert!(reader.next_line().await.unwrap().is_none());
    }
}
