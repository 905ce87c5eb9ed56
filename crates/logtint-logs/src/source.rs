use std::path::PathBuf;
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncSeekExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// How often a followed file is checked for new data
pub const FOLLOW_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Where raw lines come from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineSource {
    Stdin,
    File { path: PathBuf, follow: bool },
}

impl LineSource {
    /// `-` means stdin
    pub fn from_arg(arg: &str, follow: bool) -> Self {
        if arg == "-" {
            Self::Stdin
        } else {
            Self::File {
                path: PathBuf::from(arg),
                follow,
            }
        }
    }

    pub fn name(&self) -> String {
        match self {
            Self::Stdin => "<stdin>".to_string(),
            Self::File { path, .. } => path.display().to_string(),
        }
    }
}

/// Events sent by a running reader
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceEvent {
    /// A complete line, without its line terminator
    Line(String),
    /// The followed file shrank; reading restarts from the beginning
    Truncated,
    /// No more data will come
    Eof,
    Error(String),
}

/// Reads lines from a [`LineSource`] on a background task
pub struct SourceReader {
    /// Cancellation token for stopping the task
    cancel: CancellationToken,

    /// Task handle
    task: Option<tokio::task::JoinHandle<()>>,
}

impl SourceReader {
    /// Start reading; lines are sent in order over `tx`
    pub fn start(source: LineSource, tx: mpsc::UnboundedSender<SourceEvent>) -> Self {
        let cancel = CancellationToken::new();

        let task = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                let result = match &source {
                    LineSource::Stdin => {
                        let reader = BufReader::new(tokio::io::stdin());
                        read_to_end(reader, &tx, &cancel).await
                    }
                    LineSource::File { path, follow: false } => match File::open(path).await {
                        Ok(file) => read_to_end(BufReader::new(file), &tx, &cancel).await,
                        Err(e) => Err(e),
                    },
                    LineSource::File { path, follow: true } => {
                        follow_file(path.clone(), &tx, &cancel).await
                    }
                };

                if let Err(e) = result {
                    tracing::warn!(source = %source.name(), "read failed: {}", e);
                    let _ = tx.send(SourceEvent::Error(format!("{}: {}", source.name(), e)));
                }
            })
        };

        Self {
            cancel,
            task: Some(task),
        }
    }

    /// Stop reading
    pub fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for SourceReader {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Drop the line terminator and decode, replacing invalid UTF-8
fn decode_line(mut bytes: Vec<u8>) -> String {
    if bytes.ends_with(b"\n") {
        bytes.pop();
        if bytes.ends_with(b"\r") {
            bytes.pop();
        }
    }
    match String::from_utf8(bytes) {
        Ok(line) => line,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

async fn read_to_end<R>(
    mut reader: R,
    tx: &mpsc::UnboundedSender<SourceEvent>,
    cancel: &CancellationToken,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let mut buf = Vec::new();
        let read = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            read = reader.read_until(b'\n', &mut buf) => read?,
        };
        if read == 0 {
            let _ = tx.send(SourceEvent::Eof);
            return Ok(());
        }
        if tx.send(SourceEvent::Line(decode_line(buf))).is_err() {
            // Receiver gone
            return Ok(());
        }
    }
}

async fn follow_file(
    path: PathBuf,
    tx: &mpsc::UnboundedSender<SourceEvent>,
    cancel: &CancellationToken,
) -> std::io::Result<()> {
    let mut reader = BufReader::new(File::open(&path).await?);
    let mut offset: u64 = 0;

    // Bytes of a trailing line that has no terminator yet; decoded only once
    // complete so a half written character is never split
    let mut pending = Vec::new();

    loop {
        let read = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            read = reader.read_until(b'\n', &mut pending) => read?,
        };

        if read > 0 {
            offset += read as u64;
            if pending.ends_with(b"\n") {
                let line = decode_line(std::mem::take(&mut pending));
                if tx.send(SourceEvent::Line(line)).is_err() {
                    return Ok(());
                }
            }
            continue;
        }

        let len = tokio::fs::metadata(&path).await?.len();
        if len < offset {
            tracing::debug!(path = %path.display(), len, offset, "file truncated");
            reader.seek(std::io::SeekFrom::Start(0)).await?;
            offset = 0;
            pending.clear();
            if tx.send(SourceEvent::Truncated).is_err() {
                return Ok(());
            }
            continue;
        }

        tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            _ = tokio::time::sleep(FOLLOW_POLL_INTERVAL) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    async fn next(rx: &mut mpsc::UnboundedReceiver<SourceEvent>) -> SourceEvent {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_from_arg() {
        assert_eq!(LineSource::from_arg("-", true), LineSource::Stdin);
        assert_eq!(
            LineSource::from_arg("app.log", false),
            LineSource::File {
                path: PathBuf::from("app.log"),
                follow: false
            }
        );
    }

    #[tokio::test]
    async fn test_reads_file_lines_then_eof() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "INFO a\r\n  b\nERROR c").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _reader = SourceReader::start(
            LineSource::File {
                path: file.path().to_path_buf(),
                follow: false,
            },
            tx,
        );

        assert_eq!(next(&mut rx).await, SourceEvent::Line("INFO a".into()));
        assert_eq!(next(&mut rx).await, SourceEvent::Line("  b".into()));
        assert_eq!(next(&mut rx).await, SourceEvent::Line("ERROR c".into()));
        assert_eq!(next(&mut rx).await, SourceEvent::Eof);
    }

    #[tokio::test]
    async fn test_invalid_utf8_does_not_stop_reading() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"INFO a\n\xff\xfe bad bytes\nERROR c\n").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _reader = SourceReader::start(
            LineSource::File {
                path: file.path().to_path_buf(),
                follow: false,
            },
            tx,
        );

        assert_eq!(next(&mut rx).await, SourceEvent::Line("INFO a".into()));
        assert_eq!(
            next(&mut rx).await,
            SourceEvent::Line("\u{FFFD}\u{FFFD} bad bytes".into())
        );
        assert_eq!(next(&mut rx).await, SourceEvent::Line("ERROR c".into()));
        assert_eq!(next(&mut rx).await, SourceEvent::Eof);
    }

    #[tokio::test]
    async fn test_follow_waits_for_split_character() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        // First half of "é"
        file.write_all(b"WARN caf\xc3").unwrap();
        file.flush().unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _reader = SourceReader::start(
            LineSource::File {
                path: file.path().to_path_buf(),
                follow: true,
            },
            tx,
        );

        tokio::time::sleep(FOLLOW_POLL_INTERVAL * 2).await;
        file.write_all(b"\xa9\n").unwrap();
        file.flush().unwrap();

        assert_eq!(next(&mut rx).await, SourceEvent::Line("WARN café".into()));
    }

    #[tokio::test]
    async fn test_missing_file_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _reader = SourceReader::start(
            LineSource::File {
                path: dir.path().join("nope.log"),
                follow: false,
            },
            tx,
        );

        assert!(matches!(next(&mut rx).await, SourceEvent::Error(_)));
    }

    #[tokio::test]
    async fn test_follow_picks_up_appended_lines_and_truncation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "INFO first").unwrap();
        file.flush().unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut reader = SourceReader::start(
            LineSource::File {
                path: file.path().to_path_buf(),
                follow: true,
            },
            tx,
        );

        assert_eq!(next(&mut rx).await, SourceEvent::Line("INFO first".into()));

        writeln!(file, "WARN second").unwrap();
        file.flush().unwrap();
        assert_eq!(next(&mut rx).await, SourceEvent::Line("WARN second".into()));

        std::fs::write(file.path(), "x\n").unwrap();
        assert_eq!(next(&mut rx).await, SourceEvent::Truncated);
        assert_eq!(next(&mut rx).await, SourceEvent::Line("x".into()));

        assert!(reader.is_running());
        reader.stop();
        assert!(!reader.is_running());
    }
}
