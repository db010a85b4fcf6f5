//! Append-only access log.
//!
//! One line per completed request:
//!
//! ```text
//! 2026-10-16 09:30:00 203.0.113.7 GET /index.html 200
//! 2026-10-16 09:30:01 203.0.113.9 - - 400
//! ```
//!
//! Appends are serialized through one lock held only for the duration of a
//! single line's write, so concurrent workers never interleave lines. The
//! file is opened in append mode for each write and recreated if it has been
//! removed. Write failures are reported on the operational log and never
//! reach the request that triggered them.

use std::fmt;
use std::io;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::error;

/// Method/path placeholder used when the request line could not be parsed
/// or one of its tokens is empty.
pub const PLACEHOLDER: &str = "-";

/// One access-log line.
#[derive(Clone, Debug)]
pub struct LogEntry {
    pub timestamp: chrono::NaiveDateTime,
    pub client: IpAddr,
    pub method: String,
    pub path: String,
    pub status: u16,
}

impl LogEntry {
    /// Entry stamped with the current local time. An empty method or path
    /// is recorded as [`PLACEHOLDER`] so every line keeps six fields.
    pub fn now(client: IpAddr, method: impl Into<String>, path: impl Into<String>, status: u16) -> Self {
        Self {
            timestamp: chrono::Local::now().naive_local(),
            client,
            method: field(method.into()),
            path: field(path.into()),
            status,
        }
    }

    /// Entry for a request whose method and path are unknown.
    pub fn malformed(client: IpAddr, status: u16) -> Self {
        Self::now(client, PLACEHOLDER, PLACEHOLDER, status)
    }
}

fn field(token: String) -> String {
    if token.is_empty() { PLACEHOLDER.to_owned() } else { token }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.client,
            self.method,
            self.path,
            self.status,
        )
    }
}

/// Shared handle to the access log file.
#[derive(Debug)]
pub struct AccessLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl AccessLog {
    /// Creates the log file (and its parent directory) if absent.
    pub async fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        OpenOptions::new().create(true).append(true).open(&path).await?;
        Ok(Self { path, lock: Mutex::new(()) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one line. Failures are logged, not returned.
    pub async fn append(&self, entry: &LogEntry) {
        let line = format!("{entry}\n");
        let _guard = self.lock.lock().await;
        if let Err(e) = self.write_line(line.as_bytes()).await {
            error!(file = %self.path.display(), "failed to write access log: {e}");
        }
    }

    async fn write_line(&self, line: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path).await?;
        file.write_all(line).await?;
        file.flush().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn localhost() -> IpAddr {
        IpAddr::from([127, 0, 0, 1])
    }

    #[test]
    fn entry_formats_whitespace_separated_fields() {
        let timestamp = chrono::NaiveDate::from_ymd_opt(2026, 10, 16)
            .and_then(|d| d.and_hms_opt(9, 5, 7))
            .unwrap();
        let entry = LogEntry {
            timestamp,
            client: localhost(),
            method: "GET".into(),
            path: "/a?b=c".into(),
            status: 200,
        };
        assert_eq!(entry.to_string(), "2026-10-16 09:05:07 127.0.0.1 GET /a?b=c 200");
    }

    #[test]
    fn malformed_entry_uses_placeholders() {
        let line = LogEntry::malformed(localhost(), 400).to_string();
        assert!(line.ends_with(" 127.0.0.1 - - 400"), "{line}");
    }

    #[test]
    fn empty_tokens_become_placeholders() {
        let line = LogEntry::now(localhost(), "GET", "", 404).to_string();
        assert!(line.ends_with(" 127.0.0.1 GET - 404"), "{line}");
        assert_eq!(line.split(' ').count(), 6);

        let line = LogEntry::now(localhost(), "", "", 400).to_string();
        assert!(line.ends_with(" - - 400"), "{line}");
    }

    #[tokio::test]
    async fn open_creates_missing_file_and_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/access.log");
        let log = AccessLog::open(&path).await.unwrap();
        assert!(path.is_file());
        assert_eq!(log.path(), path);
    }

    #[tokio::test]
    async fn concurrent_appends_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(AccessLog::open(dir.path().join("access.log")).await.unwrap());

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..64 {
            let log = Arc::clone(&log);
            tasks.spawn(async move {
                log.append(&LogEntry::now(localhost(), "GET", format!("/file-{i}"), 200)).await;
            });
        }
        while tasks.join_next().await.is_some() {}

        let contents = tokio::fs::read_to_string(log.path()).await.unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 64);
        for line in lines {
            let fields: Vec<&str> = line.split(' ').collect();
            assert_eq!(fields.len(), 6, "{line}");
            assert_eq!(fields[2], "127.0.0.1");
            assert!(fields[4].starts_with("/file-"));
            assert_eq!(fields[5], "200");
        }
    }

    #[tokio::test]
    async fn append_recreates_deleted_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = AccessLog::open(dir.path().join("access.log")).await.unwrap();
        tokio::fs::remove_file(log.path()).await.unwrap();

        log.append(&LogEntry::now(localhost(), "POST", "/echo", 200)).await;
        let contents = tokio::fs::read_to_string(log.path()).await.unwrap();
        assert!(contents.ends_with(" POST /echo 200\n"));
    }

    #[tokio::test]
    async fn failed_write_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let log = AccessLog::open(dir.path().join("access.log")).await.unwrap();
        tokio::fs::remove_file(log.path()).await.unwrap();
        tokio::fs::create_dir(log.path()).await.unwrap();

        log.append(&LogEntry::now(localhost(), "GET", "/", 200)).await;
        assert!(log.path().is_dir());

        // The lock is released after a failed write.
        tokio::fs::remove_dir(log.path()).await.unwrap();
        log.append(&LogEntry::now(localhost(), "GET", "/again", 200)).await;
        let contents = tokio::fs::read_to_string(log.path()).await.unwrap();
        assert!(contents.ends_with(" GET /again 200\n"), "{contents}");
    }
}
