//! Implements ActivityLogPort and ActivityStorePort over JSON Lines files.
//! One file per user: {base_dir}/{user_id}.jsonl, one dated record per line. Append-only
//! writes; newest-first reads scan backwards from EOF in fixed-size blocks.

use crate::domain::{ActivityLogEvent, ActivityRecord, DomainError};
use crate::ports::{ActivityLogPort, ActivityStorePort};
use chrono::Utc;
use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tracing::{info, warn};

/// Block size for reverse reads.
const REVERSE_READ_BLOCK: u64 = 4096;

pub struct JsonlActivityStore {
    base_dir: PathBuf,
}

impl JsonlActivityStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Platform ids are alphanumeric; anything else is replaced so an id can never
    /// escape the base directory.
    fn user_path(&self, user_id: &str) -> PathBuf {
        let safe: String = user_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.base_dir.join(format!("{}.jsonl", safe))
    }

    /// Reads up to `max_lines` non-empty lines from the end of the file, newest first.
    async fn read_lines_reverse(path: &Path, max_lines: usize) -> Result<Vec<String>, DomainError> {
        let mut f = match fs::File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(DomainError::ActivityStore(e.to_string())),
        };
        let len = f
            .metadata()
            .await
            .map_err(|e| DomainError::ActivityStore(e.to_string()))?
            .len();

        let mut lines: Vec<String> = Vec::with_capacity(max_lines.min(1024));
        let mut pending: Vec<u8> = Vec::new();
        let mut pos = len;

        while lines.len() < max_lines && pos > 0 {
            let read_start = pos.saturating_sub(REVERSE_READ_BLOCK);
            let to_read = (pos - read_start) as usize;

            f.seek(SeekFrom::Start(read_start))
                .await
                .map_err(|e| DomainError::ActivityStore(e.to_string()))?;
            let mut block = vec![0u8; to_read];
            f.read_exact(&mut block)
                .await
                .map_err(|e| DomainError::ActivityStore(e.to_string()))?;
            pos = read_start;

            // File order: block (nearer BOF) then pending (nearer EOF)
            let mut buf = block;
            buf.append(&mut pending);

            while lines.len() < max_lines {
                let Some(last_nl) = buf.iter().rposition(|&b| b == b'\n') else {
                    break;
                };
                let line_bytes = buf.split_off(last_nl + 1);
                buf.pop();
                push_line(&mut lines, &line_bytes);
            }
            pending = buf;
        }

        if lines.len() < max_lines {
            push_line(&mut lines, &pending);
        }
        Ok(lines)
    }
}

fn push_line(lines: &mut Vec<String>, bytes: &[u8]) {
    let line = String::from_utf8_lossy(bytes);
    let trimmed = line.trim();
    if !trimmed.is_empty() {
        lines.push(trimmed.to_string());
    }
}

#[async_trait::async_trait]
impl ActivityLogPort for JsonlActivityStore {
    /// Appends one record dated today (UTC).
    async fn record(&self, event: &ActivityLogEvent) -> Result<(), DomainError> {
        fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| DomainError::ActivityStore(e.to_string()))?;
        let record = ActivityRecord {
            date: Utc::now().format("%Y-%m-%d").to_string(),
            entry: event.entry.clone(),
        };
        let mut line =
            serde_json::to_string(&record).map_err(|e| DomainError::ActivityStore(e.to_string()))?;
        line.push('\n');

        let path = self.user_path(&event.user_id);
        let mut f = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| DomainError::ActivityStore(e.to_string()))?;
        f.write_all(line.as_bytes())
            .await
            .map_err(|e| DomainError::ActivityStore(e.to_string()))?;
        f.flush()
            .await
            .map_err(|e| DomainError::ActivityStore(e.to_string()))?;

        info!(
            path = %path.display(),
            user_id = %event.user_id,
            date = %record.date,
            "activity recorded (JSONL)"
        );
        Ok(())
    }
}

#[async_trait::async_trait]
impl ActivityStorePort for JsonlActivityStore {
    async fn recent_activity(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<ActivityRecord>, DomainError> {
        if limit == 0 {
            return Ok(vec![]);
        }
        let path = self.user_path(user_id);
        let lines = Self::read_lines_reverse(&path, limit).await?;

        let mut records = Vec::with_capacity(lines.len());
        for line in lines {
            match serde_json::from_str::<ActivityRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping malformed activity line"),
            }
        }
        Ok(records)
    }
}
