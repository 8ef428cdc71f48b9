//! シーケンスファイル（NDJSON追記）
//!
//! 1レコード = 1行のJSON。書き込みごとにファイルを開き、1回の `write_all` で
//! 行全体を追記し、`sync_all` してから閉じる。

use crate::audit::sink::AuditSink;
use crate::audit::types::LogRecord;
use crate::common::error::SinkError;
use async_trait::async_trait;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// 追記専用のシーケンスファイル
#[derive(Debug, Clone)]
pub struct SequenceFileSink {
    path: PathBuf,
}

impl SequenceFileSink {
    /// ファイルパスを指定して作成（親ディレクトリがなければ作る）
    pub fn open(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    /// ファイルパス
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// レコードを改行付きの1行にエンコードする
pub fn encode_line(record: &LogRecord) -> Result<Vec<u8>, serde_json::Error> {
    let mut line = serde_json::to_vec(record)?;
    line.push(b'\n');
    Ok(line)
}

fn append_line(path: &Path, line: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line)?;
    file.flush()?;
    file.sync_all()
}

/// シーケンスファイルの全レコードを読み込む（空行は無視）
pub fn read_records(path: &Path) -> Result<Vec<LogRecord>, SinkError> {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut records = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}

#[async_trait]
impl AuditSink for SequenceFileSink {
    fn name(&self) -> &'static str {
        "sequence_file"
    }

    async fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
        let line = encode_line(record)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || append_line(&path, &line))
            .await
            .map_err(|e| SinkError::Task(e.to_string()))??;

        Ok(())
    }
}
