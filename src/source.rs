use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::debug;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

/// 日報ファイル名の形式。
const FILE_NAME_FORMAT: &str = "%Y%m%d.md";

/// 日報の読み込みに失敗したことを表すエラー。
#[derive(Debug, Error)]
pub enum SourceError {
    /// 指定された日付の日報が存在しない。
    #[error("Report not found: {date}")]
    NotFound { date: NaiveDate },

    #[error("Failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// 日付ごとの日報本文を提供するためのtrait。
#[cfg_attr(test, automock)]
pub trait ReportSource {
    /// 日報が存在する日付を列挙する。
    fn dates(&self) -> Result<Vec<NaiveDate>, SourceError>;

    /// 指定された日付の日報本文を読み込む。
    ///
    /// # Arguments
    ///
    /// * `date` - 読み込む日報の日付
    fn read(&self, date: NaiveDate) -> Result<String, SourceError>;
}

/// `YYYYMMDD.md`という名前の日報ファイルを1つのディレクトリから読み込む。
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    /// 新しい`DirectorySource`を返す。
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 日報を読み込むディレクトリ。
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(date.format(FILE_NAME_FORMAT).to_string())
    }
}

impl ReportSource for DirectorySource {
    // 日付として解釈できない名前のファイルとディレクトリは対象外とする。
    fn dates(&self) -> Result<Vec<NaiveDate>, SourceError> {
        let io_error = |source| SourceError::Io {
            path: self.dir.clone(),
            source,
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(io_error)? {
            let entry = entry.map_err(io_error)?;
            if entry.file_type().map_err(io_error)?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();

        let dates: Vec<NaiveDate> = names.iter().filter_map(|name| parse_file_name(name)).collect();
        debug!("Found {} reports in {}", dates.len(), self.dir.display());

        Ok(dates)
    }

    fn read(&self, date: NaiveDate) -> Result<String, SourceError> {
        let path = self.path(date);
        fs::read_to_string(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => SourceError::NotFound { date },
            _ => SourceError::Io { path, source },
        })
    }
}

/// ファイル名から日付を取り出す。
fn parse_file_name(name: &str) -> Option<NaiveDate> {
    let stem = name.strip_suffix(".md")?;
    if stem.len() != 8 || !stem.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(stem, "%Y%m%d").ok()
}
