use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;

use log::debug;
#[cfg(test)]
use mockall::automock;
use serde_json::Value;
use thiserror::Error;

/// フィルタ式の評価に失敗したことを表すエラー。
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("Failed to run {program}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to communicate with {program}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize document")]
    Serialize(#[from] serde_json::Error),

    /// 評価器が異常終了した。標準エラー出力をそのまま保持する。
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}

/// 文書にフィルタ式を適用して文字列を得るためのtrait。
#[cfg_attr(test, automock)]
pub trait FilterEvaluator {
    /// `document`に`filter`を適用した結果を返す。
    fn evaluate(&self, document: &Value, filter: &str) -> Result<String, EvaluatorError>;
}

/// `jq -r`でフィルタ式を評価する。
pub struct JqEvaluator {
    program: String,
}

impl JqEvaluator {
    /// 新しい`JqEvaluator`を返す。
    ///
    /// # Arguments
    ///
    /// * `program` - 実行するjqのパス
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for JqEvaluator {
    fn default() -> Self {
        Self::new("jq")
    }
}

impl FilterEvaluator for JqEvaluator {
    // 文書は標準入力から渡し、出力の前後の空白は取り除く。
    fn evaluate(&self, document: &Value, filter: &str) -> Result<String, EvaluatorError> {
        let input = serde_json::to_vec(document)?;
        let io_error = |source| EvaluatorError::Io {
            program: self.program.clone(),
            source,
        };

        debug!("Run {} -r {:?}", self.program, filter);
        let mut child = Command::new(&self.program)
            .arg("-r")
            .arg(filter)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| EvaluatorError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // 標準入力への書き込みは出力の読み取りと並行して行う。
        let mut stdin = child.stdin.take().ok_or_else(|| {
            io_error(io::Error::new(io::ErrorKind::BrokenPipe, "stdin is not piped"))
        })?;
        let writer = thread::spawn(move || stdin.write_all(&input));

        let output = child.wait_with_output().map_err(io_error)?;
        match writer.join() {
            Ok(Ok(())) => {}
            // 入力を読み切らずに終了した場合は終了状態で判断する。
            Ok(Err(error)) if error.kind() == io::ErrorKind::BrokenPipe => {}
            Ok(Err(error)) => return Err(io_error(error)),
            Err(_) => {
                return Err(io_error(io::Error::new(
                    io::ErrorKind::Other,
                    "writer thread panicked",
                )))
            }
        }

        if !output.status.success() {
            return Err(EvaluatorError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
