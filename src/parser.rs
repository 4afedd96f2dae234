use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::duration::{parse_clock, parse_composite, MalformedDuration};
use crate::locale::Keywords;
use crate::report::{Report, Task};

/// プロジェクト行。`- [ ] プロジェクト名`
static PROJECT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^- \[.\] (.+)$").unwrap());

/// タスク行。`  - [x] 見積もり/実績 タスク名`
static TASK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s+- \[(.?)\] (\S+)/(\S+) (.+)$").unwrap());

/// 構造化された部分の終わりを示す行。
const TERMINATOR: &str = "---";

/// 日報の解析に失敗したことを表すエラー。
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Failed to parse line {line_number}: {line:?}")]
pub struct ParseError {
    pub line_number: usize,
    pub line: String,
    #[source]
    pub source: MalformedDuration,
}

/// 1行の分類結果。
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Start(&'a str),
    End(&'a str),
    Break(&'a str),
    Project(&'a str),
    Task {
        completed: bool,
        estimated: &'a str,
        actual: &'a str,
        description: &'a str,
    },
    Terminator,
    Other,
}

/// 行を走査する間に持ち回る状態。
struct ScanState {
    project: String,
    report: Report,
}

/// Markdown形式の日報を`Report`に変換する。
pub struct ReportParser {
    start_prefix: String,
    end_prefix: String,
    break_prefix: String,
}

impl ReportParser {
    /// 新しい`ReportParser`を返す。
    ///
    /// # Arguments
    ///
    /// * `keywords` - 始業・終業・休憩の行を識別するキーワード
    pub fn new(keywords: &Keywords) -> Self {
        Self {
            start_prefix: format!("- {} ", keywords.start),
            end_prefix: format!("- {} ", keywords.end),
            break_prefix: format!("- {} ", keywords.break_time),
        }
    }

    /// 1日分の日報を解析する。
    ///
    /// 始業・終業は`date`の0時(UTC)からの時刻として解釈する。
    /// `---`の行以降は読まない。認識できない行は無視する。
    ///
    /// # Arguments
    ///
    /// * `date` - 日報の日付
    /// * `text` - 日報の本文
    pub fn parse(&self, date: NaiveDate, text: &str) -> Result<Report, ParseError> {
        let initial = ScanState {
            project: String::new(),
            report: Report::new(date),
        };

        let state = text
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line, self.classify(line)))
            .take_while(|(_, _, kind)| *kind != Line::Terminator)
            .try_fold(initial, |state, (line_number, line, kind)| {
                apply(state, kind).map_err(|source| ParseError {
                    line_number,
                    line: line.to_string(),
                    source,
                })
            })?;

        let mut report = state.report;
        report.attendance.working_duration = report.attendance.compute_working_duration();
        Ok(report)
    }

    /// 行の種類を判定する。先に一致したものを採用する。
    fn classify<'a>(&self, line: &'a str) -> Line<'a> {
        if let Some(token) = line.strip_prefix(self.start_prefix.as_str()) {
            return Line::Start(token.trim());
        }
        if let Some(token) = line.strip_prefix(self.end_prefix.as_str()) {
            return Line::End(token.trim());
        }
        if let Some(token) = line.strip_prefix(self.break_prefix.as_str()) {
            return Line::Break(token.trim());
        }
        if let Some(label) = PROJECT_PATTERN
            .captures(line)
            .and_then(|captures| captures.get(1))
            .map(|label| label.as_str().trim())
            .filter(|label| !label.is_empty())
        {
            return Line::Project(label);
        }
        if let Some(captures) = TASK_PATTERN.captures(line) {
            if let (Some(mark), Some(estimated), Some(actual), Some(description)) = (
                captures.get(1),
                captures.get(2),
                captures.get(3),
                captures.get(4),
            ) {
                return Line::Task {
                    completed: mark.as_str() == "x",
                    estimated: estimated.as_str(),
                    actual: actual.as_str(),
                    description: description.as_str(),
                };
            }
        }
        if line == TERMINATOR {
            return Line::Terminator;
        }
        Line::Other
    }
}

/// 1行分の内容を状態に反映する。
fn apply(mut state: ScanState, line: Line<'_>) -> Result<ScanState, MalformedDuration> {
    let midnight = state.report.date.and_time(NaiveTime::MIN).and_utc();
    let attendance = &mut state.report.attendance;
    match line {
        Line::Start(token) => attendance.started_at = Some(midnight + parse_clock(token)?),
        Line::End(token) => attendance.ended_at = Some(midnight + parse_clock(token)?),
        Line::Break(token) => attendance.break_duration = parse_clock(token)?,
        Line::Project(label) => state.project = label.to_string(),
        Line::Task {
            completed,
            estimated,
            actual,
            description,
        } => {
            let task = Task {
                project: state.project.clone(),
                description: description.to_string(),
                estimated_duration: parse_composite(estimated)?,
                actual_duration: parse_composite(actual)?,
                completed,
            };
            state.report.tasks.push(task);
        }
        Line::Terminator | Line::Other => {}
    }
    Ok(state)
}
