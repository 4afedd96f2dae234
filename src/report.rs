use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::duration::nanos;

/// 1日分の日報。
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub date: NaiveDate,
    pub attendance: Attendance,
    pub tasks: Vec<Task>,
}

/// 勤怠情報。
///
/// 始業・終業が記載されていない日は`None`となり、労働時間は0とする。
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Attendance {
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(rename = "break", serialize_with = "nanos::serialize")]
    pub break_duration: Duration,
    #[serde(rename = "working", serialize_with = "nanos::serialize")]
    pub working_duration: Duration,
}

/// タスク。`(project, description)`の組で同一のタスクとみなす。
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Task {
    pub project: String,
    pub description: String,
    #[serde(rename = "estimated", serialize_with = "nanos::serialize")]
    pub estimated_duration: Duration,
    #[serde(rename = "actual", serialize_with = "nanos::serialize")]
    pub actual_duration: Duration,
    pub completed: bool,
}

/// 複数日のタスクを集計した結果。
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AggregatedReport {
    pub tasks: Vec<Task>,
}

impl Default for Attendance {
    fn default() -> Self {
        Self {
            started_at: None,
            ended_at: None,
            break_duration: Duration::zero(),
            working_duration: Duration::zero(),
        }
    }
}

impl Attendance {
    /// 始業から終業までの時間から休憩時間を引いた労働時間を計算する。
    ///
    /// 始業・終業のいずれかがない場合や、結果が負になる場合は0とする。
    pub fn compute_working_duration(&self) -> Duration {
        match (self.started_at, self.ended_at) {
            (Some(started_at), Some(ended_at)) => {
                (ended_at - started_at - self.break_duration).max(Duration::zero())
            }
            _ => Duration::zero(),
        }
    }
}

impl Report {
    /// 日付のみを持つ空の日報を返す。
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            attendance: Attendance::default(),
            tasks: Vec::new(),
        }
    }
}
