use serde::Serialize;
use serde_json::Value;

use crate::aggregate::aggregate;
use crate::report::{AggregatedReport, Report};

/// フィルタ式で問い合わせるための文書。
///
/// 経過時間はナノ秒の整数、時刻はUTCのISO 8601形式で表す。
#[derive(Debug, Serialize)]
pub struct Document {
    pub daily: Vec<Report>,
    pub aggregated: AggregatedReport,
}

impl Document {
    /// 日報から文書を組み立てる。`daily`は日付順であること。
    pub fn new(daily: Vec<Report>) -> Self {
        let aggregated = aggregate(&daily);
        Self { daily, aggregated }
    }

    /// JSONの木構造に変換する。
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}
