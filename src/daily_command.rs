use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use log::info;

use crate::datetime::{now, parse_date};
use crate::report::Report;
use crate::source::ReportSource;
use crate::store::ReportStore;

/// 1日分の日報を出力するためのサブコマンド。
#[derive(Debug, clap::Args)]
pub struct DailyArgs {
    #[clap(
        short = 'd',
        long = "date",
        help = "Sets a custom date in the format YYYY-MM-DD",
        parse(try_from_str = parse_date),
    )]
    date: Option<NaiveDate>,
}

pub struct DailyCommand<'a, 's, S: ReportSource> {
    store: &'a ReportStore<'s, S>,
}

impl<'a, 's, S: ReportSource> DailyCommand<'a, 's, S> {
    /// 新しい`DailyCommand`を返す。
    ///
    /// # Arguments
    /// * `store` - 日報を読み込むためのストア
    pub fn new(store: &'a ReportStore<'s, S>) -> Self {
        Self { store }
    }

    /// `daily`サブコマンドの処理を行う。
    ///
    /// 日付が指定されていない場合は、Localタイムゾーンで現在の日付を利用する。
    /// 日報が存在しない場合はエラーとする。
    pub fn run(&self, daily: DailyArgs) -> Result<Vec<Report>> {
        let date = daily
            .date
            .unwrap_or_else(|| now().with_timezone(&Local).date_naive());
        info!("Date: {}", date);

        let report = self
            .store
            .get(date)
            .with_context(|| format!("Failed to read report of {}", date))?;

        Ok(vec![report])
    }
}
