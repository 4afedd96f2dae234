use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use log::info;

use crate::datetime::{default_range, parse_datetime};
use crate::report::Report;
use crate::source::ReportSource;
use crate::store::ReportStore;

/// 集計期間を表す引数。
#[derive(Debug, clap::Args)]
pub struct RangeArgs {
    #[clap(
        short = 's',
        long = "since",
        help = "Sets the start of the range (YYYY-MM-DD or RFC 3339), defaults to a month ago",
        parse(try_from_str = parse_datetime),
    )]
    pub since: Option<DateTime<Utc>>,

    #[clap(
        short = 'u',
        long = "until",
        help = "Sets the end of the range (YYYY-MM-DD or RFC 3339), defaults to tomorrow",
        parse(try_from_str = parse_datetime),
    )]
    pub until: Option<DateTime<Utc>>,
}

impl RangeArgs {
    /// 指定されていない端を既定値で補った期間を返す。
    pub fn resolve(&self) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        let (default_since, default_until) = default_range()?;
        let since = self.since.unwrap_or(default_since);
        let until = self.until.unwrap_or(default_until);
        if since > until {
            bail!("--since {} is after --until {}", since, until);
        }

        Ok((since, until))
    }
}

/// `summary`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct SummaryArgs {
    #[clap(flatten)]
    range: RangeArgs,
}

pub struct SummaryCommand<'a, 's, S: ReportSource> {
    store: &'a ReportStore<'s, S>,
}

impl<'a, 's, S: ReportSource> SummaryCommand<'a, 's, S> {
    /// 新しい`SummaryCommand`を返す。
    pub fn new(store: &'a ReportStore<'s, S>) -> Self {
        Self { store }
    }

    /// `summary`サブコマンドの処理を行う。
    ///
    /// 始業時刻が期間内にある日報を日付順に返す。
    pub fn run(&self, summary: SummaryArgs) -> Result<Vec<Report>> {
        let (since, until) = summary.range.resolve()?;
        info!("Since: {}, Until: {}", since, until);

        let reports = self
            .store
            .list(&since, &until)
            .context("Failed to list reports")?;
        info!("Reports read successfully.");

        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use rstest::rstest;

    use super::{RangeArgs, SummaryArgs, SummaryCommand};
    use crate::datetime::mock_datetime;
    use crate::locale::Lang;
    use crate::source::MockReportSource;
    use crate::store::ReportStore;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, day, 0, 0, 0).unwrap()
    }

    #[rstest]
    #[case::both(Some(at(1)), Some(at(3)), (at(1), at(3)))]
    #[case::no_since(None, Some(at(20)), (Utc.with_ymd_and_hms(2024, 12, 10, 0, 0, 0).unwrap(), at(20)))]
    #[case::no_until(Some(at(1)), None, (at(1), at(11)))]
    #[case::same(Some(at(3)), Some(at(3)), (at(3), at(3)))]
    fn test_range_resolve(
        #[case] since: Option<DateTime<Utc>>,
        #[case] until: Option<DateTime<Utc>>,
        #[case] expected: (DateTime<Utc>, DateTime<Utc>),
    ) {
        mock_datetime::set_mock_time(at(10));

        let result = RangeArgs { since, until }.resolve();
        mock_datetime::clear_mock_time();

        assert_eq!(result.unwrap(), expected);
    }

    #[test]
    fn test_range_resolve_inverted() {
        let range = RangeArgs {
            since: Some(at(3)),
            until: Some(at(1)),
        };

        assert!(range.resolve().is_err());
    }

    #[test]
    fn test_summary_command() {
        let mut source = MockReportSource::new();
        source.expect_dates().times(1).returning(|| {
            Ok(vec![
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
            ])
        });
        source
            .expect_read()
            .times(2)
            .returning(|_| Ok("- 始業 09:00\n".to_string()));
        let store = ReportStore::new(&source, &Lang::Ja.keywords());

        let command = SummaryCommand::new(&store);
        let reports = command
            .run(SummaryArgs {
                range: RangeArgs {
                    since: Some(at(1)),
                    until: Some(at(3)),
                },
            })
            .unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }
}
