use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info, warn};
use thiserror::Error;

use crate::locale::Keywords;
use crate::parser::{ParseError, ReportParser};
use crate::report::Report;
use crate::source::{ReportSource, SourceError};

/// 日報の取得に失敗したことを表すエラー。
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Failed to parse report of {date}")]
    Parse {
        date: NaiveDate,
        #[source]
        source: ParseError,
    },
}

/// 日報を読み込み、解析済みの`Report`として返す。
pub struct ReportStore<'a, S: ReportSource> {
    source: &'a S,
    parser: ReportParser,
}

impl<'a, S: ReportSource> ReportStore<'a, S> {
    /// 新しい`ReportStore`を返す。
    ///
    /// # Arguments
    ///
    /// * `source` - 日報本文の読み込み元
    /// * `keywords` - 日報の解析に使うキーワード
    pub fn new(source: &'a S, keywords: &Keywords) -> Self {
        Self {
            source,
            parser: ReportParser::new(keywords),
        }
    }

    /// 始業時刻が`since`以上`until`以下の日報を始業時刻の昇順で返す。
    ///
    /// 始業時刻のない日報は含まない。列挙後に見つからなくなった日報は飛ばし、
    /// それ以外の読み込みか解析に1件でも失敗した場合はエラーとする。
    pub fn list(
        &self,
        since: &DateTime<Utc>,
        until: &DateTime<Utc>,
    ) -> Result<Vec<Report>, StoreError> {
        let mut reports = Vec::new();
        for date in self.source.dates()? {
            let text = match self.source.read(date) {
                Ok(text) => text,
                Err(SourceError::NotFound { date }) => {
                    warn!("Report of {} disappeared, skipped", date);
                    continue;
                }
                Err(error) => return Err(error.into()),
            };
            reports.push(self.parse(date, &text)?);
        }
        debug!("Parsed {} reports", reports.len());

        reports.retain(|report| {
            report
                .attendance
                .started_at
                .map_or(false, |started_at| *since <= started_at && started_at <= *until)
        });
        reports.sort_by_key(|report| report.attendance.started_at);
        info!(
            "{} reports started between {} and {}",
            reports.len(),
            since,
            until
        );

        Ok(reports)
    }

    /// 指定された日付の日報を返す。日報が存在しない場合はエラーとする。
    pub fn get(&self, date: NaiveDate) -> Result<Report, StoreError> {
        let text = self.source.read(date)?;
        self.parse(date, &text)
    }

    fn parse(&self, date: NaiveDate, text: &str) -> Result<Report, StoreError> {
        self.parser
            .parse(date, text)
            .map_err(|source| StoreError::Parse { date, source })
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::PathBuf;

    use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
    use mockall::predicate::eq;
    use rstest::rstest;

    use super::{ReportStore, StoreError};
    use crate::locale::Lang;
    use crate::source::{MockReportSource, SourceError};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, day, hour, minute, 0).unwrap()
    }

    /// 1日から3日まで、それぞれ`start`に始業した日報を返すモック。
    fn mock_source(starts: [&'static str; 3]) -> MockReportSource {
        let mut source = MockReportSource::new();
        source
            .expect_dates()
            .returning(|| Ok(vec![date(1), date(2), date(3)]));
        source.expect_read().returning(move |date| {
            let start = starts[date.day0() as usize];
            Ok(format!("- 始業 {}\n- 終業 18:00\n", start))
        });
        source
    }

    fn started_at(reports: &[crate::report::Report]) -> Vec<DateTime<Utc>> {
        reports
            .iter()
            .map(|report| report.attendance.started_at.unwrap())
            .collect()
    }

    #[rstest]
    #[case::all(at(1, 9, 30), at(3, 9, 15), vec![at(1, 9, 30), at(2, 10, 0), at(3, 9, 15)])]
    #[case::until_one_minute_before(at(1, 9, 30), at(3, 9, 14), vec![at(1, 9, 30), at(2, 10, 0)])]
    #[case::since_one_minute_after(at(1, 9, 31), at(3, 9, 15), vec![at(2, 10, 0), at(3, 9, 15)])]
    #[case::empty(at(4, 0, 0), at(5, 0, 0), vec![])]
    fn test_list_inclusive_bounds(
        #[case] since: DateTime<Utc>,
        #[case] until: DateTime<Utc>,
        #[case] expected: Vec<DateTime<Utc>>,
    ) {
        let source = mock_source(["09:30", "10:00", "09:15"]);
        let store = ReportStore::new(&source, &Lang::Ja.keywords());

        let reports = store.list(&since, &until).unwrap();

        assert_eq!(started_at(&reports), expected);
    }

    #[test]
    fn test_list_excludes_one_microsecond_past_until() {
        let source = mock_source(["09:30", "10:00", "09:15"]);
        let store = ReportStore::new(&source, &Lang::Ja.keywords());
        let until = at(3, 9, 15) - Duration::microseconds(1);

        let reports = store.list(&at(1, 0, 0), &until).unwrap();

        assert_eq!(started_at(&reports), vec![at(1, 9, 30), at(2, 10, 0)]);
    }

    #[test]
    fn test_list_sorted_by_started_at() {
        let mut source = MockReportSource::new();
        source
            .expect_dates()
            .returning(|| Ok(vec![date(3), date(1)]));
        source
            .expect_read()
            .returning(|_| Ok("- 始業 09:00\n".to_string()));
        let store = ReportStore::new(&source, &Lang::Ja.keywords());

        let reports = store.list(&at(1, 0, 0), &at(31, 0, 0)).unwrap();

        assert_eq!(started_at(&reports), vec![at(1, 9, 0), at(3, 9, 0)]);
    }

    #[test]
    fn test_list_excludes_reports_without_start() {
        let mut source = MockReportSource::new();
        source.expect_dates().returning(|| Ok(vec![date(1)]));
        source
            .expect_read()
            .returning(|_| Ok("- 終業 18:00\n".to_string()));
        let store = ReportStore::new(&source, &Lang::Ja.keywords());

        let reports = store.list(&at(1, 0, 0), &at(31, 0, 0)).unwrap();

        assert!(reports.is_empty());
    }

    #[test]
    fn test_list_read_error_is_fatal() {
        let mut source = MockReportSource::new();
        source.expect_dates().returning(|| Ok(vec![date(1)]));
        source.expect_read().returning(|_| {
            Err(SourceError::Io {
                path: PathBuf::from("20250101.md"),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            })
        });
        let store = ReportStore::new(&source, &Lang::Ja.keywords());

        let result = store.list(&at(1, 0, 0), &at(31, 0, 0));

        assert!(matches!(
            result,
            Err(StoreError::Source(SourceError::Io { .. }))
        ));
    }

    #[test]
    fn test_list_skips_not_found() {
        let mut source = MockReportSource::new();
        source
            .expect_dates()
            .returning(|| Ok(vec![date(1), date(2)]));
        source
            .expect_read()
            .with(eq(date(1)))
            .returning(|_| Ok("- 始業 09:00\n".to_string()));
        source
            .expect_read()
            .with(eq(date(2)))
            .returning(|date| Err(SourceError::NotFound { date }));
        let store = ReportStore::new(&source, &Lang::Ja.keywords());

        let reports = store.list(&at(1, 0, 0), &at(31, 0, 0)).unwrap();

        assert_eq!(started_at(&reports), vec![at(1, 9, 0)]);
    }

    #[cfg(unix)]
    #[test]
    fn test_list_skips_dangling_symlink() {
        use std::fs;
        use std::os::unix::fs::symlink;

        use tempfile::tempdir;

        use crate::source::DirectorySource;

        let dir = tempdir().unwrap();
        fs::write(dir.path().join("20250101.md"), "- 始業 09:00\n").unwrap();
        symlink(dir.path().join("missing.md"), dir.path().join("20250102.md")).unwrap();
        let source = DirectorySource::new(dir.path());
        let store = ReportStore::new(&source, &Lang::Ja.keywords());

        let reports = store.list(&at(1, 0, 0), &at(31, 0, 0)).unwrap();

        assert_eq!(started_at(&reports), vec![at(1, 9, 0)]);
    }

    #[test]
    fn test_list_parse_error_is_fatal() {
        let mut source = MockReportSource::new();
        source
            .expect_dates()
            .returning(|| Ok(vec![date(1), date(2)]));
        source
            .expect_read()
            .with(eq(date(1)))
            .returning(|_| Ok("- 始業 09:00\n".to_string()));
        source
            .expect_read()
            .with(eq(date(2)))
            .returning(|_| Ok("- 始業 9時\n".to_string()));
        let store = ReportStore::new(&source, &Lang::Ja.keywords());

        let result = store.list(&at(1, 0, 0), &at(31, 0, 0));

        assert!(matches!(
            result,
            Err(StoreError::Parse { date: d, .. }) if d == date(2)
        ));
    }

    #[test]
    fn test_get() {
        let mut source = MockReportSource::new();
        source
            .expect_read()
            .with(eq(date(1)))
            .times(1)
            .returning(|_| Ok("- 始業 09:00\n- 終業 18:00\n- 休憩 01:00\n".to_string()));
        let store = ReportStore::new(&source, &Lang::Ja.keywords());

        let report = store.get(date(1)).unwrap();

        assert_eq!(report.attendance.working_duration, Duration::hours(8));
    }

    #[test]
    fn test_get_not_found() {
        let mut source = MockReportSource::new();
        source
            .expect_read()
            .returning(|date| Err(SourceError::NotFound { date }));
        let store = ReportStore::new(&source, &Lang::Ja.keywords());

        assert!(matches!(
            store.get(date(2)),
            Err(StoreError::Source(SourceError::NotFound { .. }))
        ));
    }
}
