use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Months, NaiveDate, NaiveTime, Utc};

#[cfg(not(test))]
/// 現在のUTC時間を取得する。
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// テストで期間の既定値を固定するためのモック時間。
#[cfg(test)]
pub mod mock_datetime {
    use std::cell::RefCell;

    use super::DateTime;
    use super::Utc;

    thread_local! {
        static MOCK_TIME: RefCell<Option<DateTime<Utc>>> = RefCell::new(None);
    }

    /// 設定されていればモック時間を、なければ現在時間を返す。
    pub fn now() -> DateTime<Utc> {
        MOCK_TIME.with(|cell| cell.borrow().as_ref().cloned().unwrap_or_else(Utc::now))
    }

    pub fn set_mock_time(time: DateTime<Utc>) {
        MOCK_TIME.with(|cell| *cell.borrow_mut() = Some(time));
    }

    pub fn clear_mock_time() {
        MOCK_TIME.with(|cell| *cell.borrow_mut() = None);
    }
}

#[cfg(test)]
pub use mock_datetime::now;

/// 集計期間の既定値として、1か月前から1日後までを返す。
pub fn default_range() -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let now = now();
    let since = now
        .checked_sub_months(Months::new(1))
        .context("Failed to subtract a month")?;
    let until = now + Duration::days(1);

    Ok((since, until))
}

/// 日時をパースする。
///
/// `YYYY-MM-DD`はUTCの0時として扱い、それ以外はRFC 3339として解釈する。
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    let datetime = DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("Failed to parse datetime: {}", s))?;

    Ok(datetime.to_utc())
}

/// 日付をパースする。
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("Failed to parse date: {}", s))
}
