use chrono::Duration;
use thiserror::Error;

/// 時間表記を解釈できなかったことを表すエラー。
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Malformed duration: {0:?}")]
pub struct MalformedDuration(pub String);

/// 単位と、その単位1つあたりのナノ秒。
///
/// `ms`は`m`より先に照合する必要がある。
const UNITS: [(&str, i128); 7] = [
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("ms", 1_000_000),
    ("h", 3_600_000_000_000),
    ("m", 60_000_000_000),
    ("s", 1_000_000_000),
];

/// `HH:MM`形式の時刻を、0時からの経過時間として解釈する。
///
/// 時は1桁または2桁で0から23、分は2桁で00から59とする。
pub fn parse_clock(token: &str) -> Result<Duration, MalformedDuration> {
    let malformed = || MalformedDuration(token.to_string());
    let (hour, minute) = token.split_once(':').ok_or_else(malformed)?;

    let is_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if !is_digits(hour) || hour.len() > 2 || !is_digits(minute) || minute.len() != 2 {
        return Err(malformed());
    }

    let hour: i64 = hour.parse().map_err(|_| malformed())?;
    let minute: i64 = minute.parse().map_err(|_| malformed())?;
    if hour > 23 || minute > 59 {
        return Err(malformed());
    }

    Ok(Duration::hours(hour) + Duration::minutes(minute))
}

/// `1h30m`のように単位付きの数値を連結した表記を経過時間として解釈する。
///
/// 数値は小数を含めてよいが符号は付けられない。単位なしで許されるのは`0`のみ。
pub fn parse_composite(token: &str) -> Result<Duration, MalformedDuration> {
    let malformed = || MalformedDuration(token.to_string());
    if token == "0" {
        return Ok(Duration::zero());
    }
    if token.is_empty() {
        return Err(malformed());
    }

    let mut rest = token;
    let mut total: i128 = 0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(malformed)?;
        let (number, tail) = rest.split_at(number_len);
        let (unit, scale) = UNITS
            .iter()
            .find(|(unit, _)| tail.starts_with(unit))
            .ok_or_else(malformed)?;
        total += scale_number(number, *scale).ok_or_else(malformed)?;
        rest = &tail[unit.len()..];
    }

    i64::try_from(total)
        .map(Duration::nanoseconds)
        .map_err(|_| malformed())
}

/// 10進数の文字列に単位あたりのナノ秒を掛ける。小数部の端数は切り捨てる。
fn scale_number(number: &str, scale: i128) -> Option<i128> {
    let (whole, fraction) = match number.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (number, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if fraction.contains('.') {
        return None;
    }
    // ナノ秒より細かい桁は切り捨てる。
    let fraction = &fraction[..fraction.len().min(18)];

    let whole: i128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut value = whole.checked_mul(scale)?;
    if !fraction.is_empty() {
        let digits: i128 = fraction.parse().ok()?;
        let denominator = 10_i128.pow(fraction.len() as u32);
        value = value.checked_add(digits * scale / denominator)?;
    }
    Some(value)
}

/// 経過時間を時間単位の小数に変換する。
pub fn hours(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 3_600_000.0
}

/// 経過時間をナノ秒の整数としてシリアライズする。
pub mod nanos {
    use chrono::Duration;
    use serde::ser::Error;
    use serde::Serializer;

    /// ナノ秒がi64に収まらない場合はエラーとする。
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let nanos = duration
            .num_nanoseconds()
            .ok_or_else(|| S::Error::custom(format!("duration out of range: {}", duration)))?;
        serializer.serialize_i64(nanos)
    }
}
