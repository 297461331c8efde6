//! リクエストのタイムスタンプを指定タイムゾーンの日時に変換する。

use chrono::DateTime;
use chrono_tz::Tz;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TimeError {
    #[error("cannot parse timestamp {0:?}")]
    InvalidTimestamp(String),
    #[error("cannot find location: {0}")]
    UnknownTimezone(String),
}

/// エポック秒の文字列と IANA タイムゾーン名から、そのタイムゾーンでの日時を求める。
///
/// # Arguments
/// * `timestamp` - 10 進数のエポック秒
/// * `area` - IANA タイムゾーン名（例: `Asia/Manila`）
pub fn resolve_timestamp(timestamp: &str, area: &str) -> Result<DateTime<Tz>, TimeError> {
    let seconds: i64 = timestamp
        .parse()
        .map_err(|_| TimeError::InvalidTimestamp(timestamp.to_string()))?;
    let tz: Tz = area
        .parse()
        .map_err(|_| TimeError::UnknownTimezone(area.to_string()))?;

    // chrono の表現範囲外の値もタイムスタンプ不正として扱う
    let utc = DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| TimeError::InvalidTimestamp(timestamp.to_string()))?;

    Ok(utc.with_timezone(&tz))
}
