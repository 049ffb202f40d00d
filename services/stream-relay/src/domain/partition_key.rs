/// 出力レコードのパーティションキー
///
/// レコード毎に現在時刻から生成する（エポック秒 + 小数部6桁）。
/// レコード内容とは無関係なため、入力ストリームの順序・シャード配置は保存されない。
/// 時計の分解能以下で連続生成した場合は同じ値になり得る。
use std::fmt;

use chrono::{DateTime, Utc};

/// タイムスタンプ由来のパーティションキー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionKey(String);

impl PartitionKey {
    /// 現在時刻からパーティションキーを生成
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// 指定時刻からパーティションキーを生成
    ///
    /// エポック以前の時刻は想定しない（0秒に丸める）。
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        let secs = at.timestamp().max(0);
        let micros = at.timestamp_subsec_micros().min(999_999);
        Self(format!("{}.{:06}", secs, micros))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// `^\d+\.\d+$`に一致するか
    fn is_decimal_timestamp(value: &str) -> bool {
        match value.split_once('.') {
            Some((int, frac)) => {
                !int.is_empty()
                    && !frac.is_empty()
                    && int.bytes().all(|b| b.is_ascii_digit())
                    && frac.bytes().all(|b| b.is_ascii_digit())
            }
            None => false,
        }
    }

    #[test]
    fn test_from_datetime_formats_seconds_and_micros() {
        let at = Utc.timestamp_opt(1_700_000_000, 123_456_000).unwrap();
        assert_eq!(PartitionKey::from_datetime(at).as_str(), "1700000000.123456");
    }

    #[test]
    fn test_from_datetime_pads_fraction() {
        let at = Utc.timestamp_opt(1_700_000_000, 5_000).unwrap();
        assert_eq!(PartitionKey::from_datetime(at).as_str(), "1700000000.000005");
    }

    #[test]
    fn test_from_datetime_whole_second() {
        let at = Utc.timestamp_opt(1_231_006_505, 0).unwrap();
        assert_eq!(PartitionKey::from_datetime(at).to_string(), "1231006505.000000");
    }

    #[test]
    fn test_now_is_decimal_timestamp() {
        let key = PartitionKey::now();
        assert!(is_decimal_timestamp(key.as_str()), "unexpected key: {}", key);
    }

    #[test]
    fn test_now_is_close_to_current_time() {
        let before = Utc::now().timestamp();
        let key = PartitionKey::now();
        let after = Utc::now().timestamp();

        let secs: i64 = key.as_str().split('.').next().unwrap().parse().unwrap();
        assert!(before <= secs && secs <= after);
    }
}
