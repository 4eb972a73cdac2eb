// ==========================================
// EcoTrack 环境指标导入系统 - 时间戳解析
// ==========================================
// 顺序: ISO-8601 优先，其后按 FALLBACK_TIMESTAMP_FORMATS 依次尝试
// 约束: 格式必须匹配整个输入；只有日期时补 00:00:00
// ==========================================

use crate::importer::error::RowError;
use chrono::{NaiveDate, NaiveDateTime};

/// 一种候选时间格式（chrono strftime 语法）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampFormat {
    /// 日期 + 时间
    DateTime(&'static str),
    /// 仅日期，时间取午夜
    Date(&'static str),
}

impl TimestampFormat {
    pub fn pattern(&self) -> &'static str {
        match self {
            TimestampFormat::DateTime(p) | TimestampFormat::Date(p) => p,
        }
    }

    fn parse(&self, raw: &str) -> Option<NaiveDateTime> {
        if !year_has_four_digits(raw, self.pattern()) {
            return None;
        }

        match self {
            TimestampFormat::DateTime(p) => NaiveDateTime::parse_from_str(raw, p).ok(),
            TimestampFormat::Date(p) => NaiveDate::parse_from_str(raw, p)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
        }
    }
}

/// chrono 的 %Y 接受任意位数，这里要求年份字段恰好 4 位数字
///
/// 年份在模式中的序号（第几个转换符）与输入中第几段连续数字一一对应。
fn year_has_four_digits(raw: &str, pattern: &str) -> bool {
    let Some(year_pos) = pattern
        .split('%')
        .skip(1)
        .position(|spec| spec.starts_with('Y'))
    else {
        return true;
    };

    raw.split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
        .nth(year_pos)
        .is_some_and(|run| run.len() == 4)
}

/// ISO-8601 子集（时区偏移已在匹配前剥离）
const ISO_FORMATS: &[TimestampFormat] = &[
    TimestampFormat::DateTime("%Y-%m-%dT%H:%M:%S%.f"),
    TimestampFormat::DateTime("%Y-%m-%d %H:%M:%S%.f"),
    TimestampFormat::DateTime("%Y-%m-%dT%H:%M"),
    TimestampFormat::DateTime("%Y-%m-%d %H:%M"),
    TimestampFormat::Date("%Y-%m-%d"),
];

/// ISO 失败后的候选格式，按优先级排列（日/月顺序以日在前为准）
pub const FALLBACK_TIMESTAMP_FORMATS: &[TimestampFormat] = &[
    TimestampFormat::DateTime("%Y-%m-%d %H:%M:%S"),
    TimestampFormat::DateTime("%Y/%m/%d %H:%M:%S"),
    TimestampFormat::DateTime("%d/%m/%Y %H:%M:%S"),
    TimestampFormat::DateTime("%d-%m-%Y %H:%M:%S"),
    TimestampFormat::DateTime("%d/%m/%Y %H:%M"),
    TimestampFormat::DateTime("%d-%m-%Y %H:%M"),
    TimestampFormat::Date("%Y-%m-%d"),
    TimestampFormat::Date("%d/%m/%Y"),
    TimestampFormat::Date("%d-%m-%Y"),
];

/// 解析时间戳
///
/// # 返回
/// - Ok(NaiveDateTime): 墙上时间（带偏移的输入保留本地时刻，丢弃偏移）
/// - Err(RowError::EmptyTimestamp): 输入为空或纯空白
/// - Err(RowError::UnknownTimestampFormat): 没有任何格式匹配，携带原始字面量
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, RowError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RowError::EmptyTimestamp);
    }

    if let Some(ts) = parse_iso(trimmed) {
        return Ok(ts);
    }

    FALLBACK_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| fmt.parse(trimmed))
        .ok_or_else(|| RowError::UnknownTimestampFormat(trimmed.to_string()))
}

fn parse_iso(raw: &str) -> Option<NaiveDateTime> {
    let local = strip_utc_offset(raw);
    ISO_FORMATS.iter().find_map(|fmt| fmt.parse(local))
}

/// 去掉结尾的 `Z` 或 `±HH:MM`（仅当其位于时间部分之后）
fn strip_utc_offset(raw: &str) -> &str {
    // 最短的带时间 ISO 形式: YYYY-MM-DDTHH:MM
    const MIN_DATETIME_LEN: usize = 16;

    if raw.len() > MIN_DATETIME_LEN {
        if let Some(rest) = raw.strip_suffix(['Z', 'z']) {
            return rest;
        }

        let bytes = raw.as_bytes();
        let sign_pos = raw.len() - 6;
        if sign_pos >= MIN_DATETIME_LEN
            && matches!(bytes[sign_pos], b'+' | b'-')
            && bytes[sign_pos + 3] == b':'
            && bytes[sign_pos + 1..sign_pos + 3].iter().all(u8::is_ascii_digit)
            && bytes[sign_pos + 4..].iter().all(u8::is_ascii_digit)
        {
            return &raw[..sign_pos];
        }
    }

    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn ymd_hm(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_all_supported_shapes_give_same_date() {
        let expected_date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        for raw in ["2024-03-05", "2024/03/05 10:00:00", "05/03/2024 10:00", "05-03-2024"] {
            let ts = parse_timestamp(raw).unwrap();
            assert_eq!(ts.date(), expected_date, "input {raw}");
        }
    }

    #[test]
    fn test_date_only_defaults_to_midnight() {
        assert_eq!(parse_timestamp("05/03/2024").unwrap(), ymd_hm(2024, 3, 5, 0, 0));
    }

    #[test]
    fn test_iso_variants() {
        assert_eq!(
            parse_timestamp("2024-03-05T10:30:00").unwrap(),
            ymd_hm(2024, 3, 5, 10, 30)
        );
        assert_eq!(
            parse_timestamp(" 2024-03-05 10:30 ").unwrap(),
            ymd_hm(2024, 3, 5, 10, 30)
        );
        assert_eq!(
            parse_timestamp("2024-03-05T10:30:00.250").unwrap().nanosecond(),
            250_000_000
        );
    }

    #[test]
    fn test_offset_is_dropped_keeping_wall_clock() {
        assert_eq!(
            parse_timestamp("2025-01-01T01:00:00+01:00").unwrap(),
            ymd_hm(2025, 1, 1, 1, 0)
        );
        assert_eq!(
            parse_timestamp("2025-01-01T01:00:00Z").unwrap(),
            ymd_hm(2025, 1, 1, 1, 0)
        );
    }

    #[test]
    fn test_empty_and_blank_are_empty_timestamp() {
        assert!(matches!(parse_timestamp(""), Err(RowError::EmptyTimestamp)));
        assert!(matches!(parse_timestamp("   "), Err(RowError::EmptyTimestamp)));
    }

    #[test]
    fn test_unknown_format_carries_literal() {
        match parse_timestamp("not-a-date") {
            Err(RowError::UnknownTimestampFormat(lit)) => assert_eq!(lit, "not-a-date"),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(parse_timestamp("2024-13-45").is_err());
    }

    #[test]
    fn test_two_digit_years_are_rejected() {
        for raw in ["05/03/24", "05-03-24", "24-03-05", "24-03-05 10:00", "05/03/24 10:00:00"] {
            match parse_timestamp(raw) {
                Err(RowError::UnknownTimestampFormat(lit)) => assert_eq!(lit, raw),
                other => panic!("input {raw}: unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_year_digit_check_follows_pattern_position() {
        assert!(year_has_four_digits("05/03/2024", "%d/%m/%Y"));
        assert!(!year_has_four_digits("05/03/24", "%d/%m/%Y"));
        assert!(!year_has_four_digits("02024-03-05", "%Y-%m-%d"));
        assert!(year_has_four_digits("2024-03-05T10:30:00.250", "%Y-%m-%dT%H:%M:%S%.f"));
    }

    #[test]
    fn test_fallback_order_is_exposed() {
        assert_eq!(FALLBACK_TIMESTAMP_FORMATS.len(), 9);
        assert_eq!(FALLBACK_TIMESTAMP_FORMATS[0].pattern(), "%Y-%m-%d %H:%M:%S");
        assert_eq!(FALLBACK_TIMESTAMP_FORMATS[8].pattern(), "%d-%m-%Y");
    }
}
