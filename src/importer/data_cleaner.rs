// ==========================================
// EcoTrack 环境指标导入系统 - 数据清洗
// ==========================================
// 职责: 表头规范化 / 数值规范化（纯函数）
// ==========================================

use crate::importer::error::RowError;

const BOM: char = '\u{feff}';

/// 规范化 CSV 表头：去掉开头的 BOM 与两端空白，保持列顺序
pub fn normalize_headers<S: AsRef<str>>(headers: &[S]) -> Vec<String> {
    headers
        .iter()
        .map(|h| h.as_ref().trim_start_matches(BOM).trim().to_string())
        .collect()
}

/// 解析数值，兼容法式小数逗号
///
/// 空值（None / 空串 / 纯空白）视为 0.0。
pub fn clean_float(value: Option<&str>) -> Result<f64, RowError> {
    let raw = match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => return Ok(0.0),
    };

    raw.replace(',', ".")
        .trim()
        .parse::<f64>()
        .map_err(|_| RowError::InvalidNumber(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_headers_strips_bom_and_spaces() {
        let headers = vec!["\u{feff}source_name", " zone_name ", "type"];
        assert_eq!(
            normalize_headers(&headers),
            vec!["source_name", "zone_name", "type"]
        );
    }

    #[test]
    fn test_normalize_headers_empty() {
        let headers: Vec<String> = Vec::new();
        assert!(normalize_headers(&headers).is_empty());
    }

    #[test]
    fn test_clean_float_comma_and_period_agree() {
        assert_eq!(clean_float(Some("12,5")).unwrap(), 12.5);
        assert_eq!(clean_float(Some("12.5")).unwrap(), 12.5);
        assert_eq!(clean_float(Some(" 3 ")).unwrap(), 3.0);
    }

    #[test]
    fn test_clean_float_signed_values() {
        assert_eq!(clean_float(Some("-3,5")).unwrap(), -3.5);
        assert_eq!(clean_float(Some("-3.5")).unwrap(), -3.5);
        assert_eq!(clean_float(Some("+2.0")).unwrap(), 2.0);
        assert_eq!(clean_float(Some(" +2,0 ")).unwrap(), 2.0);
    }

    #[test]
    fn test_clean_float_blank_is_zero() {
        assert_eq!(clean_float(None).unwrap(), 0.0);
        assert_eq!(clean_float(Some("")).unwrap(), 0.0);
        assert_eq!(clean_float(Some("   ")).unwrap(), 0.0);
    }

    #[test]
    fn test_clean_float_invalid_keeps_literal() {
        match clean_float(Some("abc")) {
            Err(RowError::InvalidNumber(lit)) => assert_eq!(lit, "abc"),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(clean_float(Some("1,234.5")).is_err());
    }
}
