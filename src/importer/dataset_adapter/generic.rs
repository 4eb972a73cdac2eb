// ==========================================
// EcoTrack 环境指标导入系统 - 通用指标 CSV 适配器
// ==========================================
// 格式: 逗号分隔，列名与 Indicator 字段一一对应
// 特点: 行错误回显原始行
// ==========================================

use super::{field, trimmed, AdapterSettings, DatasetAdapter};
use crate::domain::import::RawRow;
use crate::domain::indicator::NewIndicator;
use crate::domain::types::DatasetKind;
use crate::importer::data_cleaner::clean_float;
use crate::importer::dimension_resolver::{resolve_source, resolve_zone};
use crate::importer::error::RowError;
use crate::importer::timestamp_parser::parse_timestamp;
use crate::repository::indicator_import_repo::IndicatorImportRepository;

const REQUIRED_COLUMNS: &[&str] = &["source_name", "zone_name", "type", "value", "unit", "timestamp"];

pub struct GenericAdapter;

impl DatasetAdapter for GenericAdapter {
    fn kind(&self) -> DatasetKind {
        DatasetKind::Generic
    }

    fn delimiter(&self) -> u8 {
        b','
    }

    fn required_columns(&self) -> &'static [&'static str] {
        REQUIRED_COLUMNS
    }

    fn echoes_raw_row(&self) -> bool {
        true
    }

    fn map_row(
        &self,
        row: &RawRow,
        repo: &dyn IndicatorImportRepository,
        _settings: &AdapterSettings,
    ) -> Result<NewIndicator, RowError> {
        let source_name = trimmed(row, "source_name");
        let zone_name = trimmed(row, "zone_name");
        let indicator_type = trimmed(row, "type");

        if source_name.is_empty() {
            return Err(RowError::EmptyField("source_name".to_string()));
        }
        if zone_name.is_empty() {
            return Err(RowError::EmptyField("zone_name".to_string()));
        }
        if indicator_type.is_empty() {
            return Err(RowError::EmptyField("type".to_string()));
        }

        let value = clean_float(field(row, "value"))?;
        let timestamp = parse_timestamp(field(row, "timestamp").unwrap_or_default())?;
        let unit = trimmed(row, "unit").to_string();
        // metadata 列可选，原样保存
        let metadata = field(row, "metadata").map(str::to_string);

        let source = resolve_source(repo, source_name, None, None)?;
        let zone = resolve_zone(repo, zone_name)?;

        Ok(NewIndicator {
            source_id: source.id,
            zone_id: zone.id,
            indicator_type: indicator_type.to_string(),
            value,
            unit,
            timestamp,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{memory_conn, raw_row};
    use super::*;
    use crate::repository::indicator_import_repo_impl::SqliteImportSession;

    #[test]
    fn test_maps_complete_row() {
        let conn = memory_conn();
        let session = SqliteImportSession::begin(&conn).unwrap();
        let row = raw_row(&[
            ("source_name", " Capteur A "),
            ("zone_name", "Strasbourg"),
            ("type", "NO2"),
            ("value", "12,5"),
            ("unit", " µg/m³ "),
            ("timestamp", "05/03/2024 10:00"),
            ("metadata", " brut "),
        ]);

        let indicator = GenericAdapter
            .map_row(&row, &session, &AdapterSettings::default())
            .unwrap();

        assert_eq!(indicator.indicator_type, "NO2");
        assert_eq!(indicator.value, 12.5);
        assert_eq!(indicator.unit, "µg/m³");
        assert_eq!(indicator.metadata.as_deref(), Some(" brut "));
        let source = session.find_source_by_name("Capteur A").unwrap().unwrap();
        assert_eq!(indicator.source_id, source.id);
    }

    #[test]
    fn test_source_checked_before_zone() {
        let conn = memory_conn();
        let session = SqliteImportSession::begin(&conn).unwrap();
        let row = raw_row(&[("source_name", ""), ("zone_name", ""), ("type", "")]);

        match GenericAdapter.map_row(&row, &session, &AdapterSettings::default()) {
            Err(RowError::EmptyField(col)) => assert_eq!(col, "source_name"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_bad_value_does_not_create_dimensions() {
        let conn = memory_conn();
        let session = SqliteImportSession::begin(&conn).unwrap();
        let row = raw_row(&[
            ("source_name", "S"),
            ("zone_name", "Z"),
            ("type", "O3"),
            ("value", "n/a"),
            ("unit", "µg/m³"),
            ("timestamp", "2024-03-05"),
        ]);

        let result = GenericAdapter.map_row(&row, &session, &AdapterSettings::default());

        assert!(matches!(result, Err(RowError::InvalidNumber(_))));
        assert!(session.find_source_by_name("S").unwrap().is_none());
        assert!(session.find_zone_by_name("Z").unwrap().is_none());
    }

    #[test]
    fn test_missing_metadata_column_is_none() {
        let conn = memory_conn();
        let session = SqliteImportSession::begin(&conn).unwrap();
        let row = raw_row(&[
            ("source_name", "S"),
            ("zone_name", "Z"),
            ("type", "PM10"),
            ("value", ""),
            ("unit", "µg/m³"),
            ("timestamp", "2024-03-05"),
        ]);

        let indicator = GenericAdapter
            .map_row(&row, &session, &AdapterSettings::default())
            .unwrap();

        assert_eq!(indicator.value, 0.0);
        assert!(indicator.metadata.is_none());
    }
}
