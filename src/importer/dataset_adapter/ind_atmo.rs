// ==========================================
// EcoTrack 环境指标导入系统 - IND_ATMO 适配器
// ==========================================
// 数据: 市镇每日 ATMO 指数（逗号分隔）
// 映射: type 固定为 atmo_index，unit 固定为 index，value 取 code_qual
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

pub const ATMO_INDEX_TYPE: &str = "atmo_index";
pub const ATMO_INDEX_UNIT: &str = "index";

const REQUIRED_COLUMNS: &[&str] = &["lib_zone", "source", "date_ech", "code_qual", "lib_qual"];

/// 写入 metadata 的分污染物子指数（按此顺序，空值跳过）
const POLLUTANT_CODE_COLUMNS: &[&str] = &["code_no2", "code_o3", "code_pm10", "code_pm25", "code_so2"];

pub struct IndAtmoAdapter;

impl DatasetAdapter for IndAtmoAdapter {
    fn kind(&self) -> DatasetKind {
        DatasetKind::IndAtmo
    }

    fn delimiter(&self) -> u8 {
        b','
    }

    fn required_columns(&self) -> &'static [&'static str] {
        REQUIRED_COLUMNS
    }

    fn map_row(
        &self,
        row: &RawRow,
        repo: &dyn IndicatorImportRepository,
        settings: &AdapterSettings,
    ) -> Result<NewIndicator, RowError> {
        let zone_name = trimmed(row, "lib_zone");
        let source_name = trimmed(row, "source");

        if zone_name.is_empty() || source_name.is_empty() {
            return Err(RowError::EmptyField("lib_zone 或 source".to_string()));
        }

        let timestamp = parse_timestamp(trimmed(row, "date_ech"))?;
        let value = clean_float(field(row, "code_qual"))?;
        let metadata = build_metadata(row);

        let source = resolve_source(
            repo,
            source_name,
            Some(&settings.ind_atmo_source_description),
            None,
        )?;
        let zone = resolve_zone(repo, zone_name)?;

        Ok(NewIndicator {
            source_id: source.id,
            zone_id: zone.id,
            indicator_type: ATMO_INDEX_TYPE.to_string(),
            value,
            unit: ATMO_INDEX_UNIT.to_string(),
            timestamp,
            metadata: Some(metadata),
        })
    }
}

fn build_metadata(row: &RawRow) -> String {
    let mut parts = vec![format!("lib_qual={}", field(row, "lib_qual").unwrap_or_default())];

    parts.extend(POLLUTANT_CODE_COLUMNS.iter().filter_map(|col| {
        field(row, col)
            .filter(|v| !v.is_empty())
            .map(|v| format!("{}={}", col, v))
    }));

    parts.join("; ")
}
