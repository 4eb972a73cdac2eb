// ==========================================
// EcoTrack 环境指标导入系统 - FR_E2 适配器
// ==========================================
// 数据: ATMO GRAND EST 小时测量导出（分号分隔，法式小数逗号）
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

const COL_START_DATE: &str = "Date de début";
const COL_ORGANISM: &str = "Organisme";
const COL_ZAS: &str = "Zas";
const COL_POLLUTANT: &str = "Polluant";
const COL_VALUE: &str = "valeur";
const COL_UNIT: &str = "unité de mesure";

const REQUIRED_COLUMNS: &[&str] = &[
    COL_START_DATE,
    COL_ORGANISM,
    COL_ZAS,
    COL_POLLUTANT,
    COL_VALUE,
    COL_UNIT,
];

pub struct FrE2Adapter;

impl DatasetAdapter for FrE2Adapter {
    fn kind(&self) -> DatasetKind {
        DatasetKind::FrE2
    }

    fn delimiter(&self) -> u8 {
        b';'
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
        let timestamp = parse_timestamp(field(row, COL_START_DATE).unwrap_or_default())?;

        let source_name = trimmed(row, COL_ORGANISM);
        let zone_name = trimmed(row, COL_ZAS);
        let indicator_type = trimmed(row, COL_POLLUTANT);

        if source_name.is_empty() || zone_name.is_empty() {
            return Err(RowError::EmptyField(format!("{} 或 {}", COL_ORGANISM, COL_ZAS)));
        }
        if indicator_type.is_empty() {
            return Err(RowError::EmptyField(COL_POLLUTANT.to_string()));
        }

        let value = clean_float(field(row, COL_VALUE))?;

        let unit = match trimmed(row, COL_UNIT) {
            "" => settings.fr_e2_default_unit.clone(),
            unit => unit.to_string(),
        };

        let metadata = format!(
            "nom_site={}; type_implantation={}; type_influence={}",
            field(row, "nom site").unwrap_or_default(),
            field(row, "type d'implantation").unwrap_or_default(),
            field(row, "type d'influence").unwrap_or_default(),
        );

        let description = settings.fr_e2_source_description_for(source_name);
        let source = resolve_source(repo, source_name, Some(&description), None)?;
        let zone = resolve_zone(repo, zone_name)?;

        Ok(NewIndicator {
            source_id: source.id,
            zone_id: zone.id,
            indicator_type: indicator_type.to_string(),
            value,
            unit,
            timestamp,
            metadata: Some(metadata),
        })
    }
}
