// ==========================================
// EcoTrack 环境指标导入系统 - 数据集适配器
// ==========================================
// 职责: 把一行原始 CSV 记录映射为 NewIndicator（含维度解析）
// 实现: generic / fr_e2 / ind_atmo，每种数据集一个无状态适配器
// ==========================================

pub mod fr_e2;
pub mod generic;
pub mod ind_atmo;

use crate::config::defaults;
use crate::domain::import::RawRow;
use crate::domain::indicator::NewIndicator;
use crate::domain::types::DatasetKind;
use crate::importer::error::RowError;
use crate::repository::indicator_import_repo::IndicatorImportRepository;

pub use fr_e2::FrE2Adapter;
pub use generic::GenericAdapter;
pub use ind_atmo::IndAtmoAdapter;

// ==========================================
// AdapterSettings - 单次导入内不变的可调参数
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterSettings {
    pub fr_e2_default_unit: String,
    pub fr_e2_source_description: String, // 模板，{name} 替换为来源名称
    pub ind_atmo_source_description: String,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            fr_e2_default_unit: defaults::FR_E2_UNIT.to_string(),
            fr_e2_source_description: defaults::FR_E2_SOURCE_DESCRIPTION.to_string(),
            ind_atmo_source_description: defaults::IND_ATMO_SOURCE_DESCRIPTION.to_string(),
        }
    }
}

impl AdapterSettings {
    /// 渲染 FR_E2 来源描述
    pub fn fr_e2_source_description_for(&self, source_name: &str) -> String {
        self.fr_e2_source_description.replace("{name}", source_name)
    }
}

// ==========================================
// DatasetAdapter Trait
// ==========================================
pub trait DatasetAdapter: Send + Sync {
    /// 数据集类型
    fn kind(&self) -> DatasetKind;

    /// CSV 字段分隔符
    fn delimiter(&self) -> u8;

    /// 必需列（按报告顺序）
    fn required_columns(&self) -> &'static [&'static str];

    /// 行错误是否回显原始行
    fn echoes_raw_row(&self) -> bool {
        false
    }

    /// 映射一行记录
    ///
    /// # 参数
    /// - row: 规范化表头 → 原始值
    /// - repo: 当前导入事务（维度 get-or-create 写入其中）
    /// - settings: 本次导入的配置
    ///
    /// # 返回
    /// - Ok(NewIndicator): 维度 id 已解析
    /// - Err(RowError): 本行失败，调用方记录后继续
    fn map_row(
        &self,
        row: &RawRow,
        repo: &dyn IndicatorImportRepository,
        settings: &AdapterSettings,
    ) -> Result<NewIndicator, RowError>;

    /// 计算缺失的必需列
    fn missing_columns(&self, headers: &[String]) -> Vec<String> {
        self.required_columns()
            .iter()
            .filter(|col| !headers.iter().any(|h| h == *col))
            .map(|col| col.to_string())
            .collect()
    }
}

/// 根据数据集类型获取适配器
pub fn adapter_for(kind: DatasetKind) -> &'static dyn DatasetAdapter {
    match kind {
        DatasetKind::Generic => &GenericAdapter,
        DatasetKind::FrE2 => &FrE2Adapter,
        DatasetKind::IndAtmo => &IndAtmoAdapter,
    }
}

// ==========================================
// 字段读取辅助
// ==========================================

/// 原始值（列不存在时为 None）
pub(crate) fn field<'a>(row: &'a RawRow, column: &str) -> Option<&'a str> {
    row.get(column).map(String::as_str)
}

/// trim 后的值（列不存在时为空串）
pub(crate) fn trimmed<'a>(row: &'a RawRow, column: &str) -> &'a str {
    field(row, column).map(str::trim).unwrap_or_default()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_in_required_order() {
        let adapter = adapter_for(DatasetKind::Generic);
        let headers: Vec<String> = ["timestamp", "source_name", "zone_name", "type", "value"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        assert_eq!(adapter.missing_columns(&headers), vec!["unit".to_string()]);
    }

    #[test]
    fn test_adapter_for_matches_kind() {
        for kind in DatasetKind::ALL {
            assert_eq!(adapter_for(kind).kind(), kind);
        }
        assert_eq!(adapter_for(DatasetKind::FrE2).delimiter(), b';');
        assert!(adapter_for(DatasetKind::Generic).echoes_raw_row());
        assert!(!adapter_for(DatasetKind::IndAtmo).echoes_raw_row());
    }

    #[test]
    fn test_fr_e2_description_template() {
        let settings = AdapterSettings::default();
        assert_eq!(
            settings.fr_e2_source_description_for("ATMO GRAND EST"),
            "Mesures horaires ATMO GRAND EST"
        );
    }
}
