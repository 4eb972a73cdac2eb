// ==========================================
// EcoTrack 环境指标导入系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含导入逻辑
// ==========================================

pub mod import;
pub mod indicator;
pub mod types;

// 重导出核心类型
pub use import::{ImportOutcome, RawRow, RowErrorEntry};
pub use indicator::{
    Indicator, IndicatorFilter, IndicatorStats, IndicatorUpdate, NewIndicator, Source, Zone,
};
pub use types::DatasetKind;
