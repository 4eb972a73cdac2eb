// ==========================================
// EcoTrack 环境指标导入系统 - 导入层
// ==========================================
// 职责: 外部 CSV 数据导入，生成 zones / sources / indicators
// 支持: 通用 CSV / FR_E2 / IND_ATMO
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod dataset_adapter;
pub mod dimension_resolver;
pub mod error;
pub mod indicator_importer;
pub mod timestamp_parser;

// 重导出核心类型
pub use data_cleaner::{clean_float, normalize_headers};
pub use dataset_adapter::{adapter_for, AdapterSettings, DatasetAdapter};
pub use dimension_resolver::{resolve_source, resolve_zone};
pub use error::{ImportError, ImportResult, RowError};
pub use indicator_importer::{run_import, IndicatorImporter};
pub use timestamp_parser::{parse_timestamp, TimestampFormat, FALLBACK_TIMESTAMP_FORMATS};
