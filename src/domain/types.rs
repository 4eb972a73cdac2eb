// ==========================================
// EcoTrack 环境指标导入系统 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 数据集类型 (Dataset Kind)
// ==========================================
// 每种类型对应一种 CSV 文件形态（分隔符、列名各不相同）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Generic, // 通用指标 CSV
    FrE2,    // FR_E2 小时测量（ATMO GRAND EST）
    IndAtmo, // ind_atmo 市镇 ATMO 指数
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 3] = [DatasetKind::Generic, DatasetKind::FrE2, DatasetKind::IndAtmo];

    /// 稳定的机器可读名称（CLI 参数、日志字段）
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Generic => "generic",
            DatasetKind::FrE2 => "fr_e2",
            DatasetKind::IndAtmo => "ind_atmo",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetKind::Generic => write!(f, "CSV通用"),
            DatasetKind::FrE2 => write!(f, "FR_E2"),
            DatasetKind::IndAtmo => write!(f, "IND_ATMO"),
        }
    }
}

impl FromStr for DatasetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        match normalized.as_str() {
            "generic" | "csv" => Ok(DatasetKind::Generic),
            "fr_e2" => Ok(DatasetKind::FrE2),
            "ind_atmo" => Ok(DatasetKind::IndAtmo),
            _ => Err(format!("未知数据集类型: {}（可选: generic / fr_e2 / ind_atmo）", s)),
        }
    }
}
