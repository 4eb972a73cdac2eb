// ==========================================
// EcoTrack 环境指标导入系统 - 导入结果模型
// ==========================================
// 用途: 单次导入调用的返回值，不落库
// ==========================================

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 原始行记录（规范化后的列名 → 原始值），保持文件中的列顺序
pub type RawRow = IndexMap<String, String>;

// ==========================================
// RowErrorEntry - 行级错误
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowErrorEntry {
    pub line: usize,   // 文件行号（表头为第 1 行）
    pub error: String, // 错误信息
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub row: Option<RawRow>, // 原始行（仅通用 CSV 回显）
}

// ==========================================
// ImportOutcome - 导入结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub inserted: usize,              // 成功提交的指标行数
    pub errors: Vec<RowErrorEntry>,   // 按行号顺序的行级错误
}

impl ImportOutcome {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}
