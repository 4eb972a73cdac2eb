// ==========================================
// EcoTrack 环境指标导入系统 - 指标领域模型
// ==========================================
// 对齐: sql/schema.sql zones / sources / indicators 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Zone - 测量区域（维度）
// ==========================================
// 红线: 导入路径只创建、不更新；名称去重由应用层负责
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: i64,
    pub name: String,                // 区域名称（自然键，已 trim）
    pub postal_code: Option<String>, // 邮编（导入路径恒为空）
}

// ==========================================
// Source - 数据来源（维度）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: i64,
    pub name: String,                // 来源名称（自然键，已 trim）
    pub description: Option<String>, // 描述
    pub url: Option<String>,         // 链接
}

// ==========================================
// Indicator - 指标（事实）
// ==========================================
// 用途: 导入层只追加；修改走 IndicatorRepository::update_indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub id: i64,
    pub source_id: i64,
    pub zone_id: i64,
    #[serde(rename = "type")]
    pub indicator_type: String,   // 污染物/测量类型代码
    pub value: f64,               // 数值
    pub unit: String,             // 单位
    pub timestamp: NaiveDateTime, // 测量时间（无时区，保留原始墙上时间）
    pub metadata: Option<String>, // 附加元数据（自由文本）
}

// ==========================================
// NewIndicator - 待写入指标
// ==========================================
// 由数据集适配器产出，维度已解析为 id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIndicator {
    pub source_id: i64,
    pub zone_id: i64,
    #[serde(rename = "type")]
    pub indicator_type: String,
    pub value: f64,
    pub unit: String,
    pub timestamp: NaiveDateTime,
    pub metadata: Option<String>,
}

// ==========================================
// IndicatorUpdate - 指标部分更新
// ==========================================
// 只写入为 Some 的字段；全部为 None 时不做任何修改
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorUpdate {
    pub source_id: Option<i64>,
    pub zone_id: Option<i64>,
    #[serde(rename = "type")]
    pub indicator_type: Option<String>,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub timestamp: Option<NaiveDateTime>,
    pub metadata: Option<String>,
}

impl IndicatorUpdate {
    pub fn is_empty(&self) -> bool {
        self.source_id.is_none()
            && self.zone_id.is_none()
            && self.indicator_type.is_none()
            && self.value.is_none()
            && self.unit.is_none()
            && self.timestamp.is_none()
            && self.metadata.is_none()
    }
}

// ==========================================
// IndicatorFilter - 指标查询过滤条件
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorFilter {
    #[serde(rename = "type")]
    pub indicator_type: Option<String>,
    pub zone_id: Option<i64>,
    pub source_id: Option<i64>,
    pub date_from: Option<NaiveDateTime>,
    pub date_to: Option<NaiveDateTime>,
}

// ==========================================
// IndicatorStats - 指标聚合统计
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorStats {
    pub count: i64,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub avg_value: Option<f64>,
}
