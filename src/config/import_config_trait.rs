// ==========================================
// EcoTrack 环境指标导入系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use std::error::Error;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait ImportConfigReader {
    // ===== FR_E2 =====

    /// 获取 FR_E2 缺省单位（"unité de mesure" 为空时使用）
    ///
    /// # 默认值
    /// - µg/m³
    fn get_fr_e2_default_unit(&self) -> Result<String, Box<dyn Error>>;

    /// 获取 FR_E2 新建来源的描述模板
    ///
    /// # 说明
    /// 模板中的 `{name}` 会替换为来源名称
    ///
    /// # 默认值
    /// - Mesures horaires {name}
    fn get_fr_e2_source_description(&self) -> Result<String, Box<dyn Error>>;

    // ===== IND_ATMO =====

    /// 获取 IND_ATMO 新建来源的描述
    ///
    /// # 默认值
    /// - Indice ATMO par commune
    fn get_ind_atmo_source_description(&self) -> Result<String, Box<dyn Error>>;
}
