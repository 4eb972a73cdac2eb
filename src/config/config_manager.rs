// ==========================================
// EcoTrack 环境指标导入系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    /// 从 config_kv 表读取配置值，带默认值
    pub fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 配置（存在则覆盖）
    pub fn set_config(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;

        tracing::info!(config_key = key, "配置已更新");
        Ok(())
    }

    /// 获取所有 global 配置的快照（JSON 格式，按 key 排序）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key",
        )?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
impl ImportConfigReader for ConfigManager {
    fn get_fr_e2_default_unit(&self) -> Result<String, Box<dyn Error>> {
        let value =
            self.get_config_or_default(config_keys::FR_E2_DEFAULT_UNIT, defaults::FR_E2_UNIT)?;
        if value.trim().is_empty() {
            Ok(defaults::FR_E2_UNIT.to_string())
        } else {
            Ok(value.trim().to_string())
        }
    }

    fn get_fr_e2_source_description(&self) -> Result<String, Box<dyn Error>> {
        self.get_config_or_default(
            config_keys::FR_E2_SOURCE_DESCRIPTION,
            defaults::FR_E2_SOURCE_DESCRIPTION,
        )
    }

    fn get_ind_atmo_source_description(&self) -> Result<String, Box<dyn Error>> {
        self.get_config_or_default(
            config_keys::IND_ATMO_SOURCE_DESCRIPTION,
            defaults::IND_ATMO_SOURCE_DESCRIPTION,
        )
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // FR_E2 小时测量
    pub const FR_E2_DEFAULT_UNIT: &str = "import.fr_e2.default_unit";
    pub const FR_E2_SOURCE_DESCRIPTION: &str = "import.fr_e2.source_description";

    // IND_ATMO 市镇指数
    pub const IND_ATMO_SOURCE_DESCRIPTION: &str = "import.ind_atmo.source_description";
}

// ==========================================
// 缺省值
// ==========================================
pub mod defaults {
    pub const FR_E2_UNIT: &str = "µg/m³";
    pub const FR_E2_SOURCE_DESCRIPTION: &str = "Mesures horaires {name}";
    pub const IND_ATMO_SOURCE_DESCRIPTION: &str = "Indice ATMO par commune";
}
