// ==========================================
// EcoTrack 环境指标导入系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{ImportApi, IndicatorApi};
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::repository::indicator_repo::IndicatorRepository;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "ECOTRACK_DB_PATH";

/// 应用状态
///
/// 包含所有API实例和共享资源（单个共享连接）
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 导入API
    pub import_api: Arc<ImportApi>,

    /// 指标查询API
    pub indicator_api: Arc<IndicatorApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（不存在则创建并建表）
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let indicator_repo = Arc::new(IndicatorRepository::from_connection(conn.clone()));
        let indicator_api = Arc::new(IndicatorApi::new(indicator_repo));

        let import_api = Arc::new(
            ImportApi::new(conn).map_err(|e| format!("无法创建ImportApi: {}", e))?,
        );

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            import_api,
            indicator_api,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: ECOTRACK_DB_PATH 环境变量 → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./ecotrack.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发构建使用独立目录，避免污染正式数据
        #[cfg(debug_assertions)]
        let dir = data_dir.join("ecotrack-dev");

        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("ecotrack");

        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("ecotrack.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_app_state_creates_schema() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("state.db").to_string_lossy().to_string();

        let state = AppState::new(db_path).unwrap();

        assert!(state.indicator_api.list_zones().unwrap().is_empty());
    }
}
