// ==========================================
// EcoTrack 环境指标导入系统 - 导入 API
// ==========================================
// 职责: 文件级入口（扩展名检查、UTF-8 解码），委托 IndicatorImporter
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::import::ImportOutcome;
use crate::domain::types::DatasetKind;
use crate::importer::IndicatorImporter;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

/// 导入API
pub struct ImportApi {
    importer: IndicatorImporter<ConfigManager>,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    ///
    /// # 参数
    /// - conn: 共享数据库连接（配置与导入共用）
    pub fn new(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        let config = ConfigManager::from_connection(conn.clone())
            .map_err(|e| ApiError::DatabaseConnectionError(format!("初始化配置失败: {}", e)))?;

        Ok(Self {
            importer: IndicatorImporter::new(conn, config),
        })
    }

    /// 导入 CSV 文件
    ///
    /// # 参数
    /// - kind: 数据集类型
    /// - file_path: 文件路径（扩展名须为 .csv，大小写不敏感）
    ///
    /// # 返回
    /// - Ok(ImportOutcome): 导入结果
    /// - Err(ApiError::InvalidInput): 扩展名不符 / 缺少必需列
    /// - Err(ApiError::ImportError): 文件不可读、不是 UTF-8，或提交失败（已回滚）
    /// - Err(ApiError::DatabaseError): 导入事务无法开启
    pub fn import_file(&self, kind: DatasetKind, file_path: &Path) -> ApiResult<ImportOutcome> {
        let is_csv = file_path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if !is_csv {
            return Err(ApiError::InvalidInput(format!(
                "仅支持 .csv 文件: {}",
                file_path.display()
            )));
        }

        let bytes = std::fs::read(file_path).map_err(|e| {
            ApiError::ImportError(format!("读取文件失败 {}: {}", file_path.display(), e))
        })?;
        let content = String::from_utf8(bytes)
            .map_err(|e| ApiError::ImportError(format!("文件不是 UTF-8 编码: {}", e)))?;

        info!(file = %file_path.display(), dataset = kind.as_str(), "导入文件");
        self.import_text(kind, &content)
    }

    /// 导入内存中的 CSV 文本
    pub fn import_text(&self, kind: DatasetKind, content: &str) -> ApiResult<ImportOutcome> {
        Ok(self.importer.import_str(kind, content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, ensure_schema};
    use std::io::Write;

    fn setup_api() -> ImportApi {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        ImportApi::new(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_rejects_non_csv_extension() {
        let api = setup_api();
        let result = api.import_file(DatasetKind::Generic, Path::new("mesures.xlsx"));
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn test_accepts_uppercase_extension() {
        let api = setup_api();
        let mut file = tempfile::Builder::new().suffix(".CSV").tempfile().unwrap();
        writeln!(file, "source_name,zone_name,type,value,unit,timestamp").unwrap();
        writeln!(file, "A,Metz,NO2,1,µg/m³,2024-03-05").unwrap();

        let outcome = api.import_file(DatasetKind::Generic, file.path()).unwrap();
        assert_eq!(outcome.inserted, 1);
    }

    #[test]
    fn test_rejects_non_utf8_content() {
        let api = setup_api();
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(&[0x7a, 0x6f, 0x6e, 0x65, 0xe9, 0x0a]).unwrap();

        let result = api.import_file(DatasetKind::Generic, file.path());
        assert!(matches!(result, Err(ApiError::ImportError(_))));
    }
}
