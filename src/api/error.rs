// ==========================================
// EcoTrack 环境指标导入系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository/导入错误为用户可读的错误消息
// ==========================================

use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 客户端错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 是否属于调用方可修正的错误（对应 HTTP 4xx）
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ApiError::InvalidInput(_) | ApiError::NotFound(_) | ApiError::ImportError(_)
        )
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg)
            | RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::DatabaseError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::DatabaseError(format!("外键约束违反: {}", msg))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
// 整个文件导入失败（结构、读取、提交）一律归为客户端错误；
// 只有事务无法开启才算数据库错误
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::MissingColumns { .. } => ApiError::InvalidInput(err.to_string()),
            ImportError::CsvParseError(_)
            | ImportError::FileReadError(_)
            | ImportError::CommitFailed { .. }
            | ImportError::TransactionAborted { .. } => ApiError::ImportError(err.to_string()),
            ImportError::DatabaseTransactionError(_) => ApiError::DatabaseError(err.to_string()),
            ImportError::ConfigReadError { .. } => ApiError::InternalError(err.to_string()),
            ImportError::Repository(repo_err) => repo_err.into(),
            ImportError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_is_client_error() {
        let api_err: ApiError = ImportError::MissingColumns {
            dataset: "FR_E2".to_string(),
            columns: vec!["valeur".to_string()],
        }
        .into();

        assert!(matches!(api_err, ApiError::InvalidInput(_)));
        assert!(api_err.is_client_error());
        assert!(api_err.to_string().contains("valeur"));
    }

    #[test]
    fn test_commit_error_is_client_error() {
        let api_err: ApiError = ImportError::CommitFailed {
            dataset: "CSV通用".to_string(),
            message: "FOREIGN KEY constraint failed".to_string(),
        }
        .into();

        assert!(matches!(api_err, ApiError::ImportError(_)));
        assert!(api_err.is_client_error());
        assert!(api_err.to_string().contains("FOREIGN KEY"));
    }

    #[test]
    fn test_aborted_transaction_is_client_error() {
        let api_err: ApiError = ImportError::TransactionAborted {
            dataset: "FR_E2".to_string(),
            line: 7,
            message: "database or disk is full".to_string(),
        }
        .into();

        assert!(api_err.is_client_error());
    }

    #[test]
    fn test_begin_failure_stays_database_error() {
        let api_err: ApiError = ImportError::DatabaseTransactionError("database is locked".to_string()).into();

        assert!(matches!(api_err, ApiError::DatabaseError(_)));
        assert!(!api_err.is_client_error());
    }

    #[test]
    fn test_lock_error_maps_to_connection_error() {
        let api_err = ApiError::from(RepositoryError::LockError("poisoned".to_string()));

        assert!(matches!(api_err, ApiError::DatabaseConnectionError(_)));
        assert!(!api_err.is_client_error());
    }

    #[test]
    fn test_repository_error_conversion() {
        let repo_err = RepositoryError::NotFound {
            entity: "Indicator".to_string(),
            id: "42".to_string(),
        };
        match ApiError::from(repo_err) {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Indicator"));
                assert!(msg.contains("42"));
            }
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }
}
