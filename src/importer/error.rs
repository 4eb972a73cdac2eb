// ==========================================
// EcoTrack 环境指标导入系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分层: RowError（单行可恢复） / ImportError（整批致命）
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 行级错误：记录到 ImportOutcome.errors 后继续处理下一行
#[derive(Error, Debug)]
pub enum RowError {
    // ===== 值规范化错误 =====
    #[error("时间戳为空")]
    EmptyTimestamp,

    #[error("未知的日期格式: {0:?}")]
    UnknownTimestampFormat(String),

    #[error("数值无效: {0}")]
    InvalidNumber(String),

    // ===== 字段校验错误 =====
    #[error("{0} 为空")]
    EmptyField(String),

    #[error("CSV 记录格式错误: {0}")]
    MalformedRecord(String),

    // ===== 数据访问错误 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// 导入模块错误类型（整批失败，不产生任何持久化写入）
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 结构错误 =====
    #[error("缺少必需列 ({dataset}): {}", .columns.join(", "))]
    MissingColumns {
        dataset: String,
        columns: Vec<String>,
    },

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    // ===== 数据库错误 =====
    #[error("提交失败 ({dataset}): {message}")]
    CommitFailed { dataset: String, message: String },

    #[error("导入事务已被数据库回滚 ({dataset}, 第 {line} 行): {message}")]
    TransactionAborted {
        dataset: String,
        line: usize,
        message: String,
    },

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    // ===== 通用错误 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
