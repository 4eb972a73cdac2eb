// ==========================================
// EcoTrack 环境指标导入系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod indicator_import_repo;
pub mod indicator_import_repo_impl;
pub mod indicator_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use indicator_import_repo::IndicatorImportRepository;
pub use indicator_import_repo_impl::SqliteImportSession;
pub use indicator_repo::{IndicatorRepository, DEFAULT_LIST_LIMIT};
