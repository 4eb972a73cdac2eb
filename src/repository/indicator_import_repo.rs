// ==========================================
// EcoTrack 环境指标导入系统 - 指标导入 Repository Trait
// ==========================================
// 职责: 定义单次导入事务内的数据访问接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::indicator::{NewIndicator, Source, Zone};
use crate::repository::error::RepositoryResult;

// ==========================================
// IndicatorImportRepository Trait
// ==========================================
// 用途: 一次导入调用独占的事务会话
// 实现者: SqliteImportSession（使用 rusqlite）
//
// 约定:
// - 所有写操作都在同一个未提交事务内完成
// - insert_* 返回时已分配 id（flush 语义），但尚未持久化
// - commit 失败后由调用方负责 rollback
// - 行级写入失败后需检查 is_active：存储引擎可能已自行回滚整个事务
pub trait IndicatorImportRepository {
    // ===== 维度查询 =====

    /// 按名称精确查询区域（返回第一条匹配）
    fn find_zone_by_name(&self, name: &str) -> RepositoryResult<Option<Zone>>;

    /// 按名称精确查询来源（返回第一条匹配）
    fn find_source_by_name(&self, name: &str) -> RepositoryResult<Option<Source>>;

    // ===== 事务内写入 =====

    /// 插入区域并返回带 id 的实体
    fn insert_zone(&self, name: &str, postal_code: Option<&str>) -> RepositoryResult<Zone>;

    /// 插入来源并返回带 id 的实体
    fn insert_source(
        &self,
        name: &str,
        description: Option<&str>,
        url: Option<&str>,
    ) -> RepositoryResult<Source>;

    /// 插入指标，返回新行 id
    fn insert_indicator(&self, indicator: &NewIndicator) -> RepositoryResult<i64>;

    // ===== 事务边界 =====

    /// 提交事务（持久化本次导入全部写入）
    fn commit(&self) -> RepositoryResult<()>;

    /// 回滚事务（丢弃本次导入全部写入）
    fn rollback(&self) -> RepositoryResult<()>;

    /// 事务是否仍然有效（未结束，且未被存储引擎自动回滚）
    fn is_active(&self) -> bool;
}
